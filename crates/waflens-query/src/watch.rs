//! Realtime subscriptions: a filesystem watcher on the collection
//! directory turned into an ordered stream of full-replacement snapshots.

use crate::{QueryClient, QueryError};
use notify::{recommended_watcher, EventKind, RecursiveMode, Watcher};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use waflens_core::query::Constraint;

/// One realtime delivery: the full post-change contents of the queried
/// collection. Always a full replacement, never an incremental patch;
/// the store's change-diff capability is not used.
pub type Snapshot = Result<Vec<Value>, QueryError>;

/// Handle to an established realtime subscription. Dropping it or calling
/// [`Subscription::cancel`] detaches the watcher; teardown runs exactly
/// once no matter how many of those happen.
pub struct Subscription {
    active: bool,
    live: Arc<AtomicUsize>,
    watcher: Option<notify::RecommendedWatcher>,
}

impl Subscription {
    /// Tear the subscription down now instead of at drop time.
    pub fn cancel(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if std::mem::take(&mut self.active) {
            self.live.fetch_sub(1, Ordering::SeqCst);
            // Dropping the watcher stops its event thread and closes the
            // snapshot stream.
            self.watcher.take();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl QueryClient {
    /// Establish a realtime read of a collection. The current contents are
    /// delivered immediately as the first snapshot; afterwards every
    /// change burst in the collection directory produces a fresh snapshot,
    /// in delivery order. Redundant re-reads are possible, out-of-order
    /// state is not.
    pub fn subscribe(
        &self,
        collection: &str,
        constraints: &[Constraint],
    ) -> Result<(mpsc::UnboundedReceiver<Snapshot>, Subscription), QueryError> {
        let dir = self.store().collection_dir(collection);
        std::fs::create_dir_all(&dir).map_err(|e| QueryError::StoreUnavailable(e.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();

        // Initial snapshot so subscribers don't wait for the first write.
        let _ = tx.send(self.fetch(collection, constraints));

        let client = self.clone();
        let collection = collection.to_string();
        let constraints = constraints.to_vec();
        let mut watcher = recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if !matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        return;
                    }
                    // Atomic writes land as a rename of a .tmp file onto
                    // the .json path; only the .json event matters.
                    if !event
                        .paths
                        .iter()
                        .any(|p| p.extension().is_some_and(|e| e == "json"))
                    {
                        return;
                    }
                    let _ = tx.send(client.fetch(&collection, &constraints));
                }
                Err(e) => {
                    let _ = tx.send(Err(QueryError::SubscriptionFailure(e.to_string())));
                }
            }
        })
        .map_err(|e| QueryError::SubscriptionFailure(e.to_string()))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| QueryError::SubscriptionFailure(e.to_string()))?;

        self.live_subscriptions.fetch_add(1, Ordering::SeqCst);
        let subscription = Subscription {
            active: true,
            live: Arc::clone(&self.live_subscriptions),
            watcher: Some(watcher),
        };
        Ok((rx, subscription))
    }
}
