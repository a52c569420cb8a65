//! Reactive query handles: the async analog of a UI data hook. Construct
//! one, poll `state()`, drop it to tear everything down.

use crate::{QueryClient, QueryError, Snapshot, Subscription};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use waflens_core::query::Constraint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Single fetch on open and on every constraint change; `refetch`
    /// re-runs it manually.
    OneShot,
    /// Live subscription; every change set replaces the data wholesale.
    /// `refetch` is a no-op here; the subscription is the refresh
    /// mechanism.
    Realtime,
}

/// Snapshot of a query handle's current state.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Vec<T>,
    /// True until the first fetch or subscription delivery resolves,
    /// successfully or not. Flips false exactly once per cycle.
    pub loading: bool,
    pub error: Option<QueryError>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState {
            data: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

/// A reactive read of one collection, one-shot or realtime. Dropping the
/// handle aborts the listener and unsubscribes exactly once.
pub struct LiveQuery<T> {
    client: QueryClient,
    collection: String,
    constraints: Vec<Constraint>,
    mode: QueryMode,
    state: Arc<Mutex<QueryState<T>>>,
    subscription: Option<Subscription>,
    listener: Option<tokio::task::JoinHandle<()>>,
}

impl<T> LiveQuery<T>
where
    T: DeserializeOwned + Clone + Send + 'static,
{
    /// Open a query handle. Must be called within a tokio runtime; the
    /// initial read resolves asynchronously while `state()` reports
    /// `loading`.
    pub fn open(
        client: &QueryClient,
        collection: &str,
        constraints: Vec<Constraint>,
        mode: QueryMode,
    ) -> LiveQuery<T> {
        let mut query = LiveQuery {
            client: client.clone(),
            collection: collection.to_string(),
            constraints,
            mode,
            state: Arc::new(Mutex::new(QueryState::default())),
            subscription: None,
            listener: None,
        };
        query.start();
        query
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn state(&self) -> QueryState<T> {
        self.state.lock().unwrap().clone()
    }

    /// Re-run the one-shot fetch. In realtime mode this is a no-op by
    /// contract; callers refresh through the subscription instead.
    pub async fn refetch(&self) {
        if self.mode == QueryMode::Realtime {
            return;
        }
        {
            let mut state = self.state.lock().unwrap();
            state.loading = true;
            state.error = None;
        }
        let result = self
            .client
            .fetch_async(&self.collection, &self.constraints)
            .await;
        apply_snapshot(&self.state, result);
    }

    /// Replace the constraint list. Compared structurally: a rebuilt but
    /// identical list is ignored; a changed one re-runs the fetch or
    /// re-establishes the subscription.
    pub fn set_constraints(&mut self, constraints: Vec<Constraint>) {
        if constraints == self.constraints {
            return;
        }
        self.constraints = constraints;
        self.shutdown();
        {
            let mut state = self.state.lock().unwrap();
            state.loading = true;
            state.error = None;
        }
        self.start();
    }

    fn start(&mut self) {
        match self.mode {
            QueryMode::OneShot => {
                let client = self.client.clone();
                let collection = self.collection.clone();
                let constraints = self.constraints.clone();
                let state = Arc::clone(&self.state);
                self.listener = Some(tokio::spawn(async move {
                    let result = client.fetch_async(&collection, &constraints).await;
                    apply_snapshot(&state, result);
                }));
            }
            QueryMode::Realtime => {
                match self.client.subscribe(&self.collection, &self.constraints) {
                    Ok((mut rx, subscription)) => {
                        self.subscription = Some(subscription);
                        let state = Arc::clone(&self.state);
                        self.listener = Some(tokio::spawn(async move {
                            while let Some(snapshot) = rx.recv().await {
                                apply_snapshot(&state, snapshot);
                            }
                        }));
                    }
                    Err(e) => {
                        let mut state = self.state.lock().unwrap();
                        state.loading = false;
                        state.error = Some(e);
                    }
                }
            }
        }
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.listener.take() {
            handle.abort();
        }
        // Dropping the subscription unsubscribes; its teardown guard makes
        // that happen exactly once.
        self.subscription = None;
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.take() {
            handle.abort();
        }
        // Subscription drop unsubscribes exactly once.
        self.subscription = None;
    }
}

fn apply_snapshot<T: DeserializeOwned>(state: &Arc<Mutex<QueryState<T>>>, snapshot: Snapshot) {
    let mut state = state.lock().unwrap();
    state.loading = false;
    match snapshot.and_then(typed) {
        Ok(data) => {
            state.data = data;
            state.error = None;
        }
        Err(e) => {
            state.error = Some(e);
        }
    }
}

/// Deserialize raw documents into the caller's record type. Any malformed
/// document fails the whole snapshot.
pub(crate) fn typed<T: DeserializeOwned>(docs: Vec<Value>) -> Result<Vec<T>, QueryError> {
    docs.into_iter()
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| QueryError::QueryFailure(format!("malformed document: {}", e)))
        })
        .collect()
}
