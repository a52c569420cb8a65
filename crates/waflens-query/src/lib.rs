mod live;
pub mod pillars;
mod watch;

pub use live::{LiveQuery, QueryMode, QueryState};
pub use watch::{Snapshot, Subscription};

use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use waflens_core::query::{apply_constraints, Constraint};
use waflens_core::Store;

/// Failures surfaced by the query layer. Read errors land in hook state;
/// they are never panicked across the boundary, and there is no retry;
/// `refetch` or a fresh subscription is the caller's manual retry.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The store root could not be initialized.
    StoreUnavailable(String),
    /// A one-shot read failed.
    QueryFailure(String),
    /// The realtime change stream failed to establish or broke mid-stream.
    SubscriptionFailure(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::StoreUnavailable(e) => write!(f, "store unavailable: {}", e),
            QueryError::QueryFailure(e) => write!(f, "query failed: {}", e),
            QueryError::SubscriptionFailure(e) => write!(f, "subscription failed: {}", e),
        }
    }
}

impl std::error::Error for QueryError {}

/// Read access to the document store. Cheap to clone; clones share the
/// live-subscription counter.
#[derive(Clone)]
pub struct QueryClient {
    store: Arc<Store>,
    live_subscriptions: Arc<AtomicUsize>,
}

impl QueryClient {
    pub fn new(store: Arc<Store>) -> QueryClient {
        QueryClient {
            store,
            live_subscriptions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// One-shot read: list the collection and apply the constraints.
    pub fn fetch(&self, collection: &str, constraints: &[Constraint]) -> Result<Vec<Value>, QueryError> {
        let docs = self
            .store
            .list(collection)
            .map_err(QueryError::QueryFailure)?;
        Ok(apply_constraints(docs, constraints))
    }

    /// `fetch` off the async runtime's blocking pool. No timeout is
    /// applied; a hung read blocks the caller until it resolves.
    pub async fn fetch_async(
        &self,
        collection: &str,
        constraints: &[Constraint],
    ) -> Result<Vec<Value>, QueryError> {
        let client = self.clone();
        let collection = collection.to_string();
        let constraints = constraints.to_vec();
        tokio::task::spawn_blocking(move || client.fetch(&collection, &constraints))
            .await
            .map_err(|e| QueryError::QueryFailure(format!("fetch task: {}", e)))?
    }

    /// Number of realtime subscriptions that have not been torn down.
    pub fn live_subscription_count(&self) -> usize {
        self.live_subscriptions.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> (tempfile::TempDir, QueryClient) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()));
        (dir, QueryClient::new(store))
    }

    #[test]
    fn fetch_returns_stored_documents_with_ids() {
        let (_dir, client) = client();
        for (id, name) in [("security", "Security"), ("cost", "Cost Optimization")] {
            client
                .store()
                .write("pillars", id, &json!({"name": name}))
                .unwrap();
        }

        let docs = client.fetch("pillars", &[]).unwrap();
        assert_eq!(docs.len(), 2);
        let ids: Vec<&str> = docs.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["cost", "security"]);
    }

    #[test]
    fn fetch_applies_constraints() {
        let (_dir, client) = client();
        for (id, pillar) in [("doc-1", "security"), ("doc-2", "cost"), ("doc-3", "security")] {
            client
                .store()
                .write("recommendations", id, &json!({"pillarId": pillar}))
                .unwrap();
        }

        let docs = client
            .fetch(
                "recommendations",
                &[Constraint::field_eq("pillarId", "security")],
            )
            .unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn fetch_async_matches_sync_fetch() {
        let (_dir, client) = client();
        client
            .store()
            .write("pillars", "security", &json!({"name": "Security"}))
            .unwrap();
        let docs = client.fetch_async("pillars", &[]).await.unwrap();
        assert_eq!(docs, client.fetch("pillars", &[]).unwrap());
    }
}
