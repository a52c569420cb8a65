//! Domain hooks over the query layer: the pillar directory and the
//! recommendations listing.

use crate::live::typed;
use crate::{LiveQuery, QueryClient, QueryError, QueryMode, QueryState};
use waflens_core::content::{self, PILLARS_COLLECTION, RECOMMENDATIONS_COLLECTION};
use waflens_core::query::{apply_constraints, Constraint};
use waflens_core::{PillarRecord, Recommendation};

/// Pillar directory hook. Wraps a one-shot query over the pillars
/// collection with no constraints; when the store yields nothing the
/// built-in five-pillar list is substituted whole: all-or-nothing, never
/// merged or partially overridden.
pub struct PillarListing {
    inner: LiveQuery<PillarRecord>,
}

impl PillarListing {
    pub fn open(client: &QueryClient) -> PillarListing {
        PillarListing {
            inner: LiveQuery::open(client, PILLARS_COLLECTION, Vec::new(), QueryMode::OneShot),
        }
    }

    /// Current listing state. Once loading has finished, `data` is never
    /// empty: dashboard tiles navigate by pillar id, so an empty directory
    /// would break every route.
    pub fn state(&self) -> QueryState<PillarRecord> {
        let mut state = self.inner.state();
        if !state.loading && state.data.is_empty() {
            state.data = content::default_pillars();
        }
        state
    }

    pub async fn refetch(&self) {
        self.inner.refetch().await;
    }
}

/// One-shot read of the pillar directory with the fallback applied and
/// display ordering. The entry point for non-reactive callers.
pub async fn pillar_directory(client: &QueryClient) -> Result<Vec<PillarRecord>, QueryError> {
    let docs = client.fetch_async(PILLARS_COLLECTION, &[]).await?;
    if docs.is_empty() {
        return Ok(content::default_pillars());
    }
    let mut pillars: Vec<PillarRecord> = typed(docs)?;
    pillars.sort_by_key(|p| p.order);
    Ok(pillars)
}

/// One-shot filtered read of the recommendations collection. An empty
/// collection serves the built-in starter set; filters apply either way.
pub async fn recommendations(
    client: &QueryClient,
    pillar_id: Option<&str>,
    status: Option<&str>,
) -> Result<Vec<Recommendation>, QueryError> {
    let docs = client.fetch_async(RECOMMENDATIONS_COLLECTION, &[]).await?;
    if !docs.is_empty() {
        let mut constraints = Vec::new();
        if let Some(pillar) = pillar_id {
            constraints.push(Constraint::field_eq("pillarId", pillar));
        }
        if let Some(status) = status {
            constraints.push(Constraint::field_eq("status", status));
        }
        return typed(apply_constraints(docs, &constraints));
    }

    let mut recs = content::builtin_recommendations();
    if let Some(pillar) = pillar_id {
        recs.retain(|r| r.pillar_id == pillar);
    }
    if let Some(status) = status {
        recs.retain(|r| {
            serde_json::to_value(r.status)
                .map(|v| v == status)
                .unwrap_or(false)
        });
    }
    Ok(recs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use waflens_core::Store;

    fn make_client() -> (tempfile::TempDir, QueryClient) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()));
        (dir, QueryClient::new(store))
    }

    async fn settled(listing: &PillarListing) -> QueryState<PillarRecord> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let state = listing.state();
            if !state.loading {
                return state;
            }
            assert!(Instant::now() < deadline, "listing never settled");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn empty_store_serves_the_fixed_fallback() {
        let (_dir, client) = make_client();
        let listing = PillarListing::open(&client);
        let state = settled(&listing).await;

        let ids: Vec<&str> = state.data.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["security", "reliability", "performance", "cost", "operations"]
        );
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn stored_pillars_are_not_merged_with_the_fallback() {
        let (_dir, client) = make_client();
        client
            .store()
            .write(
                PILLARS_COLLECTION,
                "custom",
                &json!({
                    "name": "Custom",
                    "slug": "custom",
                    "description": "d",
                    "icon": "Star",
                    "color": "purple",
                    "order": 1
                }),
            )
            .unwrap();

        let listing = PillarListing::open(&client);
        let state = settled(&listing).await;
        assert_eq!(state.data.len(), 1);
        assert_eq!(state.data[0].id, "custom");
    }

    #[tokio::test]
    async fn seeded_store_bypasses_the_fallback_path() {
        let (_dir, client) = make_client();
        waflens_core::seed_pillars(client.store()).unwrap();

        let listing = PillarListing::open(&client);
        let state = settled(&listing).await;
        assert_eq!(state.data.len(), 5);
    }

    #[tokio::test]
    async fn pillar_directory_sorts_by_display_order() {
        let (_dir, client) = make_client();
        waflens_core::seed_pillars(client.store()).unwrap();

        let pillars = pillar_directory(&client).await.unwrap();
        let orders: Vec<u32> = pillars.iter().map(|p| p.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);

        // empty store serves the fallback from here too
        let (_dir2, empty) = make_client();
        let fallback = pillar_directory(&empty).await.unwrap();
        assert_eq!(fallback.len(), 5);
    }

    #[tokio::test]
    async fn builtin_recommendations_filter_by_pillar() {
        let (_dir, client) = make_client();
        let recs = recommendations(&client, Some("security"), None).await.unwrap();
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.pillar_id == "security"));

        let pending = recommendations(&client, None, Some("pending")).await.unwrap();
        assert_eq!(pending.len(), 3);

        let none = recommendations(&client, Some("reliability"), None).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn stored_recommendations_shadow_the_builtins() {
        let (_dir, client) = make_client();
        client
            .store()
            .write(
                RECOMMENDATIONS_COLLECTION,
                "doc-1",
                &json!({
                    "pillarId": "cost",
                    "controlId": "cost-1",
                    "title": "t",
                    "description": "d",
                    "priority": "high",
                    "effort": "low",
                    "impact": "medium",
                    "status": "pending"
                }),
            )
            .unwrap();

        let all = recommendations(&client, None, None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "doc-1");

        let filtered = recommendations(&client, Some("security"), None).await.unwrap();
        assert!(filtered.is_empty());
    }
}
