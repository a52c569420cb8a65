//! API route handlers. Mirrors the `/api/v1` surface: pillars, controls,
//! recommendations, assessments, and the AI advisory endpoints.

use crate::{ApiError, AppState};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use waflens_advisor::{AdvisoryAnswer, AdvisoryRequest, AssessmentAnalysis};
use waflens_auth::Session;
use waflens_core::content::{self, ASSESSMENTS_COLLECTION};
use waflens_core::query::{Constraint, Direction};
use waflens_core::{ai_configured, Assessment, ControlItem, PillarRecord, Recommendation};
use waflens_query::pillars;

pub async fn root_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "waflens-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// JSON Schemas for the wire types, in lieu of generated API docs.
pub async fn api_schemas() -> Json<Value> {
    Json(json!({
        "pillarRecord": schemars::schema_for!(PillarRecord),
        "controlItem": schemars::schema_for!(ControlItem),
        "recommendation": schemars::schema_for!(Recommendation),
        "assessment": schemars::schema_for!(Assessment),
        "advisoryRequest": schemars::schema_for!(AdvisoryRequest),
        "advisoryAnswer": schemars::schema_for!(AdvisoryAnswer),
        "assessmentAnalysis": schemars::schema_for!(AssessmentAnalysis),
    }))
}

// --- Pillars ---

pub async fn list_pillars(State(state): State<AppState>) -> Result<Json<Vec<PillarRecord>>, ApiError> {
    let pillars = pillars::pillar_directory(&state.query)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(pillars))
}

pub async fn get_pillar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PillarRecord>, ApiError> {
    let pillars = pillars::pillar_directory(&state.query)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    pillars
        .into_iter()
        .find(|p| p.id == id || p.slug == id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Pillar not found"))
}

pub async fn pillar_controls(
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Json<Value> {
    tracing::debug!(user = %session.user_id, pillar = %id, "controls read");
    Json(json!({
        "pillarId": id,
        "score": content::compliance_score(&id),
        "controls": content::controls_for(&id),
    }))
}

// --- Recommendations ---

#[derive(Debug, Deserialize)]
pub struct RecommendationFilter {
    pub pillar_id: Option<String>,
    pub status: Option<String>,
}

pub async fn list_recommendations(
    State(state): State<AppState>,
    Query(filter): Query<RecommendationFilter>,
) -> Result<Json<Vec<Recommendation>>, ApiError> {
    let recs = pillars::recommendations(
        &state.query,
        filter.pillar_id.as_deref(),
        filter.status.as_deref(),
    )
    .await
    .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(recs))
}

// --- Assessments ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentCreate {
    pub pillar_id: String,
    #[serde(default)]
    pub responses: Vec<Value>,
}

pub async fn list_assessments(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Assessment>>, ApiError> {
    let docs = state
        .query
        .fetch_async(
            ASSESSMENTS_COLLECTION,
            &[
                Constraint::field_eq("userId", session.user_id.as_str()),
                Constraint::order_by("createdAt", Direction::Descending),
            ],
        )
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let assessments = docs
        .into_iter()
        .map(|d| {
            serde_json::from_value(d)
                .map_err(|e| ApiError::internal(format!("malformed assessment: {}", e)))
        })
        .collect::<Result<Vec<Assessment>, ApiError>>()?;
    Ok(Json(assessments))
}

pub async fn create_assessment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<AssessmentCreate>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let now = now_timestamp();
    let fields = json!({
        "pillarId": body.pillar_id,
        "userId": session.user_id,
        "responses": body.responses,
        "status": "in_progress",
        "createdAt": now,
        "updatedAt": now,
    });

    let id = state
        .store
        .insert(ASSESSMENTS_COLLECTION, &fields)
        .map_err(|e| ApiError::internal(e))?;

    let mut created = fields;
    created["id"] = Value::String(id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_assessment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let doc = read_owned_assessment(&state, &session, &id, "view")?;
    Ok(Json(doc))
}

pub async fn update_assessment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(updates): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let mut doc = read_owned_assessment(&state, &session, &id, "update")?;

    if let (Some(target), Some(changes)) = (doc.as_object_mut(), updates.as_object()) {
        for (key, value) in changes {
            // identity and lineage fields are not client-writable
            if matches!(key.as_str(), "id" | "userId" | "createdAt") {
                continue;
            }
            target.insert(key.clone(), value.clone());
        }
        target.insert("updatedAt".to_string(), Value::String(now_timestamp()));
    }

    state
        .store
        .write(ASSESSMENTS_COLLECTION, &id, &doc)
        .map_err(|e| ApiError::internal(e))?;

    Ok(Json(json!({
        "message": "Assessment updated successfully",
        "id": id,
    })))
}

fn read_owned_assessment(
    state: &AppState,
    session: &Session,
    id: &str,
    action: &str,
) -> Result<Value, ApiError> {
    let doc = state
        .store
        .read(ASSESSMENTS_COLLECTION, id)
        .map_err(|e| ApiError::internal(e))?
        .ok_or_else(|| ApiError::not_found("Assessment not found"))?;

    if doc.get("userId").and_then(|v| v.as_str()) != Some(session.user_id.as_str()) {
        return Err(ApiError::forbidden(format!(
            "Not authorized to {} this assessment",
            action
        )));
    }
    Ok(doc)
}

// --- AI ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeRequest {
    pub pillar: String,
    #[serde(default)]
    pub responses: Vec<Value>,
}

pub async fn ai_chat(
    State(state): State<AppState>,
    Json(request): Json<AdvisoryRequest>,
) -> Result<Json<AdvisoryAnswer>, ApiError> {
    ensure_ai_configured(&state)?;
    waflens_advisor::ask(&state.ai, &request)
        .await
        .map(Json)
        .map_err(|e| ApiError::bad_gateway(format!("Chat failed: {}", e)))
}

pub async fn ai_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AssessmentAnalysis>, ApiError> {
    ensure_ai_configured(&state)?;
    waflens_advisor::analyze(&state.ai, &request.pillar, &request.responses)
        .await
        .map(Json)
        .map_err(|e| ApiError::bad_gateway(format!("AI analysis failed: {}", e)))
}

fn ensure_ai_configured(state: &AppState) -> Result<(), ApiError> {
    if ai_configured(&state.ai) {
        Ok(())
    } else {
        Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "AI provider not configured",
        ))
    }
}

fn now_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use waflens_core::{AiSettings, Store};

    fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()));
        let state = AppState::new(store, None, AiSettings::default());
        (dir, state)
    }

    fn session(user_id: &str) -> Session {
        Session {
            user_id: user_id.to_string(),
            display_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn pillar_listing_serves_fallback_on_empty_store() {
        let (_dir, state) = state();
        let Json(pillars) = list_pillars(State(state)).await.unwrap();
        let ids: Vec<&str> = pillars.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["security", "reliability", "performance", "cost", "operations"]
        );
    }

    #[tokio::test]
    async fn pillar_lookup_by_id_or_slug() {
        let (_dir, state) = state();
        let Json(by_id) = get_pillar(State(state.clone()), Path("cost".to_string()))
            .await
            .unwrap();
        assert_eq!(by_id.name, "Cost Optimization");

        let Json(by_slug) = get_pillar(State(state.clone()), Path("cost-optimization".to_string()))
            .await
            .unwrap();
        assert_eq!(by_slug.id, "cost");

        let err = get_pillar(State(state), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn controls_payload_carries_score_and_checklist() {
        let Json(payload) = pillar_controls(
            Extension(session("u-1")),
            Path("security".to_string()),
        )
        .await;
        assert_eq!(payload["score"], 75);
        assert_eq!(payload["controls"].as_array().unwrap().len(), 5);
        assert_eq!(payload["controls"][0]["id"], "sec-1");
        assert_eq!(payload["controls"][2]["status"], "action-required");
    }

    #[tokio::test]
    async fn unknown_pillar_controls_are_empty() {
        let Json(payload) =
            pillar_controls(Extension(session("u-1")), Path("nope".to_string())).await;
        assert!(payload["controls"].as_array().unwrap().is_empty());
        assert_eq!(payload["score"], Value::Null);
    }

    #[tokio::test]
    async fn assessment_lifecycle_with_ownership_checks() {
        let (_dir, state) = state();
        let owner = session("u-1");
        let intruder = session("u-2");

        // create
        let (status, Json(created)) = create_assessment(
            State(state.clone()),
            Extension(owner.clone()),
            Json(AssessmentCreate {
                pillar_id: "security".to_string(),
                responses: vec![json!({"question": "q1", "answer": "yes"})],
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["status"], "in_progress");

        // list is scoped to the owner
        let Json(mine) = list_assessments(State(state.clone()), Extension(owner.clone()))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].pillar_id, "security");

        let Json(theirs) = list_assessments(State(state.clone()), Extension(intruder.clone()))
            .await
            .unwrap();
        assert!(theirs.is_empty());

        // foreign reads and writes are forbidden
        let err = get_assessment(
            State(state.clone()),
            Extension(intruder.clone()),
            Path(id.clone()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        // update completes the assessment and bumps updatedAt only
        let Json(updated) = update_assessment(
            State(state.clone()),
            Extension(owner.clone()),
            Path(id.clone()),
            Json(json!({"status": "completed", "score": 88, "userId": "u-2"})),
        )
        .await
        .unwrap();
        assert_eq!(updated["id"], id.as_str());

        let Json(doc) = get_assessment(State(state.clone()), Extension(owner), Path(id))
            .await
            .unwrap();
        assert_eq!(doc["status"], "completed");
        assert_eq!(doc["score"], 88);
        // ownership could not be reassigned
        assert_eq!(doc["userId"], "u-1");
    }

    #[tokio::test]
    async fn missing_assessment_is_not_found() {
        let (_dir, state) = state();
        let err = get_assessment(
            State(state),
            Extension(session("u-1")),
            Path("doc-99".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unconfigured_ai_is_unavailable_not_a_crash() {
        let (_dir, state) = state();
        let err = ai_chat(
            State(state),
            Json(AdvisoryRequest {
                prompt: "How do I reduce cost?".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn recommendation_filters_pass_through() {
        let (_dir, state) = state();
        let Json(recs) = list_recommendations(
            State(state),
            Query(RecommendationFilter {
                pillar_id: Some("security".to_string()),
                status: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(recs.len(), 2);
    }
}
