//! HTTP request handlers and shared application state.

use super::errors::ApiError;
use super::models::{
    CreatedResponse, DeletedResponse, HealthResponse, KeysResponse, ListResponse,
    NO_MATCHES_MESSAGE, StatsParams, UpdatedResponse, patch_from_body,
};
use crate::errors::StoreError;
use crate::logger::AUDIT_TARGET;
use crate::store::{FeatureStore, FieldSummary, SpotDraft, SpotFilter};
use crate::types::DEFAULT_SUMMARY_FIELDS;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Arc<FeatureStore>,
}

impl AppState {
    #[must_use]
    pub const fn new(store: Arc<FeatureStore>) -> Self {
        Self { store }
    }
}

/// Run a mutation on the blocking pool. The task is detached from the request
/// future, so a client that hangs up does not interrupt a write in progress.
async fn on_store<T, F>(state: &AppState, op: &'static str, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&FeatureStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| ApiError::Internal(format!("{op} task failed: {e}")))?
        .map_err(|e| ApiError::from_store(op, e))
}

fn object_body(body: Result<Json<Value>, JsonRejection>) -> Result<serde_json::Map<String, Value>, ApiError> {
    match body {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(Json(_)) => Err(ApiError::BadRequest("request body must be a JSON object".into())),
        Err(rejection) => Err(ApiError::BadRequest(format!(
            "request body is missing or malformed: {}",
            rejection.body_text()
        ))),
    }
}

/// `GET /api/parcheggi?key=value&...`
pub async fn list_spots(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(pairs) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let filter = SpotFilter::from_pairs(pairs).map_err(|e| ApiError::from_store("list", e))?;
    let features = state.store.list(&filter).map_err(|e| ApiError::from_store("list", e))?;
    let message = features.is_empty().then(|| NO_MATCHES_MESSAGE.to_string());
    Ok(Json(ListResponse {
        kind: state.store.snapshot().type_name().to_string(),
        message,
        features,
    }))
}

/// `POST /api/parcheggi`
pub async fn create_spot(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let body = object_body(body)?;
    let draft: SpotDraft = serde_json::from_value(Value::Object(body))
        .map_err(|e| ApiError::BadRequest(format!("invalid feature: {e}")))?;
    if draft.geometry.is_none() {
        return Err(ApiError::BadRequest("geometry is missing from the feature".into()));
    }
    let id = on_store(&state, "create", move |store| store.create(draft)).await?;
    log::info!(target: AUDIT_TARGET, "create id={id}");
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { message: "parking spot added".into(), id }),
    ))
}

/// `PUT /api/parcheggi/:id`
pub async fn update_spot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let body = object_body(body)?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("request body is empty".into()));
    }
    let patch = patch_from_body(&body)?;
    let target = id.clone();
    let updated = on_store(&state, "update", move |store| store.update(&target, &patch)).await?;
    log::info!(target: AUDIT_TARGET, "update id={id} fields={:?}", updated.keys().collect::<Vec<_>>());
    Ok(Json(UpdatedResponse {
        message: "parking spot updated".into(),
        id,
        updated_properties: updated,
    }))
}

/// `DELETE /api/parcheggi/:id`
pub async fn delete_spot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let removed = on_store(&state, "delete", move |store| store.delete(&id)).await?;
    log::info!(target: AUDIT_TARGET, "delete id={removed}");
    Ok(Json(DeletedResponse { message: "parking spot deleted".into(), id: removed }))
}

/// `GET /api/parcheggi/keys`
pub async fn known_keys(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(KeysResponse { keys: state.store.known_keys().into_iter().collect() })
}

/// `GET /api/parcheggi/stats?fields=a,b`
pub async fn field_stats(
    State(state): State<AppState>,
    params: Result<Query<StatsParams>, QueryRejection>,
) -> Result<Json<FieldSummary>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let summary = match params.field_list() {
        Some(fields) => {
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            state.store.field_summary(&fields)
        }
        None => state.store.field_summary(&DEFAULT_SUMMARY_FIELDS),
    };
    Ok(Json(summary))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse { ok: true, features: state.store.len() })
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}
