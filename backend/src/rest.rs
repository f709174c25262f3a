use axum::{
    extract::{Query, State},
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use shared::{
    d3_key, generate_record_id, is_d3_key, sort_record_values, CreateRecordResponse,
    D3StatusResponse, D3Update, ErrorResponse, SuccessResponse, D3_UPDATE_KIND, LOCAL_KEY_PREFIX,
};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::db::RecordStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
}

impl AppState {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

/// Handler-level failures. Store and deserialisation errors surface as a
/// generic 500 with the underlying message; a missing required query
/// parameter is the caller's fault and gets a 400. No retries happen here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing {0}")]
    MissingParameter(&'static str),
    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
    #[error("{0}")]
    Store(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Malformed(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("request failed: {}", self);
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Query parameters for `/api/records`.
#[derive(Deserialize, Debug)]
pub struct RecordsQuery {
    /// "d3" switches a GET into a checklist-status read.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<String>,
    pub id: Option<String>,
}

/// Reads must never be served from a downstream cache; the client reconciles
/// against the latest server view.
fn no_cache_headers() -> [(HeaderName, &'static str); 3] {
    [
        (
            header::CACHE_CONTROL,
            "no-store, no-cache, must-revalidate, max-age=0",
        ),
        (header::PRAGMA, "no-cache"),
        (header::EXPIRES, "0"),
    ]
}

/// Build the full application router: the `/api/records` surface plus an
/// open CORS layer that also answers OPTIONS preflights with the allowed
/// methods and headers.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new().route(
        "/records",
        get(get_records).post(create_record).delete(delete_record),
    );

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

/// GET /api/records
///
/// Default mode enumerates every stored feeding record (checklist keys are
/// filtered out by prefix), attaches the store key as `id` and returns the
/// list sorted by the ordering contract. With `?type=d3&date=...` it returns
/// that date's checklist status instead, `[false, false]` when unset.
pub async fn get_records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> Result<Response, ApiError> {
    info!("GET /api/records - query: {:?}", query);

    if query.kind.as_deref() == Some(D3_UPDATE_KIND) {
        let date = query
            .date
            .as_deref()
            .ok_or(ApiError::MissingParameter("date"))?;
        let status = match state.store.get(&d3_key(date)).await? {
            Some(raw) => serde_json::from_str::<[bool; 2]>(&raw)?,
            None => [false, false],
        };
        return Ok((no_cache_headers(), Json(D3StatusResponse { status })).into_response());
    }

    let mut records: Vec<Value> = Vec::new();
    for (key, value) in state.store.list_entries().await? {
        if is_d3_key(&key) {
            continue;
        }
        let mut parsed: Value = serde_json::from_str(&value)?;
        if let Some(object) = parsed.as_object_mut() {
            object.insert("id".to_string(), Value::String(key));
        }
        records.push(parsed);
    }
    sort_record_values(&mut records);

    Ok((no_cache_headers(), Json(records)).into_response())
}

/// POST /api/records
///
/// A body carrying the `"type": "d3"` marker replaces that date's checklist
/// status wholesale. Anything else is a feeding record: stored verbatim
/// under the caller-supplied id, or a freshly generated one. A client-local
/// `temp_*` id is never stored; it gets a fresh `record_*` id, echoed in
/// the response so the caller can rekey its copy. The id is kept out of
/// the stored value and re-attached on read.
pub async fn create_record(
    State(state): State<AppState>,
    Json(mut body): Json<Value>,
) -> Result<Response, ApiError> {
    if body.get("type").and_then(Value::as_str) == Some(D3_UPDATE_KIND) {
        let update: D3Update = serde_json::from_value(body)?;
        info!("POST /api/records - d3 update for {}", update.date_string);
        state
            .store
            .put(
                &d3_key(&update.date_string),
                &serde_json::to_string(&update.status)?,
            )
            .await?;
        return Ok(Json(SuccessResponse { success: true }).into_response());
    }

    let id = match body.get("id").and_then(Value::as_str) {
        Some(supplied) if !supplied.starts_with(LOCAL_KEY_PREFIX) => supplied.to_string(),
        _ => generate_record_id(chrono::Utc::now().timestamp_millis()),
    };
    info!("POST /api/records - storing record {}", id);

    if let Some(object) = body.as_object_mut() {
        object.remove("id");
    }
    state.store.put(&id, &body.to_string()).await?;

    Ok(Json(CreateRecordResponse { success: true, id }).into_response())
}

/// DELETE /api/records?id=...
///
/// Removing an id that no longer exists still succeeds, so a retried delete
/// is harmless.
pub async fn delete_record(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = query.id.ok_or(ApiError::MissingParameter("id"))?;
    info!("DELETE /api/records - id: {}", id);

    state.store.delete(&id).await?;

    Ok(Json(SuccessResponse { success: true }))
}
