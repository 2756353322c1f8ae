use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::dispatch::DispatchResult;
use crate::helpers::time::now_rfc3339;
use crate::server::server::AppState;

const STATUS_SOME_SUCCEEDED: u8 = 1;
const STATUS_NONE_SUCCEEDED: u8 = 2;

#[derive(Debug, Deserialize)]
pub struct LikeQuery {
    pub uid: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub uid: String,
    pub likes_sent: usize,
    pub likes_added: usize,
    pub server_used: String,
    pub status: u8,
}

impl LikeResponse {
    fn new(uid: String, server_used: String, result: DispatchResult) -> Self {
        Self {
            uid,
            likes_sent: result.attempted,
            likes_added: result.succeeded,
            server_used,
            status: if result.succeeded > 0 {
                STATUS_SOME_SUCCEEDED
            } else {
                STATUS_NONE_SUCCEEDED
            },
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root_home))
        .route("/like", get(like_player))
        .route("/health-check", get(health_check))
}

async fn root_home() -> Json<serde_json::Value> {
    Json(json!({
        "message": "like dispatch service",
        "endpoints": ["/like?uid=<uid>", "/health-check"],
    }))
}

async fn like_player(State(state): State<AppState>, Query(query): Query<LikeQuery>) -> Response {
    let uid = match query.uid.filter(|uid| is_valid_uid(uid)) {
        Some(uid) => uid,
        None => return error_response(StatusCode::BAD_REQUEST, "Invalid UID", "Valid numeric UID required"),
    };

    let region = state.region_policy.resolve(query.region.as_deref());
    if !state.dispatcher.serves(&region) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Unknown region",
            &format!("Region {} is not configured", region),
        );
    }

    match state.dispatcher.send_likes(&uid, &region).await {
        Ok(result) if result.attempted == 0 => error_response(
            StatusCode::NOT_FOUND,
            "No valid tokens",
            &format!("No tokens available for {}. Check /health-check.", region),
        ),
        Ok(result) => Json(LikeResponse::new(uid, region.to_string(), result)).into_response(),
        Err(err) => {
            error!("like error for uid {}: {:#}", uid, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", &err.to_string())
        }
    }
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut servers = BTreeMap::new();
    for region in state.regions.iter() {
        let available = !state.cache.get_tokens(region).await.is_empty();
        servers.insert(region.to_string(), available);
    }
    let status = if servers.values().all(|available| *available) {
        "healthy"
    } else {
        "degraded"
    };

    Json(json!({
        "status": status,
        "servers": servers,
        "timestamp": now_rfc3339(),
    }))
}

fn is_valid_uid(uid: &str) -> bool {
    !uid.is_empty() && uid.bytes().all(|b| b.is_ascii_digit()) && uid.parse::<u64>().is_ok()
}

fn error_response(status: StatusCode, error: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": error,
            "message": message,
            "status": status.as_u16(),
        })),
    )
        .into_response()
}
