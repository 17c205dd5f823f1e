use axum::{
    body::Body,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::analysis::HistoryQueryService;
use crate::config::Config;
use crate::error::HistoryError;
use crate::types::{DailySeries, RepoQuery};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn routes(service: Arc<HistoryQueryService>, config: Arc<Config>) -> Router<(), Body> {
    Router::new()
        .route("/", get(handle_root))
        .route("/api/data", get(get_data))
        .layer(Extension(service))
        .layer(Extension(config))
}

async fn handle_root() -> String {
    format!("gitspiral v{VERSION}")
}

#[derive(Debug, Default, Deserialize)]
struct DataParams {
    repo: Option<String>,
    folder: Option<String>,
    branch: Option<String>,
    all: Option<String>,
}

impl From<DataParams> for RepoQuery {
    fn from(params: DataParams) -> Self {
        RepoQuery {
            repo: params.repo.unwrap_or_default(),
            folder: params.folder.filter(|folder| !folder.is_empty()),
            branch: params.branch.filter(|branch| !branch.is_empty()),
            all_branches: params.all.as_deref() == Some("true"),
        }
    }
}

async fn get_data(
    Extension(service): Extension<Arc<HistoryQueryService>>,
    Extension(config): Extension<Arc<Config>>,
    Query(params): Query<DataParams>,
) -> Result<Json<DailySeries>, ApiError> {
    let query = RepoQuery::from(params);
    let task = tokio::task::spawn_blocking(move || service.query(&query));

    match tokio::time::timeout(config.query_timeout(), task).await {
        Ok(Ok(result)) => Ok(Json(result?)),
        Ok(Err(error)) => Err(ApiError::Internal(format!("query task failed: {}", error))),
        Err(_) => Err(ApiError::Internal(format!(
            "query timed out after {}s",
            config.query_timeout_secs
        ))),
    }
}

/// Error returned from an API handler
pub enum ApiError {
    History(HistoryError),
    Internal(String),
}

impl From<HistoryError> for ApiError {
    fn from(error: HistoryError) -> Self {
        ApiError::History(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::History(error) => {
                let status = match &error {
                    HistoryError::Validation(_)
                    | HistoryError::NotARepository(_)
                    | HistoryError::RangeQuery(_) => StatusCode::BAD_REQUEST,
                    HistoryError::NotFound(_) => StatusCode::NOT_FOUND,
                    HistoryError::MalformedDate(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, json!({ "error": error.to_string(), "kind": error.kind() }))
            }
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message, "kind": "InternalError" }),
            ),
        };

        log::error!("HTTP error {}: {}", status, body["error"]);
        (status, Json(body)).into_response()
    }
}
