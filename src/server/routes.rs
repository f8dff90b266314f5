use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::model::{Diagram, GlobalConfig};
use crate::server::AppState;
use crate::Error;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (status, Json(ErrorResponse { error: error.to_string() }))
}

impl From<Error> for (StatusCode, Json<ErrorResponse>) {
    fn from(e: Error) -> Self {
        let status = match &e {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", e);
        }
        api_error(status, e)
    }
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, rejection.body_text())
}

// ========== Diagrams ==========

pub async fn list_diagrams(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Diagram>>, ApiError> {
    Ok(Json(state.diagrams.get_all().await?))
}

pub async fn get_diagram(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Diagram>, ApiError> {
    Ok(Json(state.diagrams.get_one(&id).await?))
}

pub async fn save_diagram(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Option<Diagram>>, JsonRejection>,
) -> Result<Json<Diagram>, ApiError> {
    let Json(diagram) = payload.map_err(bad_body)?;
    Ok(Json(state.diagrams.save(diagram).await?))
}

pub async fn delete_diagram(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.diagrams.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ========== Config ==========

pub async fn get_config(State(state): State<Arc<AppState>>) -> Result<Json<GlobalConfig>, ApiError> {
    Ok(Json(state.config.get().await?))
}

pub async fn save_config(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GlobalConfig>, JsonRejection>,
) -> Result<Json<GlobalConfig>, ApiError> {
    let Json(config) = payload.map_err(bad_body)?;
    Ok(Json(state.config.save(config).await?))
}
