use super::path_id;
use crate::{AppState, errors::ApiError, models::Group};
use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::HeaderMap,
};

/// GET /groups/
pub async fn list_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Group>>, ApiError> {
    let identity = state.identity(&headers)?;
    Ok(Json(state.groups().list(identity.as_ref())?))
}

/// GET /groups/{id}/
pub async fn get_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Group>, ApiError> {
    let identity = state.identity(&headers)?;
    let id = path_id(id)?;
    Ok(Json(state.groups().retrieve(identity.as_ref(), id)?))
}
