use super::{json_body, query_params};
use crate::{
    AppState,
    dto::{FollowPayload, FollowQuery, FollowResponse},
    errors::ApiError,
};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
};

/// GET /follow/?search=<username fragment>
/// Headers: Authorization: Bearer <token>
pub async fn list_follows(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<FollowQuery>, QueryRejection>,
) -> Result<Json<Vec<FollowResponse>>, ApiError> {
    let identity = state.identity(&headers)?;
    let query = match query {
        Err(_) if identity.is_none() => return Err(ApiError::Unauthorized),
        query => query_params(query)?,
    };
    Ok(Json(state.follows().list(identity.as_ref(), &query)?))
}

/// POST /follow/
/// Headers: Authorization: Bearer <token>
/// Body: { "following": "<username>" }
pub async fn create_follow(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<FollowPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<FollowResponse>), ApiError> {
    let identity = state.identity(&headers)?;
    let payload = json_body(identity.as_ref(), payload)?;
    let follow = state.follows().create(identity.as_ref(), payload)?;
    Ok((StatusCode::CREATED, Json(follow)))
}
