use super::{bad_body, path_id};
use crate::{
    AppState,
    dto::{CommentPayload, CommentResponse},
    errors::ApiError,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode},
};

/// GET /posts/{post_id}/comments/
pub async fn list_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    post_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    state.identity(&headers)?;
    let post_id = path_id(post_id)?;
    Ok(Json(state.comments().list(post_id)?))
}

/// POST /posts/{post_id}/comments/
/// Body: { "text": "..." }
pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    post_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CommentPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let identity = state.identity(&headers)?;
    let post_id = path_id(post_id)?;
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(_) if identity.is_none() => return Err(ApiError::Unauthorized),
        Err(rejection) => {
            state.comments().parent(post_id)?;
            return Err(bad_body(rejection));
        }
    };
    let comment = state
        .comments()
        .create(identity.as_ref(), post_id, payload)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /posts/{post_id}/comments/{id}/
pub async fn get_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<CommentResponse>, ApiError> {
    state.identity(&headers)?;
    let (post_id, id) = path_id(ids)?;
    Ok(Json(state.comments().retrieve(post_id, id)?))
}

async fn update(
    state: AppState,
    headers: HeaderMap,
    ids: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<CommentPayload>, JsonRejection>,
    partial: bool,
) -> Result<Json<CommentResponse>, ApiError> {
    let identity = state.identity(&headers)?;
    let (post_id, id) = path_id(ids)?;
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            state.comments().writable(identity.as_ref(), post_id, id)?;
            return Err(bad_body(rejection));
        }
    };
    let comment = state
        .comments()
        .update(identity.as_ref(), post_id, id, payload, partial)?;
    Ok(Json(comment))
}

/// PUT /posts/{post_id}/comments/{id}/
pub async fn update_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    ids: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<CommentPayload>, JsonRejection>,
) -> Result<Json<CommentResponse>, ApiError> {
    update(state, headers, ids, payload, false).await
}

/// PATCH /posts/{post_id}/comments/{id}/
pub async fn partial_update_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    ids: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<CommentPayload>, JsonRejection>,
) -> Result<Json<CommentResponse>, ApiError> {
    update(state, headers, ids, payload, true).await
}

/// DELETE /posts/{post_id}/comments/{id}/
pub async fn delete_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let identity = state.identity(&headers)?;
    let (post_id, id) = path_id(ids)?;
    state.comments().delete(identity.as_ref(), post_id, id)?;
    Ok(StatusCode::NO_CONTENT)
}
