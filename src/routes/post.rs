use super::{bad_body, json_body, path_id, query_params};
use crate::{
    AppState,
    dto::{Listing, PaginationParams, PostPayload, PostResponse},
    errors::ApiError,
};
use axum::{
    Json,
    extract::{
        OriginalUri, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
};

/// GET /posts/?limit=10&offset=0
pub async fn list_posts(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<Listing<PostResponse>>, ApiError> {
    state.identity(&headers)?;
    let params = query_params(params)?;
    let posts = state.posts().list()?;
    Ok(Json(Listing::paginate(posts, &params, uri.path())))
}

/// GET /posts/{id}/
pub async fn get_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PostResponse>, ApiError> {
    state.identity(&headers)?;
    let id = path_id(id)?;
    Ok(Json(state.posts().retrieve(id)?))
}

/// POST /posts/
/// Headers: Authorization: Bearer <token>
/// Body: { "text": "...", "group": 1, "image": "..." }
pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PostPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let identity = state.identity(&headers)?;
    let payload = json_body(identity.as_ref(), payload)?;
    let post = state.posts().create(identity.as_ref(), payload)?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update(
    state: AppState,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PostPayload>, JsonRejection>,
    partial: bool,
) -> Result<Json<PostResponse>, ApiError> {
    let identity = state.identity(&headers)?;
    let id = path_id(id)?;
    let payload = match payload {
        Ok(Json(payload)) => payload,
        // Lookup and ownership outrank a malformed body.
        Err(rejection) => {
            state.posts().writable(identity.as_ref(), id)?;
            return Err(bad_body(rejection));
        }
    };
    Ok(Json(
        state.posts().update(identity.as_ref(), id, payload, partial)?,
    ))
}

/// PUT /posts/{id}/
pub async fn update_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PostPayload>, JsonRejection>,
) -> Result<Json<PostResponse>, ApiError> {
    update(state, headers, id, payload, false).await
}

/// PATCH /posts/{id}/
pub async fn partial_update_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PostPayload>, JsonRejection>,
) -> Result<Json<PostResponse>, ApiError> {
    update(state, headers, id, payload, true).await
}

/// DELETE /posts/{id}/
/// Headers: Authorization: Bearer <token>
pub async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let identity = state.identity(&headers)?;
    let id = path_id(id)?;
    state.posts().delete(identity.as_ref(), id)?;
    Ok(StatusCode::NO_CONTENT)
}
