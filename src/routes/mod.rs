pub mod comment;
pub mod follow;
pub mod group;
pub mod health;
pub mod post;
pub mod user;

use crate::errors::{ApiError, FieldErrors};
use crate::models::Identity;
use crate::states::AppState;
use axum::{
    Json, Router,
    extract::{
        Path,
        Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    routing::{get, post},
};

/// Routes served under the versioned prefix.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/posts/", get(post::list_posts).post(post::create_post))
        .route(
            "/posts/{id}/",
            get(post::get_post)
                .put(post::update_post)
                .patch(post::partial_update_post)
                .delete(post::delete_post),
        )
        .route(
            "/posts/{post_id}/comments/",
            get(comment::list_comments).post(comment::create_comment),
        )
        .route(
            "/posts/{post_id}/comments/{id}/",
            get(comment::get_comment)
                .put(comment::update_comment)
                .patch(comment::partial_update_comment)
                .delete(comment::delete_comment),
        )
        .route("/groups/", get(group::list_groups))
        .route("/groups/{id}/", get(group::get_group))
        .route("/follow/", get(follow::list_follows).post(follow::create_follow))
        .route("/auth/users/", post(user::signup))
        .route("/auth/users/me/", get(user::get_current_user))
        .route("/auth/jwt/create/", post(user::create_jwt))
        .route("/auth/jwt/verify/", post(user::verify_jwt))
}

/// Ids in paths are numeric; anything else cannot name a resource.
pub(crate) fn path_id<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::NotFound)
}

pub(crate) fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::ValidationError(FieldErrors::single(
        FieldErrors::NON_FIELD,
        rejection.body_text(),
    ))
}

pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query.map(|Query(params)| params).map_err(|rejection| {
        ApiError::ValidationError(FieldErrors::single(
            FieldErrors::NON_FIELD,
            rejection.body_text(),
        ))
    })
}

/// Unwraps a JSON body. An anonymous caller sending a write gets 401 even
/// when the body is malformed.
pub(crate) fn json_body<T>(
    identity: Option<&Identity>,
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    match body {
        Ok(Json(payload)) => Ok(payload),
        Err(_) if identity.is_none() => Err(ApiError::Unauthorized),
        Err(rejection) => Err(bad_body(rejection)),
    }
}
