use super::bad_body;
use crate::{
    AppState,
    auth::{create_token, decode_token, hash_password, verify_password},
    dto::{LoginRequest, SignupRequest, TokenResponse, UserResponse, VerifyRequest},
    errors::ApiError,
    store::StoreError,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use tracing::info;
use validator::Validate;

// These routes are called anonymously, so a bad body is a 400, never a 401.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(p)| p).map_err(bad_body)
}

/// POST /auth/users/
/// Body: { "username": "...", "password": "...", "email": "..." }
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let payload = body(payload)?;
    payload.validate()?;

    let hashed_password = hash_password(&payload.password, state.config.bcrypt_cost)?;
    let user = state
        .store
        .insert_user(&payload.username, payload.email, hashed_password)
        .map_err(|e| match e {
            StoreError::Unique(_) => {
                ApiError::field("username", "A user with that username already exists.")
            }
            other => ApiError::InternalError(other.to_string()),
        })?;

    info!("New user registered: {}", user.username);

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/jwt/create/
/// Body: { "username": "...", "password": "..." }
pub async fn create_jwt(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let payload = body(payload)?;

    let user = state
        .store
        .user_by_username(&payload.username)
        .ok_or(ApiError::InvalidCredentials)?;

    // Verify password
    if !verify_password(&payload.password, &user.hashed_password)? {
        return Err(ApiError::InvalidCredentials);
    }

    let access = create_token(&user, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;

    info!("User logged in: {}", user.username);

    Ok(Json(TokenResponse { access }))
}

/// POST /auth/jwt/verify/
/// Body: { "token": "..." }
pub async fn verify_jwt(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let payload = body(payload)?;
    decode_token(&payload.token, &state.config.jwt_secret)?;
    Ok(Json(serde_json::json!({})))
}

/// GET /auth/users/me/
/// Headers: Authorization: Bearer <token>
pub async fn get_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let identity = state.identity(&headers)?.ok_or(ApiError::Unauthorized)?;
    let user = state
        .store
        .user(identity.user_id)
        .ok_or(ApiError::NotFound)?;

    Ok(Json(user.into()))
}
