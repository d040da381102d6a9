use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

const BLANK: &str = "This field may not be blank.";

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message(Cow::Borrowed(BLANK)))
    } else {
        Ok(())
    }
}

fn username_chars(value: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
    if value.chars().all(allowed) {
        Ok(())
    } else {
        Err(ValidationError::new("username").with_message(Cow::Borrowed(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        )))
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`), so PATCH can clear optional columns.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Validate, Deserialize)]
pub struct SignupRequest {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        custom(function = "username_chars")
    )]
    pub username: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Body of POST/PUT/PATCH on a post. Server-owned fields (`id`, `author`,
/// `pub_date`, `comments`) are not part of the payload and are dropped by
/// serde if a client sends them.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PostPayload {
    #[validate(custom(function = "not_blank"))]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub group: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommentPayload {
    #[validate(custom(function = "not_blank"))]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct FollowPayload {
    #[validate(custom(function = "not_blank"))]
    pub following: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FollowQuery {
    pub search: Option<String>,
}
