use crate::domain;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DTO for registering a new account via the API
#[derive(Deserialize, Display, Validate, ToSchema)]
#[display("{username} <{email}>")]
#[cfg_attr(test, derive(Serialize))]
pub struct Signup {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// DTO for exchanging credentials for a session token
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct Login {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// DTO describing a freshly issued (or reused) session
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct CreatedSession {
    #[schema(example = 4)]
    pub account_id: i32,
    #[schema(example = 4)]
    pub profile_id: i32,
    #[schema(example = "h2L7vMn0Qx3pR8sT1uVw5yZa6bCd9eFgHiJkLmNo")]
    pub token: String,
}

impl From<domain::account::AuthGrant> for CreatedSession {
    fn from(value: domain::account::AuthGrant) -> Self {
        CreatedSession {
            account_id: value.account_id,
            profile_id: value.profile_id,
            token: value.token,
        }
    }
}

/// DTO reporting whether a logout actually revoked a token
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct LogoutResult {
    pub token_revoked: bool,
}

/// DTO asking for a user's security question
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct SecurityQuestionRequest {
    #[validate(length(min = 1))]
    pub username: String,
}

/// DTO carrying a user's configured security question
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct SecurityQuestion {
    #[schema(example = "What was your first pet's name?")]
    pub security_question: String,
}

/// DTO for checking a recovery answer before a password reset
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct VerifyAnswer {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub security_answer: String,
}

/// DTO for resetting a forgotten password through the recovery flow
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct ResetPassword {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub security_answer: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// DTO for configuring the security question on the authenticated profile
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct SetSecurityQuestion {
    #[validate(length(min = 1))]
    pub security_question: String,
    #[validate(length(min = 1))]
    pub security_answer: String,
}

/// DTO for an authenticated password change
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct ChangePassword {
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}
