use crate::domain::account::driving_ports::{
    AccountPort, ChangePasswordError, LoginError, RecoveryError, SecurityQuestionError, SignupError,
};
use crate::external_connections::{ExternalConnectivity, TransactableExternalConnectivity};
use crate::routing_utils::{GenericErrorResponse, Json, ValidationErrorResponse, error_response};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::ErrorResponse;
use axum::routing::{post, put};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(
    signup,
    login,
    logout,
    security_question,
    set_security_question,
    verify_security_answer,
    reset_password,
    change_password,
))]
/// Defines the OpenAPI documentation for account and session endpoints
pub struct AuthApi;
/// Constant used to group account endpoints in OpenAPI documentation
pub const AUTH_API_GROUP: &str = "Authentication";

/// Builds a router for the account and session endpoints under "/auth"
pub fn auth_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/signup",
            post(
                |State(app_state): AppState, Json(new_account): Json<dto::auth::Signup>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};

                    signup(new_account, &mut ext_cxn, &account_service).await
                },
            ),
        )
        .route(
            "/login",
            post(
                |State(app_state): AppState, Json(credentials): Json<dto::auth::Login>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};

                    login(credentials, &mut ext_cxn, &account_service).await
                },
            ),
        )
        .route(
            "/logout",
            post(|State(app_state): AppState, headers: HeaderMap| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let account_service = domain::account::AccountService {};

                logout(headers, &mut ext_cxn, &account_service).await
            }),
        )
        .route(
            "/security-question",
            post(
                |State(app_state): AppState,
                 Json(question_request): Json<dto::auth::SecurityQuestionRequest>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};

                    security_question(question_request, &mut ext_cxn, &account_service).await
                },
            ),
        )
        .route(
            "/security-question",
            put(
                |State(app_state): AppState,
                 headers: HeaderMap,
                 Json(new_question): Json<dto::auth::SetSecurityQuestion>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};

                    set_security_question(headers, new_question, &mut ext_cxn, &account_service)
                        .await
                },
            ),
        )
        .route(
            "/verify-security-answer",
            post(
                |State(app_state): AppState,
                 Json(answer_check): Json<dto::auth::VerifyAnswer>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};

                    verify_security_answer(answer_check, &mut ext_cxn, &account_service).await
                },
            ),
        )
        .route(
            "/reset-password",
            post(
                |State(app_state): AppState,
                 Json(reset_request): Json<dto::auth::ResetPassword>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};

                    reset_password(reset_request, &mut ext_cxn, &account_service).await
                },
            ),
        )
        .route(
            "/change-password",
            post(
                |State(app_state): AppState,
                 headers: HeaderMap,
                 Json(password_change): Json<dto::auth::ChangePassword>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};

                    change_password(headers, password_change, &mut ext_cxn, &account_service).await
                },
            ),
        )
}

/// Maps recovery failures onto HTTP responses. Shared by answer verification
/// and password reset, which fail in identical ways.
fn recovery_error_response(recovery_err: RecoveryError) -> ErrorResponse {
    match recovery_err {
        RecoveryError::UnknownUser => error_response(
            StatusCode::NOT_FOUND,
            "user_not_found",
            "User not found",
        )
        .into(),
        RecoveryError::WrongAnswer => error_response(
            StatusCode::BAD_REQUEST,
            "incorrect_answer",
            "Incorrect security answer",
        )
        .into(),
        RecoveryError::PortError(port_err) => {
            error!("Account recovery failure: {port_err}");
            GenericErrorResponse(port_err).into()
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = AUTH_API_GROUP,
    request_body = dto::auth::Signup,
    responses(
        (status = 201, description = "Account created successfully", body = dto::auth::CreatedSession),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Registers a new account along with its profile and first session token
async fn signup(
    new_account: dto::auth::Signup,
    ext_cxn: &mut impl TransactableExternalConnectivity,
    account_service: &impl AccountPort,
) -> Result<(StatusCode, Json<dto::auth::CreatedSession>), ErrorResponse> {
    info!("Signup requested for {new_account}");
    new_account
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let account_read = persistence::db_account_driven_ports::DbAccountReader;
    let account_write = persistence::db_account_driven_ports::DbAccountWriter;
    let token_store = persistence::db_account_driven_ports::DbTokenStore;

    let signup_result = account_service
        .signup(
            &domain::account::NewAccount {
                username: new_account.username,
                email: new_account.email,
                password: new_account.password,
            },
            &mut *ext_cxn,
            &account_read,
            &account_write,
            &token_store,
        )
        .await;
    match signup_result {
        Ok(grant) => Ok((StatusCode::CREATED, Json(grant.into()))),
        Err(SignupError::UsernameTaken) => Err(error_response(
            StatusCode::BAD_REQUEST,
            "username_taken",
            "Username already taken.",
        )
        .into()),
        Err(SignupError::EmailInUse) => Err(error_response(
            StatusCode::BAD_REQUEST,
            "email_in_use",
            "Email already in use.",
        )
        .into()),
        Err(SignupError::PortError(port_err)) => {
            error!("Signup failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = AUTH_API_GROUP,
    request_body = dto::auth::Login,
    responses(
        (status = 200, description = "Credentials accepted, session token issued", body = dto::auth::CreatedSession),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Exchanges a username and password for a session token
async fn login(
    credentials: dto::auth::Login,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
) -> Result<Json<dto::auth::CreatedSession>, ErrorResponse> {
    info!("Login attempt for {}", credentials.username);
    credentials
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let account_read = persistence::db_account_driven_ports::DbAccountReader;
    let token_store = persistence::db_account_driven_ports::DbTokenStore;

    let login_result = account_service
        .login(
            &credentials.username,
            &credentials.password,
            &mut *ext_cxn,
            &account_read,
            &token_store,
        )
        .await;
    match login_result {
        Ok(grant) => Ok(Json(grant.into())),
        Err(LoginError::BadCredentials) => Err(error_response(
            StatusCode::UNAUTHORIZED,
            "bad_credentials",
            "The username or password was incorrect.",
        )
        .into()),
        Err(LoginError::PortError(port_err)) => {
            error!("Login failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = AUTH_API_GROUP,
    responses(
        (status = 200, description = "Session tokens revoked", body = dto::auth::LogoutResult),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Revokes the requester's session tokens, reporting whether any existed
async fn logout(
    headers: HeaderMap,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
) -> Result<Json<dto::auth::LogoutResult>, ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Logout for account {}", identity.account_id);

    let token_store = persistence::db_account_driven_ports::DbTokenStore;
    let logout_result = account_service
        .logout(identity.account_id, &mut *ext_cxn, &token_store)
        .await;
    match logout_result {
        Ok(token_revoked) => Ok(Json(dto::auth::LogoutResult { token_revoked })),
        Err(port_err) => {
            error!("Logout failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/security-question",
    tag = AUTH_API_GROUP,
    request_body = dto::auth::SecurityQuestionRequest,
    responses(
        (status = 200, description = "The user's configured security question", body = dto::auth::SecurityQuestion),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Fetches the security question configured for a username
async fn security_question(
    question_request: dto::auth::SecurityQuestionRequest,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
) -> Result<Json<dto::auth::SecurityQuestion>, ErrorResponse> {
    info!("Security question requested");
    question_request
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let account_read = persistence::db_account_driven_ports::DbAccountReader;
    let question_result = account_service
        .security_question(&question_request.username, &mut *ext_cxn, &account_read)
        .await;
    match question_result {
        Ok(question) => Ok(Json(dto::auth::SecurityQuestion {
            security_question: question,
        })),
        Err(SecurityQuestionError::NotFound) => Err(error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "No security question is available for that username.",
        )
        .into()),
        Err(SecurityQuestionError::PortError(port_err)) => {
            error!("Security question lookup failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    put,
    path = "/auth/security-question",
    tag = AUTH_API_GROUP,
    request_body = dto::auth::SetSecurityQuestion,
    responses(
        (status = 200, description = "Security question stored"),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Configures the recovery question and answer on the requester's profile
async fn set_security_question(
    headers: HeaderMap,
    new_question: dto::auth::SetSecurityQuestion,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
) -> Result<StatusCode, ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Setting security question for profile {}", identity.profile_id);
    new_question
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let account_write = persistence::db_account_driven_ports::DbAccountWriter;
    let set_result = account_service
        .set_security_question(
            identity.profile_id,
            &new_question.security_question,
            &new_question.security_answer,
            &mut *ext_cxn,
            &account_write,
        )
        .await;
    match set_result {
        Ok(()) => Ok(StatusCode::OK),
        Err(port_err) => {
            error!("Failed to store a security question: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/verify-security-answer",
    tag = AUTH_API_GROUP,
    request_body = dto::auth::VerifyAnswer,
    responses(
        (status = 200, description = "The answer matched"),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Checks a recovery answer ahead of a password reset
async fn verify_security_answer(
    answer_check: dto::auth::VerifyAnswer,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
) -> Result<StatusCode, ErrorResponse> {
    info!("Verifying a security answer");
    answer_check
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let account_read = persistence::db_account_driven_ports::DbAccountReader;
    account_service
        .verify_security_answer(
            &answer_check.username,
            &answer_check.security_answer,
            &mut *ext_cxn,
            &account_read,
        )
        .await
        .map_err(recovery_error_response)?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = AUTH_API_GROUP,
    request_body = dto::auth::ResetPassword,
    responses(
        (status = 200, description = "Password replaced"),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Replaces a forgotten password after re-checking the recovery answer
async fn reset_password(
    reset_request: dto::auth::ResetPassword,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
) -> Result<StatusCode, ErrorResponse> {
    info!("Password reset requested");
    reset_request
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let account_read = persistence::db_account_driven_ports::DbAccountReader;
    let account_write = persistence::db_account_driven_ports::DbAccountWriter;
    account_service
        .reset_password(
            &reset_request.username,
            &reset_request.security_answer,
            &reset_request.new_password,
            &mut *ext_cxn,
            &account_read,
            &account_write,
        )
        .await
        .map_err(recovery_error_response)?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/auth/change-password",
    tag = AUTH_API_GROUP,
    request_body = dto::auth::ChangePassword,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Changes the requester's password after verifying the current one
async fn change_password(
    headers: HeaderMap,
    password_change: dto::auth::ChangePassword,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
) -> Result<StatusCode, ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Password change for account {}", identity.account_id);
    password_change
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let account_read = persistence::db_account_driven_ports::DbAccountReader;
    let account_write = persistence::db_account_driven_ports::DbAccountWriter;
    let change_result = account_service
        .change_password(
            identity.account_id,
            &password_change.old_password,
            &password_change.new_password,
            &mut *ext_cxn,
            &account_read,
            &account_write,
        )
        .await;
    match change_result {
        Ok(()) => Ok(StatusCode::OK),
        Err(ChangePasswordError::WrongOldPassword) => Err(error_response(
            StatusCode::BAD_REQUEST,
            "wrong_old_password",
            "The current password was incorrect.",
        )
        .into()),
        Err(ChangePasswordError::PortError(port_err)) => {
            error!("Password change failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}
