use crate::domain::account::AuthContext;
use crate::domain::account::driving_ports::{AccountPort, AuthError};
use crate::external_connections::ExternalConnectivity;
use crate::persistence;
use crate::routing_utils::{GenericErrorResponse, error_response};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::ErrorResponse;
use tracing::error;

pub mod auth;
pub mod list;
pub mod swagger_main;
pub mod task;
#[cfg(test)]
pub mod test_util;

/// Resolves the identity behind a request's bearer token. Requests without a
/// token and requests with an unrecognized token both produce a 401.
async fn authenticated_identity(
    headers: &HeaderMap,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
) -> Result<AuthContext, ErrorResponse> {
    let maybe_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|header_value| header_value.to_str().ok())
        .and_then(|header_value| header_value.strip_prefix("Bearer "));
    let Some(token) = maybe_token else {
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            "missing_token",
            "A valid authentication token is required.",
        )
        .into());
    };

    let account_read = persistence::db_account_driven_ports::DbAccountReader;
    let token_store = persistence::db_account_driven_ports::DbTokenStore;
    let auth_result = account_service
        .authenticate(token, &mut *ext_cxn, &account_read, &token_store)
        .await;
    match auth_result {
        Ok(identity) => Ok(identity),
        Err(AuthError::InvalidToken) => Err(error_response(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "A valid authentication token is required.",
        )
        .into()),
        Err(AuthError::PortError(port_err)) => {
            error!("Failed to authenticate a request: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}
