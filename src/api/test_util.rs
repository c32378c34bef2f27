use axum::body;
use axum::response::{ErrorResponse, IntoResponse, Response};
use serde::de::DeserializeOwned;

/// Test helper exposing the HTTP response inside an [ErrorResponse], whose
/// inner response axum does not make publicly accessible.
pub trait ErrorResponseExt {
    fn into_response(self) -> Response;
}

impl ErrorResponseExt for ErrorResponse {
    fn into_response(self) -> Response {
        Result::<(), ErrorResponse>::Err(self).into_response()
    }
}

/// Test helper that drains an HTTP response body and deserializes it into the
/// requested type, panicking (and failing the test) if either step goes wrong.
pub async fn deserialize_body<T: DeserializeOwned>(response_body: body::Body) -> T {
    let body_bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("could not drain the response body");

    serde_json::from_slice(&body_bytes).unwrap_or_else(|parse_err| {
        panic!(
            "response body did not match the expected structure: {}, raw body: {:?}",
            parse_err, body_bytes
        )
    })
}
