use utoipa::OpenApi;

pub mod auth;
pub mod list;
pub mod task;

/// Reusable OpenAPI error responses referenced from endpoint annotations
pub mod err_resps {
    use serde::Serialize;
    use utoipa::ToResponse;

    #[derive(Serialize, ToResponse)]
    #[response(description = "Submitted data was invalid", example = json!({
        "error_code": "invalid_input",
        "error_description": "Submitted data was invalid.",
        "extra_info": null
    }))]
    #[allow(dead_code)]
    pub struct BasicError400 {
        error_code: String,
        error_description: String,
    }

    #[derive(Serialize, ToResponse)]
    #[response(description = "Missing or invalid authentication token", example = json!({
        "error_code": "invalid_token",
        "error_description": "A valid authentication token is required.",
        "extra_info": null
    }))]
    #[allow(dead_code)]
    pub struct BasicError401 {
        error_code: String,
        error_description: String,
    }

    #[derive(Serialize, ToResponse)]
    #[response(description = "The requester lacks rights to the entity", example = json!({
        "error_code": "permission_denied",
        "error_description": "You do not have rights to modify this entity.",
        "extra_info": null
    }))]
    #[allow(dead_code)]
    pub struct BasicError403 {
        error_code: String,
        error_description: String,
    }

    #[derive(Serialize, ToResponse)]
    #[response(description = "Entity could not be found", example = json!({
        "error_code": "not_found",
        "error_description": "The requested entity could not be found.",
        "extra_info": null
    }))]
    #[allow(dead_code)]
    pub struct BasicError404 {
        error_code: String,
        error_description: String,
    }

    #[derive(Serialize, ToResponse)]
    #[response(description = "Something unexpected went wrong inside the server", example = json!({
        "error_code": "internal_error",
        "error_description": "Could not access data to complete your request",
        "extra_info": null
    }))]
    #[allow(dead_code)]
    pub struct BasicError500 {
        error_code: String,
        error_description: String,
    }
}

/// Registers the shared DTO schemas and canned error responses with the
/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(components(
    schemas(
        auth::Signup,
        auth::Login,
        auth::CreatedSession,
        auth::LogoutResult,
        auth::SecurityQuestionRequest,
        auth::SecurityQuestion,
        auth::VerifyAnswer,
        auth::ResetPassword,
        auth::SetSecurityQuestion,
        auth::ChangePassword,
        task::Priority,
        task::Status,
        task::TaskData,
        task::NewTask,
        task::UpdateTask,
        task::InsertedTask,
        list::ListData,
        list::NewList,
        list::InsertedList,
        list::AddMember,
        list::AddedMember,
    ),
    responses(
        err_resps::BasicError400,
        err_resps::BasicError401,
        err_resps::BasicError403,
        err_resps::BasicError404,
        err_resps::BasicError500,
    )
))]
pub struct OpenApiSchemas;
