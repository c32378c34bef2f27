use crate::domain::access;
use crate::domain::account::driving_ports::AccountPort;
use crate::domain::task::driving_ports::{
    CreateTaskError, ModifyTaskError, RestoreTaskError, TaskDetailError, TaskPort,
};
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{GenericErrorResponse, Json, ValidationErrorResponse, error_response};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::ErrorResponse;
use axum::routing::{delete, get, patch, post};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(
    create_task,
    personal_tasks,
    collaborative_tasks,
    task_detail,
    update_task,
    delete_task,
    restore_task,
))]
/// Defines the OpenAPI documentation for task endpoints
pub struct TaskApi;
/// Constant used to group task endpoints in OpenAPI documentation
pub const TASK_API_GROUP: &str = "Tasks";

/// Builds a router for the task endpoints under "/tasks"
pub fn task_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            post(
                |State(app_state): AppState,
                 headers: HeaderMap,
                 Json(new_task): Json<dto::task::NewTask>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};
                    let task_service = domain::task::TaskService {};

                    create_task(headers, new_task, &mut ext_cxn, &account_service, &task_service)
                        .await
                },
            ),
        )
        .route(
            "/",
            get(|State(app_state): AppState, headers: HeaderMap| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let account_service = domain::account::AccountService {};
                let task_service = domain::task::TaskService {};

                personal_tasks(headers, &mut ext_cxn, &account_service, &task_service).await
            }),
        )
        .route(
            "/collaborative",
            get(
                |State(app_state): AppState,
                 headers: HeaderMap,
                 Query(filter): Query<CollaborativeTasksQuery>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};
                    let task_service = domain::task::TaskService {};

                    collaborative_tasks(
                        headers,
                        filter.list_id,
                        &mut ext_cxn,
                        &account_service,
                        &task_service,
                    )
                    .await
                },
            ),
        )
        .route(
            "/:task_id",
            get(
                |State(app_state): AppState, headers: HeaderMap, Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};
                    let task_service = domain::task::TaskService {};

                    task_detail(headers, task_id, &mut ext_cxn, &account_service, &task_service)
                        .await
                },
            ),
        )
        .route(
            "/:task_id",
            patch(
                |State(app_state): AppState,
                 headers: HeaderMap,
                 Path(task_id): Path<i32>,
                 Json(update): Json<dto::task::UpdateTask>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};
                    let task_service = domain::task::TaskService {};

                    update_task(
                        headers,
                        task_id,
                        update,
                        &mut ext_cxn,
                        &account_service,
                        &task_service,
                    )
                    .await
                },
            ),
        )
        .route(
            "/:task_id",
            delete(
                |State(app_state): AppState, headers: HeaderMap, Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};
                    let task_service = domain::task::TaskService {};

                    delete_task(headers, task_id, &mut ext_cxn, &account_service, &task_service)
                        .await
                },
            ),
        )
        .route(
            "/:task_id/restore",
            post(
                |State(app_state): AppState, headers: HeaderMap, Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};
                    let task_service = domain::task::TaskService {};

                    restore_task(headers, task_id, &mut ext_cxn, &account_service, &task_service)
                        .await
                },
            ),
        )
}

/// Query parameters for collaborative task enumeration
#[derive(Deserialize)]
struct CollaborativeTasksQuery {
    list_id: Option<i32>,
}

/// Maps failures of single-task mutations onto HTTP responses
fn modify_task_error_response(modify_err: ModifyTaskError) -> ErrorResponse {
    match modify_err {
        ModifyTaskError::NotFound => error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "The requested task could not be found.",
        )
        .into(),
        ModifyTaskError::PermissionDenied => error_response(
            StatusCode::FORBIDDEN,
            "permission_denied",
            "You do not have rights to modify this task.",
        )
        .into(),
        ModifyTaskError::PortError(port_err) => {
            error!("Task mutation failure: {port_err}");
            GenericErrorResponse(port_err).into()
        }
    }
}

#[utoipa::path(
    post,
    path = "/tasks",
    tag = TASK_API_GROUP,
    request_body = dto::task::NewTask,
    responses(
        (status = 201, description = "Task created successfully", body = dto::task::InsertedTask),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 403, response = dto::err_resps::BasicError403),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Creates a task, either personal or inside a collaborative list
async fn create_task(
    headers: HeaderMap,
    new_task: dto::task::NewTask,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
    task_service: &impl TaskPort,
) -> Result<(StatusCode, Json<dto::task::InsertedTask>), ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Creating a task for profile {}", identity.profile_id);
    new_task.validate().map_err(ValidationErrorResponse::from)?;

    let in_list = new_task.list;
    let domain_new_task = domain::task::NewTask::from(new_task);
    let list_read = persistence::db_list_driven_ports::DbListReader;
    let task_write = persistence::db_task_driven_ports::DbTaskWriter;

    let create_result = task_service
        .create_task(
            identity.profile_id,
            &domain_new_task,
            in_list,
            &mut *ext_cxn,
            &list_read,
            &task_write,
        )
        .await;
    match create_result {
        Ok(task_id) => Ok((
            StatusCode::CREATED,
            Json(dto::task::InsertedTask { id: task_id }),
        )),
        Err(CreateTaskError::ListDoesNotExist) => Err(error_response(
            StatusCode::BAD_REQUEST,
            "list_not_found",
            "The specified list does not exist.",
        )
        .into()),
        Err(CreateTaskError::ListNotAccessible) => Err(error_response(
            StatusCode::FORBIDDEN,
            "permission_denied",
            "You cannot create tasks in that list.",
        )
        .into()),
        Err(CreateTaskError::PortError(port_err)) => {
            error!("Task creation failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/tasks",
    tag = TASK_API_GROUP,
    responses(
        (status = 200, description = "The requester's personal tasks", body = Vec<dto::task::TaskData>),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Lists the requester's personal tasks
async fn personal_tasks(
    headers: HeaderMap,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
    task_service: &impl TaskPort,
) -> Result<Json<Vec<dto::task::TaskData>>, ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Fetching personal tasks for profile {}", identity.profile_id);

    let task_read = persistence::db_task_driven_ports::DbTaskReader;
    let tasks_result = task_service
        .personal_tasks(identity.profile_id, &mut *ext_cxn, &task_read)
        .await;
    match tasks_result {
        Ok(tasks) => Ok(Json(tasks.into_iter().map(Into::into).collect())),
        Err(port_err) => {
            error!("Personal task fetch failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/tasks/collaborative",
    tag = TASK_API_GROUP,
    params(
        ("list_id" = Option<i32>, Query, description = "Restrict results to a single accessible list"),
    ),
    responses(
        (status = 200, description = "Tasks from the requester's accessible lists", body = Vec<dto::task::TaskData>),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Lists tasks from every collaborative list the requester can access
async fn collaborative_tasks(
    headers: HeaderMap,
    narrowed_list: Option<i32>,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
    task_service: &impl TaskPort,
) -> Result<Json<Vec<dto::task::TaskData>>, ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!(
        "Fetching collaborative tasks for profile {}",
        identity.profile_id
    );

    let list_read = persistence::db_list_driven_ports::DbListReader;
    let task_read = persistence::db_task_driven_ports::DbTaskReader;
    let tasks_result = task_service
        .collaborative_tasks(
            identity.profile_id,
            narrowed_list,
            &mut *ext_cxn,
            &list_read,
            &task_read,
        )
        .await;
    match tasks_result {
        Ok(tasks) => Ok(Json(tasks.into_iter().map(Into::into).collect())),
        Err(port_err) => {
            error!("Collaborative task fetch failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(
        ("task_id" = i32, Path, description = "ID of the task to fetch"),
    ),
    responses(
        (status = 200, description = "The requested task", body = dto::task::TaskData),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Fetches a single task the requester can see
async fn task_detail(
    headers: HeaderMap,
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
    task_service: &impl TaskPort,
) -> Result<Json<dto::task::TaskData>, ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Fetching task {task_id} for profile {}", identity.profile_id);

    let list_read = persistence::db_list_driven_ports::DbListReader;
    let task_read = persistence::db_task_driven_ports::DbTaskReader;
    let detail_result = task_service
        .task_for_detail(
            task_id,
            identity.profile_id,
            &mut *ext_cxn,
            &list_read,
            &task_read,
        )
        .await;
    match detail_result {
        Ok(task) => Ok(Json(task.into())),
        Err(TaskDetailError::NotFound) => Err(error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "The requested task could not be found.",
        )
        .into()),
        Err(TaskDetailError::PortError(port_err)) => {
            error!("Task detail failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    patch,
    path = "/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(
        ("task_id" = i32, Path, description = "ID of the task to update"),
    ),
    request_body = dto::task::UpdateTask,
    responses(
        (status = 200, description = "Task updated"),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 403, response = dto::err_resps::BasicError403),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Patches the content of a task the requester created
async fn update_task(
    headers: HeaderMap,
    task_id: i32,
    update: dto::task::UpdateTask,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
    task_service: &impl TaskPort,
) -> Result<StatusCode, ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Updating task {task_id}");
    update.validate().map_err(ValidationErrorResponse::from)?;

    let domain_update = domain::task::UpdateTask::from(update);
    let list_read = persistence::db_list_driven_ports::DbListReader;
    let task_read = persistence::db_task_driven_ports::DbTaskReader;
    let task_write = persistence::db_task_driven_ports::DbTaskWriter;

    task_service
        .update_task(
            task_id,
            identity.profile_id,
            &domain_update,
            &mut *ext_cxn,
            &list_read,
            &task_read,
            &task_write,
        )
        .await
        .map_err(modify_task_error_response)?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(
        ("task_id" = i32, Path, description = "ID of the task to delete"),
    ),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 403, response = dto::err_resps::BasicError403),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Soft-deletes a task the requester created
async fn delete_task(
    headers: HeaderMap,
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
    task_service: &impl TaskPort,
) -> Result<StatusCode, ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Deleting task {task_id}");

    let list_read = persistence::db_list_driven_ports::DbListReader;
    let task_read = persistence::db_task_driven_ports::DbTaskReader;
    let task_write = persistence::db_task_driven_ports::DbTaskWriter;

    task_service
        .delete_task(
            task_id,
            identity.profile_id,
            &mut *ext_cxn,
            &list_read,
            &task_read,
            &task_write,
        )
        .await
        .map_err(modify_task_error_response)?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/tasks/{task_id}/restore",
    tag = TASK_API_GROUP,
    params(
        ("task_id" = i32, Path, description = "ID of the soft-deleted task to restore"),
    ),
    responses(
        (status = 200, description = "Task restored", body = dto::task::TaskData),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 403, response = dto::err_resps::BasicError403),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Restores a soft-deleted task the requester created
async fn restore_task(
    headers: HeaderMap,
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
    task_service: &impl TaskPort,
) -> Result<Json<dto::task::TaskData>, ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Restoring task {task_id}");

    let task_read = persistence::db_task_driven_ports::DbTaskReader;
    let task_write = persistence::db_task_driven_ports::DbTaskWriter;

    let restore_result = task_service
        .restore_task(task_id, &mut *ext_cxn, &task_read, &task_write)
        .await;
    match restore_result {
        Ok(task) => {
            // The restored task's data never reaches a requester who can't modify it
            access::ensure_can_modify_task(&task, identity.profile_id).map_err(|_| {
                error_response(
                    StatusCode::FORBIDDEN,
                    "permission_denied",
                    "You do not have rights to modify this task.",
                )
            })?;
            Ok(Json(task.into()))
        }
        Err(RestoreTaskError::NotFound) => Err(error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "The requested task could not be found.",
        )
        .into()),
        Err(RestoreTaskError::PortError(port_err)) => {
            error!("Task restore failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}
