use crate::domain::account::driving_ports::AccountPort;
use crate::domain::list::driving_ports::{AddMemberError, DeleteListError, ListPort};
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{GenericErrorResponse, Json, ValidationErrorResponse, error_response};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::ErrorResponse;
use axum::routing::{delete, get, post};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(get_lists, create_list, add_member, delete_list))]
/// Defines the OpenAPI documentation for collaborative list endpoints
pub struct ListApi;
/// Constant used to group collaborative list endpoints in OpenAPI documentation
pub const LIST_API_GROUP: &str = "Collaborative Lists";

/// Builds a router for the collaborative list endpoints under "/lists"
pub fn list_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(|State(app_state): AppState, headers: HeaderMap| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let account_service = domain::account::AccountService {};
                let list_service = domain::list::ListService {};

                get_lists(headers, &mut ext_cxn, &account_service, &list_service).await
            }),
        )
        .route(
            "/",
            post(
                |State(app_state): AppState,
                 headers: HeaderMap,
                 Json(new_list): Json<dto::list::NewList>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};
                    let list_service = domain::list::ListService {};

                    create_list(headers, new_list, &mut ext_cxn, &account_service, &list_service)
                        .await
                },
            ),
        )
        .route(
            "/:list_id/members",
            post(
                |State(app_state): AppState,
                 headers: HeaderMap,
                 Path(list_id): Path<i32>,
                 Json(new_member): Json<dto::list::AddMember>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};
                    let list_service = domain::list::ListService {};

                    add_member(
                        headers,
                        list_id,
                        new_member,
                        &mut ext_cxn,
                        &account_service,
                        &list_service,
                    )
                    .await
                },
            ),
        )
        .route(
            "/:list_id",
            delete(
                |State(app_state): AppState, headers: HeaderMap, Path(list_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let account_service = domain::account::AccountService {};
                    let list_service = domain::list::ListService {};

                    delete_list(headers, list_id, &mut ext_cxn, &account_service, &list_service)
                        .await
                },
            ),
        )
}

#[utoipa::path(
    get,
    path = "/lists",
    tag = LIST_API_GROUP,
    responses(
        (status = 200, description = "Lists the requester owns or belongs to", body = Vec<dto::list::ListData>),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Lists every collaborative list the requester can access
async fn get_lists(
    headers: HeaderMap,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
    list_service: &impl ListPort,
) -> Result<Json<Vec<dto::list::ListData>>, ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Fetching lists for profile {}", identity.profile_id);

    let list_read = persistence::db_list_driven_ports::DbListReader;
    let lists_result = list_service
        .accessible_lists(identity.profile_id, &mut *ext_cxn, &list_read)
        .await;
    match lists_result {
        Ok(lists) => Ok(Json(lists.into_iter().map(Into::into).collect())),
        Err(port_err) => {
            error!("List fetch failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/lists",
    tag = LIST_API_GROUP,
    request_body = dto::list::NewList,
    responses(
        (status = 201, description = "List created successfully", body = dto::list::InsertedList),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Creates a collaborative list owned by the requester
async fn create_list(
    headers: HeaderMap,
    new_list: dto::list::NewList,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
    list_service: &impl ListPort,
) -> Result<(StatusCode, Json<dto::list::InsertedList>), ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Creating a list for profile {}", identity.profile_id);
    new_list.validate().map_err(ValidationErrorResponse::from)?;

    let domain_new_list = domain::list::NewList::from(new_list);
    let list_write = persistence::db_list_driven_ports::DbListWriter;
    let create_result = list_service
        .create_list(identity.profile_id, &domain_new_list, &mut *ext_cxn, &list_write)
        .await;
    match create_result {
        Ok(list_id) => Ok((
            StatusCode::CREATED,
            Json(dto::list::InsertedList { id: list_id }),
        )),
        Err(port_err) => {
            error!("List creation failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/lists/{list_id}/members",
    tag = LIST_API_GROUP,
    params(
        ("list_id" = i32, Path, description = "ID of the list gaining a member"),
    ),
    request_body = dto::list::AddMember,
    responses(
        (status = 200, description = "Member added to the list", body = dto::list::AddedMember),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 403, response = dto::err_resps::BasicError403),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Adds another user to a list the requester owns
async fn add_member(
    headers: HeaderMap,
    list_id: i32,
    new_member: dto::list::AddMember,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
    list_service: &impl ListPort,
) -> Result<Json<dto::list::AddedMember>, ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Adding a member to list {list_id}");

    let list_read = persistence::db_list_driven_ports::DbListReader;
    let account_read = persistence::db_account_driven_ports::DbAccountReader;
    let list_write = persistence::db_list_driven_ports::DbListWriter;

    let add_result = list_service
        .add_member(
            list_id,
            &new_member.username,
            identity.profile_id,
            &mut *ext_cxn,
            &list_read,
            &account_read,
            &list_write,
        )
        .await;
    match add_result {
        Ok(profile_id) => Ok(Json(dto::list::AddedMember { profile_id })),
        Err(AddMemberError::ListNotFound) => Err(error_response(
            StatusCode::NOT_FOUND,
            "list_not_found",
            "The requested list could not be found.",
        )
        .into()),
        Err(AddMemberError::NotOwner) => Err(error_response(
            StatusCode::FORBIDDEN,
            "permission_denied",
            "Only the list owner can manage its membership.",
        )
        .into()),
        Err(AddMemberError::UsernameRequired) => Err(error_response(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "A username is required.",
        )
        .into()),
        Err(AddMemberError::UserNotFound) => Err(error_response(
            StatusCode::NOT_FOUND,
            "user_not_found",
            "User not found",
        )
        .into()),
        Err(AddMemberError::UserHasNoProfile) => Err(error_response(
            StatusCode::BAD_REQUEST,
            "user_has_no_profile",
            "That user cannot join lists.",
        )
        .into()),
        Err(AddMemberError::PortError(port_err)) => {
            error!("Membership addition failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}

#[utoipa::path(
    delete,
    path = "/lists/{list_id}",
    tag = LIST_API_GROUP,
    params(
        ("list_id" = i32, Path, description = "ID of the list to delete"),
    ),
    responses(
        (status = 200, description = "List deleted"),
        (status = 401, response = dto::err_resps::BasicError401),
        (status = 403, response = dto::err_resps::BasicError403),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Soft-deletes a list the requester owns
async fn delete_list(
    headers: HeaderMap,
    list_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    account_service: &impl AccountPort,
    list_service: &impl ListPort,
) -> Result<StatusCode, ErrorResponse> {
    let identity = super::authenticated_identity(&headers, &mut *ext_cxn, account_service).await?;
    info!("Deleting list {list_id}");

    let list_read = persistence::db_list_driven_ports::DbListReader;
    let list_write = persistence::db_list_driven_ports::DbListWriter;
    let delete_result = list_service
        .delete_list(
            list_id,
            identity.profile_id,
            &mut *ext_cxn,
            &list_read,
            &list_write,
        )
        .await;
    match delete_result {
        Ok(()) => Ok(StatusCode::OK),
        Err(DeleteListError::ListNotFound) => Err(error_response(
            StatusCode::NOT_FOUND,
            "list_not_found",
            "The requested list could not be found.",
        )
        .into()),
        Err(DeleteListError::NotOwner) => Err(error_response(
            StatusCode::FORBIDDEN,
            "permission_denied",
            "Only the list owner can delete it.",
        )
        .into()),
        Err(DeleteListError::PortError(port_err)) => {
            error!("List deletion failure: {port_err}");
            Err(GenericErrorResponse(port_err).into())
        }
    }
}
