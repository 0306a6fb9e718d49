use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, response::Json, Extension};
use serde_json::Value;
use tracing::info;

use crate::api::rest::dto::{
    CreateUserReq, MessageDto, UpdateUserReq, UserDto, UserEnvelopeDto, UserListDto,
    UserMessageDto, UsersQueryParams,
};
use crate::api::rest::error::{ApiError, ApiJson, ApiQuery};
use crate::api::rest::validation::{
    validate_id_param, validate_insert_body, validate_query_params, validate_update_body,
};
use crate::domain::service::Service;

pub const USER_CREATED: &str = "User created successfully";
pub const USER_UPDATED: &str = "User updated successfully";

/// List users with pagination, filter and projection
#[utoipa::path(
    get,
    path = "/users",
    params(UsersQueryParams),
    responses(
        (status = 200, description = "Page of users", body = UserListDto),
        (status = 400, description = "Invalid query parameters or filter", body = MessageDto),
        (status = 500, description = "Unexpected server error", body = MessageDto),
    ),
    tag = "users"
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    ApiQuery(params): ApiQuery<UsersQueryParams>,
) -> Result<Json<UserListDto>, ApiError> {
    info!("Listing users with query: {:?}", params);

    let query = validate_query_params(&params)?;
    let page = svc.list_users(query).await?;

    Ok(Json(UserListDto {
        page: page.page,
        per_page: page.per_page,
        result: page.items.into_iter().map(UserDto::from).collect(),
    }))
}

/// Get a specific user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "24-character hex user id"),
        UsersQueryParams
    ),
    responses(
        (status = 200, description = "User found", body = UserEnvelopeDto),
        (status = 400, description = "Malformed id or query parameters", body = MessageDto),
        (status = 404, description = "User not found", body = MessageDto),
        (status = 500, description = "Unexpected server error", body = MessageDto),
    ),
    tag = "users"
)]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<UsersQueryParams>,
) -> Result<Json<UserEnvelopeDto>, ApiError> {
    info!("Getting user with id: {}", id);

    let id = validate_id_param(&id)?;
    let query = validate_query_params(&params)?;
    let user = svc.get_user(id, &query.projection).await?;

    Ok(Json(UserEnvelopeDto { user: user.into() }))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "User created", body = UserMessageDto),
        (status = 400, description = "Invalid body", body = MessageDto),
        (status = 401, description = "Name already in use", body = MessageDto),
        (status = 500, description = "Unexpected server error", body = MessageDto),
    ),
    tag = "users"
)]
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<UserMessageDto>), ApiError> {
    info!("Creating user: {}", body);

    let new_user = validate_insert_body(&body)?;
    let user = svc.insert_user(new_user).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserMessageDto {
            message: USER_CREATED.to_string(),
            user: user.into(),
        }),
    ))
}

/// Update an existing user; only supplied fields change
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = String, Path, description = "24-character hex user id")),
    request_body = UpdateUserReq,
    responses(
        (status = 201, description = "User updated", body = UserMessageDto),
        (status = 400, description = "Malformed id or body", body = MessageDto),
        (status = 401, description = "Name already in use", body = MessageDto),
        (status = 404, description = "User not found", body = MessageDto),
        (status = 500, description = "Unexpected server error", body = MessageDto),
    ),
    tag = "users"
)]
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<UserMessageDto>), ApiError> {
    info!("Updating user {} with: {}", id, body);

    let id = validate_id_param(&id)?;
    let patch = validate_update_body(&body)?;
    let user = svc.update_user(id, patch).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserMessageDto {
            message: USER_UPDATED.to_string(),
            user: user.into(),
        }),
    ))
}
