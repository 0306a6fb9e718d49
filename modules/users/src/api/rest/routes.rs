use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;
use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use utoipa::OpenApi;

/// OpenAPI document for the user routes.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        description = "CRUD operations over the user resource (name, age)."
    ),
    paths(
        handlers::list_users,
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
    ),
    components(schemas(
        dto::UserDto,
        dto::CreateUserReq,
        dto::UpdateUserReq,
        dto::UserMessageDto,
        dto::UserListDto,
        dto::UserEnvelopeDto,
        dto::MessageDto,
    )),
    tags((name = "users", description = "Operations related to users"))
)]
pub struct ApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route("/users/{id}", get(handlers::get_user).put(handlers::update_user))
        .layer(Extension(service))
}
