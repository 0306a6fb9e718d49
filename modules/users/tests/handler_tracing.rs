//! Tests to verify that handlers emit expected tracing output and that store
//! failures surface as generic 500 responses.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing_test::traced_test;

use anyhow::Result;
use users::api::rest::routes;
use users::contract::model::{ObjectId, ProjectedUser, User};
use users::domain::filter::UserFilter;
use users::domain::projection::Projection;
use users::domain::repo::UsersRepository;
use users::domain::service::{Service, ServiceConfig};

const BOB_ID: &str = "507f1f77bcf86cd799439011";

// In-memory repository for testing
#[derive(Default)]
struct MockUsersRepository {
    users: Mutex<Vec<User>>,
}

impl MockUsersRepository {
    fn with_bob() -> Self {
        Self {
            users: Mutex::new(vec![User {
                id: ObjectId::parse_str(BOB_ID).unwrap(),
                name: "Bob".to_string(),
                age: 30.0,
            }]),
        }
    }
}

#[async_trait::async_trait]
impl UsersRepository for MockUsersRepository {
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_projected(&self, id: ObjectId, projection: &Projection) -> Result<Option<ProjectedUser>> {
        Ok(self.find_by_id(id).await?.map(|u| projection.apply(u)))
    }

    async fn name_exists(&self, name: &str) -> Result<bool> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.name == name))
    }

    async fn insert(&self, user: User) -> Result<()> {
        self.users.lock().unwrap().push(user);
        Ok(())
    }

    async fn update(&self, user: User) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(slot) = users.iter_mut().find(|u| u.id == user.id) {
            *slot = user;
        }
        Ok(())
    }

    async fn find(
        &self,
        filter: &UserFilter,
        projection: &Projection,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<ProjectedUser>> {
        let mut users: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        users.sort_by_key(|u| u.id);
        Ok(users
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|u| projection.apply(u))
            .collect())
    }
}

// Repository whose every call fails like a lost database connection
struct FailingUsersRepository;

#[async_trait::async_trait]
impl UsersRepository for FailingUsersRepository {
    async fn find_by_id(&self, _id: ObjectId) -> Result<Option<User>> {
        anyhow::bail!("connection to 10.0.0.7 refused")
    }

    async fn find_projected(&self, _id: ObjectId, _p: &Projection) -> Result<Option<ProjectedUser>> {
        anyhow::bail!("connection to 10.0.0.7 refused")
    }

    async fn name_exists(&self, _name: &str) -> Result<bool> {
        anyhow::bail!("connection to 10.0.0.7 refused")
    }

    async fn insert(&self, _user: User) -> Result<()> {
        anyhow::bail!("connection to 10.0.0.7 refused")
    }

    async fn update(&self, _user: User) -> Result<()> {
        anyhow::bail!("connection to 10.0.0.7 refused")
    }

    async fn find(
        &self,
        _filter: &UserFilter,
        _projection: &Projection,
        _skip: u64,
        _limit: u64,
    ) -> Result<Vec<ProjectedUser>> {
        anyhow::bail!("connection to 10.0.0.7 refused")
    }
}

fn router_with(repo: Arc<dyn UsersRepository>) -> Router {
    let service = Arc::new(Service::new(repo, ServiceConfig::default()));
    routes::register_routes(Router::new(), service)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[traced_test]
#[tokio::test]
async fn get_user_handler_emits_span() {
    let app = router_with(Arc::new(MockUsersRepository::with_bob()));

    let request = Request::builder()
        .method("GET")
        .uri(format!("/users/{BOB_ID}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(logs_contain("Getting user with id"));
    assert!(logs_contain("users.service.get_user"));
}

#[traced_test]
#[tokio::test]
async fn create_user_handler_logs_service_span() {
    let app = router_with(Arc::new(MockUsersRepository::default()));

    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"name":"Carol","age":41}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    assert!(logs_contain("users.service.insert_user"));
    assert!(logs_contain("Successfully created user"));
}

#[traced_test]
#[tokio::test]
async fn list_users_with_mock_store_filters_and_pages() {
    let repo = Arc::new(MockUsersRepository::default());
    let app = router_with(repo.clone());
    for (name, age) in [("A", 10), ("B", 20), ("C", 30)] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(r#"{{"name":"{name}","age":{age}}}"#)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // {"age":{"$gte":20}}, page size 1, second page
    let response = app
        .oneshot(
            Request::builder()
                .uri("/users?perPage=1&page=2&query=%7B%22age%22%3A%7B%22%24gte%22%3A20%7D%7D")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["result"].as_array().unwrap().len(), 1);
    assert_eq!(body["result"][0]["name"], "C");
    assert!(logs_contain("users.service.list_users"));
}

#[traced_test]
#[tokio::test]
async fn store_failures_are_generic_500s() {
    let app = router_with(Arc::new(FailingUsersRepository));

    for (method, uri, body) in [
        ("GET", "/users".to_string(), None),
        ("GET", format!("/users/{BOB_ID}"), None),
        ("POST", "/users".to_string(), Some(r#"{"name":"Bob","age":1}"#)),
        ("PUT", format!("/users/{BOB_ID}"), Some(r#"{"age":1}"#)),
    ] {
        let mut builder = Request::builder().method(method).uri(&uri);
        let body = match body {
            Some(b) => {
                builder = builder.header("content-type", "application/json");
                Body::from(b)
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        let json = json_body(response).await;
        assert_eq!(json, serde_json::json!({"message": "unexpected server error"}));
    }

    // Detail stays in the logs only
    assert!(logs_contain("connection to 10.0.0.7 refused"));
}

#[traced_test]
#[tokio::test]
async fn validation_runs_before_the_store() {
    // A failing store proves no persistence call happens for invalid input
    let app = router_with(Arc::new(FailingUsersRepository));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/users")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"name":"Bob"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({"message": "Field \"age\" is required"})
    );
}
