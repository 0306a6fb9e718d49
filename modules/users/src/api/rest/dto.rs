use serde::{Deserialize, Serialize, Serializer};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{ProjectedUser, User};

/// Numeric age as written to the wire: integral values render as JSON integers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Age(pub f64);

const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

impl Serialize for Age {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0.abs() <= MAX_EXACT_INT {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

/// REST DTO for user representation; projected-out attributes are omitted
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserDto {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "507f1f77bcf86cd799439011")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub age: Option<Age>,
}

/// Request body for `POST /users` (documentation shape; input is validated field by field)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserReq {
    pub name: String,
    pub age: f64,
}

/// Request body for `PUT /users/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateUserReq {
    pub name: Option<String>,
    pub age: Option<f64>,
}

/// Response for create and update
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserMessageDto {
    pub message: String,
    pub user: UserDto,
}

/// Response for `GET /users`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListDto {
    pub page: u64,
    #[serde(rename = "perPage")]
    pub per_page: u64,
    pub result: Vec<UserDto>,
}

/// Response for `GET /users/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelopeDto {
    pub user: UserDto,
}

/// Error body shared by every failure response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageDto {
    pub message: String,
}

/// Raw query parameters; kept as text so validation can report bad values.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsersQueryParams {
    /// 1-based page number (default 1)
    pub page: Option<String>,
    /// Page size (default 10)
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
    /// Comma-separated attribute list, e.g. `name,age` or `-age`
    pub fields: Option<String>,
    /// JSON filter document, e.g. `{"age":{"$gte":18}}`
    pub query: Option<String>,
}

// Conversion implementations between REST DTOs and contract models

impl From<ProjectedUser> for UserDto {
    fn from(user: ProjectedUser) -> Self {
        Self {
            id: user.id.map(|id| id.to_string()),
            name: user.name,
            age: user.age.map(Age),
        }
    }
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        ProjectedUser::from(user).into()
    }
}
