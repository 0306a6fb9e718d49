//! Request validation: runs before any record operation, first failing rule wins.

use serde_json::{Map, Value};

use crate::api::rest::dto::UsersQueryParams;
use crate::api::rest::error::ApiError;
use crate::contract::model::{ListUsersQuery, NewUser, ObjectId, UserPatch};

/// Body of `POST /users`: `name` and numeric `age` are required.
pub fn validate_insert_body(body: &Value) -> Result<NewUser, ApiError> {
    let obj = body_object(body)?;

    let name = present(obj, "name")
        .ok_or_else(|| required("name"))
        .and_then(name_text)?;
    let age = present(obj, "age")
        .ok_or_else(|| required("age"))
        .and_then(age_number)?;

    Ok(NewUser { name, age })
}

/// Body of `PUT /users/{id}`: every field optional, `age` must be numeric when given.
pub fn validate_update_body(body: &Value) -> Result<UserPatch, ApiError> {
    let obj = body_object(body)?;

    let age = present(obj, "age").map(age_number).transpose()?;
    let name = present(obj, "name").map(name_text).transpose()?;

    Ok(UserPatch { name, age })
}

/// Path id must be a 24-character hex identifier.
pub fn validate_id_param(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| {
        ApiError::validation(format!(
            "Parameter \"id\" must be a 24-character hex identifier, got \"{id}\""
        ))
    })
}

/// Query string of the user endpoints: `page`/`perPage` integers >= 1,
/// `query` valid JSON, `fields` free-form (commas become spaces).
pub fn validate_query_params(params: &UsersQueryParams) -> Result<ListUsersQuery, ApiError> {
    let page = positive_int("page", params.page.as_deref())?;
    let per_page = positive_int("perPage", params.per_page.as_deref())?;

    let filter = match non_blank(params.query.as_deref()) {
        Some(text) => Some(serde_json::from_str::<Value>(text).map_err(|_| {
            ApiError::validation("Query parameter \"query\" must be valid JSON")
        })?),
        None => None,
    };

    let projection = params
        .fields
        .as_deref()
        .map(|f| f.replace(',', " "))
        .unwrap_or_default();

    Ok(ListUsersQuery {
        page,
        per_page,
        filter,
        projection,
    })
}

fn body_object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object()
        .ok_or_else(|| ApiError::validation("Request body must be a JSON object"))
}

/// A field counts as given unless missing, null or blank text.
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    match obj.get(key)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        v => Some(v),
    }
}

fn required(field: &str) -> ApiError {
    ApiError::validation(format!("Field \"{field}\" is required"))
}

fn name_text(v: &Value) -> Result<String, ApiError> {
    match v {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ApiError::validation("Field \"name\" must be a string")),
    }
}

fn age_number(v: &Value) -> Result<f64, ApiError> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
        .ok_or_else(|| ApiError::validation("Field \"age\" must be a number"))
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

fn positive_int(name: &str, raw: Option<&str>) -> Result<Option<u64>, ApiError> {
    let Some(text) = non_blank(raw) else {
        return Ok(None);
    };
    let too_small =
        || ApiError::validation(format!("Query parameter \"{name}\" must be greater than or equal to 1"));
    let n: i64 = match text.parse() {
        Ok(n) => n,
        Err(_) => {
            // Not a plain integer: decimals, exponents and overflowing digits land here.
            let f = text
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .ok_or_else(|| {
                    ApiError::validation(format!("Query parameter \"{name}\" must be a number"))
                })?;
            if f < 1.0 {
                return Err(too_small());
            }
            if f.fract() != 0.0 {
                return Err(ApiError::validation(format!(
                    "Query parameter \"{name}\" must be an integer"
                )));
            }
            if f >= i64::MAX as f64 {
                return Err(ApiError::validation(format!(
                    "Query parameter \"{name}\" is out of range"
                )));
            }
            f as i64
        }
    };
    if n < 1 {
        return Err(too_small());
    }
    Ok(Some(n as u64))
}
