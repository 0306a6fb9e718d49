//! Structured user filter parsed from a JSON document.
//!
//! Accepted shape (a small subset of document-store query syntax):
//! - `{"name": "Alice"}`: bare value means equality
//! - `{"age": {"$gte": 18, "$lt": 65}}`: operator object, operators AND-ed
//! - `{"_id": {"$in": ["507f1f77bcf86cd799439011"]}}`
//! - `{"$or": [{"name": "Alice"}, {"age": 30}]}` and `$and`
//!
//! Several keys in one object are AND-ed; `{}` matches every record.

use serde_json::{Map, Value};

use crate::contract::model::{ObjectId, User};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Name,
    Age,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "_id" | "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "age" => Some(Self::Age),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Id(ObjectId),
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserFilter {
    Cmp {
        field: Field,
        op: CmpOp,
        value: FilterValue,
    },
    In {
        field: Field,
        values: Vec<FilterValue>,
        negated: bool,
    },
    And(Vec<UserFilter>),
    Or(Vec<UserFilter>),
}

impl Default for UserFilter {
    fn default() -> Self {
        Self::match_all()
    }
}

impl UserFilter {
    pub fn match_all() -> Self {
        Self::And(Vec::new())
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::And(v) if v.is_empty())
    }

    /// Parse a JSON filter document.
    pub fn parse(doc: &Value) -> Result<Self, DomainError> {
        match doc {
            Value::Object(map) => parse_object(map),
            other => Err(DomainError::invalid_filter(format!(
                "filter must be a JSON object, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Evaluate the filter against an in-memory record.
    pub fn matches(&self, user: &User) -> bool {
        match self {
            Self::And(items) => items.iter().all(|f| f.matches(user)),
            Self::Or(items) => items.iter().any(|f| f.matches(user)),
            Self::Cmp { field, op, value } => compare(user, *field, value)
                .map(|ord| match op {
                    CmpOp::Eq => ord.is_eq(),
                    CmpOp::Ne => !ord.is_eq(),
                    CmpOp::Gt => ord.is_gt(),
                    CmpOp::Gte => ord.is_ge(),
                    CmpOp::Lt => ord.is_lt(),
                    CmpOp::Lte => ord.is_le(),
                })
                .unwrap_or(matches!(op, CmpOp::Ne)),
            Self::In {
                field,
                values,
                negated,
            } => {
                let hit = values
                    .iter()
                    .any(|v| compare(user, *field, v).is_some_and(|o| o.is_eq()));
                hit != *negated
            }
        }
    }
}

fn compare(user: &User, field: Field, value: &FilterValue) -> Option<std::cmp::Ordering> {
    match (field, value) {
        (Field::Id, FilterValue::Id(id)) => Some(user.id.cmp(id)),
        (Field::Name, FilterValue::Text(s)) => Some(user.name.as_str().cmp(s.as_str())),
        (Field::Age, FilterValue::Number(n)) => user.age.partial_cmp(n),
        _ => None,
    }
}

fn parse_object(map: &Map<String, Value>) -> Result<UserFilter, DomainError> {
    let mut clauses = Vec::with_capacity(map.len());
    for (key, value) in map {
        match key.as_str() {
            "$and" => clauses.push(UserFilter::And(parse_branches(key, value)?)),
            "$or" => clauses.push(UserFilter::Or(parse_branches(key, value)?)),
            k if k.starts_with('$') => {
                return Err(DomainError::invalid_filter(format!(
                    "unknown top-level operator '{k}'"
                )))
            }
            k => {
                let field = Field::from_key(k).ok_or_else(|| {
                    DomainError::invalid_filter(format!("unknown field '{k}'"))
                })?;
                clauses.push(parse_field(field, k, value)?);
            }
        }
    }

    if clauses.len() == 1 {
        Ok(clauses.remove(0))
    } else {
        Ok(UserFilter::And(clauses))
    }
}

fn parse_branches(op: &str, value: &Value) -> Result<Vec<UserFilter>, DomainError> {
    let items = value
        .as_array()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| DomainError::invalid_filter(format!("'{op}' needs a non-empty array")))?;
    items.iter().map(UserFilter::parse).collect()
}

fn parse_field(field: Field, key: &str, value: &Value) -> Result<UserFilter, DomainError> {
    let ops = match value {
        Value::Object(ops) if ops.keys().any(|k| k.starts_with('$')) => ops,
        Value::Object(_) => {
            return Err(DomainError::invalid_filter(format!(
                "field '{key}' cannot be compared to an object"
            )))
        }
        bare => {
            return Ok(UserFilter::Cmp {
                field,
                op: CmpOp::Eq,
                value: typed_value(field, key, bare)?,
            })
        }
    };

    let mut clauses = Vec::with_capacity(ops.len());
    for (op, operand) in ops {
        let clause = match op.as_str() {
            "$in" | "$nin" => {
                let values = operand
                    .as_array()
                    .ok_or_else(|| {
                        DomainError::invalid_filter(format!("'{op}' on '{key}' needs an array"))
                    })?
                    .iter()
                    .map(|v| typed_value(field, key, v))
                    .collect::<Result<Vec<_>, _>>()?;
                UserFilter::In {
                    field,
                    values,
                    negated: op == "$nin",
                }
            }
            other => UserFilter::Cmp {
                field,
                op: cmp_op(other).ok_or_else(|| {
                    DomainError::invalid_filter(format!("unknown operator '{other}' on '{key}'"))
                })?,
                value: typed_value(field, key, operand)?,
            },
        };
        clauses.push(clause);
    }

    if clauses.len() == 1 {
        Ok(clauses.remove(0))
    } else {
        Ok(UserFilter::And(clauses))
    }
}

fn cmp_op(op: &str) -> Option<CmpOp> {
    match op {
        "$eq" => Some(CmpOp::Eq),
        "$ne" => Some(CmpOp::Ne),
        "$gt" => Some(CmpOp::Gt),
        "$gte" => Some(CmpOp::Gte),
        "$lt" => Some(CmpOp::Lt),
        "$lte" => Some(CmpOp::Lte),
        _ => None,
    }
}

fn typed_value(field: Field, key: &str, value: &Value) -> Result<FilterValue, DomainError> {
    let bad = || {
        DomainError::invalid_filter(format!(
            "value {} is not valid for field '{key}'",
            value
        ))
    };
    match field {
        Field::Id => value
            .as_str()
            .and_then(|s| ObjectId::parse_str(s).ok())
            .map(FilterValue::Id)
            .ok_or_else(bad),
        Field::Name => value
            .as_str()
            .map(|s| FilterValue::Text(s.to_string()))
            .ok_or_else(bad),
        Field::Age => match value {
            Value::Number(n) => n.as_f64().map(FilterValue::Number).ok_or_else(bad),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(FilterValue::Number)
                .ok_or_else(bad),
            _ => Err(bad()),
        },
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
