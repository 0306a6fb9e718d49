//! SeaORM-backed repository implementation for the domain port.
//!
//! This struct is generic over `C: ConnectionTrait`, so you can construct it
//! with a `DatabaseConnection` **or** a transactional connection.

use anyhow::Context;
use sea_orm::sea_query::SimpleExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select,
};
use serde_json::Value as JsonValue;

use crate::contract::model::{ObjectId, ProjectedUser, User};
use crate::domain::filter::{CmpOp, Field, FilterValue, UserFilter};
use crate::domain::projection::Projection;
use crate::domain::repo::UsersRepository;
use crate::infra::storage::entity::{Column, Entity as UserEntity};
use crate::infra::storage::mapper::{contract_to_active, entity_to_contract};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn column(field: Field) -> Column {
    match field {
        Field::Id => Column::Id,
        Field::Name => Column::Name,
        Field::Age => Column::Age,
    }
}

fn db_value(value: &FilterValue) -> sea_orm::Value {
    match value {
        FilterValue::Id(id) => id.to_string().into(),
        FilterValue::Text(s) => s.clone().into(),
        FilterValue::Number(n) => (*n).into(),
    }
}

/// Compile the domain filter into a SQL condition.
pub fn filter_condition(filter: &UserFilter) -> Condition {
    match filter {
        UserFilter::And(items) => items
            .iter()
            .fold(Condition::all(), |c, f| c.add(filter_condition(f))),
        UserFilter::Or(items) => items
            .iter()
            .fold(Condition::any(), |c, f| c.add(filter_condition(f))),
        UserFilter::Cmp { field, op, value } => {
            let col = column(*field);
            let v = db_value(value);
            let expr: SimpleExpr = match op {
                CmpOp::Eq => col.eq(v),
                CmpOp::Ne => col.ne(v),
                CmpOp::Gt => col.gt(v),
                CmpOp::Gte => col.gte(v),
                CmpOp::Lt => col.lt(v),
                CmpOp::Lte => col.lte(v),
            };
            Condition::all().add(expr)
        }
        UserFilter::In {
            field,
            values,
            negated,
        } => {
            let col = column(*field);
            let vals = values.iter().map(db_value);
            let expr = if *negated {
                col.is_not_in(vals)
            } else {
                col.is_in(vals)
            };
            Condition::all().add(expr)
        }
    }
}

/// Narrow `select` by the filter; match-all filters add no WHERE clause.
fn filtered(select: Select<UserEntity>, filter: &UserFilter) -> Select<UserEntity> {
    if filter.is_match_all() {
        select
    } else {
        select.filter(filter_condition(filter))
    }
}

/// Restrict the selected columns to what the projection returns.
/// `id` is always selected so the row can be identified; it is dropped later if projected out.
fn projected_select(select: Select<UserEntity>, projection: &Projection) -> Select<UserEntity> {
    let mut select = select.select_only().column(Column::Id);
    if projection.name {
        select = select.column(Column::Name);
    }
    if projection.age {
        select = select.column(Column::Age);
    }
    select
}

fn row_to_projected(row: JsonValue, projection: &Projection) -> anyhow::Result<ProjectedUser> {
    let id = if projection.id {
        let raw = row
            .get("id")
            .and_then(JsonValue::as_str)
            .context("row without id")?;
        Some(ObjectId::parse_str(raw).with_context(|| format!("corrupt id in users table: '{raw}'"))?)
    } else {
        None
    };
    let name = if projection.name {
        Some(
            row.get("name")
                .and_then(JsonValue::as_str)
                .context("row without name")?
                .to_string(),
        )
    } else {
        None
    };
    let age = if projection.age {
        Some(
            row.get("age")
                .and_then(JsonValue::as_f64)
                .context("row without age")?,
        )
    } else {
        None
    };
    Ok(ProjectedUser { id, name, age })
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        found.map(entity_to_contract).transpose()
    }

    async fn find_projected(
        &self,
        id: ObjectId,
        projection: &Projection,
    ) -> anyhow::Result<Option<ProjectedUser>> {
        let row = projected_select(UserEntity::find_by_id(id.to_string()), projection)
            .into_json()
            .one(&self.conn)
            .await
            .context("find_projected failed")?;
        row.map(|r| row_to_projected(r, projection)).transpose()
    }

    async fn name_exists(&self, name: &str) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(Column::Name.eq(name))
            .count(&self.conn)
            .await
            .context("name_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, u: User) -> anyhow::Result<()> {
        let _ = contract_to_active(u)
            .insert(&self.conn)
            .await
            .context("insert failed")?;
        Ok(())
    }

    async fn update(&self, u: User) -> anyhow::Result<()> {
        let _ = contract_to_active(u)
            .update(&self.conn)
            .await
            .context("update failed")?;
        Ok(())
    }

    async fn find(
        &self,
        filter: &UserFilter,
        projection: &Projection,
        skip: u64,
        limit: u64,
    ) -> anyhow::Result<Vec<ProjectedUser>> {
        // SQLite binds LIMIT/OFFSET as signed 64-bit integers.
        let max = i64::MAX as u64;
        let select = filtered(UserEntity::find(), filter)
            .order_by_asc(Column::Id)
            .offset(skip.min(max))
            .limit(limit.min(max));
        let rows = projected_select(select, projection)
            .into_json()
            .all(&self.conn)
            .await
            .context("find failed")?;
        rows.into_iter()
            .map(|r| row_to_projected(r, projection))
            .collect()
    }
}
