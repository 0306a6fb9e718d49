use crate::contract::model::{ObjectId, ProjectedUser, User};
use crate::domain::filter::UserFilter;
use crate::domain::projection::Projection;
use async_trait::async_trait;

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a full user by id.
    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<User>>;
    /// Load a user by id, returning only the projected attributes.
    async fn find_projected(
        &self,
        id: ObjectId,
        projection: &Projection,
    ) -> anyhow::Result<Option<ProjectedUser>>;
    /// Exact-match check on name.
    async fn name_exists(&self, name: &str) -> anyhow::Result<bool>;
    /// Insert a fully-formed domain user.
    ///
    /// Service assigns the id; repo persists.
    async fn insert(&self, u: User) -> anyhow::Result<()>;
    /// Update an existing user (by primary key in `u.id`).
    async fn update(&self, u: User) -> anyhow::Result<()>;
    /// Filtered, projected page in id order.
    async fn find(
        &self,
        filter: &UserFilter,
        projection: &Projection,
        skip: u64,
        limit: u64,
    ) -> anyhow::Result<Vec<ProjectedUser>>;
}
