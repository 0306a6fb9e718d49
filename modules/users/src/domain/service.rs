use std::sync::Arc;

use crate::contract::model::{
    ListUsersQuery, NewUser, ObjectId, ProjectedUser, User, UserPatch, UsersPage,
};
use crate::domain::error::DomainError;
use crate::domain::filter::UserFilter;
use crate::domain::projection::Projection;
use crate::domain::repo::UsersRepository;
use tracing::{debug, info, instrument};

/// Domain service with business rules for user management.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page: u64,
    pub default_per_page: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_per_page: 10,
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(repo: Arc<dyn UsersRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(
        name = "users.service.insert_user",
        skip(self),
        fields(name = %new_user.name, age = new_user.age)
    )]
    pub async fn insert_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        if self
            .repo
            .name_exists(&new_user.name)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::name_already_exists(new_user.name));
        }

        let user = User {
            id: ObjectId::generate(),
            name: new_user.name,
            age: new_user.age,
        };

        self.repo
            .insert(user.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(
        name = "users.service.update_user",
        skip(self),
        fields(user_id = %id)
    )]
    pub async fn update_user(&self, id: ObjectId, patch: UserPatch) -> Result<User, DomainError> {
        info!("Updating user");

        // Load current
        let mut current = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        // Uniqueness for name change
        if let Some(ref new_name) = patch.name {
            if new_name != &current.name
                && self
                    .repo
                    .name_exists(new_name)
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?
            {
                return Err(DomainError::name_already_exists(new_name.clone()));
            }
        }

        // Apply patch
        if let Some(name) = patch.name {
            current.name = name;
        }
        if let Some(age) = patch.age {
            current.age = age;
        }

        // Persist
        self.repo
            .update(current.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully updated user");
        Ok(current)
    }

    /// List users with offset pagination, filter and projection.
    #[instrument(name = "users.service.list_users", skip(self, query), fields(page, per_page))]
    pub async fn list_users(&self, query: ListUsersQuery) -> Result<UsersPage, DomainError> {
        let page = query.page.unwrap_or(self.config.default_page);
        let per_page = query.per_page.unwrap_or(self.config.default_per_page);
        tracing::Span::current()
            .record("page", page)
            .record("per_page", per_page);
        debug!("Listing users");

        if page < 1 {
            return Err(DomainError::validation(
                "Query parameter \"page\" must be greater than or equal to 1",
            ));
        }
        if per_page < 1 {
            return Err(DomainError::validation(
                "Query parameter \"perPage\" must be greater than or equal to 1",
            ));
        }
        let skip = (page - 1)
            .checked_mul(per_page)
            .ok_or_else(|| DomainError::validation("Requested page is out of range"))?;

        let filter = match &query.filter {
            Some(doc) => UserFilter::parse(doc)?,
            None => UserFilter::match_all(),
        };
        let projection = Projection::parse(&query.projection)?;

        let items = self
            .repo
            .find(&filter, &projection, skip, per_page)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        debug!("Successfully listed {} users", items.len());
        Ok(UsersPage {
            page,
            per_page,
            items,
        })
    }

    #[instrument(name = "users.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: ObjectId, projection: &str) -> Result<ProjectedUser, DomainError> {
        debug!("Getting user by id");

        let projection = Projection::parse(projection)?;
        let user = self
            .repo
            .find_projected(id, &projection)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))?;
        debug!("Successfully retrieved user");
        Ok(user)
    }
}
