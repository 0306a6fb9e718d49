use std::sync::Arc;

use anyhow::Context;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::UsersConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmUsersRepository;

/// Users module: wires the SeaORM repository into the domain service and
/// exposes the REST routes.
#[derive(Clone)]
pub struct UsersModule {
    service: Arc<Service>,
}

impl UsersModule {
    /// Run migrations and build the service on top of `db`.
    pub async fn init(db: DatabaseConnection, cfg: UsersConfig) -> anyhow::Result<Self> {
        info!("Initializing users module");
        debug!(
            "Loaded users config: default_page={}, default_per_page={}",
            cfg.default_page, cfg.default_per_page
        );

        Self::migrate(&db).await?;

        // Wire repository (infra) to domain service (port)
        let repo = SeaOrmUsersRepository::new(db);
        let service = Service::new(
            Arc::new(repo),
            ServiceConfig {
                default_page: cfg.default_page,
                default_per_page: cfg.default_per_page,
            },
        );

        Ok(Self {
            service: Arc::new(service),
        })
    }

    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running users database migrations");
        Migrator::up(db, None)
            .await
            .context("users migrations failed")?;
        info!("Users database migrations completed successfully");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering users REST routes");
        routes::register_routes(router, self.service.clone())
    }

    pub fn openapi(&self) -> utoipa::openapi::OpenApi {
        routes::openapi()
    }
}
