use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::ProfilesConfig;
use crate::domain::ports::{AccessTokenDecoder, ObjectStorage};
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::jwt::JwtAuthManager;
use crate::infra::object_storage::build_object_storage;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{SeaOrmAccountsRepository, SeaOrmProfilesRepository};

/// Composition root of the profiles module: wires storage, token and
/// repository adapters into the domain service and exposes its routes.
#[derive(Clone)]
pub struct ProfilesModule {
    service: Arc<Service>,
}

impl ProfilesModule {
    /// Build the module with the adapters selected in `cfg`.
    ///
    /// # Errors
    /// Fails when the JWT secret is missing or the storage backend is unusable.
    pub fn init(cfg: &ProfilesConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        info!("Initializing profiles module");
        debug!(
            max_avatar_size_mb = cfg.validation.max_avatar_size_mb,
            min_age_years = cfg.validation.min_age_years,
            "Loaded profiles config"
        );

        let tokens: Arc<dyn AccessTokenDecoder> = Arc::new(JwtAuthManager::from_config(&cfg.jwt)?);
        let storage = build_object_storage(&cfg.storage)?;

        Ok(Self::with_adapters(cfg, db, storage, tokens))
    }

    /// Build the module around caller-provided storage and token adapters.
    #[must_use]
    pub fn with_adapters(
        cfg: &ProfilesConfig,
        db: DatabaseConnection,
        storage: Arc<dyn ObjectStorage>,
        tokens: Arc<dyn AccessTokenDecoder>,
    ) -> Self {
        let service = Service::new(
            Arc::new(SeaOrmAccountsRepository::new(db.clone())),
            Arc::new(SeaOrmProfilesRepository::new(db)),
            storage,
            tokens,
            ServiceConfig {
                validation: cfg.validation.clone(),
            },
        );

        Self {
            service: Arc::new(service),
        }
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    /// Returns the underlying database error.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running profiles database migrations");
        Migrator::up(db, None).await?;
        info!("Profiles database migrations completed successfully");
        Ok(())
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }

    /// REST routes of the module.
    #[must_use]
    pub fn router(&self) -> Router {
        routes::register_routes(Router::new(), self.service())
    }
}
