use async_trait::async_trait;
use db::DBService;
use services::services::{
    auth::{AuthError, AuthService},
    config::{Config, ConfigError},
    database_validator::{DatabaseValidationError, DatabaseValidator},
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Schema(#[from] DatabaseValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Everything a request handler may reach.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    async fn new() -> Result<Self, DeploymentError>;

    fn db(&self) -> &DBService;

    fn config(&self) -> &Config;

    fn auth(&self) -> &AuthService;

    /// Verify the schema and create the configured admin account if needed.
    async fn bootstrap(&self) -> Result<(), DeploymentError> {
        DatabaseValidator::new(self.db().pool.clone())
            .validate()
            .await?;

        if let Some(admin) = &self.config().admin {
            if self.auth().ensure_admin(admin).await? {
                info!(username = %admin.username, "Admin account bootstrapped");
            }
        }
        Ok(())
    }
}
