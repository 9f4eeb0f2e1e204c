use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{auth::AuthService, config::Config};
use tracing::info;

/// Single-process deployment configured from the environment.
#[derive(Clone)]
pub struct LocalDeployment {
    db: DBService,
    config: Arc<Config>,
    auth: AuthService,
}

impl LocalDeployment {
    pub fn from_parts(db: DBService, config: Config) -> Self {
        let auth = AuthService::with_secret(
            db.pool.clone(),
            &config.jwt_secret,
            config.token_ttl_hours,
            config.bcrypt_cost,
        );
        Self {
            db,
            config: Arc::new(config),
            auth,
        }
    }
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new() -> Result<Self, DeploymentError> {
        let config = Config::from_env()?;
        info!(database_url = %config.database_url, "Opening database");
        let db = DBService::new(&config.database_url, config.db_max_connections).await?;
        Ok(Self::from_parts(db, config))
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn auth(&self) -> &AuthService {
        &self.auth
    }
}
