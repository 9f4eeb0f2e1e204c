use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use deployment::Deployment;
use serde::Serialize;
use tracing::error;
use ts_rs::TS;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Serialize, TS)]
pub struct HealthStatus {
    pub status: String,
}

/// GET /api/health
pub async fn health(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<HealthStatus>, ApiError> {
    deployment.db().ping().await.map_err(|e| {
        error!(error = %e, "Health check could not reach the database");
        ApiError::Unavailable
    })?;
    Ok(ResponseJson(HealthStatus {
        status: "ok".to_string(),
    }))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/health", get(health))
}
