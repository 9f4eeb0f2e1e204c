use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::stats::DashboardStats;
use deployment::Deployment;
use services::services::stats::StatsService;

use crate::{
    DeploymentImpl,
    error::{ApiError, Operation},
    extract::StaffUser,
};

/// GET /api/stats/dashboard
pub async fn dashboard(
    State(deployment): State<DeploymentImpl>,
    StaffUser(_staff): StaffUser,
) -> Result<ResponseJson<DashboardStats>, ApiError> {
    let stats = StatsService::dashboard(&deployment.db().pool)
        .await
        .during("Failed to fetch statistics")?;
    Ok(ResponseJson(stats))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/stats/dashboard", get(dashboard))
}
