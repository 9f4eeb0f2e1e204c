use db::models::stats::DashboardStats;
use sqlx::SqlitePool;
use tracing::debug;

pub struct StatsService;

impl StatsService {
    pub async fn dashboard(pool: &SqlitePool) -> Result<DashboardStats, sqlx::Error> {
        let stats = DashboardStats::collect(pool).await?;
        debug!(?stats, "Dashboard statistics collected");
        Ok(stats)
    }
}
