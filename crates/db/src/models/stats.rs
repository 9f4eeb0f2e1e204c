use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

use super::{complaint::ComplaintStatus, emergency_alert::AlertStatus, fir::FirStatus};

/// Counters shown on the staff dashboard.
#[derive(Debug, Clone, Copy, FromRow, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct DashboardStats {
    pub total_firs: i64,
    pub active_firs: i64,
    pub pending_complaints: i64,
    pub emergency_alerts: i64,
}

impl DashboardStats {
    pub async fn collect(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let [open_a, open_b, open_c] = FirStatus::OPEN;
        sqlx::query_as::<_, DashboardStats>(
            r#"SELECT
                (SELECT COUNT(*) FROM fir)                                     AS total_firs,
                (SELECT COUNT(*) FROM fir WHERE status IN ($1, $2, $3))        AS active_firs,
                (SELECT COUNT(*) FROM complaints WHERE status = $4)            AS pending_complaints,
                (SELECT COUNT(*) FROM emergency_alerts WHERE status = $5)      AS emergency_alerts"#,
        )
        .bind(open_a)
        .bind(open_b)
        .bind(open_c)
        .bind(ComplaintStatus::Pending)
        .bind(AlertStatus::Active)
        .fetch_one(pool)
        .await
    }
}
