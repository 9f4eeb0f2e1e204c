use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "alert_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Active,
    Acknowledged,
    Resolved,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct EmergencyAlert {
    pub alert_id: i64,
    pub user_id: i64,
    pub alert_type: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_description: String,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateEmergencyAlert {
    pub user_id: i64,
    pub alert_type: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_description: String,
}

const ALERT_COLUMNS: &str = "alert_id, user_id, alert_type, latitude, longitude, \
     location_description, status, created_at, resolved_at";

impl EmergencyAlert {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateEmergencyAlert,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, EmergencyAlert>(&format!(
            r#"INSERT INTO emergency_alerts (user_id, alert_type, latitude, longitude, location_description, status)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {ALERT_COLUMNS}"#
        ))
        .bind(data.user_id)
        .bind(&data.alert_type)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.location_description)
        .bind(AlertStatus::Active)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_status(
        pool: &SqlitePool,
        status: AlertStatus,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, EmergencyAlert>(&format!(
            r#"SELECT {ALERT_COLUMNS} FROM emergency_alerts
               WHERE status = $1
               ORDER BY created_at DESC, alert_id DESC"#
        ))
        .bind(status)
        .fetch_all(pool)
        .await
    }

    /// Moving to `resolved` stamps `resolved_at`; any other status clears it.
    pub async fn update_status<'e, E>(
        executor: E,
        alert_id: i64,
        status: AlertStatus,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, EmergencyAlert>(&format!(
            r#"UPDATE emergency_alerts
               SET status = $1,
                   resolved_at = CASE WHEN $1 = 'resolved' THEN datetime('now', 'subsec') ELSE NULL END
               WHERE alert_id = $2
               RETURNING {ALERT_COLUMNS}"#
        ))
        .bind(status)
        .bind(alert_id)
        .fetch_optional(executor)
        .await
    }
}
