use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    FirUpdate,
    ComplaintUpdate,
    EmergencyUpdate,
}

/// Kind of record a notification points at.
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "reference_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReferenceType {
    Fir,
    Complaint,
    Alert,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Notification {
    pub notification_id: i64,
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub reference_id: Option<i64>,
    pub reference_type: Option<ReferenceType>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub reference_id: Option<i64>,
    pub reference_type: Option<ReferenceType>,
}

const NOTIFICATION_COLUMNS: &str = "notification_id, user_id, notification_type, title, message, \
     reference_id, reference_type, is_read, created_at";

impl Notification {
    pub async fn create<'e, E>(executor: E, data: &CreateNotification) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Notification>(&format!(
            r#"INSERT INTO notifications (user_id, notification_type, title, message, reference_id, reference_type)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {NOTIFICATION_COLUMNS}"#
        ))
        .bind(data.user_id)
        .bind(data.notification_type)
        .bind(&data.title)
        .bind(&data.message)
        .bind(data.reference_id)
        .bind(data.reference_type)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: i64,
        unread_only: bool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            r#"SELECT {NOTIFICATION_COLUMNS} FROM notifications
               WHERE user_id = $1 AND ($2 = 0 OR is_read = 0)
               ORDER BY created_at DESC, notification_id DESC"#
        ))
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(pool)
        .await
    }

    pub async fn count_unread(pool: &SqlitePool, user_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Marks the notification read if it belongs to `user_id`. Returns whether a row matched.
    pub async fn mark_read(
        pool: &SqlitePool,
        notification_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE notification_id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
