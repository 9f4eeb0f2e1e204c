//! In-app notifications raised when a citizen's records change.

use db::models::{
    complaint::Complaint,
    emergency_alert::EmergencyAlert,
    fir::Fir,
    notification::{CreateNotification, Notification, NotificationType, ReferenceType},
};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};
use thiserror::Error;
use ts_rs::TS;

use super::auth::Principal;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Notification not found")]
    NotFound,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct NotificationQuery {
    pub unread_only: Option<bool>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub unread: i64,
}

pub struct NotificationService;

impl NotificationService {
    pub async fn fir_filed<'e, E>(executor: E, fir: &Fir) -> Result<Notification, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Notification::create(
            executor,
            &CreateNotification {
                user_id: fir.user_id,
                notification_type: NotificationType::FirUpdate,
                title: "FIR Filed Successfully".to_string(),
                message: format!("Your FIR {} has been filed successfully", fir.fir_number),
                reference_id: Some(fir.fir_id),
                reference_type: Some(ReferenceType::Fir),
            },
        )
        .await
    }

    pub async fn fir_status_changed<'e, E>(
        executor: E,
        fir: &Fir,
    ) -> Result<Notification, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Notification::create(
            executor,
            &CreateNotification {
                user_id: fir.user_id,
                notification_type: NotificationType::FirUpdate,
                title: "FIR Status Updated".to_string(),
                message: format!(
                    "Your FIR {} status changed to {}",
                    fir.fir_number, fir.status
                ),
                reference_id: Some(fir.fir_id),
                reference_type: Some(ReferenceType::Fir),
            },
        )
        .await
    }

    pub async fn complaint_status_changed<'e, E>(
        executor: E,
        complaint: &Complaint,
    ) -> Result<Notification, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Notification::create(
            executor,
            &CreateNotification {
                user_id: complaint.user_id,
                notification_type: NotificationType::ComplaintUpdate,
                title: "Complaint Status Updated".to_string(),
                message: format!(
                    "Your complaint {} status changed to {}",
                    complaint.complaint_number, complaint.status
                ),
                reference_id: Some(complaint.complaint_id),
                reference_type: Some(ReferenceType::Complaint),
            },
        )
        .await
    }

    pub async fn alert_status_changed<'e, E>(
        executor: E,
        alert: &EmergencyAlert,
    ) -> Result<Notification, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Notification::create(
            executor,
            &CreateNotification {
                user_id: alert.user_id,
                notification_type: NotificationType::EmergencyUpdate,
                title: "Emergency Alert Updated".to_string(),
                message: format!(
                    "Your {} alert is now {}",
                    alert.alert_type, alert.status
                ),
                reference_id: Some(alert.alert_id),
                reference_type: Some(ReferenceType::Alert),
            },
        )
        .await
    }

    pub async fn list(
        pool: &SqlitePool,
        principal: &Principal,
        query: NotificationQuery,
    ) -> Result<NotificationList, NotificationError> {
        let unread_only = query.unread_only.unwrap_or(false);
        let notifications =
            Notification::find_by_user_id(pool, principal.user_id, unread_only).await?;
        let unread = Notification::count_unread(pool, principal.user_id).await?;
        Ok(NotificationList {
            notifications,
            unread,
        })
    }

    pub async fn mark_read(
        pool: &SqlitePool,
        principal: &Principal,
        notification_id: i64,
    ) -> Result<(), NotificationError> {
        if Notification::mark_read(pool, notification_id, principal.user_id).await? {
            Ok(())
        } else {
            Err(NotificationError::NotFound)
        }
    }
}
