//! Emergency (SOS) alerts raised by citizens and handled by staff.

use db::models::emergency_alert::{AlertStatus, CreateEmergencyAlert, EmergencyAlert};
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;

use super::{auth::Principal, non_blank, notification::NotificationService};

#[derive(Debug, Error)]
pub enum EmergencyError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(String),
    #[error("Alert not found")]
    NotFound,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct CreateAlertRequest {
    pub alert_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateAlertStatusRequest {
    pub status: Option<String>,
}

pub struct EmergencyService;

impl EmergencyService {
    pub async fn raise(
        pool: &SqlitePool,
        principal: &Principal,
        request: CreateAlertRequest,
    ) -> Result<EmergencyAlert, EmergencyError> {
        let Some(alert_type) = non_blank(request.alert_type) else {
            return Err(EmergencyError::Validation(
                "alert_type is required".to_string(),
            ));
        };
        if let Some(latitude) = request.latitude.filter(|l| !(-90.0..=90.0).contains(l)) {
            return Err(EmergencyError::Validation(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if let Some(longitude) = request.longitude.filter(|l| !(-180.0..=180.0).contains(l)) {
            return Err(EmergencyError::Validation(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }

        let alert = EmergencyAlert::create(
            pool,
            &CreateEmergencyAlert {
                user_id: principal.user_id,
                alert_type,
                latitude: request.latitude,
                longitude: request.longitude,
                location_description: request.location_description.unwrap_or_default(),
            },
        )
        .await?;

        // Staff dashboards poll active alerts; make these stand out in the log as well
        warn!(
            alert_id = alert.alert_id,
            user_id = alert.user_id,
            alert_type = %alert.alert_type,
            latitude = ?alert.latitude,
            longitude = ?alert.longitude,
            "Emergency alert raised"
        );
        Ok(alert)
    }

    pub async fn list_active(pool: &SqlitePool) -> Result<Vec<EmergencyAlert>, EmergencyError> {
        Ok(EmergencyAlert::find_by_status(pool, AlertStatus::Active).await?)
    }

    pub async fn update_status(
        pool: &SqlitePool,
        principal: &Principal,
        alert_id: i64,
        request: UpdateAlertStatusRequest,
    ) -> Result<EmergencyAlert, EmergencyError> {
        let status = match non_blank(request.status) {
            Some(raw) => raw.parse::<AlertStatus>().map_err(|_| {
                EmergencyError::Validation(format!("Invalid alert status: {raw}"))
            })?,
            None => return Err(EmergencyError::Validation("status is required".to_string())),
        };

        let mut tx = pool.begin().await?;
        let alert = EmergencyAlert::update_status(&mut *tx, alert_id, status)
            .await?
            .ok_or(EmergencyError::NotFound)?;
        NotificationService::alert_status_changed(&mut *tx, &alert).await?;
        tx.commit().await?;

        info!(alert_id, status = %status, changed_by = principal.user_id, "Emergency alert updated");
        Ok(alert)
    }
}

#[cfg(test)]
mod tests {
    use db::models::{notification::Notification, user::UserType};

    use super::*;
    use crate::services::test_support::{seed_user, test_db};

    fn request() -> CreateAlertRequest {
        CreateAlertRequest {
            alert_type: Some("medical".to_string()),
            latitude: Some(19.0760),
            longitude: Some(72.8777),
            location_description: None,
        }
    }

    #[tokio::test]
    async fn raise_validates_and_lists_active() {
        let db = test_db().await;
        let citizen = seed_user(&db, "kiran", UserType::Citizen).await;

        let alert = EmergencyService::raise(&db.pool, &citizen, request())
            .await
            .unwrap();
        assert_eq!(alert.status, AlertStatus::Active);
        assert_eq!(alert.location_description, "");

        for bad in [
            CreateAlertRequest {
                alert_type: None,
                ..request()
            },
            CreateAlertRequest {
                latitude: Some(91.0),
                ..request()
            },
            CreateAlertRequest {
                longitude: Some(-180.5),
                ..request()
            },
        ] {
            assert!(matches!(
                EmergencyService::raise(&db.pool, &citizen, bad).await,
                Err(EmergencyError::Validation(_))
            ));
        }

        let active = EmergencyService::list_active(&db.pool).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].alert_id, alert.alert_id);
    }

    #[tokio::test]
    async fn resolving_notifies_and_clears_active() {
        let db = test_db().await;
        let citizen = seed_user(&db, "kiran", UserType::Citizen).await;
        let officer = seed_user(&db, "si.sharma", UserType::Officer).await;
        let alert = EmergencyService::raise(&db.pool, &citizen, request())
            .await
            .unwrap();

        let resolved = EmergencyService::update_status(
            &db.pool,
            &officer,
            alert.alert_id,
            UpdateAlertStatusRequest {
                status: Some("resolved".to_string()),
            },
        )
        .await
        .unwrap();
        assert!(resolved.resolved_at.is_some());
        assert!(EmergencyService::list_active(&db.pool).await.unwrap().is_empty());

        let notices = Notification::find_by_user_id(&db.pool, citizen.user_id, false)
            .await
            .unwrap();
        assert_eq!(notices[0].message, "Your medical alert is now resolved");

        assert!(matches!(
            EmergencyService::update_status(
                &db.pool,
                &officer,
                alert.alert_id,
                UpdateAlertStatusRequest {
                    status: Some("closed".to_string()),
                },
            )
            .await,
            Err(EmergencyError::Validation(_))
        ));
    }
}
