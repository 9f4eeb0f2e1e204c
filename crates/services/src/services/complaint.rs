//! Citizen grievances: filing, tracking and resolution.

use db::models::{
    Page, is_unique_violation,
    complaint::{Complaint, ComplaintFilter, ComplaintStatus, CreateComplaint},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use utils::reference::{self, COMPLAINT_PREFIX};

use super::{auth::Principal, non_blank, notification::NotificationService};

const NUMBER_ATTEMPTS: usize = 3;
const DEFAULT_LIST_LIMIT: i64 = 100;

#[derive(Debug, Error)]
pub enum ComplaintError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(String),
    #[error("Complaint not found")]
    NotFound,
    #[error("Access denied")]
    AccessDenied,
    #[error("no free complaint number after {} attempts", NUMBER_ATTEMPTS)]
    NumberExhausted,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct CreateComplaintRequest {
    pub complainant_name: Option<String>,
    pub contact: Option<String>,
    pub complaint_type: Option<String>,
    pub complaint_details: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct ComplaintListQuery {
    pub status: Option<String>,
    pub complaint_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateComplaintStatusRequest {
    pub status: Option<String>,
    pub resolution_details: Option<String>,
}

pub struct ComplaintService;

impl ComplaintService {
    pub async fn file(
        pool: &SqlitePool,
        principal: &Principal,
        request: CreateComplaintRequest,
    ) -> Result<Complaint, ComplaintError> {
        let (Some(complainant_name), Some(contact), Some(complaint_type), Some(complaint_details)) = (
            non_blank(request.complainant_name),
            non_blank(request.contact),
            non_blank(request.complaint_type),
            non_blank(request.complaint_details),
        ) else {
            return Err(ComplaintError::Validation(
                "All fields are required".to_string(),
            ));
        };

        let data = CreateComplaint {
            user_id: principal.user_id,
            complainant_name,
            contact,
            complaint_type,
            complaint_details,
        };

        for attempt in 1..=NUMBER_ATTEMPTS {
            let complaint_number = reference::generate(COMPLAINT_PREFIX);
            match Complaint::create(pool, &complaint_number, &data).await {
                Ok(complaint) => {
                    info!(
                        complaint_id = complaint.complaint_id,
                        complaint_number = %complaint.complaint_number,
                        user_id = complaint.user_id,
                        "Complaint submitted"
                    );
                    return Ok(complaint);
                }
                Err(e) if is_unique_violation(&e) => {
                    warn!(attempt, complaint_number = %complaint_number, "Complaint number collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ComplaintError::NumberExhausted)
    }

    pub async fn list_all(
        pool: &SqlitePool,
        query: ComplaintListQuery,
    ) -> Result<Vec<Complaint>, ComplaintError> {
        let filter = ComplaintFilter {
            status: query.status.as_deref().map(parse_status).transpose()?,
            complaint_type: non_blank(query.complaint_type),
        };
        let page = Page::new(query.limit, query.offset, DEFAULT_LIST_LIMIT);
        Ok(Complaint::find_filtered(pool, &filter, page).await?)
    }

    pub async fn list_for(
        pool: &SqlitePool,
        principal: &Principal,
    ) -> Result<Vec<Complaint>, ComplaintError> {
        Ok(Complaint::find_by_user_id(pool, principal.user_id).await?)
    }

    pub async fn track(
        pool: &SqlitePool,
        principal: &Principal,
        complaint_number: &str,
    ) -> Result<Complaint, ComplaintError> {
        let complaint = Complaint::find_by_number(pool, complaint_number)
            .await?
            .ok_or(ComplaintError::NotFound)?;

        if !principal.can_access(complaint.user_id) {
            return Err(ComplaintError::AccessDenied);
        }
        Ok(complaint)
    }

    pub async fn update_status(
        pool: &SqlitePool,
        principal: &Principal,
        complaint_id: i64,
        request: UpdateComplaintStatusRequest,
    ) -> Result<Complaint, ComplaintError> {
        let status = match non_blank(request.status) {
            Some(raw) => parse_status(&raw)?,
            None => return Err(ComplaintError::Validation("status is required".to_string())),
        };
        let resolution_details = request.resolution_details.unwrap_or_default();

        let mut tx = pool.begin().await?;
        let complaint =
            Complaint::update_status(&mut *tx, complaint_id, status, &resolution_details)
                .await?
                .ok_or(ComplaintError::NotFound)?;
        NotificationService::complaint_status_changed(&mut *tx, &complaint).await?;
        tx.commit().await?;

        info!(
            complaint_id,
            status = %status,
            changed_by = principal.user_id,
            "Complaint status updated"
        );
        Ok(complaint)
    }
}

fn parse_status(raw: &str) -> Result<ComplaintStatus, ComplaintError> {
    raw.parse()
        .map_err(|_| ComplaintError::Validation(format!("Invalid complaint status: {raw}")))
}

#[cfg(test)]
mod tests {
    use db::models::{notification::Notification, user::UserType};

    use super::*;
    use crate::services::test_support::{seed_user, test_db};

    fn request() -> CreateComplaintRequest {
        CreateComplaintRequest {
            complainant_name: Some("Meena Iyer".to_string()),
            contact: Some("9111111111".to_string()),
            complaint_type: Some("Noise".to_string()),
            complaint_details: Some("Loudspeakers after midnight".to_string()),
        }
    }

    #[tokio::test]
    async fn file_and_track() {
        let db = test_db().await;
        let meena = seed_user(&db, "meena", UserType::Citizen).await;
        let other = seed_user(&db, "ravi", UserType::Citizen).await;
        let admin = seed_user(&db, "admin", UserType::Admin).await;

        let complaint = ComplaintService::file(&db.pool, &meena, request())
            .await
            .unwrap();
        assert!(complaint.complaint_number.starts_with("CMP"));
        assert_eq!(complaint.status, ComplaintStatus::Pending);

        let tracked = ComplaintService::track(&db.pool, &meena, &complaint.complaint_number)
            .await
            .unwrap();
        assert_eq!(tracked.complaint_id, complaint.complaint_id);
        assert!(ComplaintService::track(&db.pool, &admin, &complaint.complaint_number)
            .await
            .is_ok());
        assert!(matches!(
            ComplaintService::track(&db.pool, &other, &complaint.complaint_number).await,
            Err(ComplaintError::AccessDenied)
        ));
        assert!(matches!(
            ComplaintService::track(&db.pool, &meena, "CMP000000000").await,
            Err(ComplaintError::NotFound)
        ));
    }

    #[tokio::test]
    async fn file_requires_all_fields() {
        let db = test_db().await;
        let meena = seed_user(&db, "meena", UserType::Citizen).await;
        let err = ComplaintService::file(
            &db.pool,
            &meena,
            CreateComplaintRequest {
                contact: Some(String::new()),
                ..request()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "All fields are required");
    }

    #[tokio::test]
    async fn update_status_notifies_and_handles_missing() {
        let db = test_db().await;
        let meena = seed_user(&db, "meena", UserType::Citizen).await;
        let officer = seed_user(&db, "si.sharma", UserType::Officer).await;
        let complaint = ComplaintService::file(&db.pool, &meena, request())
            .await
            .unwrap();

        let updated = ComplaintService::update_status(
            &db.pool,
            &officer,
            complaint.complaint_id,
            UpdateComplaintStatusRequest {
                status: Some("Resolved".to_string()),
                resolution_details: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.status, ComplaintStatus::Resolved);
        assert_eq!(updated.resolution_details.as_deref(), Some(""));

        let notices = Notification::find_by_user_id(&db.pool, meena.user_id, false)
            .await
            .unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Complaint Status Updated");

        assert!(matches!(
            ComplaintService::update_status(
                &db.pool,
                &officer,
                complaint.complaint_id + 1,
                UpdateComplaintStatusRequest {
                    status: Some("Closed".to_string()),
                    resolution_details: None,
                },
            )
            .await,
            Err(ComplaintError::NotFound)
        ));
        assert!(matches!(
            ComplaintService::update_status(
                &db.pool,
                &officer,
                complaint.complaint_id,
                UpdateComplaintStatusRequest::default(),
            )
            .await,
            Err(ComplaintError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn list_all_newest_first_with_filters() {
        let db = test_db().await;
        let meena = seed_user(&db, "meena", UserType::Citizen).await;
        let first = ComplaintService::file(&db.pool, &meena, request())
            .await
            .unwrap();
        let second = ComplaintService::file(
            &db.pool,
            &meena,
            CreateComplaintRequest {
                complaint_type: Some("Water".to_string()),
                ..request()
            },
        )
        .await
        .unwrap();

        let all = ComplaintService::list_all(&db.pool, ComplaintListQuery::default())
            .await
            .unwrap();
        assert_eq!(
            all.iter().map(|c| c.complaint_id).collect::<Vec<_>>(),
            vec![second.complaint_id, first.complaint_id]
        );

        let water = ComplaintService::list_all(
            &db.pool,
            ComplaintListQuery {
                complaint_type: Some("Water".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(water.len(), 1);

        let mine = ComplaintService::list_for(&db.pool, &meena).await.unwrap();
        assert_eq!(mine.len(), 2);
    }
}
