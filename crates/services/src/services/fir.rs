//! First Information Report filing, tracking and status workflow.

use chrono::NaiveDate;
use db::models::{
    Page, is_unique_violation,
    fir::{CreateFir, Fir, FirFilter, FirStatus, FirStatusHistory},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use utils::reference::{self, FIR_PREFIX};

use super::{auth::Principal, non_blank, notification::NotificationService};

/// Attempts at drawing an unused FIR number before giving up.
const NUMBER_ATTEMPTS: usize = 3;
const DEFAULT_LIST_LIMIT: i64 = 50;

#[derive(Debug, Error)]
pub enum FirError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(String),
    #[error("FIR not found")]
    NotFound,
    #[error("Access denied")]
    AccessDenied,
    #[error("no free FIR number after {} attempts", NUMBER_ATTEMPTS)]
    NumberExhausted,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct CreateFirRequest {
    pub complainant_name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub crime_type: Option<String>,
    pub incident_details: Option<String>,
    /// `YYYY-MM-DD`
    pub incident_date: Option<String>,
    pub incident_location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct FirListQuery {
    pub status: Option<String>,
    pub crime_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateFirStatusRequest {
    pub status: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct FirWithHistory {
    pub fir: Fir,
    pub history: Vec<FirStatusHistory>,
}

pub struct FirService;

impl FirService {
    /// File a new FIR for `principal` and notify them of its number.
    pub async fn file(
        pool: &SqlitePool,
        principal: &Principal,
        request: CreateFirRequest,
    ) -> Result<Fir, FirError> {
        let (
            Some(complainant_name),
            Some(mobile),
            Some(address),
            Some(crime_type),
            Some(incident_details),
            Some(incident_date),
            Some(incident_location),
        ) = (
            non_blank(request.complainant_name),
            non_blank(request.mobile),
            non_blank(request.address),
            non_blank(request.crime_type),
            non_blank(request.incident_details),
            non_blank(request.incident_date),
            non_blank(request.incident_location),
        )
        else {
            return Err(FirError::Validation(
                "All required fields must be filled".to_string(),
            ));
        };

        let data = CreateFir {
            user_id: principal.user_id,
            complainant_name,
            mobile,
            email: request.email.unwrap_or_default(),
            address,
            crime_type,
            incident_details,
            incident_date: parse_incident_date(&incident_date)?,
            incident_location,
        };

        for attempt in 1..=NUMBER_ATTEMPTS {
            let fir_number = reference::generate(FIR_PREFIX);
            let mut tx = pool.begin().await?;
            match Fir::create(&mut *tx, &fir_number, &data).await {
                Ok(fir) => {
                    NotificationService::fir_filed(&mut *tx, &fir).await?;
                    tx.commit().await?;
                    info!(
                        fir_id = fir.fir_id,
                        fir_number = %fir.fir_number,
                        user_id = fir.user_id,
                        crime_type = %fir.crime_type,
                        "FIR filed"
                    );
                    return Ok(fir);
                }
                Err(e) if is_unique_violation(&e) => {
                    warn!(attempt, fir_number = %fir_number, "FIR number collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(FirError::NumberExhausted)
    }

    pub async fn list_all(pool: &SqlitePool, query: FirListQuery) -> Result<Vec<Fir>, FirError> {
        let filter = FirFilter {
            status: query.status.as_deref().map(parse_status).transpose()?,
            crime_type: non_blank(query.crime_type),
        };
        let page = Page::new(query.limit, query.offset, DEFAULT_LIST_LIMIT);
        Ok(Fir::find_filtered(pool, &filter, page).await?)
    }

    pub async fn list_for(pool: &SqlitePool, principal: &Principal) -> Result<Vec<Fir>, FirError> {
        Ok(Fir::find_by_user_id(pool, principal.user_id).await?)
    }

    pub async fn track(
        pool: &SqlitePool,
        principal: &Principal,
        fir_number: &str,
    ) -> Result<FirWithHistory, FirError> {
        let fir = Fir::find_by_number(pool, fir_number)
            .await?
            .ok_or(FirError::NotFound)?;

        if !principal.can_access(fir.user_id) {
            warn!(
                user_id = principal.user_id,
                fir_id = fir.fir_id,
                "Citizen tried to track another user's FIR"
            );
            return Err(FirError::AccessDenied);
        }

        let history = FirStatusHistory::find_by_fir_id(pool, fir.fir_id).await?;
        Ok(FirWithHistory { fir, history })
    }

    /// Move an FIR to a new status, recording history and notifying the filer atomically.
    pub async fn update_status(
        pool: &SqlitePool,
        principal: &Principal,
        fir_id: i64,
        request: UpdateFirStatusRequest,
    ) -> Result<Fir, FirError> {
        let status = match non_blank(request.status) {
            Some(raw) => parse_status(&raw)?,
            None => return Err(FirError::Validation("status is required".to_string())),
        };
        let remarks = request.remarks.unwrap_or_default();

        // The first statement must be a write: under WAL a deferred read cannot upgrade once
        // another writer has committed.
        let mut tx = pool.begin().await?;
        let entry = FirStatusHistory::record(&mut *tx, fir_id, status, principal.user_id, &remarks)
            .await?
            .ok_or(FirError::NotFound)?;
        let fir = Fir::update_status(&mut *tx, fir_id, status)
            .await?
            .ok_or(FirError::NotFound)?;
        NotificationService::fir_status_changed(&mut *tx, &fir).await?;
        tx.commit().await?;

        info!(
            fir_id,
            old_status = %entry.old_status,
            new_status = %status,
            changed_by = principal.user_id,
            "FIR status updated"
        );
        Ok(fir)
    }
}

fn parse_status(raw: &str) -> Result<FirStatus, FirError> {
    raw.parse()
        .map_err(|_| FirError::Validation(format!("Invalid FIR status: {raw}")))
}

fn parse_incident_date(raw: &str) -> Result<NaiveDate, FirError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        FirError::Validation(format!("incident_date must be YYYY-MM-DD, got {raw}"))
    })
}
