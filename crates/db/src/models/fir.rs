use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, QueryBuilder, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use super::Page;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "fir_status")]
pub enum FirStatus {
    #[default]
    Pending,
    Active,
    #[sqlx(rename = "Under Investigation")]
    #[serde(rename = "Under Investigation")]
    #[strum(serialize = "Under Investigation")]
    UnderInvestigation,
    #[sqlx(rename = "Charge Sheet Filed")]
    #[serde(rename = "Charge Sheet Filed")]
    #[strum(serialize = "Charge Sheet Filed")]
    ChargeSheetFiled,
    Resolved,
    Closed,
    Rejected,
}

impl FirStatus {
    /// Statuses counted as open cases on the dashboard.
    pub const OPEN: [FirStatus; 3] = [
        FirStatus::Pending,
        FirStatus::Active,
        FirStatus::UnderInvestigation,
    ];
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Fir {
    pub fir_id: i64,
    pub fir_number: String,
    pub user_id: i64,
    pub complainant_name: String,
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub crime_type: String,
    pub incident_details: String,
    pub incident_date: NaiveDate,
    pub incident_location: String,
    pub status: FirStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct FirStatusHistory {
    pub history_id: i64,
    pub fir_id: i64,
    pub old_status: FirStatus,
    pub new_status: FirStatus,
    pub changed_by: i64,
    pub remarks: String,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateFir {
    pub user_id: i64,
    pub complainant_name: String,
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub crime_type: String,
    pub incident_details: String,
    pub incident_date: NaiveDate,
    pub incident_location: String,
}

#[derive(Debug, Clone, Default)]
pub struct FirFilter {
    pub status: Option<FirStatus>,
    pub crime_type: Option<String>,
}

const FIR_COLUMNS: &str = "fir_id, fir_number, user_id, complainant_name, mobile, email, address, \
     crime_type, incident_details, incident_date, incident_location, status, created_at, updated_at";

const HISTORY_COLUMNS: &str =
    "history_id, fir_id, old_status, new_status, changed_by, remarks, changed_at";

impl Fir {
    pub async fn create<'e, E>(
        executor: E,
        fir_number: &str,
        data: &CreateFir,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Fir>(&format!(
            r#"INSERT INTO fir (fir_number, user_id, complainant_name, mobile, email, address,
                   crime_type, incident_details, incident_date, incident_location, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING {FIR_COLUMNS}"#
        ))
        .bind(fir_number)
        .bind(data.user_id)
        .bind(&data.complainant_name)
        .bind(&data.mobile)
        .bind(&data.email)
        .bind(&data.address)
        .bind(&data.crime_type)
        .bind(&data.incident_details)
        .bind(data.incident_date)
        .bind(&data.incident_location)
        .bind(FirStatus::Pending)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_number(
        pool: &SqlitePool,
        fir_number: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Fir>(&format!(
            "SELECT {FIR_COLUMNS} FROM fir WHERE fir_number = $1"
        ))
        .bind(fir_number)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_user_id(pool: &SqlitePool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Fir>(&format!(
            "SELECT {FIR_COLUMNS} FROM fir WHERE user_id = $1 ORDER BY created_at DESC, fir_id DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Staff listing, newest first, optionally narrowed by status and crime type.
    pub async fn find_filtered(
        pool: &SqlitePool,
        filter: &FirFilter,
        page: Page,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {FIR_COLUMNS} FROM fir WHERE 1=1"));
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(crime_type) = &filter.crime_type {
            query.push(" AND crime_type = ").push_bind(crime_type.clone());
        }
        query
            .push(" ORDER BY created_at DESC, fir_id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        query.build_query_as::<Fir>().fetch_all(pool).await
    }

    pub async fn update_status<'e, E>(
        executor: E,
        fir_id: i64,
        status: FirStatus,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Fir>(&format!(
            r#"UPDATE fir SET status = $1, updated_at = datetime('now', 'subsec')
               WHERE fir_id = $2
               RETURNING {FIR_COLUMNS}"#
        ))
        .bind(status)
        .bind(fir_id)
        .fetch_optional(executor)
        .await
    }
}

impl FirStatusHistory {
    /// Append a transition to `new_status`, taking `old_status` from the FIR row as it is now.
    /// Returns `None` when the FIR does not exist.
    ///
    /// This is a write, so inside a transaction it takes the write lock before anything is read.
    pub async fn record<'e, E>(
        executor: E,
        fir_id: i64,
        new_status: FirStatus,
        changed_by: i64,
        remarks: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, FirStatusHistory>(&format!(
            r#"INSERT INTO fir_status_history (fir_id, old_status, new_status, changed_by, remarks)
               SELECT fir_id, status, $2, $3, $4 FROM fir WHERE fir_id = $1
               RETURNING {HISTORY_COLUMNS}"#
        ))
        .bind(fir_id)
        .bind(new_status)
        .bind(changed_by)
        .bind(remarks)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_by_fir_id(pool: &SqlitePool, fir_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FirStatusHistory>(&format!(
            r#"SELECT {HISTORY_COLUMNS} FROM fir_status_history
               WHERE fir_id = $1
               ORDER BY changed_at DESC, history_id DESC"#
        ))
        .bind(fir_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DBService,
        models::user::{CreateUser, User, UserType},
    };

    async fn seed_user(pool: &SqlitePool) -> User {
        User::create(
            pool,
            &CreateUser {
                username: "ravi".to_string(),
                email: "ravi@example.com".to_string(),
                password_hash: "hash".to_string(),
                full_name: "Ravi Kumar".to_string(),
                mobile: "9000000000".to_string(),
                address: "Lucknow".to_string(),
                user_type: UserType::Citizen,
            },
        )
        .await
        .unwrap()
    }

    fn new_fir(user_id: i64, crime_type: &str) -> CreateFir {
        CreateFir {
            user_id,
            complainant_name: "Ravi Kumar".to_string(),
            mobile: "9000000000".to_string(),
            email: String::new(),
            address: "Lucknow".to_string(),
            crime_type: crime_type.to_string(),
            incident_details: "Phone snatched near the market".to_string(),
            incident_date: NaiveDate::from_ymd_opt(2025, 9, 14).unwrap(),
            incident_location: "Aminabad".to_string(),
        }
    }

    #[test]
    fn status_text_matches_stored_form() {
        assert_eq!(FirStatus::UnderInvestigation.to_string(), "Under Investigation");
        assert_eq!(
            "Charge Sheet Filed".parse::<FirStatus>().unwrap(),
            FirStatus::ChargeSheetFiled
        );
        assert_eq!(
            serde_json::to_string(&FirStatus::UnderInvestigation).unwrap(),
            "\"Under Investigation\""
        );
        assert_eq!(
            "under investigation".parse::<FirStatus>(),
            Err(strum::ParseError::VariantNotFound)
        );
    }

    #[tokio::test]
    async fn create_defaults_to_pending_and_filters() {
        let db = DBService::new_in_memory().await.unwrap();
        let user = seed_user(&db.pool).await;

        let theft = Fir::create(&db.pool, "FIR000001001", &new_fir(user.user_id, "Theft"))
            .await
            .unwrap();
        let fraud = Fir::create(&db.pool, "FIR000002002", &new_fir(user.user_id, "Fraud"))
            .await
            .unwrap();
        assert_eq!(theft.status, FirStatus::Pending);
        assert_eq!(theft.incident_date, NaiveDate::from_ymd_opt(2025, 9, 14).unwrap());

        Fir::update_status(&db.pool, fraud.fir_id, FirStatus::Active).await.unwrap();

        let all = Fir::find_filtered(&db.pool, &FirFilter::default(), Page::new(None, None, 50))
            .await
            .unwrap();
        assert_eq!(
            all.iter().map(|f| f.fir_id).collect::<Vec<_>>(),
            vec![fraud.fir_id, theft.fir_id]
        );

        let active = Fir::find_filtered(
            &db.pool,
            &FirFilter {
                status: Some(FirStatus::Active),
                crime_type: None,
            },
            Page::new(None, None, 50),
        )
        .await
        .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].fir_id, fraud.fir_id);

        let thefts = Fir::find_filtered(
            &db.pool,
            &FirFilter {
                status: None,
                crime_type: Some("Theft".to_string()),
            },
            Page::new(Some(1), Some(0), 50),
        )
        .await
        .unwrap();
        assert_eq!(thefts.len(), 1);
        assert_eq!(thefts[0].fir_number, "FIR000001001");

        let second_page =
            Fir::find_filtered(&db.pool, &FirFilter::default(), Page::new(Some(1), Some(1), 50))
                .await
                .unwrap();
        assert_eq!(second_page[0].fir_id, theft.fir_id);
    }

    #[tokio::test]
    async fn duplicate_number_is_a_unique_violation() {
        let db = DBService::new_in_memory().await.unwrap();
        let user = seed_user(&db.pool).await;
        Fir::create(&db.pool, "FIR123456789", &new_fir(user.user_id, "Theft"))
            .await
            .unwrap();
        let err = Fir::create(&db.pool, "FIR123456789", &new_fir(user.user_id, "Theft"))
            .await
            .unwrap_err();
        assert!(crate::models::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let db = DBService::new_in_memory().await.unwrap();
        let user = seed_user(&db.pool).await;
        let fir = Fir::create(&db.pool, "FIR000001001", &new_fir(user.user_id, "Theft"))
            .await
            .unwrap();

        FirStatusHistory::record(&db.pool, fir.fir_id, FirStatus::Active, user.user_id, "")
            .await
            .unwrap()
            .unwrap();
        let updated = Fir::update_status(&db.pool, fir.fir_id, FirStatus::Active)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, FirStatus::Active);

        FirStatusHistory::record(
            &db.pool,
            fir.fir_id,
            FirStatus::UnderInvestigation,
            user.user_id,
            "assigned to SI Sharma",
        )
        .await
        .unwrap()
        .unwrap();

        let history = FirStatusHistory::find_by_fir_id(&db.pool, fir.fir_id)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].old_status, FirStatus::Active);
        assert_eq!(history[0].new_status, FirStatus::UnderInvestigation);
        assert_eq!(history[0].remarks, "assigned to SI Sharma");
        assert_eq!(history[1].old_status, FirStatus::Pending);
        assert_eq!(history[1].new_status, FirStatus::Active);
    }

    #[tokio::test]
    async fn missing_fir_records_nothing() {
        let db = DBService::new_in_memory().await.unwrap();
        let user = seed_user(&db.pool).await;

        let recorded =
            FirStatusHistory::record(&db.pool, 9999, FirStatus::Active, user.user_id, "")
                .await
                .unwrap();
        assert!(recorded.is_none());
        assert!(
            Fir::update_status(&db.pool, 9999, FirStatus::Active)
                .await
                .unwrap()
                .is_none()
        );
    }
}
