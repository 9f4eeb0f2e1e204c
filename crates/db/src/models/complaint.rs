use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, QueryBuilder, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use super::Page;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "complaint_status")]
pub enum ComplaintStatus {
    #[default]
    Pending,
    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    Resolved,
    Closed,
    Rejected,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Complaint {
    pub complaint_id: i64,
    pub complaint_number: String,
    pub user_id: i64,
    pub complainant_name: String,
    pub contact: String,
    pub complaint_type: String,
    pub complaint_details: String,
    pub status: ComplaintStatus,
    pub resolution_details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateComplaint {
    pub user_id: i64,
    pub complainant_name: String,
    pub contact: String,
    pub complaint_type: String,
    pub complaint_details: String,
}

#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    pub status: Option<ComplaintStatus>,
    pub complaint_type: Option<String>,
}

const COMPLAINT_COLUMNS: &str = "complaint_id, complaint_number, user_id, complainant_name, contact, \
     complaint_type, complaint_details, status, resolution_details, created_at, updated_at";

impl Complaint {
    pub async fn create(
        pool: &SqlitePool,
        complaint_number: &str,
        data: &CreateComplaint,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Complaint>(&format!(
            r#"INSERT INTO complaints (complaint_number, user_id, complainant_name, contact,
                   complaint_type, complaint_details, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {COMPLAINT_COLUMNS}"#
        ))
        .bind(complaint_number)
        .bind(data.user_id)
        .bind(&data.complainant_name)
        .bind(&data.contact)
        .bind(&data.complaint_type)
        .bind(&data.complaint_details)
        .bind(ComplaintStatus::Pending)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_number(
        pool: &SqlitePool,
        complaint_number: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Complaint>(&format!(
            "SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE complaint_number = $1"
        ))
        .bind(complaint_number)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_user_id(pool: &SqlitePool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Complaint>(&format!(
            r#"SELECT {COMPLAINT_COLUMNS} FROM complaints
               WHERE user_id = $1
               ORDER BY created_at DESC, complaint_id DESC"#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_filtered(
        pool: &SqlitePool,
        filter: &ComplaintFilter,
        page: Page,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE 1=1"
        ));
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(complaint_type) = &filter.complaint_type {
            query
                .push(" AND complaint_type = ")
                .push_bind(complaint_type.clone());
        }
        query
            .push(" ORDER BY created_at DESC, complaint_id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        query.build_query_as::<Complaint>().fetch_all(pool).await
    }

    /// Returns the updated row, or `None` when no complaint has this id.
    pub async fn update_status<'e, E>(
        executor: E,
        complaint_id: i64,
        status: ComplaintStatus,
        resolution_details: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Complaint>(&format!(
            r#"UPDATE complaints
               SET status = $1, resolution_details = $2, updated_at = datetime('now', 'subsec')
               WHERE complaint_id = $3
               RETURNING {COMPLAINT_COLUMNS}"#
        ))
        .bind(status)
        .bind(resolution_details)
        .bind(complaint_id)
        .fetch_optional(executor)
        .await
    }
}
