use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "user_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserType {
    #[default]
    Citizen,
    Officer,
    Admin,
}

impl UserType {
    /// Officers and admins may act on records they do not own.
    pub fn is_staff(self) -> bool {
        matches!(self, UserType::Officer | UserType::Admin)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub full_name: String,
    pub mobile: String,
    pub address: String,
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Public subset of a user returned on login.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UserSummary {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub user_type: UserType,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            user_type: user.user_type,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub mobile: String,
    pub address: String,
    pub user_type: UserType,
}

const USER_COLUMNS: &str = "user_id, username, email, password_hash, full_name, mobile, address, \
     user_type, created_at, last_login";

impl User {
    pub async fn find_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Look a user up by login identifier, which may be either the username or the email.
    pub async fn find_by_login(
        pool: &SqlitePool,
        identifier: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1 LIMIT 1"
        ))
        .bind(identifier)
        .fetch_optional(pool)
        .await
    }

    pub async fn exists_with_username_or_email(
        pool: &SqlitePool,
        username: &str,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1 OR username = $2")
                .bind(email)
                .bind(username)
                .fetch_one(pool)
                .await?;
        Ok(count > 0)
    }

    pub async fn create(pool: &SqlitePool, data: &CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO users (username, email, password_hash, full_name, mobile, address, user_type)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.full_name)
        .bind(&data.mobile)
        .bind(&data.address)
        .bind(data.user_type)
        .fetch_one(pool)
        .await
    }

    pub async fn touch_last_login(pool: &SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login = datetime('now', 'subsec') WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn new_user(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            full_name: "Asha Verma".to_string(),
            mobile: "9876543210".to_string(),
            address: String::new(),
            user_type: UserType::Citizen,
        }
    }

    #[test]
    fn staff_roles() {
        assert!(!UserType::Citizen.is_staff());
        assert!(UserType::Officer.is_staff());
        assert!(UserType::Admin.is_staff());
        assert_eq!("officer".parse::<UserType>().unwrap(), UserType::Officer);
    }

    #[tokio::test]
    async fn login_identifier_matches_username_or_email() {
        let db = DBService::new_in_memory().await.unwrap();
        let created = User::create(&db.pool, &new_user("asha", "asha@example.com"))
            .await
            .unwrap();
        assert_eq!(created.user_type, UserType::Citizen);
        assert!(created.last_login.is_none());

        let by_name = User::find_by_login(&db.pool, "asha").await.unwrap().unwrap();
        let by_mail = User::find_by_login(&db.pool, "asha@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.user_id, created.user_id);
        assert_eq!(by_mail.user_id, created.user_id);
        assert!(User::find_by_login(&db.pool, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_detection_and_last_login() {
        let db = DBService::new_in_memory().await.unwrap();
        let user = User::create(&db.pool, &new_user("asha", "asha@example.com"))
            .await
            .unwrap();

        assert!(
            User::exists_with_username_or_email(&db.pool, "other", "asha@example.com")
                .await
                .unwrap()
        );
        assert!(
            User::exists_with_username_or_email(&db.pool, "asha", "other@example.com")
                .await
                .unwrap()
        );
        assert!(
            !User::exists_with_username_or_email(&db.pool, "other", "other@example.com")
                .await
                .unwrap()
        );

        let err = User::create(&db.pool, &new_user("asha", "again@example.com"))
            .await
            .unwrap_err();
        assert!(super::super::is_unique_violation(&err));

        User::touch_last_login(&db.pool, user.user_id).await.unwrap();
        let reloaded = User::find_by_id(&db.pool, user.user_id).await.unwrap().unwrap();
        assert!(reloaded.last_login.is_some());
    }
}
