//! Registration, login and bearer-token authentication.

use chrono::Duration;
use db::models::user::{CreateUser, User, UserSummary, UserType};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::task::{JoinError, spawn_blocking};
use tracing::{info, warn};
use ts_rs::TS;
use utils::{
    jwt::{TokenError, TokenService},
    password::{PasswordError, hash_password, verify_password},
};

use super::{config::AdminBootstrap, non_blank};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("password task failed: {0}")]
    Join(#[from] JoinError),
    #[error("All fields are required")]
    MissingFields,
    #[error("User already exists")]
    UserExists,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
}

/// Identity carried inside a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub user_type: UserType,
}

impl Principal {
    pub fn is_staff(&self) -> bool {
        self.user_type.is_staff()
    }

    /// Staff see every record; citizens only their own.
    pub fn can_access(&self, owner_id: i64) -> bool {
        self.is_staff() || self.user_id == owner_id
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username.clone(),
            user_type: user.user_type,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct LoginRequest {
    /// Username or email.
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

#[derive(Clone)]
pub struct AuthService {
    pool: SqlitePool,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(pool: SqlitePool, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            pool,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn with_secret(
        pool: SqlitePool,
        secret: &secrecy::SecretString,
        ttl_hours: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self::new(
            pool,
            TokenService::new(secret, Duration::hours(ttl_hours)),
            bcrypt_cost,
        )
    }

    /// Create a citizen account. Staff accounts are never created through this path.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        let (Some(username), Some(email), Some(password), Some(full_name), Some(mobile)) = (
            non_blank(request.username),
            non_blank(request.email),
            non_blank(request.password),
            non_blank(request.full_name),
            non_blank(request.mobile),
        ) else {
            return Err(AuthError::MissingFields);
        };

        if User::exists_with_username_or_email(&self.pool, &username, &email).await? {
            return Err(AuthError::UserExists);
        }

        let password_hash = self.hash(password).await?;
        let user = User::create(
            &self.pool,
            &CreateUser {
                username,
                email,
                password_hash,
                full_name,
                mobile,
                address: request.address.unwrap_or_default(),
                user_type: UserType::Citizen,
            },
        )
        .await
        .map_err(|e| {
            // Lost a race with a concurrent registration
            if db::models::is_unique_violation(&e) {
                AuthError::UserExists
            } else {
                AuthError::Database(e)
            }
        })?;

        info!(user_id = user.user_id, username = %user.username, "User registered");
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let identifier = request.username.unwrap_or_default();
        let password = request.password.unwrap_or_default();

        let Some(user) = User::find_by_login(&self.pool, &identifier).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let hash = user.password_hash.clone();
        let valid = spawn_blocking(move || verify_password(&password, &hash)).await??;
        if !valid {
            warn!(user_id = user.user_id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        User::touch_last_login(&self.pool, user.user_id).await?;
        let token = self.tokens.issue(Principal::from(&user))?;

        info!(user_id = user.user_id, user_type = %user.user_type, "User logged in");
        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
            user: user.into(),
        })
    }

    /// Resolve a bearer token to the identity it was issued for.
    pub fn authenticate(&self, token: &str) -> Result<Principal, TokenError> {
        self.tokens.verify::<Principal>(token).map(|c| c.subject)
    }

    pub async fn current_user(&self, principal: &Principal) -> Result<User, AuthError> {
        User::find_by_id(&self.pool, principal.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Create the configured admin unless a user with that username or email exists.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, admin: &AdminBootstrap) -> Result<bool, AuthError> {
        if User::exists_with_username_or_email(&self.pool, &admin.username, &admin.email).await? {
            return Ok(false);
        }

        let password_hash = self.hash(admin.password.expose_secret().to_string()).await?;
        let user = User::create(
            &self.pool,
            &CreateUser {
                username: admin.username.clone(),
                email: admin.email.clone(),
                password_hash,
                full_name: admin.full_name.clone(),
                mobile: String::new(),
                address: String::new(),
                user_type: UserType::Admin,
            },
        )
        .await?;

        info!(user_id = user.user_id, username = %user.username, "Bootstrap admin created");
        Ok(true)
    }

    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let cost = self.bcrypt_cost;
        Ok(spawn_blocking(move || hash_password(&password, cost)).await??)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::services::test_support::{auth_service, register_request};

    #[tokio::test]
    async fn register_creates_citizen() {
        let (_, auth) = auth_service().await;
        let user = auth.register(register_request("asha")).await.unwrap();
        assert_eq!(user.user_type, UserType::Citizen);
        assert_eq!(user.address, "");
        assert_ne!(user.password_hash, "password123");
    }

    #[tokio::test]
    async fn register_requires_fields() {
        let (_, auth) = auth_service().await;
        let mut request = register_request("asha");
        request.mobile = Some("   ".to_string());
        assert!(matches!(
            auth.register(request).await,
            Err(AuthError::MissingFields)
        ));

        let mut request = register_request("asha");
        request.email = None;
        assert!(matches!(
            auth.register(request).await,
            Err(AuthError::MissingFields)
        ));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username_or_email() {
        let (_, auth) = auth_service().await;
        auth.register(register_request("asha")).await.unwrap();

        let same_name = RegisterRequest {
            email: Some("different@example.com".to_string()),
            ..register_request("asha")
        };
        assert!(matches!(
            auth.register(same_name).await,
            Err(AuthError::UserExists)
        ));

        let same_email = RegisterRequest {
            username: Some("someone-else".to_string()),
            ..register_request("asha")
        };
        assert!(matches!(
            auth.register(same_email).await,
            Err(AuthError::UserExists)
        ));
    }

    #[tokio::test]
    async fn login_by_username_or_email_issues_verifiable_token() {
        let (_, auth) = auth_service().await;
        let user = auth.register(register_request("asha")).await.unwrap();

        for identifier in ["asha", "asha@example.com"] {
            let response = auth
                .login(LoginRequest {
                    username: Some(identifier.to_string()),
                    password: Some("password123".to_string()),
                })
                .await
                .unwrap();
            assert_eq!(response.message, "Login successful");
            assert_eq!(response.user.user_id, user.user_id);

            let principal = auth.authenticate(&response.token).unwrap();
            assert_eq!(principal.user_id, user.user_id);
            assert_eq!(principal.username, "asha");
            assert_eq!(principal.user_type, UserType::Citizen);
        }

        let reloaded = auth
            .current_user(&Principal::from(&user))
            .await
            .unwrap();
        assert!(reloaded.last_login.is_some());
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let (_, auth) = auth_service().await;
        auth.register(register_request("asha")).await.unwrap();

        let wrong_password = auth
            .login(LoginRequest {
                username: Some("asha".to_string()),
                password: Some("nope".to_string()),
            })
            .await;
        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));

        let unknown = auth
            .login(LoginRequest {
                username: Some("ghost".to_string()),
                password: Some("password123".to_string()),
            })
            .await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let (db, auth) = auth_service().await;
        let admin = AdminBootstrap {
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            password: SecretString::from("changeme".to_string()),
            full_name: "Administrator".to_string(),
        };
        assert!(auth.ensure_admin(&admin).await.unwrap());
        assert!(!auth.ensure_admin(&admin).await.unwrap());

        let user = User::find_by_login(&db.pool, "root").await.unwrap().unwrap();
        assert_eq!(user.user_type, UserType::Admin);

        let login = auth
            .login(LoginRequest {
                username: Some("root".to_string()),
                password: Some("changeme".to_string()),
            })
            .await
            .unwrap();
        assert!(auth.authenticate(&login.token).unwrap().is_staff());
    }

    #[test]
    fn access_rule() {
        let citizen = Principal {
            user_id: 1,
            username: "asha".to_string(),
            user_type: UserType::Citizen,
        };
        let officer = Principal {
            user_id: 2,
            username: "si.sharma".to_string(),
            user_type: UserType::Officer,
        };
        assert!(citizen.can_access(1));
        assert!(!citizen.can_access(2));
        assert!(officer.can_access(1));
    }
}
