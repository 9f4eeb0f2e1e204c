use db::{
    DBService,
    models::user::{CreateUser, User, UserType},
};
use secrecy::SecretString;

use super::auth::{AuthService, Principal, RegisterRequest};

pub async fn test_db() -> DBService {
    DBService::new_in_memory()
        .await
        .expect("in-memory database")
}

pub async fn auth_service() -> (DBService, AuthService) {
    let db = test_db().await;
    let auth = AuthService::with_secret(
        db.pool.clone(),
        &SecretString::from("test-secret".to_string()),
        24,
        4,
    );
    (db, auth)
}

pub fn register_request(username: &str) -> RegisterRequest {
    RegisterRequest {
        username: Some(username.to_string()),
        email: Some(format!("{username}@example.com")),
        password: Some("password123".to_string()),
        full_name: Some("Test User".to_string()),
        mobile: Some("9876543210".to_string()),
        address: None,
    }
}

/// Insert a user directly, skipping password hashing.
pub async fn seed_user(db: &DBService, username: &str, user_type: UserType) -> Principal {
    let user = User::create(
        &db.pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "unused".to_string(),
            full_name: username.to_string(),
            mobile: "9000000000".to_string(),
            address: String::new(),
            user_type,
        },
    )
    .await
    .expect("seed user");
    Principal::from(&user)
}
