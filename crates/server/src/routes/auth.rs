use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::user::User;
use deployment::Deployment;
use serde::Serialize;
use services::services::auth::{LoginRequest, LoginResponse, RegisterRequest};
use ts_rs::TS;

use crate::{
    DeploymentImpl,
    error::{ApiError, Operation},
    extract::{AppJson, AuthUser},
};

#[derive(Debug, Serialize, TS)]
pub struct Registered {
    pub message: String,
    pub user_id: i64,
}

/// POST /api/auth/register
pub async fn register(
    State(deployment): State<DeploymentImpl>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, ResponseJson<Registered>), ApiError> {
    let user = deployment
        .auth()
        .register(payload)
        .await
        .during("Registration failed")?;

    Ok((
        StatusCode::CREATED,
        ResponseJson(Registered {
            message: "Registration successful".to_string(),
            user_id: user.user_id,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(deployment): State<DeploymentImpl>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<ResponseJson<LoginResponse>, ApiError> {
    let response = deployment
        .auth()
        .login(payload)
        .await
        .during("Login failed")?;
    Ok(ResponseJson(response))
}

/// GET /api/auth/me
pub async fn me(
    State(deployment): State<DeploymentImpl>,
    AuthUser(principal): AuthUser,
) -> Result<ResponseJson<User>, ApiError> {
    let user = deployment
        .auth()
        .current_user(&principal)
        .await
        .during("Failed to fetch profile")?;
    Ok(ResponseJson(user))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/auth",
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/me", get(me)),
    )
}
