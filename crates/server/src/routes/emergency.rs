use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::emergency_alert::EmergencyAlert;
use deployment::Deployment;
use serde::Serialize;
use services::services::emergency::{CreateAlertRequest, EmergencyService, UpdateAlertStatusRequest};
use ts_rs::TS;
use utils::response::MessageResponse;

use crate::{
    DeploymentImpl,
    error::{ApiError, Operation},
    extract::{AppJson, AppPath, AuthUser, StaffUser},
};

#[derive(Debug, Serialize, TS)]
pub struct AlertCreated {
    pub message: String,
    pub alert_id: i64,
}

#[derive(Debug, Serialize, TS)]
pub struct AlertList {
    pub alerts: Vec<EmergencyAlert>,
}

/// POST /api/emergency/alert
pub async fn raise_alert(
    State(deployment): State<DeploymentImpl>,
    AuthUser(principal): AuthUser,
    AppJson(payload): AppJson<CreateAlertRequest>,
) -> Result<(StatusCode, ResponseJson<AlertCreated>), ApiError> {
    let alert = EmergencyService::raise(&deployment.db().pool, &principal, payload)
        .await
        .during("Failed to send emergency alert")?;

    Ok((
        StatusCode::CREATED,
        ResponseJson(AlertCreated {
            message: "Emergency alert sent successfully".to_string(),
            alert_id: alert.alert_id,
        }),
    ))
}

/// GET /api/emergency/active
pub async fn active_alerts(
    State(deployment): State<DeploymentImpl>,
    StaffUser(_staff): StaffUser,
) -> Result<ResponseJson<AlertList>, ApiError> {
    let alerts = EmergencyService::list_active(&deployment.db().pool)
        .await
        .during("Failed to fetch emergency alerts")?;
    Ok(ResponseJson(AlertList { alerts }))
}

/// PUT /api/emergency/update-status/{alert_id}
pub async fn update_alert_status(
    State(deployment): State<DeploymentImpl>,
    StaffUser(staff): StaffUser,
    AppPath(alert_id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateAlertStatusRequest>,
) -> Result<ResponseJson<MessageResponse>, ApiError> {
    EmergencyService::update_status(&deployment.db().pool, &staff, alert_id, payload)
        .await
        .during("Failed to update emergency alert")?;
    Ok(ResponseJson(MessageResponse::new(
        "Emergency alert updated successfully",
    )))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/emergency",
        Router::new()
            .route("/alert", post(raise_alert))
            .route("/active", get(active_alerts))
            .route("/update-status/{alert_id}", put(update_alert_status)),
    )
}
