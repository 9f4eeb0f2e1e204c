use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::complaint::Complaint;
use deployment::Deployment;
use serde::Serialize;
use services::services::complaint::{
    ComplaintListQuery, ComplaintService, CreateComplaintRequest, UpdateComplaintStatusRequest,
};
use ts_rs::TS;
use utils::response::MessageResponse;

use crate::{
    DeploymentImpl,
    error::{ApiError, Operation},
    extract::{AppJson, AppPath, AppQuery, AuthUser, StaffUser},
};

#[derive(Debug, Serialize, TS)]
pub struct ComplaintCreated {
    pub message: String,
    pub complaint_number: String,
    pub complaint_id: i64,
}

#[derive(Debug, Serialize, TS)]
pub struct ComplaintList {
    pub complaints: Vec<Complaint>,
}

#[derive(Debug, Serialize, TS)]
pub struct TrackedComplaint {
    pub complaint: Complaint,
}

/// POST /api/complaint/create
pub async fn create_complaint(
    State(deployment): State<DeploymentImpl>,
    AuthUser(principal): AuthUser,
    AppJson(payload): AppJson<CreateComplaintRequest>,
) -> Result<(StatusCode, ResponseJson<ComplaintCreated>), ApiError> {
    let complaint = ComplaintService::file(&deployment.db().pool, &principal, payload)
        .await
        .during("Failed to submit complaint")?;

    Ok((
        StatusCode::CREATED,
        ResponseJson(ComplaintCreated {
            message: "Complaint submitted successfully".to_string(),
            complaint_number: complaint.complaint_number,
            complaint_id: complaint.complaint_id,
        }),
    ))
}

/// GET /api/complaint/all
pub async fn list_complaints(
    State(deployment): State<DeploymentImpl>,
    StaffUser(_staff): StaffUser,
    AppQuery(query): AppQuery<ComplaintListQuery>,
) -> Result<ResponseJson<ComplaintList>, ApiError> {
    let complaints = ComplaintService::list_all(&deployment.db().pool, query)
        .await
        .during("Failed to fetch complaints")?;
    Ok(ResponseJson(ComplaintList { complaints }))
}

/// GET /api/complaint/my-complaints
pub async fn my_complaints(
    State(deployment): State<DeploymentImpl>,
    AuthUser(principal): AuthUser,
) -> Result<ResponseJson<ComplaintList>, ApiError> {
    let complaints = ComplaintService::list_for(&deployment.db().pool, &principal)
        .await
        .during("Failed to fetch complaints")?;
    Ok(ResponseJson(ComplaintList { complaints }))
}

/// GET /api/complaint/track/{complaint_number}
pub async fn track_complaint(
    State(deployment): State<DeploymentImpl>,
    AuthUser(principal): AuthUser,
    AppPath(complaint_number): AppPath<String>,
) -> Result<ResponseJson<TrackedComplaint>, ApiError> {
    let complaint = ComplaintService::track(&deployment.db().pool, &principal, &complaint_number)
        .await
        .during("Failed to track complaint")?;
    Ok(ResponseJson(TrackedComplaint { complaint }))
}

/// PUT /api/complaint/update-status/{complaint_id}
pub async fn update_complaint_status(
    State(deployment): State<DeploymentImpl>,
    StaffUser(staff): StaffUser,
    AppPath(complaint_id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateComplaintStatusRequest>,
) -> Result<ResponseJson<MessageResponse>, ApiError> {
    ComplaintService::update_status(&deployment.db().pool, &staff, complaint_id, payload)
        .await
        .during("Failed to update complaint status")?;
    Ok(ResponseJson(MessageResponse::new(
        "Complaint status updated successfully",
    )))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/complaint",
        Router::new()
            .route("/create", post(create_complaint))
            .route("/all", get(list_complaints))
            .route("/my-complaints", get(my_complaints))
            .route("/track/{complaint_number}", get(track_complaint))
            .route(
                "/update-status/{complaint_id}",
                put(update_complaint_status),
            ),
    )
}
