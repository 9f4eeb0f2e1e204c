use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::fir::Fir;
use deployment::Deployment;
use serde::Serialize;
use services::services::fir::{
    CreateFirRequest, FirListQuery, FirService, FirWithHistory, UpdateFirStatusRequest,
};
use ts_rs::TS;
use utils::response::MessageResponse;

use crate::{
    DeploymentImpl,
    error::{ApiError, Operation},
    extract::{AppJson, AppPath, AppQuery, AuthUser, StaffUser},
};

#[derive(Debug, Serialize, TS)]
pub struct FirCreated {
    pub message: String,
    pub fir_number: String,
    pub fir_id: i64,
}

#[derive(Debug, Serialize, TS)]
pub struct FirList {
    pub firs: Vec<Fir>,
    pub count: usize,
}

#[derive(Debug, Serialize, TS)]
pub struct MyFirs {
    pub firs: Vec<Fir>,
}

/// POST /api/fir/create
pub async fn create_fir(
    State(deployment): State<DeploymentImpl>,
    AuthUser(principal): AuthUser,
    AppJson(payload): AppJson<CreateFirRequest>,
) -> Result<(StatusCode, ResponseJson<FirCreated>), ApiError> {
    let fir = FirService::file(&deployment.db().pool, &principal, payload)
        .await
        .during("Failed to file FIR")?;

    Ok((
        StatusCode::CREATED,
        ResponseJson(FirCreated {
            message: "FIR filed successfully".to_string(),
            fir_number: fir.fir_number,
            fir_id: fir.fir_id,
        }),
    ))
}

/// GET /api/fir/all
pub async fn list_firs(
    State(deployment): State<DeploymentImpl>,
    StaffUser(_staff): StaffUser,
    AppQuery(query): AppQuery<FirListQuery>,
) -> Result<ResponseJson<FirList>, ApiError> {
    let firs = FirService::list_all(&deployment.db().pool, query)
        .await
        .during("Failed to fetch FIRs")?;
    let count = firs.len();
    Ok(ResponseJson(FirList { firs, count }))
}

/// GET /api/fir/my-firs
pub async fn my_firs(
    State(deployment): State<DeploymentImpl>,
    AuthUser(principal): AuthUser,
) -> Result<ResponseJson<MyFirs>, ApiError> {
    let firs = FirService::list_for(&deployment.db().pool, &principal)
        .await
        .during("Failed to fetch FIRs")?;
    Ok(ResponseJson(MyFirs { firs }))
}

/// GET /api/fir/track/{fir_number}
pub async fn track_fir(
    State(deployment): State<DeploymentImpl>,
    AuthUser(principal): AuthUser,
    AppPath(fir_number): AppPath<String>,
) -> Result<ResponseJson<FirWithHistory>, ApiError> {
    let tracked = FirService::track(&deployment.db().pool, &principal, &fir_number)
        .await
        .during("Failed to track FIR")?;
    Ok(ResponseJson(tracked))
}

/// PUT /api/fir/update-status/{fir_id}
pub async fn update_fir_status(
    State(deployment): State<DeploymentImpl>,
    StaffUser(staff): StaffUser,
    AppPath(fir_id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateFirStatusRequest>,
) -> Result<ResponseJson<MessageResponse>, ApiError> {
    FirService::update_status(&deployment.db().pool, &staff, fir_id, payload)
        .await
        .during("Failed to update FIR status")?;
    Ok(ResponseJson(MessageResponse::new(
        "FIR status updated successfully",
    )))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/fir",
        Router::new()
            .route("/create", post(create_fir))
            .route("/all", get(list_firs))
            .route("/my-firs", get(my_firs))
            .route("/track/{fir_number}", get(track_fir))
            .route("/update-status/{fir_id}", put(update_fir_status)),
    )
}
