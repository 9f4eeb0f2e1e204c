use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, put},
};
use deployment::Deployment;
use services::services::notification::{NotificationList, NotificationQuery, NotificationService};
use utils::response::MessageResponse;

use crate::{
    DeploymentImpl,
    error::{ApiError, Operation},
    extract::{AppPath, AppQuery, AuthUser},
};

/// GET /api/notifications
pub async fn list_notifications(
    State(deployment): State<DeploymentImpl>,
    AuthUser(principal): AuthUser,
    AppQuery(query): AppQuery<NotificationQuery>,
) -> Result<ResponseJson<NotificationList>, ApiError> {
    let list = NotificationService::list(&deployment.db().pool, &principal, query)
        .await
        .during("Failed to fetch notifications")?;
    Ok(ResponseJson(list))
}

/// PUT /api/notifications/{notification_id}/read
pub async fn mark_read(
    State(deployment): State<DeploymentImpl>,
    AuthUser(principal): AuthUser,
    AppPath(notification_id): AppPath<i64>,
) -> Result<ResponseJson<MessageResponse>, ApiError> {
    NotificationService::mark_read(&deployment.db().pool, &principal, notification_id)
        .await
        .during("Failed to update notification")?;
    Ok(ResponseJson(MessageResponse::new("Notification marked as read")))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/notifications",
        Router::new()
            .route("/", get(list_notifications))
            .route("/{notification_id}/read", put(mark_read)),
    )
}
