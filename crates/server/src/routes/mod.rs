use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::DeploymentImpl;

pub mod auth;
pub mod complaint;
pub mod emergency;
pub mod fir;
pub mod health;
pub mod notifications;
pub mod stats;

pub fn router(deployment: DeploymentImpl) -> Router {
    let api = Router::new()
        .merge(health::router(&deployment))
        .merge(auth::router(&deployment))
        .merge(fir::router(&deployment))
        .merge(complaint::router(&deployment))
        .merge(emergency::router(&deployment))
        .merge(notifications::router(&deployment))
        .merge(stats::router(&deployment));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}
