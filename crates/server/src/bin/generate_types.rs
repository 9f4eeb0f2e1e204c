use std::{env, fs, path::PathBuf};

use anyhow::Context;
use ts_rs::TS;

fn generate_types_content() -> String {
    let decls = [
        db::models::user::UserType::decl(),
        db::models::user::User::decl(),
        db::models::user::UserSummary::decl(),
        db::models::fir::FirStatus::decl(),
        db::models::fir::Fir::decl(),
        db::models::fir::FirStatusHistory::decl(),
        db::models::complaint::ComplaintStatus::decl(),
        db::models::complaint::Complaint::decl(),
        db::models::emergency_alert::AlertStatus::decl(),
        db::models::emergency_alert::EmergencyAlert::decl(),
        db::models::notification::NotificationType::decl(),
        db::models::notification::ReferenceType::decl(),
        db::models::notification::Notification::decl(),
        db::models::stats::DashboardStats::decl(),
        services::services::auth::RegisterRequest::decl(),
        services::services::auth::LoginRequest::decl(),
        services::services::auth::LoginResponse::decl(),
        services::services::fir::CreateFirRequest::decl(),
        services::services::fir::FirListQuery::decl(),
        services::services::fir::UpdateFirStatusRequest::decl(),
        services::services::fir::FirWithHistory::decl(),
        services::services::complaint::CreateComplaintRequest::decl(),
        services::services::complaint::ComplaintListQuery::decl(),
        services::services::complaint::UpdateComplaintStatusRequest::decl(),
        services::services::emergency::CreateAlertRequest::decl(),
        services::services::emergency::UpdateAlertStatusRequest::decl(),
        services::services::notification::NotificationQuery::decl(),
        services::services::notification::NotificationList::decl(),
        server::routes::auth::Registered::decl(),
        server::routes::fir::FirCreated::decl(),
        server::routes::fir::FirList::decl(),
        server::routes::fir::MyFirs::decl(),
        server::routes::complaint::ComplaintCreated::decl(),
        server::routes::complaint::ComplaintList::decl(),
        server::routes::complaint::TrackedComplaint::decl(),
        server::routes::emergency::AlertCreated::decl(),
        server::routes::emergency::AlertList::decl(),
        server::routes::health::HealthStatus::decl(),
        utils::response::ErrorResponse::decl(),
        utils::response::MessageResponse::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|decl| format!("export {}", decl.trim_start_matches("export ")))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "// This file was generated by `generate_types`. Do not edit it by hand.\n\n{body}\n"
    )
}

fn main() -> anyhow::Result<()> {
    let check = env::args().any(|arg| arg == "--check");
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../shared/types.ts");
    let generated = generate_types_content();

    if check {
        let current = fs::read_to_string(&path).unwrap_or_default();
        if current == generated {
            println!("shared/types.ts is up to date.");
            return Ok(());
        }
        anyhow::bail!("shared/types.ts is stale; run `cargo run --bin generate_types`");
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, generated).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Generated {}", path.display());
    Ok(())
}
