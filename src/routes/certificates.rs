use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::{
    dto::{
        certificate_dto::{AssignCertificatesPayload, AssignmentOverview, MyCertificateEntry},
        flash::{FlashMessage, FlashResponse},
    },
    error::Result,
    middleware::auth::CurrentUser,
    AppState,
};

#[utoipa::path(
    get,
    path = "/certificates/my-certificates/",
    responses(
        (status = 200, description = "Certificates assigned to the caller", body = [MyCertificateEntry]),
        (status = 403, description = "Not a volunteer")
    )
)]
#[axum::debug_handler]
pub async fn my_certificates(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<MyCertificateEntry>>> {
    Ok(Json(state.certificate_service.my_certificates(&user).await?))
}

#[utoipa::path(
    get,
    path = "/certificates/event/{event_id}/assign/",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Approved volunteers and who already holds the certificate", body = AssignmentOverview),
        (status = 403, description = "Not the owning NGO"),
        (status = 409, description = "No approved certificate")
    )
)]
#[axum::debug_handler]
pub async fn assignment_overview(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<Uuid>,
) -> Result<Json<AssignmentOverview>> {
    let overview = state
        .certificate_service
        .assignment_overview(&user, event_id)
        .await?;
    Ok(Json(overview))
}

#[utoipa::path(
    post,
    path = "/certificates/event/{event_id}/assign/",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    request_body = AssignCertificatesPayload,
    responses(
        (status = 200, description = "Assignment report", body = FlashResponse),
        (status = 403, description = "Not the owning NGO"),
        (status = 409, description = "No approved certificate")
    )
)]
#[axum::debug_handler]
pub async fn assign_certificates(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<AssignCertificatesPayload>,
) -> Result<FlashResponse> {
    let report = state
        .certificate_service
        .assign(&user, event_id, &payload.volunteers)
        .await?;

    let mut flash = FlashResponse::redirect(format!("/certificates/event/{}/assign/", event_id));
    if payload.volunteers.is_empty() {
        flash = flash.message(FlashMessage::warning("Please select at least one volunteer."));
    }
    if report.assigned > 0 {
        flash = flash.success(format!(
            "Certificate assigned to {} volunteer(s).",
            report.assigned
        ));
    }
    if report.already_assigned > 0 {
        flash = flash.message(FlashMessage::info(format!(
            "{} volunteer(s) already had this certificate.",
            report.already_assigned
        )));
    }
    flash.data(&report)
}
