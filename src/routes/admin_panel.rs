//! Back office. Every handler here sits behind `require_admin`.

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::{
        admin_dto::{
            settings_from_form, AdminEventDetailResponse, AdminEventListResponse,
            AdminEventsQuery, DashboardStats, NgoApprovalsResponse, NgoDetailResponse,
            NgoListResponse, SearchQuery, StatusQuery, UserDetailResponse, UserListResponse,
        },
        certificate_dto::{
            CertificateApprovalsQuery, CertificateApprovalsResponse, CertificateDetailResponse,
        },
        flash::{FlashMessage, FlashResponse},
    },
    error::Result,
    models::platform_settings::PlatformSettings,
    utils::form::FormData,
    AppState,
};

const NGO_APPROVALS: &str = "/admin-panel/ngo-approvals/";
const CERTIFICATES: &str = "/admin-panel/certificates/";

fn event_detail_path(id: Uuid) -> String {
    format!("/admin-panel/event/{}/detail/", id)
}

#[utoipa::path(
    get,
    path = "/admin-panel/dashboard/",
    responses((status = 200, description = "Platform statistics", body = DashboardStats))
)]
#[axum::debug_handler]
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    Ok(Json(state.dashboard_service.stats(Utc::now()).await?))
}

#[utoipa::path(
    get,
    path = "/admin-panel/ngo-approvals/",
    params(("status" = Option<String>, Query, description = "pending (default) | approved | rejected | all")),
    responses((status = 200, description = "NGO verification queue", body = NgoApprovalsResponse))
)]
#[axum::debug_handler]
pub async fn ngo_approvals(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<NgoApprovalsResponse>> {
    Ok(Json(state.ngo_service.approvals(query.status).await?))
}

#[utoipa::path(
    post,
    path = "/admin-panel/ngo/{id}/approve/",
    params(("id" = Uuid, Path, description = "NGO ID")),
    responses(
        (status = 200, description = "NGO approved", body = FlashResponse),
        (status = 404, description = "NGO not found")
    )
)]
#[axum::debug_handler]
pub async fn approve_ngo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let ngo = state.ngo_service.approve(id).await?;
    FlashResponse::redirect(NGO_APPROVALS)
        .success(format!(
            "{} has been approved successfully!",
            ngo.organization_name
        ))
        .data(&ngo)
}

#[utoipa::path(
    post,
    path = "/admin-panel/ngo/{id}/reject/",
    params(("id" = Uuid, Path, description = "NGO ID")),
    responses(
        (status = 200, description = "NGO rejected", body = FlashResponse),
        (status = 404, description = "NGO not found")
    )
)]
#[axum::debug_handler]
pub async fn reject_ngo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let ngo = state.ngo_service.reject(id).await?;
    FlashResponse::redirect(NGO_APPROVALS)
        .message(FlashMessage::warning(format!(
            "{} has been rejected.",
            ngo.organization_name
        )))
        .data(&ngo)
}

#[utoipa::path(
    get,
    path = "/admin-panel/ngo/{id}/detail/",
    params(("id" = Uuid, Path, description = "NGO ID")),
    responses(
        (status = 200, description = "NGO with its events", body = NgoDetailResponse),
        (status = 404, description = "NGO not found")
    )
)]
#[axum::debug_handler]
pub async fn ngo_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NgoDetailResponse>> {
    Ok(Json(state.ngo_service.detail(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin-panel/ngo/{id}/delete/",
    params(("id" = Uuid, Path, description = "NGO ID")),
    responses(
        (status = 200, description = "NGO and its account deleted", body = FlashResponse),
        (status = 404, description = "NGO not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_ngo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let name = state.ngo_service.delete(id).await?;
    Ok(FlashResponse::redirect("/admin-panel/ngos/").success(format!("{} has been deleted.", name)))
}

#[utoipa::path(
    get,
    path = "/admin-panel/ngos/",
    params(("search" = Option<String>, Query, description = "Organization name, email or registration number")),
    responses((status = 200, description = "All NGOs", body = NgoListResponse))
)]
#[axum::debug_handler]
pub async fn ngos(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<NgoListResponse>> {
    Ok(Json(state.ngo_service.list(query.search).await?))
}

#[utoipa::path(
    get,
    path = "/admin-panel/users/",
    params(("search" = Option<String>, Query, description = "Username, email, first or last name")),
    responses((status = 200, description = "Volunteer accounts", body = UserListResponse))
)]
#[axum::debug_handler]
pub async fn users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<UserListResponse>> {
    Ok(Json(state.account_service.list_volunteers(query.search).await?))
}

#[utoipa::path(
    get,
    path = "/admin-panel/user/{id}/detail/",
    params(("id" = Uuid, Path, description = "Volunteer user ID")),
    responses(
        (status = 200, description = "Volunteer with profile and registrations", body = UserDetailResponse),
        (status = 404, description = "Volunteer not found")
    )
)]
#[axum::debug_handler]
pub async fn user_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDetailResponse>> {
    Ok(Json(state.account_service.volunteer_detail(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin-panel/user/{id}/delete/",
    params(("id" = Uuid, Path, description = "Volunteer user ID")),
    responses(
        (status = 200, description = "Volunteer deleted", body = FlashResponse),
        (status = 404, description = "Volunteer not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let username = state.account_service.delete_volunteer(id).await?;
    Ok(FlashResponse::redirect("/admin-panel/users/")
        .success(format!("User {} has been deleted.", username)))
}

#[utoipa::path(
    get,
    path = "/admin-panel/events/",
    params(
        ("search" = Option<String>, Query, description = "Title or organization name"),
        ("status" = Option<String>, Query, description = "published | ongoing | completed")
    ),
    responses((status = 200, description = "All events", body = AdminEventListResponse))
)]
#[axum::debug_handler]
pub async fn events(
    State(state): State<AppState>,
    Query(query): Query<AdminEventsQuery>,
) -> Result<Json<AdminEventListResponse>> {
    Ok(Json(state.event_service.admin_list(query, Utc::now()).await?))
}

#[utoipa::path(
    get,
    path = "/admin-panel/event/{id}/detail/",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event with registrations and certificate", body = AdminEventDetailResponse),
        (status = 404, description = "Event not found")
    )
)]
#[axum::debug_handler]
pub async fn event_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminEventDetailResponse>> {
    Ok(Json(state.event_service.admin_detail(id, Utc::now()).await?))
}

#[utoipa::path(
    post,
    path = "/admin-panel/event/{id}/delete/",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted", body = FlashResponse),
        (status = 404, description = "Event not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let title = state.event_service.admin_delete(id).await?;
    Ok(FlashResponse::redirect("/admin-panel/events/")
        .success(format!("Event \"{}\" has been deleted.", title)))
}

#[utoipa::path(
    post,
    path = "/admin-panel/event/{id}/certificate/approve/",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Certificate approved", body = FlashResponse),
        (status = 409, description = "Event has no certificate")
    )
)]
#[axum::debug_handler]
pub async fn approve_event_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let title = state.certificate_service.approve_for_event(id).await?;
    Ok(FlashResponse::redirect(event_detail_path(id))
        .success(format!("Certificate for \"{}\" has been approved.", title)))
}

#[utoipa::path(
    post,
    path = "/admin-panel/event/{id}/certificate/reject/",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Certificate rejected and deleted", body = FlashResponse),
        (status = 409, description = "Event has no certificate")
    )
)]
#[axum::debug_handler]
pub async fn reject_event_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let title = state.certificate_service.reject_for_event(id).await?;
    Ok(
        FlashResponse::redirect(event_detail_path(id)).message(FlashMessage::warning(format!(
            "Certificate for \"{}\" has been rejected and removed. NGO must upload a new one.",
            title
        ))),
    )
}

#[utoipa::path(
    get,
    path = "/admin-panel/certificates/",
    params(
        ("status" = Option<String>, Query, description = "pending (default) | approved | rejected | all"),
        ("search" = Option<String>, Query, description = "Event title or organization name"),
        ("sort" = Option<String>, Query, description = "newest (default) | oldest")
    ),
    responses((status = 200, description = "Certificate moderation queue", body = CertificateApprovalsResponse))
)]
#[axum::debug_handler]
pub async fn certificates(
    State(state): State<AppState>,
    Query(query): Query<CertificateApprovalsQuery>,
) -> Result<Json<CertificateApprovalsResponse>> {
    Ok(Json(state.certificate_service.approvals(query).await?))
}

#[utoipa::path(
    get,
    path = "/admin-panel/certificate/{id}/detail/",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Certificate with event, NGO and assignments", body = CertificateDetailResponse),
        (status = 404, description = "Certificate not found")
    )
)]
#[axum::debug_handler]
pub async fn certificate_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CertificateDetailResponse>> {
    Ok(Json(state.certificate_service.detail(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin-panel/certificate/{id}/approve/",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Certificate approved", body = FlashResponse),
        (status = 404, description = "Certificate not found")
    )
)]
#[axum::debug_handler]
pub async fn approve_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let title = state.certificate_service.approve(id).await?;
    Ok(FlashResponse::redirect(CERTIFICATES)
        .success(format!("Certificate for \"{}\" has been approved!", title)))
}

#[utoipa::path(
    post,
    path = "/admin-panel/certificate/{id}/reject/",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Certificate rejected and deleted", body = FlashResponse),
        (status = 404, description = "Certificate not found")
    )
)]
#[axum::debug_handler]
pub async fn reject_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let title = state.certificate_service.reject(id).await?;
    Ok(
        FlashResponse::redirect(CERTIFICATES).message(FlashMessage::warning(format!(
            "Certificate for \"{}\" has been rejected and deleted. NGO must upload a new one.",
            title
        ))),
    )
}

#[utoipa::path(
    get,
    path = "/admin-panel/settings/",
    responses((status = 200, description = "Current platform settings", body = PlatformSettings))
)]
#[axum::debug_handler]
pub async fn settings(State(state): State<AppState>) -> Json<PlatformSettings> {
    Json(state.settings_service.current().await)
}

#[utoipa::path(
    post,
    path = "/admin-panel/settings/",
    responses(
        (status = 200, description = "Settings replaced", body = FlashResponse),
        (status = 400, description = "Invalid number in the form")
    )
)]
#[axum::debug_handler]
pub async fn update_settings(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<FlashResponse> {
    let form = FormData::from_multipart(multipart).await?;
    let current = state.settings_service.current().await;
    let updated = settings_from_form(&form, &current)?;
    let saved = state.settings_service.save(updated).await?;
    FlashResponse::redirect("/admin-panel/settings/")
        .success("Platform settings updated successfully!")
        .data(&saved)
}
