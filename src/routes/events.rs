use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::{
        event_dto::{
            EventDetailResponse, EventForm, EventListQuery, EventListResponse,
            ManageRegistrationsResponse, MyEventEntry, NgoEventsResponse,
        },
        flash::{FlashMessage, FlashResponse},
    },
    error::Result,
    middleware::auth::{CurrentUser, MaybeUser},
    services::registration_service::{ReviewOutcome, WithdrawOutcome},
    utils::form::FormData,
    AppState,
};

const NGO_EVENTS: &str = "/events/ngo-events/";

#[utoipa::path(
    get,
    path = "/events/",
    params(
        ("search" = Option<String>, Query, description = "Matches title, description or location"),
        ("status" = Option<String>, Query, description = "published | ongoing | completed")
    ),
    responses((status = 200, description = "Upcoming events", body = EventListResponse))
)]
#[axum::debug_handler]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<EventListResponse>> {
    let events = state.event_service.list_public(query, Utc::now()).await?;
    Ok(Json(events))
}

#[utoipa::path(
    get,
    path = "/events/{id}/",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event with seats and approved volunteers", body = EventDetailResponse),
        (status = 404, description = "Event not found")
    )
)]
#[axum::debug_handler]
pub async fn event_detail(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDetailResponse>> {
    let detail = state
        .event_service
        .detail(id, viewer.as_ref(), Utc::now())
        .await?;
    Ok(Json(detail))
}

#[utoipa::path(
    post,
    path = "/events/create/",
    responses(
        (status = 201, description = "Event created with a pending certificate", body = FlashResponse),
        (status = 400, description = "Invalid form or missing certificate"),
        (status = 403, description = "Caller is not an approved NGO")
    )
)]
#[axum::debug_handler]
pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<FlashResponse> {
    let mut form = FormData::from_multipart(multipart).await?;
    let image = form.take_file("image");
    let certificate = form.take_file("certificate_file");
    let fields = EventForm::from_form(&form)?;

    let event = state
        .event_service
        .create(&user, fields, image, certificate)
        .await?;
    FlashResponse::redirect(NGO_EVENTS)
        .with_status(StatusCode::CREATED)
        .success("Event created successfully! Certificate is pending admin approval.")
        .data(&event)
}

#[utoipa::path(
    post,
    path = "/events/{id}/edit/",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event updated", body = FlashResponse),
        (status = 403, description = "Not the owning NGO"),
        (status = 404, description = "Event not found")
    )
)]
#[axum::debug_handler]
pub async fn edit_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<FlashResponse> {
    let mut form = FormData::from_multipart(multipart).await?;
    let image = form.take_file("image");
    let certificate = form.take_file("certificate_file");
    let fields = EventForm::from_form(&form)?;

    let replaced = state
        .event_service
        .update(&user, id, fields, image, certificate)
        .await?;
    let mut flash = FlashResponse::redirect(NGO_EVENTS);
    if replaced {
        flash = flash.message(FlashMessage::info(
            "New certificate uploaded. Waiting for admin approval.",
        ));
    }
    Ok(flash.success("Event updated successfully!"))
}

#[utoipa::path(
    post,
    path = "/events/{id}/delete/",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted", body = FlashResponse),
        (status = 403, description = "Not the owning NGO")
    )
)]
#[axum::debug_handler]
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    state.event_service.delete(&user, id).await?;
    Ok(FlashResponse::redirect(NGO_EVENTS).success("Event deleted successfully!"))
}

#[utoipa::path(
    post,
    path = "/events/{id}/register/",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 201, description = "Application submitted", body = FlashResponse),
        (status = 403, description = "Only volunteers can apply"),
        (status = 409, description = "Past, full or already applied")
    )
)]
#[axum::debug_handler]
pub async fn register_for_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let registration = state
        .registration_service
        .register(&user, id, Utc::now())
        .await?;
    FlashResponse::redirect(format!("/events/{}/", id))
        .with_status(StatusCode::CREATED)
        .success("Application submitted! Waiting for NGO approval.")
        .data(&registration)
}

#[utoipa::path(
    post,
    path = "/events/registration/{id}/withdraw/",
    params(("id" = Uuid, Path, description = "Registration ID")),
    responses(
        (status = 200, description = "Withdrawn, or already withdrawn", body = FlashResponse),
        (status = 404, description = "Registration not found"),
        (status = 409, description = "Rejected applications cannot be withdrawn")
    )
)]
#[axum::debug_handler]
pub async fn withdraw_registration(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let flash = FlashResponse::redirect("/events/my-events/");
    Ok(match state.registration_service.withdraw(&user, id).await? {
        WithdrawOutcome::Withdrawn => flash.success("You have withdrawn from the event."),
        WithdrawOutcome::AlreadyWithdrawn => flash.message(FlashMessage::warning(
            "You have already withdrawn from this event.",
        )),
    })
}

#[utoipa::path(
    get,
    path = "/events/my-events/",
    responses(
        (status = 200, description = "Caller's active applications", body = [MyEventEntry]),
        (status = 403, description = "Not a volunteer")
    )
)]
#[axum::debug_handler]
pub async fn my_events(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<MyEventEntry>>> {
    Ok(Json(state.registration_service.my_events(&user).await?))
}

#[utoipa::path(
    get,
    path = "/events/ngo-events/",
    responses(
        (status = 200, description = "Events of the caller's organization", body = NgoEventsResponse),
        (status = 403, description = "Not an NGO")
    )
)]
#[axum::debug_handler]
pub async fn ngo_events(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<NgoEventsResponse>> {
    Ok(Json(state.event_service.ngo_events(&user, Utc::now()).await?))
}

#[utoipa::path(
    get,
    path = "/events/{id}/manage/",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Applications for the event", body = ManageRegistrationsResponse),
        (status = 403, description = "Not the owning NGO")
    )
)]
#[axum::debug_handler]
pub async fn manage_registrations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ManageRegistrationsResponse>> {
    let view = state
        .registration_service
        .manage(&user, id, Utc::now())
        .await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/events/registration/{id}/approve/",
    params(("id" = Uuid, Path, description = "Registration ID")),
    responses(
        (status = 200, description = "Registration approved", body = FlashResponse),
        (status = 403, description = "Not the owning NGO"),
        (status = 409, description = "Event full or registration not pending")
    )
)]
#[axum::debug_handler]
pub async fn approve_registration(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let (registration, username, outcome) =
        state.registration_service.approve(&user, id).await?;
    let flash = FlashResponse::redirect(format!("/events/{}/manage/", registration.event_id));
    let flash = match outcome {
        ReviewOutcome::Changed => flash.success(format!("{} has been approved!", username)),
        ReviewOutcome::Unchanged => flash.message(FlashMessage::info(format!(
            "{} is already approved.",
            username
        ))),
    };
    flash.data(&registration)
}

#[utoipa::path(
    post,
    path = "/events/registration/{id}/reject/",
    params(("id" = Uuid, Path, description = "Registration ID")),
    responses(
        (status = 200, description = "Registration rejected", body = FlashResponse),
        (status = 403, description = "Not the owning NGO"),
        (status = 409, description = "Registration not pending")
    )
)]
#[axum::debug_handler]
pub async fn reject_registration(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<FlashResponse> {
    let (registration, username) = state.registration_service.reject(&user, id).await?;
    FlashResponse::redirect(format!("/events/{}/manage/", registration.event_id))
        .success(format!("{} has been rejected.", username))
        .data(&registration)
}
