use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;

use crate::{
    dto::{
        account_dto::{
            LoginPayload, NgoProfileForm, PublicVolunteerProfile,
            RegisterNgoPayload, RegisterVolunteerPayload, SessionResponse, VolunteerProfileForm,
        },
        flash::{FlashMessage, FlashResponse},
    },
    error::Result,
    middleware::auth::{clear_session_cookie, session_cookie, CurrentUser},
    models::user::User,
    utils::{form::FormData, token::issue_session_token},
    AppState,
};

const PROFILE: &str = "/accounts/profile/";

/// Signs a session for `user` and returns it in the body and as a cookie.
fn start_session(state: &AppState, user: User, flash: FlashResponse) -> Result<Response> {
    let ttl = state.config.session_ttl_hours;
    let token = issue_session_token(&user, &state.config.jwt_secret, ttl)?;
    let cookie = session_cookie(&token, ttl)?;
    let body = flash.data(&SessionResponse { token, user })?;
    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

#[utoipa::path(
    post,
    path = "/accounts/register/volunteer/",
    request_body = RegisterVolunteerPayload,
    responses(
        (status = 201, description = "Volunteer registered and logged in", body = SessionResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Username or email taken")
    )
)]
#[axum::debug_handler]
pub async fn register_volunteer(
    State(state): State<AppState>,
    Json(payload): Json<RegisterVolunteerPayload>,
) -> Result<Response> {
    let user = state.account_service.register_volunteer(payload).await?;
    let flash = FlashResponse::redirect("/")
        .with_status(StatusCode::CREATED)
        .success("Registration successful! Welcome to Voluntree.");
    start_session(&state, user, flash)
}

#[utoipa::path(
    post,
    path = "/accounts/register/ngo/",
    request_body = RegisterNgoPayload,
    responses(
        (status = 201, description = "NGO registered, pending approval", body = SessionResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Username, email or registration number taken")
    )
)]
#[axum::debug_handler]
pub async fn register_ngo(
    State(state): State<AppState>,
    Json(payload): Json<RegisterNgoPayload>,
) -> Result<Response> {
    let user = state.account_service.register_ngo(payload).await?;
    let flash = FlashResponse::redirect("/")
        .with_status(StatusCode::CREATED)
        .success("Registration successful! Your NGO account is pending approval.");
    start_session(&state, user, flash)
}

#[utoipa::path(
    post,
    path = "/accounts/login/",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse),
        (status = 401, description = "Invalid username or password")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Response> {
    let user = state.account_service.authenticate(&payload).await?;
    tracing::info!(user_id = %user.id, "user logged in");
    let flash = FlashResponse::redirect("/").success(format!("Welcome back, {}!", user.username));
    start_session(&state, user, flash)
}

#[utoipa::path(
    post,
    path = "/accounts/logout/",
    responses((status = 200, description = "Session cookie cleared"))
)]
#[axum::debug_handler]
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        FlashResponse::redirect("/").success("You have been logged out successfully."),
    )
}

#[utoipa::path(
    get,
    path = "/accounts/profile/",
    responses(
        (status = 200, description = "Profile of the logged-in user", body = crate::dto::account_dto::ProfileView),
        (status = 401, description = "Not logged in")
    )
)]
#[axum::debug_handler]
pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response> {
    match state.account_service.profile(&user).await? {
        Some(view) => Ok(Json(view).into_response()),
        None => Ok(FlashResponse::redirect("/").into_response()),
    }
}

#[utoipa::path(
    post,
    path = "/accounts/profile/edit/volunteer/",
    responses(
        (status = 200, description = "Profile updated", body = FlashResponse),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Not a volunteer")
    )
)]
#[axum::debug_handler]
pub async fn edit_volunteer_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<FlashResponse> {
    let mut form = FormData::from_multipart(multipart).await?;
    let picture = form.take_file("profile_picture");
    let fields = VolunteerProfileForm::from_form(&form)?;
    state
        .account_service
        .update_volunteer_profile(&user, fields, picture)
        .await?;
    Ok(FlashResponse::redirect(PROFILE).success("Profile updated successfully!"))
}

#[utoipa::path(
    post,
    path = "/accounts/profile/edit/ngo/",
    responses(
        (status = 200, description = "Organization profile updated", body = FlashResponse),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Not an NGO")
    )
)]
#[axum::debug_handler]
pub async fn edit_ngo_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<FlashResponse> {
    let mut form = FormData::from_multipart(multipart).await?;
    let logo = form.take_file("logo");
    let document = form.take_file("verification_document");
    let fields = NgoProfileForm::from_form(&form);

    let reverify = state
        .account_service
        .update_ngo_profile(&user, fields, logo, document)
        .await?;

    let mut flash = FlashResponse::redirect(PROFILE);
    if reverify {
        flash = flash.message(FlashMessage::info(
            "Your profile will need re-verification due to document changes.",
        ));
    }
    Ok(flash.success("Organization profile updated successfully!"))
}

#[utoipa::path(
    get,
    path = "/accounts/volunteer/{user_id}/",
    params(("user_id" = Uuid, Path, description = "Volunteer user ID")),
    responses(
        (status = 200, description = "Volunteer profile", body = PublicVolunteerProfile),
        (status = 403, description = "Other volunteers cannot view it"),
        (status = 404, description = "Volunteer not found")
    )
)]
#[axum::debug_handler]
pub async fn view_volunteer_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PublicVolunteerProfile>> {
    let view = state
        .account_service
        .public_volunteer_profile(&user, user_id)
        .await?;
    Ok(Json(view))
}
