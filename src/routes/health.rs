use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    dto::flash::FlashResponse, error::Result, middleware::auth::MaybeUser,
    models::user::UserRole, AppState,
};

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

/// Where a visitor lands: admins on the dashboard, other members on the
/// event list. Anonymous visitors get the site's home blurb.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Landing redirect or home page data", body = FlashResponse))
)]
#[axum::debug_handler]
pub async fn landing(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<FlashResponse> {
    match user.map(|u| u.role) {
        Some(UserRole::Admin) => Ok(FlashResponse::redirect("/admin-panel/dashboard/")),
        Some(_) => Ok(FlashResponse::redirect("/events/")),
        None => {
            let settings = state.settings_service.current().await;
            FlashResponse::redirect("/").data(&json!({
                "site_name": settings.site_name,
                "site_tagline": settings.site_tagline,
                "site_description": settings.site_description,
            }))
        }
    }
}
