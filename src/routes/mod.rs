pub mod accounts;
pub mod admin_panel;
pub mod certificates;
pub mod events;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    auth::require_admin,
    cors::cors_layer,
    rate_limit::{new_rps_state, rps_middleware},
};
use crate::AppState;

/// Multipart bodies carry one upload plus the form fields.
const BODY_LIMIT_HEADROOM: usize = 1024 * 1024;

/// Builds the full application router with its layers.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let public = Router::new()
        .route("/", get(health::landing))
        .route("/health", get(health::health));

    let session_api = Router::new()
        .route(
            "/accounts/register/volunteer/",
            post(accounts::register_volunteer),
        )
        .route("/accounts/register/ngo/", post(accounts::register_ngo))
        .route("/accounts/login/", post(accounts::login))
        .layer(axum::middleware::from_fn_with_state(
            new_rps_state(config.auth_rps),
            rps_middleware,
        ));

    let accounts = Router::new()
        .route("/accounts/logout/", post(accounts::logout))
        .route("/accounts/profile/", get(accounts::profile))
        .route(
            "/accounts/profile/edit/volunteer/",
            post(accounts::edit_volunteer_profile),
        )
        .route(
            "/accounts/profile/edit/ngo/",
            post(accounts::edit_ngo_profile),
        )
        .route(
            "/accounts/volunteer/:user_id/",
            get(accounts::view_volunteer_profile),
        );

    let events = Router::new()
        .route("/events/", get(events::list_events))
        .route("/events/create/", post(events::create_event))
        .route("/events/my-events/", get(events::my_events))
        .route("/events/ngo-events/", get(events::ngo_events))
        .route("/events/:id/", get(events::event_detail))
        .route("/events/:id/edit/", post(events::edit_event))
        .route("/events/:id/delete/", post(events::delete_event))
        .route("/events/:id/register/", post(events::register_for_event))
        .route("/events/:id/manage/", get(events::manage_registrations))
        .route(
            "/events/registration/:id/withdraw/",
            post(events::withdraw_registration),
        )
        .route(
            "/events/registration/:id/approve/",
            post(events::approve_registration),
        )
        .route(
            "/events/registration/:id/reject/",
            post(events::reject_registration),
        );

    let certificates = Router::new()
        .route(
            "/certificates/my-certificates/",
            get(certificates::my_certificates),
        )
        .route(
            "/certificates/event/:event_id/assign/",
            get(certificates::assignment_overview).post(certificates::assign_certificates),
        );

    let admin = Router::new()
        .route("/admin-panel/dashboard/", get(admin_panel::dashboard))
        .route("/admin-panel/ngo-approvals/", get(admin_panel::ngo_approvals))
        .route("/admin-panel/ngo/:id/approve/", post(admin_panel::approve_ngo))
        .route("/admin-panel/ngo/:id/reject/", post(admin_panel::reject_ngo))
        .route("/admin-panel/ngo/:id/detail/", get(admin_panel::ngo_detail))
        .route("/admin-panel/ngo/:id/delete/", post(admin_panel::delete_ngo))
        .route("/admin-panel/ngos/", get(admin_panel::ngos))
        .route("/admin-panel/users/", get(admin_panel::users))
        .route("/admin-panel/user/:id/detail/", get(admin_panel::user_detail))
        .route("/admin-panel/user/:id/delete/", post(admin_panel::delete_user))
        .route("/admin-panel/events/", get(admin_panel::events))
        .route("/admin-panel/event/:id/detail/", get(admin_panel::event_detail))
        .route("/admin-panel/event/:id/delete/", post(admin_panel::delete_event))
        .route(
            "/admin-panel/event/:id/certificate/approve/",
            post(admin_panel::approve_event_certificate),
        )
        .route(
            "/admin-panel/event/:id/certificate/reject/",
            post(admin_panel::reject_event_certificate),
        )
        .route("/admin-panel/certificates/", get(admin_panel::certificates))
        .route(
            "/admin-panel/certificate/:id/detail/",
            get(admin_panel::certificate_detail),
        )
        .route(
            "/admin-panel/certificate/:id/approve/",
            post(admin_panel::approve_certificate),
        )
        .route(
            "/admin-panel/certificate/:id/reject/",
            post(admin_panel::reject_certificate),
        )
        .route(
            "/admin-panel/settings/",
            get(admin_panel::settings).post(admin_panel::update_settings),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    public
        .merge(session_api)
        .merge(accounts)
        .merge(events)
        .merge(certificates)
        .merge(admin)
        .nest_service("/media", ServeDir::new(&config.uploads_dir))
        .with_state(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes + BODY_LIMIT_HEADROOM,
        ))
}
