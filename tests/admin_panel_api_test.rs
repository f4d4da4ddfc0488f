mod common;

use axum::http::StatusCode;
use common::{Form, TestApp};

#[tokio::test]
async fn admin_routes_require_an_administrator() {
    let app = TestApp::new().await;

    let anonymous = app.get("/admin-panel/dashboard/", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.redirect_to(), "/accounts/login/");

    let (_, volunteer) = app.volunteer("vic").await;
    let refused = app.get("/admin-panel/dashboard/", Some(&volunteer)).await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
    assert_eq!(refused.error(), "Access denied.");
    assert_eq!(refused.redirect_to(), "/");

    let (_, ngo) = app.ngo("habitat", "HB-1").await;
    let refused = app.post("/admin-panel/settings/", Some(&ngo)).await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dashboard_counts_accounts_and_upcoming_events() {
    let app = TestApp::new().await;
    app.volunteer("ana").await;
    app.volunteer("ben").await;
    app.ngo("pending-org", "PO-1").await;
    let (_, ngo) = app.approved_ngo("active-org", "AO-1").await;
    app.event(&ngo, "Harvest", 8).await;

    let admin = app.admin_token().await;
    let stats = app.get("/admin-panel/dashboard/", Some(&admin)).await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.body["total_volunteers"], 2);
    assert_eq!(stats.body["total_ngos"], 2);
    assert_eq!(stats.body["approved_ngos"], 1);
    assert_eq!(stats.body["pending_ngos"], 1);
    assert_eq!(stats.body["total_events"], 1);
    assert_eq!(stats.body["upcoming_events"], 1);
    assert_eq!(stats.body["upcoming_events_list"][0]["title"], "Harvest");

    let queue = app.get("/admin-panel/ngo-approvals/", Some(&admin)).await;
    assert_eq!(queue.body["status_filter"], "pending");
    assert_eq!(queue.body["ngos"].as_array().unwrap().len(), 1);
    assert_eq!(queue.body["total_count"], 2);
}

#[tokio::test]
async fn rejecting_an_ngo_is_a_warning() {
    let app = TestApp::new().await;
    let (user_id, _) = app.ngo("dubious", "DB-1").await;
    let ngo_id = app.ngo_id(user_id).await;
    let admin = app.admin_token().await;

    let res = app
        .post(&format!("/admin-panel/ngo/{}/reject/", ngo_id), Some(&admin))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["messages"][0]["level"], "warning");
    assert_eq!(res.messages(), vec!["dubious Foundation has been rejected."]);
    assert_eq!(res.body["data"]["status"], "rejected");
}

#[tokio::test]
async fn deleting_an_ngo_removes_its_account_and_events() {
    let app = TestApp::new().await;
    let (user_id, ngo) = app.approved_ngo("closing", "CL-1").await;
    let event_id = app.event(&ngo, "Farewell", 4).await;
    let (_, volunteer) = app.volunteer("ana").await;
    app.apply(&volunteer, event_id).await;
    let ngo_id = app.ngo_id(user_id).await;
    let admin = app.admin_token().await;

    let res = app
        .post(&format!("/admin-panel/ngo/{}/delete/", ngo_id), Some(&admin))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.messages(), vec!["closing Foundation has been deleted."]);
    assert_eq!(res.redirect_to(), "/admin-panel/ngos/");

    let gone = app.get(&format!("/events/{}/", event_id), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    let mine = app.get("/events/my-events/", Some(&volunteer)).await;
    assert!(mine.body.as_array().unwrap().is_empty());
    let detail = app
        .get(&format!("/admin-panel/ngo/{}/detail/", ngo_id), Some(&admin))
        .await;
    assert_eq!(detail.status, StatusCode::NOT_FOUND);
    let listing = app.get("/admin-panel/ngos/", Some(&admin)).await;
    assert_eq!(listing.body["total_ngos"], 0);
}

#[tokio::test]
async fn deleting_a_volunteer_via_the_panel() {
    let app = TestApp::new().await;
    let (user_id, _) = app.volunteer("leaver").await;
    let admin = app.admin_token().await;

    let detail = app
        .get(&format!("/admin-panel/user/{}/detail/", user_id), Some(&admin))
        .await;
    assert_eq!(detail.body["volunteer"]["username"], "leaver");

    let res = app
        .post(&format!("/admin-panel/user/{}/delete/", user_id), Some(&admin))
        .await;
    assert_eq!(res.messages(), vec!["User leaver has been deleted."]);

    let users = app.get("/admin-panel/users/", Some(&admin)).await;
    assert_eq!(users.body["total_volunteers"], 0);
}

#[tokio::test]
async fn settings_stay_a_single_row_and_unchecked_boxes_read_false() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let initial = app.get("/admin-panel/settings/", Some(&admin)).await;
    assert_eq!(initial.body["site_name"], "Voluntree");
    assert_eq!(initial.body["send_welcome_email"], true);

    let first = app
        .post_form(
            "/admin-panel/settings/",
            Some(&admin),
            Form::new()
                .text("site_name", "Helping Hands")
                .text("site_tagline", "Give an hour")
                .text("max_event_duration", "6")
                .text("allow_volunteer_registration", "on"),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK, "{}", first.body);
    assert_eq!(first.messages(), vec!["Platform settings updated successfully!"]);

    let second = app
        .post_form(
            "/admin-panel/settings/",
            Some(&admin),
            Form::new().text("site_name", "Helping Hands"),
        )
        .await;
    assert_eq!(second.status, StatusCode::OK, "{}", second.body);
    assert_eq!(app.store.settings_row_count().await, 1);

    let current = app.get("/admin-panel/settings/", Some(&admin)).await;
    assert_eq!(current.body["site_name"], "Helping Hands");
    assert_eq!(current.body["site_tagline"], "");
    assert_eq!(current.body["send_welcome_email"], false);
    assert_eq!(current.body["allow_volunteer_registration"], false);

    let landing = app.get("/", None).await;
    assert_eq!(landing.body["data"]["site_name"], "Helping Hands");

    let bad = app
        .post_form(
            "/admin-panel/settings/",
            Some(&admin),
            Form::new().text("max_event_duration", "a week"),
        )
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}
