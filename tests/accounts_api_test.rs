mod common;

use axum::http::{header, StatusCode};
use common::{ngo_payload, Form, TestApp};
use serde_json::json;
use voluntree::{
    database::store::NgoRepository,
    models::ngo::NgoStatus,
};

#[tokio::test]
async fn duplicate_identities_are_refused_at_registration() {
    let app = TestApp::new().await;
    app.volunteer("maria").await;

    let same_username = app
        .post_json(
            "/accounts/register/volunteer/",
            None,
            json!({
                "username": "maria",
                "email": "other@example.com",
                "password1": "correct-horse",
                "password2": "correct-horse",
            }),
        )
        .await;
    assert_eq!(same_username.status, StatusCode::CONFLICT);
    assert_eq!(same_username.error(), "A user with that username already exists.");

    let same_email = app
        .post_json(
            "/accounts/register/volunteer/",
            None,
            json!({
                "username": "maria2",
                "email": "maria@example.com",
                "password1": "correct-horse",
                "password2": "correct-horse",
            }),
        )
        .await;
    assert_eq!(same_email.status, StatusCode::CONFLICT);

    app.ngo("greenleaf", "REG-100").await;
    let same_number = app
        .post_json("/accounts/register/ngo/", None, ngo_payload("bluewave", "REG-100"))
        .await;
    assert_eq!(same_number.status, StatusCode::CONFLICT);
    assert_eq!(
        same_number.error(),
        "NGO with this Registration number already exists."
    );
}

#[tokio::test]
async fn mismatched_passwords_fail_validation() {
    let app = TestApp::new().await;
    let res = app
        .post_json(
            "/accounts/register/volunteer/",
            None,
            json!({
                "username": "lee",
                "email": "lee@example.com",
                "password1": "correct-horse",
                "password2": "battery-staple",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["fields"]["password2"].is_array());
}

#[tokio::test]
async fn login_sets_cookie_and_profile_reads_it() {
    let app = TestApp::new().await;
    app.volunteer("sam").await;

    let bad = app
        .post_json(
            "/accounts/login/",
            None,
            json!({ "username": "sam", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad.error(), "Invalid username or password.");

    let ok = app
        .post_json(
            "/accounts/login/",
            None,
            json!({ "username": "sam", "password": "correct-horse" }),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.messages(), vec!["Welcome back, sam!"]);
    let cookie = ok.headers[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("voluntree_session="));
    assert!(cookie.contains("HttpOnly"));

    let token = ok.body["data"]["token"].as_str().unwrap();
    let profile = app.get("/accounts/profile/", Some(token)).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["kind"], "volunteer");
    assert_eq!(profile.body["user"]["username"], "sam");
    assert!(profile.body["user"].get("password_hash").is_none());

    let anonymous = app.get("/accounts/profile/", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.redirect_to(), "/accounts/login/");
}

#[tokio::test]
async fn volunteer_profile_edit_splits_skills() {
    let app = TestApp::new().await;
    let (user_id, token) = app.volunteer("kim").await;

    let res = app
        .post_form(
            "/accounts/profile/edit/volunteer/",
            Some(&token),
            Form::new()
                .text("first_name", "Kim")
                .text("email", "kim@example.com")
                .text("skills", "Cooking, , Driving ")
                .file("profile_picture", "me.png", b"\x89PNG"),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.messages(), vec!["Profile updated successfully!"]);

    let profile = app.get("/accounts/profile/", Some(&token)).await;
    assert_eq!(profile.body["skills_list"], json!(["Cooking", "Driving"]));
    let picture = profile.body["profile"]["profile_picture"].as_str().unwrap();
    assert!(picture.starts_with("profiles/volunteers/"));
    assert!(app.media.join(picture).exists());

    let view = app
        .get(&format!("/accounts/volunteer/{}/", user_id), Some(&token))
        .await;
    assert_eq!(view.status, StatusCode::OK);

    let (_, other) = app.volunteer("ola").await;
    let refused = app
        .get(&format!("/accounts/volunteer/{}/", user_id), Some(&other))
        .await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn new_verification_document_sends_approved_ngo_back_to_review() {
    let app = TestApp::new().await;
    let (user_id, token) = app.approved_ngo("harbor", "H-1").await;
    let ngo_id = app.ngo_id(user_id).await;
    assert_eq!(
        app.store.find_ngo(ngo_id).await.unwrap().unwrap().status,
        NgoStatus::Approved
    );

    let form = Form::new()
        .text("organization_name", "Harbor Trust")
        .text("email", "harbor@example.com")
        .file("verification_document", "license.pdf", b"%PDF-1.4");
    let res = app
        .post_form("/accounts/profile/edit/ngo/", Some(&token), form)
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(
        res.messages(),
        vec![
            "Your profile will need re-verification due to document changes.",
            "Organization profile updated successfully!",
        ]
    );

    let ngo = app.store.find_ngo(ngo_id).await.unwrap().unwrap();
    assert_eq!(ngo.status, NgoStatus::Pending);
    assert_eq!(ngo.organization_name, "Harbor Trust");
    assert_eq!(ngo.registration_number, "H-1");

    let wrong_type = app
        .post_form(
            "/accounts/profile/edit/ngo/",
            Some(&token),
            Form::new()
                .text("organization_name", "Harbor Trust")
                .text("email", "harbor@example.com")
                .file("verification_document", "license.exe", b"MZ"),
        )
        .await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = TestApp::new().await;
    let res = app.post("/accounts/logout/", None).await;
    assert_eq!(res.status, StatusCode::OK);
    let cookie = res.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));
}
