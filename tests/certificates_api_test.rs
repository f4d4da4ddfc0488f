mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

struct Scene {
    app: TestApp,
    ngo: String,
    admin: String,
    event_id: Uuid,
}

async fn scene() -> Scene {
    let app = TestApp::new().await;
    let (_, ngo) = app.approved_ngo("beacon", "BC-1").await;
    let admin = app.admin_token().await;
    let event_id = app.event(&ngo, "Coastal survey", 5).await;
    Scene {
        app,
        ngo,
        admin,
        event_id,
    }
}

impl Scene {
    fn assign_path(&self) -> String {
        format!("/certificates/event/{}/assign/", self.event_id)
    }

    async fn approved_volunteer(&self, name: &str) -> (Uuid, String) {
        let (user_id, token) = self.app.volunteer(name).await;
        let registration = self.app.apply(&token, self.event_id).await;
        let res = self
            .app
            .post(
                &format!("/events/registration/{}/approve/", registration),
                Some(&self.ngo),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
        (user_id, token)
    }
}

#[tokio::test]
async fn rejected_certificate_cannot_be_assigned() {
    let s = scene().await;
    let (volunteer, _) = s.approved_volunteer("ana").await;

    let pending = s
        .app
        .post_json(&s.assign_path(), Some(&s.ngo), json!({ "volunteers": [volunteer] }))
        .await;
    assert_eq!(pending.status, StatusCode::CONFLICT);
    assert_eq!(
        pending.error(),
        "Certificate is pending. Only approved certificates can be assigned."
    );

    let rejected = s
        .app
        .post(
            &format!("/admin-panel/event/{}/certificate/reject/", s.event_id),
            Some(&s.admin),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::OK);
    assert_eq!(
        rejected.messages(),
        vec!["Certificate for \"Coastal survey\" has been rejected and removed. NGO must upload a new one."]
    );

    let missing = s
        .app
        .post_json(&s.assign_path(), Some(&s.ngo), json!({ "volunteers": [volunteer] }))
        .await;
    assert_eq!(missing.status, StatusCode::CONFLICT);
    assert_eq!(missing.error(), "This event does not have a certificate uploaded.");
    assert_eq!(missing.redirect_to(), "/events/ngo-events/");

    let again = s
        .app
        .post(
            &format!("/admin-panel/event/{}/certificate/approve/", s.event_id),
            Some(&s.admin),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.error(), "This event does not have a certificate.");
}

#[tokio::test]
async fn assignment_reports_new_and_repeat_volunteers() {
    let s = scene().await;
    let (ana, ana_token) = s.approved_volunteer("ana").await;
    let (ben, _) = s.approved_volunteer("ben").await;
    let (pending, pending_token) = s.app.volunteer("cid").await;
    s.app.apply(&pending_token, s.event_id).await;

    let queue = s.app.get("/admin-panel/certificates/", Some(&s.admin)).await;
    let certificate_id = queue.body["certificates"][0]["id"].as_str().unwrap().to_string();
    let approved = s
        .app
        .post(
            &format!("/admin-panel/certificate/{}/approve/", certificate_id),
            Some(&s.admin),
        )
        .await;
    assert_eq!(
        approved.messages(),
        vec!["Certificate for \"Coastal survey\" has been approved!"]
    );

    let first = s
        .app
        .post_json(
            &s.assign_path(),
            Some(&s.ngo),
            json!({ "volunteers": [ana, pending] }),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.messages(), vec!["Certificate assigned to 1 volunteer(s)."]);

    let second = s
        .app
        .post_json(&s.assign_path(), Some(&s.ngo), json!({ "volunteers": [ana, ben] }))
        .await;
    assert_eq!(
        second.messages(),
        vec![
            "Certificate assigned to 1 volunteer(s).",
            "1 volunteer(s) already had this certificate.",
        ]
    );

    let empty = s
        .app
        .post_json(&s.assign_path(), Some(&s.ngo), json!({ "volunteers": [] }))
        .await;
    assert_eq!(empty.messages(), vec!["Please select at least one volunteer."]);

    let overview = s.app.get(&s.assign_path(), Some(&s.ngo)).await;
    assert_eq!(overview.body["registrations"].as_array().unwrap().len(), 2);
    assert_eq!(
        overview.body["assigned_volunteer_ids"].as_array().unwrap().len(),
        2
    );

    let mine = s
        .app
        .get("/certificates/my-certificates/", Some(&ana_token))
        .await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(mine.body[0]["event"]["title"], "Coastal survey");
    assert_eq!(mine.body[0]["organization_name"], "beacon Foundation");

    let detail = s
        .app
        .get(
            &format!("/admin-panel/certificate/{}/detail/", certificate_id),
            Some(&s.admin),
        )
        .await;
    assert_eq!(detail.body["assignments_count"], 2);

    let ngo_view = s.app.get("/certificates/my-certificates/", Some(&s.ngo)).await;
    assert_eq!(ngo_view.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn other_organizations_cannot_assign() {
    let s = scene().await;
    let (_, rival) = s.app.approved_ngo("rival", "RV-9").await;
    let res = s
        .app
        .post_json(&s.assign_path(), Some(&rival), json!({ "volunteers": [] }))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(
        res.error(),
        "You can only assign certificates for your own events."
    );
}
