#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;
use voluntree::{
    config::Config,
    database::{store::NgoRepository, MemoryStore},
    routes,
    services::storage_service::LocalFileStorage,
    AppState,
};

pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub media: PathBuf,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: JsonValue,
}

impl TestResponse {
    pub fn redirect_to(&self) -> &str {
        self.body["redirect_to"].as_str().unwrap_or_default()
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// Flash texts in order, regardless of level.
    pub fn messages(&self) -> Vec<String> {
        self.body["messages"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|m| m["message"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Hand-built multipart/form-data body.
pub struct Form {
    boundary: String,
    body: Vec<u8>,
}

impl Form {
    pub fn new() -> Self {
        Self {
            boundary: format!("voluntree-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                self.boundary, name, file_name
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

pub fn event_form(title: &str, max_volunteers: u32) -> Form {
    Form::new()
        .text("title", title)
        .text("description", "Bring water and gloves")
        .text("date", "2030-05-01T09:30")
        .text("location", "Riverside park")
        .text("required_skills", "Lifting, First aid")
        .text("max_volunteers", &max_volunteers.to_string())
        .text("status", "published")
}

impl TestApp {
    pub async fn new() -> Self {
        let media = std::env::temp_dir().join(format!("voluntree-test-{}", Uuid::new_v4()));
        let config = Config {
            server_address: "127.0.0.1:0".into(),
            database_url: "memory://".into(),
            jwt_secret: "test_secret_key".into(),
            session_ttl_hours: 1,
            uploads_dir: media.clone(),
            max_upload_bytes: 1024 * 1024,
            auth_rps: 1000,
            cors_origins: Vec::new(),
            log_format: "pretty".into(),
        };
        let store = Arc::new(MemoryStore::new());
        let storage = Arc::new(LocalFileStorage::new(media.clone(), config.max_upload_bytes));
        let state = AppState::new(store.clone(), storage, Arc::new(config))
            .await
            .expect("app state");
        Self {
            router: routes::router(state.clone()),
            state,
            store,
            media,
        }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    fn request(method: &str, path: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.send(Self::request("GET", path, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.send(Self::request("POST", path, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, path: &str, token: Option<&str>, body: JsonValue) -> TestResponse {
        self.send(
            Self::request("POST", path, token)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_form(&self, path: &str, token: Option<&str>, form: Form) -> TestResponse {
        let (content_type, body) = form.finish();
        self.send(
            Self::request("POST", path, token)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Registers a volunteer and returns `(user id, session token)`.
    pub async fn volunteer(&self, username: &str) -> (Uuid, String) {
        let res = self
            .post_json(
                "/accounts/register/volunteer/",
                None,
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password1": "correct-horse",
                    "password2": "correct-horse",
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        session(&res)
    }

    /// Registers an NGO (pending) and returns `(user id, session token)`.
    pub async fn ngo(&self, username: &str, registration_number: &str) -> (Uuid, String) {
        let res = self
            .post_json(
                "/accounts/register/ngo/",
                None,
                ngo_payload(username, registration_number),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        session(&res)
    }

    pub async fn admin_token(&self) -> String {
        self.state
            .account_service
            .ensure_admin("root", "root@example.com", ADMIN_PASSWORD)
            .await
            .expect("admin");
        let res = self
            .post_json(
                "/accounts/login/",
                None,
                json!({ "username": "root", "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "{}", res.body);
        session(&res).1
    }

    pub async fn ngo_id(&self, user_id: Uuid) -> Uuid {
        self.store
            .find_ngo_by_user(user_id)
            .await
            .expect("store")
            .expect("ngo record")
            .id
    }

    /// Registers an NGO and has the admin approve it.
    pub async fn approved_ngo(&self, username: &str, registration_number: &str) -> (Uuid, String) {
        let (user_id, token) = self.ngo(username, registration_number).await;
        let admin = self.admin_token().await;
        let ngo_id = self.ngo_id(user_id).await;
        let res = self
            .post(&format!("/admin-panel/ngo/{}/approve/", ngo_id), Some(&admin))
            .await;
        assert_eq!(res.status, StatusCode::OK, "{}", res.body);
        (user_id, token)
    }

    /// Creates an event with a certificate template and returns its id.
    pub async fn event(&self, ngo_token: &str, title: &str, max_volunteers: u32) -> Uuid {
        let res = self
            .post_form(
                "/events/create/",
                Some(ngo_token),
                event_form(title, max_volunteers).file("certificate_file", "template.pdf", b"%PDF-1.4"),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        Uuid::parse_str(res.body["data"]["id"].as_str().expect("event id")).expect("uuid")
    }

    /// Applies as `volunteer_token` and returns the registration id.
    pub async fn apply(&self, volunteer_token: &str, event_id: Uuid) -> Uuid {
        let res = self
            .post(&format!("/events/{}/register/", event_id), Some(volunteer_token))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        Uuid::parse_str(res.body["data"]["id"].as_str().expect("registration id")).expect("uuid")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media);
    }
}

pub fn ngo_payload(username: &str, registration_number: &str) -> JsonValue {
    json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "password1": "correct-horse",
        "password2": "correct-horse",
        "organization_name": format!("{} Foundation", username),
        "registration_number": registration_number,
        "description": "Community work",
        "phone": "5550100",
        "address": "1 Main street",
        "city": "Springfield",
        "country": "Freedonia",
        "focus_areas": "Environment, Education",
    })
}

fn session(res: &TestResponse) -> (Uuid, String) {
    let data = &res.body["data"];
    let user_id = Uuid::parse_str(data["user"]["id"].as_str().expect("user id")).expect("uuid");
    let token = data["token"].as_str().expect("token").to_string();
    (user_id, token)
}
