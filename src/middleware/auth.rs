use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::User;
use crate::utils::token::decode_session_token;
use crate::AppState;

pub const SESSION_COOKIE: &str = "voluntree_session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: String,
}

/// The logged-in user; rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The logged-in user when a valid session is presented.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

fn session_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(token.trim());
    }
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<User>> {
    if let Some(user) = parts.extensions.get::<User>() {
        return Ok(Some(user.clone()));
    }
    let Some(token) = session_token(&parts.headers) else {
        return Ok(None);
    };
    let claims = decode_session_token(token, &state.config.jwt_secret)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| Error::Unauthorized("Invalid session".to_string()))?;
    state.account_service.session_user(user_id).await.map(Some)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        resolve_user(parts, state)
            .await?
            .map(CurrentUser)
            .ok_or_else(|| Error::Unauthorized("Please log in to continue.".to_string()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match resolve_user(parts, state).await {
            Ok(user) => Ok(MaybeUser(user)),
            Err(Error::Token(_)) | Err(Error::Unauthorized(_)) => Ok(MaybeUser(None)),
            Err(other) => Err(other),
        }
    }
}

/// Guards the admin panel: anonymous callers get 401, other roles 403.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    let (mut parts, body) = req.into_parts();
    let CurrentUser(user) = CurrentUser::from_request_parts(&mut parts, &state).await?;
    if !user.is_admin() {
        tracing::warn!(user_id = %user.id, role = %user.role, "admin panel access refused");
        return Err(Error::forbidden("Access denied.", "/"));
    }
    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

pub fn session_cookie(token: &str, ttl_hours: i64) -> Result<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl_hours * 3600
    ))
    .map_err(|e| Error::Internal(format!("invalid session cookie: {}", e)))
}

pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("voluntree_session=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}
