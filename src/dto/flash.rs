use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// One user-facing notice, rendered by the client after navigating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Warning, message)
    }
}

/// Body returned by every state-changing endpoint: the notices to show and
/// where the client should go next, plus an optional payload.
#[derive(Debug, Clone, Serialize)]
pub struct FlashResponse {
    #[serde(skip)]
    status: StatusCode,
    pub messages: Vec<FlashMessage>,
    pub redirect_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl FlashResponse {
    pub fn redirect(redirect_to: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            messages: Vec::new(),
            redirect_to: redirect_to.into(),
            data: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn message(mut self, message: FlashMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn success(self, message: impl Into<String>) -> Self {
        self.message(FlashMessage::success(message))
    }

    pub fn data<T: Serialize>(mut self, data: &T) -> crate::error::Result<Self> {
        self.data = Some(serde_json::to_value(data)?);
        Ok(self)
    }
}

impl IntoResponse for FlashResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
