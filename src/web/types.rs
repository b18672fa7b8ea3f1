//! Request and response envelopes for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::session::{Appointment, ChatTurn};

/// JSON error envelope with an explicit status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

// -- Request bodies --

#[derive(Debug, Deserialize)]
pub struct ProcessTextForm {
    #[serde(default)]
    pub text_input: String,
    #[serde(default)]
    pub mode: String,
}

#[derive(Debug, Deserialize)]
pub struct SmsRequest {
    pub doctor_number: Option<String>,
    pub case_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentRequest {
    pub date: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub metric: Option<String>,
    pub value: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct BreathingQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

// -- Response bodies --

#[derive(Debug, Serialize)]
pub struct TextReply {
    pub success: bool,
    pub response: String,
    /// The most recent turns, oldest first.
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct AudioReply {
    pub success: bool,
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryPayload {
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentReply {
    pub success: bool,
    pub appointment: Appointment,
}

#[derive(Debug, Serialize)]
pub struct AppointmentsPayload {
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Serialize)]
pub struct TrackAck {
    pub success: bool,
}
