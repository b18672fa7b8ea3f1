//! HTTP route handlers.
//!
//! Each handler validates its input, delegates to the orchestrator, a
//! gateway client or the session store, and wraps the result in a JSON
//! envelope. Validation failures are 400s; upstream trouble never surfaces
//! as an HTTP error because the pipeline degrades to well-formed replies.

use axum::extract::{Multipart, Query, State};
use axum::response::Html;
use axum::{Extension, Form, Json};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

use crate::assistant::Mode;
use crate::breathing::{self, BreathingExercise};
use crate::doctors;
use crate::metrics::{self, HealthReading};
use crate::session::{Appointment, SessionContext};
use crate::sms_client::SmsOutcome;

use super::cookies::SessionId;
use super::server::AppState;
use super::types::{
    ApiError, AppointmentReply, AppointmentRequest, AppointmentsPayload, AudioReply,
    BreathingQuery, HistoryPayload, ProcessTextForm, SmsRequest, TextReply, TrackAck,
    TrackRequest,
};

/// Turns of history returned alongside a text reply.
const HISTORY_TAIL: usize = 5;

/// Landing page with the doctor directory.
pub async fn index() -> Html<String> {
    let mut rows = String::new();
    for (specialty, phone) in doctors::DIRECTORY {
        rows.push_str(&format!(
            "<tr><td>{specialty}</td><td>{phone}</td></tr>\n"
        ));
    }

    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\">\
<title>Ubuzima Health Assistant</title></head>\n<body>\n\
<h1>Ubuzima Health Assistant</h1>\n\
<p>Describe your symptoms in English or Kinyarwanda, by text or voice.</p>\n\
<h2>Doctor directory</h2>\n\
<table>\n<tr><th>Specialty</th><th>Contact</th></tr>\n{rows}</table>\n\
</body>\n</html>\n"
    ))
}

pub async fn process_text(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<ProcessTextForm>,
) -> Result<Json<TextReply>, ApiError> {
    let text = form.text_input.trim();
    if text.is_empty() {
        return Err(ApiError::bad_request("No text provided"));
    }

    let mode = Mode::from_request(&form.mode);
    let ctx = SessionContext {
        store: &state.sessions,
        session_id: &session.0,
    };
    let response = state.assistant.handle_text(text, mode, Some(&ctx)).await;
    let history = state.sessions.recent_history(&session.0, HISTORY_TAIL);

    Ok(Json(TextReply {
        success: true,
        response,
        history,
    }))
}

pub async fn process_audio(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    mut multipart: Multipart,
) -> Result<Json<AudioReply>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("audio") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ApiError::bad_request("No audio file selected"));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read audio upload: {e}")))?;

        info!("received audio upload {filename} ({} bytes)", bytes.len());

        let ctx = SessionContext {
            store: &state.sessions,
            session_id: &session.0,
        };
        let response = state
            .assistant
            .handle_audio(bytes.to_vec(), &filename, Some(&ctx))
            .await;

        return Ok(Json(AudioReply {
            success: true,
            response,
        }));
    }

    Err(ApiError::bad_request("No audio file provided"))
}

pub async fn send_sms(
    State(state): State<AppState>,
    Json(request): Json<SmsRequest>,
) -> Result<Json<SmsOutcome>, ApiError> {
    let destination = request
        .doctor_number
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing required information"))?;
    let summary = request
        .case_summary
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing required information"))?;

    let outcome = state.sms.notify(destination, summary).await;
    Ok(Json(outcome))
}

pub async fn get_history(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Json<HistoryPayload> {
    Json(HistoryPayload {
        history: state.sessions.history(&session.0),
    })
}

pub async fn breathing_exercise(Query(query): Query<BreathingQuery>) -> Json<BreathingExercise> {
    let kind = query.kind.as_deref().unwrap_or("box");
    Json(breathing::exercise_for(kind))
}

pub async fn add_appointment(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(request): Json<AppointmentRequest>,
) -> Result<Json<AppointmentReply>, ApiError> {
    let date = request
        .date
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing required information"))?;
    let specialty = request
        .specialty
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing required information"))?;

    let appointment = Appointment::new(date.to_string(), specialty.to_string());
    state
        .sessions
        .add_appointment(&session.0, appointment.clone());

    info!("appointment {} booked for {specialty}", appointment.id);

    Ok(Json(AppointmentReply {
        success: true,
        appointment,
    }))
}

pub async fn get_appointments(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Json<AppointmentsPayload> {
    Json(AppointmentsPayload {
        appointments: state.sessions.appointments(&session.0),
    })
}

/// Recorded readings for this visitor, or a synthesized week of data when
/// nothing has been recorded yet.
pub async fn get_health_metrics(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Json<BTreeMap<String, Vec<HealthReading>>> {
    let recorded = state.sessions.recorded_metrics(&session.0);
    if recorded.is_empty() {
        Json(metrics::mock_health_series())
    } else {
        Json(recorded)
    }
}

pub async fn record_health_metric(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(request): Json<TrackRequest>,
) -> Result<Json<TrackAck>, ApiError> {
    let metric = request
        .metric
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing metric or value"))?;
    let value = request
        .value
        .filter(|v| !matches!(v, Value::Null))
        .ok_or_else(|| ApiError::bad_request("Missing metric or value"))?;

    state.sessions.add_reading(&session.0, metric, value);
    Ok(Json(TrackAck { success: true }))
}
