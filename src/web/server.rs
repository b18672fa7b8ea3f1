//! Router assembly and server bootstrap.

use axum::routing::{get, post};
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

use crate::assistant::Assistant;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::session::SessionStore;
use crate::sms_client::{SmsClient, SmsProvider};
use crate::stt_client::SttClient;
use crate::translate::TranslateClient;

use super::cookies;
use super::handlers;

/// Upload cap; voice notes are short.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub sms: Arc<dyn SmsProvider>,
    pub sessions: SessionStore,
}

impl AppState {
    /// Wire the real upstream clients from configuration.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let completion = LlmClient::new(&config.llm_base_url, &config.llm_api_key, &config.llm_model)?;
        let translation = TranslateClient::new(&config.translate_base_url)?;
        let stt = SttClient::new(&config.stt_url)?;
        let sms = SmsClient::new(&config.sms_gateway_url, &config.sms_api_token, &config.sms_sender)?;

        Ok(Self {
            assistant: Arc::new(Assistant::new(
                Arc::new(completion),
                Arc::new(translation),
                Arc::new(stt),
            )),
            sms: Arc::new(sms),
            sessions: SessionStore::new(),
        })
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/process_text", post(handlers::process_text))
        .route("/process_audio", post(handlers::process_audio))
        .route("/send_sms", post(handlers::send_sms))
        .route("/get_history", get(handlers::get_history))
        .route("/breathing_exercise", get(handlers::breathing_exercise))
        .route("/add_appointment", post(handlers::add_appointment))
        .route("/get_appointments", get(handlers::get_appointments))
        .route(
            "/health_tracking",
            get(handlers::get_health_metrics).post(handlers::record_health_metric),
        )
        .layer(middleware::from_fn(cookies::session_cookie))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(state: AppState, bind_addr: &str) {
    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {bind_addr}: {e}");
            return;
        }
    };

    info!("listening on {bind_addr}");

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {e}");
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
