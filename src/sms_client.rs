//! SMS gateway client.
//!
//! Sends the doctor a short case summary through the gateway's JSON API.
//! Gateways in this class are loose about response bodies, so interpretation
//! is deliberately optimistic: any 2xx counts as sent unless the body says
//! otherwise. Failures come back as a structured outcome, never an error.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Fixed prefix prepended to every notification.
pub const MESSAGE_PREFIX: &str = "Medical Assistance Request:\n";

/// Cap on the summary portion so the body fits SMS constraints.
pub const MAX_SUMMARY_CHARS: usize = 160;

/// Result of one notification attempt.
#[derive(Debug, Clone, Serialize)]
pub struct SmsOutcome {
    pub success: bool,
    pub message: String,
}

/// Gateway backend, swappable for tests.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    async fn notify(&self, destination: &str, summary: &str) -> SmsOutcome;
}

/// Build the SMS body: fixed prefix plus the truncated summary.
pub fn build_message_body(summary: &str) -> String {
    let truncated: String = summary.chars().take(MAX_SUMMARY_CHARS).collect();
    format!("{MESSAGE_PREFIX}{truncated}")
}

/// Map a gateway response to an outcome.
///
/// 2xx with a `status: success` or an `id` is a confirmed send; 2xx with any
/// other JSON is assumed queued; 2xx without parseable JSON is assumed sent.
/// Anything else is a failure carrying the gateway's own error text.
pub fn interpret_gateway_response(status: u16, body: &str) -> SmsOutcome {
    if (200..300).contains(&status) {
        return match serde_json::from_str::<Value>(body) {
            Ok(parsed) => {
                let confirmed = parsed.get("status").and_then(Value::as_str) == Some("success")
                    || parsed.get("id").is_some();
                if confirmed {
                    SmsOutcome {
                        success: true,
                        message: "SMS sent successfully".to_string(),
                    }
                } else {
                    SmsOutcome {
                        success: true,
                        message: "SMS queued for delivery".to_string(),
                    }
                }
            }
            Err(_) => SmsOutcome {
                success: true,
                message: "SMS sent (gateway response was not JSON)".to_string(),
            },
        };
    }

    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "Unknown error".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        });

    SmsOutcome {
        success: false,
        message: format!("Failed to send SMS: {detail}"),
    }
}

/// HTTP client for the SMS gateway.
#[derive(Debug)]
pub struct SmsClient {
    client: reqwest::Client,
    gateway_url: String,
    api_token: String,
    sender: String,
}

impl SmsClient {
    pub fn new(gateway_url: &str, api_token: &str, sender: &str) -> Result<Self, String> {
        let parsed = reqwest::Url::parse(gateway_url)
            .map_err(|e| format!("Invalid SMS gateway URL '{gateway_url}': {e}"))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!(
                "SMS gateway URL must use http or https scheme, got: {}",
                parsed.scheme()
            ));
        }

        info!("SmsClient created for {gateway_url}");

        Ok(Self {
            client: reqwest::Client::new(),
            gateway_url: gateway_url.to_string(),
            api_token: api_token.to_string(),
            sender: sender.to_string(),
        })
    }
}

#[async_trait]
impl SmsProvider for SmsClient {
    async fn notify(&self, destination: &str, summary: &str) -> SmsOutcome {
        let payload = json!({
            "to": destination,
            "text": build_message_body(summary),
            "sender": self.sender,
        });

        let sent = self
            .client
            .post(&self.gateway_url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await;

        match sent {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                let outcome = interpret_gateway_response(status, &body);
                if outcome.success {
                    info!("SMS to {destination}: {}", outcome.message);
                } else {
                    warn!("SMS to {destination} failed: {}", outcome.message);
                }
                outcome
            }
            Err(e) => {
                error!("SMS gateway unreachable: {e}");
                SmsOutcome {
                    success: false,
                    message: format!("Failed to send SMS: {e}"),
                }
            }
        }
    }
}
