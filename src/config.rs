//! Service configuration.
//!
//! Everything comes from environment variables with working defaults for the
//! non-secret values. The two credentials (completion API key, SMS gateway
//! token) have no defaults: without them the corresponding upstream calls
//! simply fail and degrade, and startup warns about what is missing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Base URL of the OpenAI-compatible completion endpoint.
    pub llm_base_url: String,
    /// Bearer key for the completion endpoint. Secret; no default.
    pub llm_api_key: String,
    /// Model name requested from the completion endpoint.
    pub llm_model: String,
    /// Translation page endpoint.
    pub translate_base_url: String,
    /// Speech-to-text upload endpoint.
    pub stt_url: String,
    /// SMS gateway endpoint.
    pub sms_gateway_url: String,
    /// Bearer token for the SMS gateway. Secret; no default.
    pub sms_api_token: String,
    /// Sender identity registered with the SMS gateway.
    pub sms_sender: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            llm_base_url: "https://api.groq.com/openai".to_string(),
            llm_api_key: String::new(),
            llm_model: "llama-3.3-70b-versatile".to_string(),
            translate_base_url: "https://translate.google.com/m".to_string(),
            stt_url: "https://api.pindo.io/ai/stt/rw/public".to_string(),
            sms_gateway_url: "https://api.pindo.io/v1/sms/".to_string(),
            sms_api_token: String::new(),
            sms_sender: "PindoTest".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_or("UBUZIMA_BIND_ADDR", defaults.bind_addr),
            llm_base_url: env_or("UBUZIMA_LLM_BASE_URL", defaults.llm_base_url),
            llm_api_key: env_or("UBUZIMA_LLM_API_KEY", defaults.llm_api_key),
            llm_model: env_or("UBUZIMA_LLM_MODEL", defaults.llm_model),
            translate_base_url: env_or("UBUZIMA_TRANSLATE_URL", defaults.translate_base_url),
            stt_url: env_or("UBUZIMA_STT_URL", defaults.stt_url),
            sms_gateway_url: env_or("UBUZIMA_SMS_URL", defaults.sms_gateway_url),
            sms_api_token: env_or("UBUZIMA_SMS_TOKEN", defaults.sms_api_token),
            sms_sender: env_or("UBUZIMA_SMS_SENDER", defaults.sms_sender),
        }
    }

    /// Names of unset secrets, for startup warnings.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.llm_api_key.is_empty() {
            missing.push("UBUZIMA_LLM_API_KEY");
        }
        if self.sms_api_token.is_empty() {
            missing.push("UBUZIMA_SMS_TOKEN");
        }
        missing
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(default)
}
