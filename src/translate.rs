//! Machine-translation client.
//!
//! Talks to the mobile web endpoint of the translation service and pulls the
//! translated text out of the `result-container` fragment of the returned
//! page. That fragment is the entire contract, which makes this the most
//! brittle integration in the service — it lives behind
//! [`TranslationProvider`](crate::assistant::TranslationProvider) so it can
//! be swapped for a real API without touching the pipeline.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::assistant::TranslationProvider;
use crate::error::UpstreamError;

const SERVICE: &str = "translation";

/// Client for the page-scraping translation endpoint.
#[derive(Debug)]
pub struct TranslateClient {
    client: reqwest::Client,
    base_url: String,
}

impl TranslateClient {
    /// Create a client with URL validation.
    pub fn new(base_url: &str) -> Result<Self, String> {
        let cleaned_url = base_url.trim_end_matches('/');

        let parsed = reqwest::Url::parse(cleaned_url)
            .map_err(|e| format!("Invalid translation URL '{cleaned_url}': {e}"))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!(
                "Translation URL must use http or https scheme, got: {}",
                parsed.scheme()
            ));
        }

        info!("TranslateClient created for {cleaned_url}");

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: cleaned_url.to_string(),
        })
    }
}

/// Pull the translated text out of the response page.
fn extract_translation(html: &str) -> Option<String> {
    let marker = "class=\"result-container\"";
    let at = html.find(marker)?;
    let rest = &html[at + marker.len()..];
    let start = rest.find('>')? + 1;
    let end = rest[start..].find("</div>")? + start;

    let fragment = rest[start..end].trim();
    if fragment.is_empty() {
        None
    } else {
        Some(decode_entities(fragment))
    }
}

/// Decode the handful of entities the result fragment can carry.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[async_trait]
impl TranslationProvider for TranslateClient {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, UpstreamError> {
        debug!("translating {} chars to {target_lang}", text.len());

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("hl", target_lang),
                ("sl", "auto"),
                ("tl", target_lang),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::transport(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::bad_status(SERVICE, status, body));
        }

        let html = response
            .text()
            .await
            .map_err(|e| UpstreamError::transport(SERVICE, e))?;

        extract_translation(&html)
            .ok_or_else(|| UpstreamError::malformed(SERVICE, "result fragment not found"))
    }
}
