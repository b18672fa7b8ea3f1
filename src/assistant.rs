//! Conversation orchestration.
//!
//! Ties the language heuristic, translation, completion and speech-to-text
//! pieces into one pipeline: detect language, translate inbound text to
//! English when needed, pick a prompt for the requested mode, ask the model,
//! translate the reply back, and record the turn. Every step degrades on its
//! own — a dead translation endpoint means an untranslated reply, a dead
//! completion endpoint means an apology, never a failed request.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::UpstreamError;
use crate::language;
use crate::session::{ChatTurn, SessionContext};

/// Language codes used by the translation endpoint.
pub mod lang {
    pub const ENGLISH: &str = "en";
    pub const KINYARWANDA: &str = "rw";
}

/// Reply used when the completion service fails and the input was English.
pub const FALLBACK_REPLY_EN: &str =
    "I'm sorry, I couldn't process your request right now. Please try again in a moment.";

/// Reply used when the completion service fails and the input was Kinyarwanda.
pub const FALLBACK_REPLY_RW: &str =
    "Mwihangane, ntibishobotse gutunganya ubutumwa bwanyu ubu. Mwongere mugerageze nyuma y'akanya.";

/// Reply used when an audio upload cannot be transcribed.
pub const AUDIO_FALLBACK_REPLY: &str =
    "Ntibishobotse gutunganya amajwi yanyu. We could not process your audio, please try again.";

const MENTAL_HEALTH_PROMPT: &str = "You are a compassionate mental health assistant with expertise in mindfulness, \
stress reduction, and basic cognitive behavioral therapy. The user is speaking in Kinyarwanda or English, \
and they're experiencing mental health challenges.

Offer soothing, practical advice with these guidelines:
1. ALWAYS respond with empathy and validation
2. Suggest 1-2 simple mindfulness or breathing exercises
3. If they mention severe symptoms (self-harm, suicide), treat it as an emergency and advise them to contact mental health services
4. Keep responses concise (3-5 sentences) and easy to understand
5. When appropriate, recommend talking to a professional therapist

Here is what they said: {input_text}";

const HEALTH_ASSESSMENT_PROMPT: &str = "You are a healthcare assistant helping rural patients in Rwanda. The patient has described their symptoms in Kinyarwanda or English.

Please analyze their symptoms and provide:
1. A brief assessment of possible conditions (mention you are not a doctor)
2. Urgency level (Low, Medium, High, Emergency)
3. Whether they should see a doctor and which specialty would be most appropriate
4. Simple self-care measures they can take immediately
5. Key questions a doctor would want to know

Keep your response clear, simple, and reassuring. Here is the patient's description: {input_text}";

/// Conversation mode selected by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Health,
    MentalHealth,
}

impl Mode {
    /// Parse the form value; anything unrecognized is the general health mode.
    pub fn from_request(value: &str) -> Self {
        if value == "mental_health" {
            Mode::MentalHealth
        } else {
            Mode::Health
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            Mode::MentalHealth => MENTAL_HEALTH_PROMPT,
            Mode::Health => HEALTH_ASSESSMENT_PROMPT,
        }
    }
}

/// Chat-completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// One completion call. With a template, it is rendered with the input
    /// and sent as the system instruction alongside the raw user turn.
    async fn complete(&self, text: &str, template: Option<&str>) -> Result<String, UpstreamError>;
}

/// Machine-translation backend.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, UpstreamError>;
}

/// Speech-to-text backend.
#[async_trait]
pub trait SpeechToTextProvider: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, UpstreamError>;
}

/// The conversation pipeline over pluggable backends.
pub struct Assistant {
    completion: Arc<dyn CompletionProvider>,
    translation: Arc<dyn TranslationProvider>,
    stt: Arc<dyn SpeechToTextProvider>,
}

impl Assistant {
    pub fn new(
        completion: Arc<dyn CompletionProvider>,
        translation: Arc<dyn TranslationProvider>,
        stt: Arc<dyn SpeechToTextProvider>,
    ) -> Self {
        Self {
            completion,
            translation,
            stt,
        }
    }

    /// Produce a reply for `user_text` and, when a session context is given,
    /// append the turn to its chat history. Without a session context the
    /// append is skipped so the pipeline also works non-interactively.
    pub async fn handle_text(
        &self,
        user_text: &str,
        mode: Mode,
        session: Option<&SessionContext<'_>>,
    ) -> String {
        let is_english = language::is_english(user_text);
        debug!(is_english, ?mode, "handling text input");

        let english_text = if is_english {
            user_text.to_string()
        } else {
            match self.translation.translate(user_text, lang::ENGLISH).await {
                Ok(translated) => translated,
                Err(e) => {
                    warn!("inbound translation failed, using original text: {e}");
                    user_text.to_string()
                }
            }
        };

        // On completion failure the apology is already in the caller's
        // language, so the reply-translation step must be skipped.
        let (reply, already_localized) = match self
            .completion
            .complete(&english_text, Some(mode.template()))
            .await
        {
            Ok(reply) => (reply, false),
            Err(e) => {
                error!("completion failed: {e}");
                let fallback = if is_english {
                    FALLBACK_REPLY_EN
                } else {
                    FALLBACK_REPLY_RW
                };
                (fallback.to_string(), true)
            }
        };

        let reply = if is_english || already_localized {
            reply
        } else {
            match self.translation.translate(&reply, lang::KINYARWANDA).await {
                Ok(translated) => translated,
                Err(e) => {
                    warn!("reply translation failed, keeping English reply: {e}");
                    reply
                }
            }
        };

        if let Some(ctx) = session {
            ctx.store.append_turn(
                ctx.session_id,
                ChatTurn {
                    user_text: user_text.to_string(),
                    assistant_text: reply.clone(),
                    timestamp: Utc::now(),
                    mode,
                },
            );
        }

        reply
    }

    /// Transcribe an audio upload and run the transcript through the text
    /// pipeline in the general health mode. Transcription failure degrades
    /// to a fixed bilingual apology.
    pub async fn handle_audio(
        &self,
        audio: Vec<u8>,
        filename: &str,
        session: Option<&SessionContext<'_>>,
    ) -> String {
        let transcript = match self.stt.transcribe(audio, filename).await {
            Ok(text) => text,
            Err(e) => {
                error!("speech-to-text failed: {e}");
                return AUDIO_FALLBACK_REPLY.to_string();
            }
        };

        if transcript.trim().is_empty() {
            warn!("speech-to-text returned an empty transcript");
            return AUDIO_FALLBACK_REPLY.to_string();
        }

        debug!("transcribed {} chars of audio", transcript.len());
        self.handle_text(&transcript, Mode::Health, session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubCompletion {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubCompletion {
        fn ok() -> Self {
            Self { calls: AtomicUsize::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { calls: AtomicUsize::new(0), fail: true }
        }
    }

    #[async_trait]
    impl CompletionProvider for StubCompletion {
        async fn complete(&self, text: &str, template: Option<&str>) -> Result<String, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(template.is_some(), "pipeline always selects a template");
            if self.fail {
                return Err(UpstreamError::malformed("completion", "stubbed failure"));
            }
            Ok(format!("advice for: {text}"))
        }
    }

    struct StubTranslator {
        to_english: AtomicUsize,
        to_kinyarwanda: AtomicUsize,
        fail: bool,
    }

    impl StubTranslator {
        fn ok() -> Self {
            Self {
                to_english: AtomicUsize::new(0),
                to_kinyarwanda: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                to_english: AtomicUsize::new(0),
                to_kinyarwanda: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl TranslationProvider for StubTranslator {
        async fn translate(&self, text: &str, target_lang: &str) -> Result<String, UpstreamError> {
            match target_lang {
                lang::ENGLISH => self.to_english.fetch_add(1, Ordering::SeqCst),
                lang::KINYARWANDA => self.to_kinyarwanda.fetch_add(1, Ordering::SeqCst),
                other => panic!("unexpected target language {other}"),
            };
            if self.fail {
                return Err(UpstreamError::malformed("translation", "stubbed failure"));
            }
            Ok(format!("[{target_lang}] {text}"))
        }
    }

    struct StubStt {
        transcript: Option<String>,
    }

    #[async_trait]
    impl SpeechToTextProvider for StubStt {
        async fn transcribe(&self, _audio: Vec<u8>, _filename: &str) -> Result<String, UpstreamError> {
            self.transcript
                .clone()
                .ok_or_else(|| UpstreamError::malformed("speech-to-text", "stubbed failure"))
        }
    }

    fn assistant(
        completion: Arc<StubCompletion>,
        translator: Arc<StubTranslator>,
        stt: Arc<StubStt>,
    ) -> Assistant {
        Assistant::new(completion, translator, stt)
    }

    const ENGLISH_INPUT: &str = "I have a headache and my stomach hurts";
    const KINYARWANDA_INPUT: &str = "Mfite umuriro mwinshi kandi umutwe urandya cyane";

    #[tokio::test]
    async fn test_english_input_skips_translation() {
        let completion = Arc::new(StubCompletion::ok());
        let translator = Arc::new(StubTranslator::ok());
        let a = assistant(completion.clone(), translator.clone(), Arc::new(StubStt { transcript: None }));

        let reply = a.handle_text(ENGLISH_INPUT, Mode::Health, None).await;

        assert!(reply.contains(ENGLISH_INPUT));
        assert_eq!(completion.calls.load(Ordering::SeqCst), 1);
        assert_eq!(translator.to_english.load(Ordering::SeqCst), 0);
        assert_eq!(translator.to_kinyarwanda.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_kinyarwanda_round_trips_through_translation() {
        let completion = Arc::new(StubCompletion::ok());
        let translator = Arc::new(StubTranslator::ok());
        let a = assistant(completion.clone(), translator.clone(), Arc::new(StubStt { transcript: None }));

        let reply = a.handle_text(KINYARWANDA_INPUT, Mode::Health, None).await;

        assert_eq!(completion.calls.load(Ordering::SeqCst), 1);
        assert_eq!(translator.to_english.load(Ordering::SeqCst), 1);
        assert_eq!(translator.to_kinyarwanda.load(Ordering::SeqCst), 1);
        assert!(reply.starts_with("[rw]"));
    }

    #[tokio::test]
    async fn test_completion_failure_returns_localized_apology() {
        let translator = Arc::new(StubTranslator::ok());
        let a = assistant(
            Arc::new(StubCompletion::failing()),
            translator.clone(),
            Arc::new(StubStt { transcript: None }),
        );

        let english_reply = a.handle_text(ENGLISH_INPUT, Mode::Health, None).await;
        assert_eq!(english_reply, FALLBACK_REPLY_EN);

        let kinyarwanda_reply = a.handle_text(KINYARWANDA_INPUT, Mode::Health, None).await;
        assert_eq!(kinyarwanda_reply, FALLBACK_REPLY_RW);
        // The apology is already localized; no reply translation happens
        assert_eq!(translator.to_kinyarwanda.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_translation_failure_degrades_not_aborts() {
        let completion = Arc::new(StubCompletion::ok());
        let a = assistant(
            completion.clone(),
            Arc::new(StubTranslator::failing()),
            Arc::new(StubStt { transcript: None }),
        );

        // Inbound translation fails -> original text goes to the model;
        // reply translation fails -> English reply is kept.
        let reply = a.handle_text(KINYARWANDA_INPUT, Mode::Health, None).await;
        assert_eq!(completion.calls.load(Ordering::SeqCst), 1);
        assert!(reply.contains(KINYARWANDA_INPUT));
    }

    #[tokio::test]
    async fn test_turn_recorded_when_session_present() {
        let a = assistant(
            Arc::new(StubCompletion::ok()),
            Arc::new(StubTranslator::ok()),
            Arc::new(StubStt { transcript: None }),
        );
        let store = SessionStore::new();
        let ctx = SessionContext { store: &store, session_id: "visitor" };

        a.handle_text(ENGLISH_INPUT, Mode::MentalHealth, Some(&ctx)).await;

        let history = store.history("visitor");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_text, ENGLISH_INPUT);
        assert_eq!(history[0].mode, Mode::MentalHealth);
        assert!(!history[0].assistant_text.is_empty());
    }

    #[tokio::test]
    async fn test_audio_reenters_text_pipeline() {
        let completion = Arc::new(StubCompletion::ok());
        let a = assistant(
            completion.clone(),
            Arc::new(StubTranslator::ok()),
            Arc::new(StubStt { transcript: Some(ENGLISH_INPUT.to_string()) }),
        );

        let reply = a.handle_audio(vec![0u8; 16], "clip.wav", None).await;
        assert!(reply.contains(ENGLISH_INPUT));
        assert_eq!(completion.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_audio_failure_yields_fixed_apology() {
        let completion = Arc::new(StubCompletion::ok());
        let a = assistant(
            completion.clone(),
            Arc::new(StubTranslator::ok()),
            Arc::new(StubStt { transcript: None }),
        );

        let reply = a.handle_audio(vec![0u8; 16], "clip.wav", None).await;
        assert_eq!(reply, AUDIO_FALLBACK_REPLY);
        assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_transcript_yields_fixed_apology() {
        let a = assistant(
            Arc::new(StubCompletion::ok()),
            Arc::new(StubTranslator::ok()),
            Arc::new(StubStt { transcript: Some("   ".to_string()) }),
        );

        let reply = a.handle_audio(vec![0u8; 16], "clip.wav", None).await;
        assert_eq!(reply, AUDIO_FALLBACK_REPLY);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(Mode::from_request("mental_health"), Mode::MentalHealth);
        assert_eq!(Mode::from_request("health"), Mode::Health);
        assert_eq!(Mode::from_request("anything-else"), Mode::Health);
        assert_eq!(Mode::from_request(""), Mode::Health);
    }

    #[test]
    fn test_templates_carry_placeholder() {
        assert!(Mode::Health.template().contains("{input_text}"));
        assert!(Mode::MentalHealth.template().contains("{input_text}"));
    }
}
