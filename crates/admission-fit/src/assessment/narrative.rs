//! Optional prose evaluation from an OpenAI-compatible chat completions endpoint.
//!
//! The scoring engine never depends on this module. The assessment service calls a
//! [`NarrativeGenerator`] after scoring and degrades to a visible notice on failure.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::FreeTextAnswer;
use super::evaluation::EvaluationResult;
use crate::config::NarrativeConfig;

/// Everything the narrative prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeRequest<'a> {
    pub student_name: &'a str,
    pub answers: &'a [FreeTextAnswer],
    pub result: &'a EvaluationResult,
}

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, request: &NarrativeRequest<'_>) -> Result<String, NarrativeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("narrative generation is not configured")]
    Disabled,
    #[error("narrative request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("narrative service returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("narrative service returned no content")]
    EmptyContent,
    #[error("narrative response was malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Used when no API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNarrator;

#[async_trait]
impl NarrativeGenerator for DisabledNarrator {
    async fn generate(&self, _request: &NarrativeRequest<'_>) -> Result<String, NarrativeError> {
        Err(NarrativeError::Disabled)
    }
}

/// Picks the chat completions client when an API key is present.
pub fn narrator_from_config(
    config: &NarrativeConfig,
) -> Result<Arc<dyn NarrativeGenerator>, NarrativeError> {
    if config.enabled() {
        Ok(Arc::new(ChatCompletionNarrator::new(config)?))
    } else {
        Ok(Arc::new(DisabledNarrator))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Single-shot chat completions client. No retries: evaluations are interactive.
#[derive(Clone)]
pub struct ChatCompletionNarrator {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl ChatCompletionNarrator {
    pub fn new(config: &NarrativeConfig) -> Result<Self, NarrativeError> {
        let api_key = config.api_key.clone().ok_or(NarrativeError::Disabled)?;
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl NarrativeGenerator for ChatCompletionNarrator {
    async fn generate(&self, request: &NarrativeRequest<'_>) -> Result<String, NarrativeError> {
        let prompt = build_prompt(request);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            return Err(NarrativeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let narrative = parse_completion(&text)?;
        debug!(
            model = %self.model,
            chars = narrative.len(),
            "narrative generated"
        );
        Ok(narrative)
    }
}

pub(crate) fn parse_completion(body: &str) -> Result<String, NarrativeError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .find_map(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(NarrativeError::EmptyContent)
}

pub(crate) fn build_prompt(request: &NarrativeRequest<'_>) -> String {
    let result = request.result;
    let program = &result.program;
    let mut prompt = format!(
        "You are an experienced admission advisor. A student named {} is applying to the {} program \
         and answered the intake questions below.\n\n",
        request.student_name, program
    );

    for (index, answer) in request.answers.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}\n{}\n", index + 1, answer.question, answer.answer);
    }

    let _ = writeln!(
        prompt,
        "Self-rated scores place the student at {:.2}% ({}).",
        result.percentage,
        result.classification.label()
    );
    let _ = writeln!(prompt, "Strong areas: {}", list_or_none(&result.strengths));
    let _ = writeln!(prompt, "Weak areas: {}", list_or_none(&result.weaknesses));
    if let Some(suggestion) = &result.suggestion {
        let _ = writeln!(
            prompt,
            "The scoring rubric points to {} as an alternative.",
            suggestion.program
        );
    }

    let _ = write!(
        prompt,
        "\nPlease analyse the student's strengths, weaknesses and fit for {program}. \
         If they are not a good fit, suggest a better department (for example BBA, B.Sc or BA) \
         and explain why. Write a detailed evaluation in a friendly and insightful tone."
    );

    prompt
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
