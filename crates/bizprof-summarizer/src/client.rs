//! Chat-completions client for the judgment fields.

use std::time::Duration;

use bizprof_core::{AppConfig, SummaryFields, Vocabulary, ABSENCE_MARKER};
use serde::Deserialize;
use serde_json::json;

use crate::error::SummarizerError;
use crate::prompt;

const REQUEST_TIMEOUT_SECS: u64 = 120;
const TEMPERATURE: f64 = 0.1;

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// A missing API key is not an error at construction time; it surfaces as
/// [`SummarizerError::MissingApiKey`] on the first call so the server can
/// still start and report its status.
#[derive(Clone)]
pub struct Summarizer {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Summarizer {
    /// # Errors
    ///
    /// Returns [`SummarizerError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, SummarizerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`SummarizerError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SummarizerError> {
        Self::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            config.openai_base_url.clone(),
        )
    }

    #[must_use]
    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Fails fast when no credential is configured.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizerError::MissingApiKey`].
    pub fn ensure_configured(&self) -> Result<(), SummarizerError> {
        if self.has_key() {
            Ok(())
        } else {
            Err(SummarizerError::MissingApiKey)
        }
    }

    /// One chat completion; returns the first choice's content, or an empty
    /// string when the reply has none.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizerError::MissingApiKey`] without a credential,
    /// [`SummarizerError::Upstream`] on a non-2xx reply, and
    /// [`SummarizerError::Http`] on transport or decode failures.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, SummarizerError> {
        let api_key = self.api_key.as_deref().ok_or(SummarizerError::MissingApiKey)?;
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": TEMPERATURE,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), model = %self.model, "summarizer request failed");
            return Err(SummarizerError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    /// Asks for the judgment fields, repairs a non-JSON reply once, then
    /// rewrites the description to the fixed template.
    ///
    /// The returned fields are unvalidated; vocabulary enforcement happens
    /// when the record is built.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::complete`] failures, and returns
    /// [`SummarizerError::MalformedResponse`] when neither the reply nor its
    /// repair decodes.
    pub async fn summarize(
        &self,
        url: &str,
        corpus: &str,
        vocabulary: &Vocabulary,
    ) -> Result<SummaryFields, SummarizerError> {
        let raw = self
            .complete(&prompt::system_prompt(vocabulary), &prompt::user_prompt(url, corpus))
            .await?;

        let mut summary = match prompt::parse_summary(&raw) {
            Some(summary) => summary,
            None => {
                tracing::debug!(url, "summarizer reply was not JSON, requesting repair");
                let repaired = self
                    .complete(prompt::REPAIR_SYSTEM_PROMPT, &prompt::repair_prompt(&raw))
                    .await?;
                prompt::parse_summary(&repaired).ok_or_else(|| {
                    SummarizerError::MalformedResponse(repaired.chars().take(200).collect())
                })?
            }
        };

        let draft = summary.description.trim();
        if !draft.is_empty() && !draft.eq_ignore_ascii_case(ABSENCE_MARKER) {
            let rewritten = self
                .complete(
                    &prompt::description_rewrite_prompt(vocabulary.description_max_chars()),
                    draft,
                )
                .await?;
            if !rewritten.trim().is_empty() {
                summary.description = rewritten.trim().to_string();
            }
        }

        Ok(summary)
    }
}
