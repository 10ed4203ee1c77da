//! Discussion summaries through an OpenAI-compatible chat completion API.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CompletionUsage, CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde::Serialize;
use thiserror::Error;

use crate::{config::AiConfig, record::PostRecord};

pub const SYSTEM_PROMPT: &str = "You are an expert forum summarizer.";
pub const DEFAULT_FOCUS: &str =
    "themes, decisions, unresolved questions, sentiment, and action items (with owners if obvious).";
/// The transcript sent for summarization is cut after this many characters.
pub const CORPUS_LIMIT: usize = 120_000;
pub const TEMPERATURE: f32 = 0.1;

/// Upper bound for a completion, including the client's own retries.
pub const TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error(transparent)]
    OpenAi(#[from] OpenAIError),
    #[error("completion request timed out after {} s", TIMEOUT.as_secs())]
    Timeout,
    #[error("completion response has no content")]
    NoContent,
}

/// The instruction preceding the transcript.
pub fn instruction(focus: &str) -> String {
    let focus = match focus.trim() {
        "" => DEFAULT_FOCUS,
        focus => focus,
    };
    format!(
        "Summarize this Moodle forum discussion.\n\
         Focus: {focus}\n\
         Be concise, use bullet points, end with 3–5 next steps."
    )
}

/// One line per post, cut to [`CORPUS_LIMIT`] characters.
pub fn corpus(posts: &[PostRecord]) -> String {
    let corpus = posts
        .iter()
        .map(|post| {
            format!(
                "- {} @ {}: {}",
                post.author,
                post.created_text(),
                post.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    match corpus.char_indices().nth(CORPUS_LIMIT) {
        Some((end, _)) => corpus[..end].to_string(),
        None => corpus,
    }
}

/// Token counts as reported by the backend.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub input: u32,
    pub output: u32,
    pub total: u32,
}

impl From<CompletionUsage> for Usage {
    fn from(usage: CompletionUsage) -> Self {
        Self {
            input: usage.prompt_tokens,
            output: usage.completion_tokens,
            total: usage.total_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    /// Not every backend reports usage.
    pub usage: Option<Usage>,
}

#[derive(Debug)]
pub struct CompletionClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl CompletionClient {
    #[must_use]
    pub fn new(http_client: reqwest::Client, config: AiConfig) -> Self {
        let AiConfig {
            api_key,
            model,
            base_url,
        } = config;
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url.trim_end_matches('/'));
        Self {
            client: Client::with_config(openai_config).with_http_client(http_client),
            model,
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Requests a single completion for `instruction` followed by `corpus`.
    pub async fn complete(
        &self,
        instruction: &str,
        corpus: &str,
    ) -> Result<Completion, SummarizeError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(SYSTEM_PROMPT)
                        .build()?,
                ),
                ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(instruction)
                        .build()?,
                ),
                ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(corpus)
                        .build()?,
                ),
            ])
            .temperature(TEMPERATURE)
            .build()?;

        let response = tokio::time::timeout(TIMEOUT, self.client.chat().create(request))
            .await
            .map_err(|_| SummarizeError::Timeout)??;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(SummarizeError::NoContent)?;
        Ok(Completion {
            content,
            usage: response.usage.map(Usage::from),
        })
    }
}
