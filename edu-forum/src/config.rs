//! Runtime configuration, fixed at startup.

use std::fmt;

pub use edu_ws::token::Token;

pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Moodle site, without the web service path.
    pub site_url: String,
    pub token: Token,
    /// Session language forced on every request.
    pub lang: Option<String>,
    /// Probe whether a discussion id is actually a forum id before
    /// fetching posts.
    pub smart_id_guard: bool,
    /// Summarization is disabled without it.
    pub ai: Option<AiConfig>,
}

impl Config {
    #[must_use]
    pub fn new(site_url: impl Into<String>, token: Token) -> Self {
        Self {
            site_url: site_url.into(),
            token,
            lang: None,
            smart_id_guard: true,
            ai: None,
        }
    }

    #[must_use]
    pub fn has_site(&self) -> bool {
        !self.site_url.trim().is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(String::new(), Token::default())
    }
}

#[derive(Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
}

impl AiConfig {
    /// Returns `None` for an empty key.
    #[must_use]
    pub fn from_key(api_key: Option<String>) -> Option<Self> {
        api_key
            .filter(|api_key| !api_key.trim().is_empty())
            .map(|api_key| Self {
                api_key,
                model: DEFAULT_AI_MODEL.to_string(),
                base_url: DEFAULT_AI_BASE_URL.to_string(),
            })
    }
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &"…")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}
