//! Web service tokens.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Number of leading characters kept when a token is written to logs.
const VISIBLE_CHARS: usize = 4;

/// A web service token as issued by Moodle.
///
/// `Debug` never prints the full token, use [`Token::redacted`] for log
/// records.
#[derive(Serialize, Deserialize, Clone, Default, Eq, Hash, PartialEq)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first four characters followed by an ellipsis.
    #[must_use]
    pub fn redacted(&self) -> String {
        redact(&self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.redacted()).finish()
    }
}

impl FromStr for Token {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

fn redact(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    if value.chars().count() <= VISIBLE_CHARS {
        return "…".to_string();
    }
    let mut redacted = value.chars().take(VISIBLE_CHARS).collect::<String>();
    redacted.push('…');
    redacted
}
