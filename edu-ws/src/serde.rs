//! Utilities for serde.

use std::{borrow::Cow, convert::Infallible};

use serde_with::serde_conv;

serde_conv!(
    pub NumBool,
    bool,
    |source: &bool| *source as u8,
    |value| match value {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(format!("bool out of range: {}", value)),
    }
);

serde_conv!(
    pub StringAsHtml,
    String,
    |string: &str| html_escape::encode_text(string).into_owned(),
    |html: String| -> Result<_, Infallible> {
        match html_escape::decode_html_entities(&html) {
            Cow::Owned(string) => Ok(string),
            Cow::Borrowed(_) => Ok(html),
        }
    }
);
