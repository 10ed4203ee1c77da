//! Responses to several web service requests.

pub mod course;
pub mod discussion;
pub mod forum;
pub mod post;

use serde::Deserialize;
use serde_repr::Deserialize_repr;

#[derive(Deserialize_repr, Copy, Clone, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum SummaryFormat {
    Html = 1,
    Moodle = 0,
    Plain = 2,
    Markdown = 4,
}

/// A non-fatal warning attached to a response.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Warning {
    pub item: Option<String>,
    #[serde(rename = "itemid")]
    pub item_id: Option<u64>,
    #[serde(rename = "warningcode")]
    pub code: Option<String>,
    pub message: Option<String>,
}
