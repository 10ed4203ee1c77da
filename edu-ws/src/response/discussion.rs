//! Response from `mod_forum_get_forum_discussions`.

use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use time::{serde::timestamp, OffsetDateTime};

use crate::{response::Warning, serde::StringAsHtml};

#[derive(Deserialize, PartialEq, Debug, Default)]
pub struct Discussions {
    #[serde(default)]
    pub discussions: Vec<Discussion>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

#[serde_as]
#[derive(Deserialize, PartialEq, Debug, Default)]
pub struct Discussion {
    /// Id of the first post.
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, rename = "discussion")]
    pub discussion_id: Option<u64>,
    #[serde_as(as = "Option<StringAsHtml>")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(as = "Option<StringAsHtml>")]
    #[serde(default, rename = "userfullname")]
    pub author_full_name: Option<String>,
    #[serde(with = "timestamp::option", default)]
    pub created: Option<OffsetDateTime>,
    #[serde(with = "timestamp::option", default, rename = "timemodified")]
    pub modified: Option<OffsetDateTime>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, rename = "numreplies")]
    pub reply_count: Option<u64>,
    #[serde(default)]
    pub pinned: Option<bool>,
}
