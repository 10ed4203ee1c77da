//! Response from `mod_forum_get_discussion_posts`.

use serde::Deserialize;
use serde_with::serde_as;
use time::{serde::timestamp, OffsetDateTime};

use crate::{response::Warning, serde::StringAsHtml};

/// Posts of a discussion.
///
/// Current Moodle releases wrap the posts in an object, some older ones
/// return the bare list. Both decode into this type.
#[derive(Deserialize, PartialEq, Debug, Default)]
#[serde(from = "PostsRepr")]
pub struct Posts {
    pub posts: Vec<Post>,
    pub warnings: Vec<Warning>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PostsRepr {
    Bare(Vec<Post>),
    Wrapped {
        #[serde(default)]
        posts: Vec<Post>,
        #[serde(default)]
        warnings: Vec<Warning>,
    },
}

impl From<PostsRepr> for Posts {
    fn from(repr: PostsRepr) -> Self {
        match repr {
            PostsRepr::Bare(posts) => Self {
                posts,
                warnings: Vec::new(),
            },
            PostsRepr::Wrapped { posts, warnings } => Self { posts, warnings },
        }
    }
}

#[serde_as]
#[derive(Deserialize, PartialEq, Debug, Default)]
pub struct Post {
    pub id: u64,
    #[serde(default, rename = "discussionid")]
    pub discussion_id: Option<u64>,
    #[serde(default, rename = "parentid")]
    pub parent_id: Option<u64>,
    #[serde_as(as = "Option<StringAsHtml>")]
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(with = "timestamp::option", default, rename = "timecreated")]
    pub created: Option<OffsetDateTime>,
}

#[serde_as]
#[derive(Deserialize, PartialEq, Debug, Default)]
pub struct Author {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde_as(as = "Option<StringAsHtml>")]
    #[serde(default, rename = "fullname")]
    pub full_name: Option<String>,
}
