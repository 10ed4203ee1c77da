//! Response from `mod_forum_get_forums_by_courses`.

use serde::Deserialize;
use serde_with::serde_as;
use time::{serde::timestamp, OffsetDateTime};

use crate::serde::StringAsHtml;

#[serde_as]
#[derive(Deserialize, PartialEq, Debug, Default)]
pub struct Forum {
    pub id: u64,
    #[serde(default, rename = "course")]
    pub course_id: Option<u64>,
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    #[serde_as(as = "Option<StringAsHtml>")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default, rename = "cmid")]
    pub course_module_id: Option<u64>,
    #[serde(default, rename = "numdiscussions")]
    pub discussion_count: Option<u64>,
    #[serde(with = "timestamp::option", default, rename = "timemodified")]
    pub modified: Option<OffsetDateTime>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_forum_deserialization() -> serde_json::Result<()> {
        assert_eq!(
            Forum {
                id: 7,
                course_id: Some(2),
                ty: Some("general".to_string()),
                name: Some("Q&A".to_string()),
                intro: Some("<p>Ask here</p>".to_string()),
                course_module_id: Some(41),
                discussion_count: Some(3),
                modified: None,
            },
            serde_json::from_value(json!({
                "id": 7,
                "course": 2,
                "type": "general",
                "name": "Q&amp;A",
                "intro": "<p>Ask here</p>",
                "cmid": 41,
                "numdiscussions": 3
            }))?
        );
        assert_eq!(
            Forum {
                id: 7,
                ..Forum::default()
            },
            serde_json::from_value(json!({ "id": 7 }))?
        );
        Ok(())
    }
}
