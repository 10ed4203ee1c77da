//! Records returned by the tools.
//!
//! Every record serializes to the JSON form of a tool result and displays as
//! its text form. Both forms carry the same fields.

use std::fmt::{self, Display};

use edu_ws::response::{course::Course, discussion::Discussion, forum::Forum, post::Post};
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, serde::timestamp, OffsetDateTime};

use crate::sanitize::{preview, shorten, strip_html};

/// Summaries are shortened to this many characters in listings and text
/// output.
pub const SUMMARY_LIMIT: usize = 320;
/// Post messages are cut after this many characters in text output.
pub const MESSAGE_PREVIEW_LIMIT: usize = 240;
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// An entry of a course search.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CourseSummary {
    pub id: u64,
    #[serde(rename = "fullname")]
    pub full_name: String,
    pub summary: String,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            full_name: course.name().to_string(),
            summary: shorten(
                &strip_html(course.summary.as_deref().unwrap_or_default()),
                SUMMARY_LIMIT,
            ),
        }
    }
}

impl Display for CourseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.full_name)?;
        if !self.summary.is_empty() {
            write!(f, " — {}", self.summary)?;
        }
        Ok(())
    }
}

/// A course with all details.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CourseRecord {
    pub id: u64,
    #[serde(rename = "fullname")]
    pub full_name: String,
    #[serde(rename = "shortname")]
    pub short_name: Option<String>,
    #[serde(rename = "categoryid")]
    pub category_id: Option<u64>,
    #[serde(rename = "categoryname")]
    pub category_name: Option<String>,
    pub visible: Option<bool>,
    #[serde(with = "timestamp::option", rename = "startdate")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(with = "timestamp::option", rename = "enddate")]
    pub end_date: Option<OffsetDateTime>,
    /// Complete plain text summary.
    pub summary: String,
    pub format: Option<String>,
    pub lang: Option<String>,
    #[serde(rename = "enrollmentmethods")]
    pub enrollment_methods: Vec<String>,
}

impl From<Course> for CourseRecord {
    fn from(course: Course) -> Self {
        let full_name = course.name().to_string();
        let summary = strip_html(course.summary.as_deref().unwrap_or_default());
        let Course {
            id,
            short_name,
            category_id,
            category_name,
            visible,
            start_date,
            end_date,
            format,
            lang,
            enrollment_methods,
            ..
        } = course;
        Self {
            id,
            full_name,
            short_name,
            category_id,
            category_name,
            visible,
            start_date: start_date.filter(is_set),
            end_date: end_date.filter(is_set),
            summary,
            format,
            lang,
            enrollment_methods,
        }
    }
}

/// Moodle stores "no date" as 0.
fn is_set(date: &OffsetDateTime) -> bool {
    date.unix_timestamp() != 0
}

impl Display for CourseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({})",
            self.id,
            self.full_name,
            OrNone(&self.short_name)
        )?;
        write!(
            f,
            "\nCategory: {} ({}) · Visible: {}",
            OrNone(&self.category_id),
            OrNone(&self.category_name),
            OrNone(&self.visible)
        )?;
        write!(
            f,
            "\nStart: {} · End: {} · Format: {} · Lang: {}",
            timestamp_text(self.start_date),
            timestamp_text(self.end_date),
            OrNone(&self.format),
            OrNone(&self.lang)
        )?;
        if !self.enrollment_methods.is_empty() {
            write!(f, "\nEnroll methods: {}", self.enrollment_methods.join(", "))?;
        }
        if !self.summary.is_empty() {
            write!(f, "\nSummary: {}", shorten(&self.summary, SUMMARY_LIMIT))?;
        }
        Ok(())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForumRecord {
    pub forum_id: u64,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    #[serde(rename = "course")]
    pub course_id: Option<u64>,
    #[serde(rename = "cmid")]
    pub course_module_id: Option<u64>,
}

impl From<Forum> for ForumRecord {
    fn from(forum: Forum) -> Self {
        Self {
            forum_id: forum.id,
            name: forum.name,
            ty: forum.ty,
            course_id: forum.course_id,
            course_module_id: forum.course_module_id,
        }
    }
}

impl Display for ForumRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} · type={} · cmid={}",
            self.forum_id,
            OrNone(&self.name),
            OrNone(&self.ty),
            OrNone(&self.course_module_id)
        )
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DiscussionRecord {
    pub forum_id: u64,
    pub discussion_id: Option<u64>,
    pub name: Option<String>,
    #[serde(rename = "userfullname")]
    pub author: Option<String>,
    #[serde(with = "timestamp::option")]
    pub created: Option<OffsetDateTime>,
    #[serde(with = "timestamp::option", rename = "timemodified")]
    pub modified: Option<OffsetDateTime>,
    #[serde(rename = "numreplies")]
    pub reply_count: Option<u64>,
}

impl DiscussionRecord {
    #[must_use]
    pub fn new(forum_id: u64, discussion: Discussion) -> Self {
        Self {
            forum_id,
            discussion_id: discussion.discussion_id,
            name: discussion.name,
            author: discussion.author_full_name,
            created: discussion.created,
            modified: discussion.modified,
            reply_count: discussion.reply_count,
        }
    }
}

impl Display for DiscussionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[discussion_id={}] {} · by {} · replies={}",
            OrNone(&self.discussion_id),
            OrNone(&self.name),
            OrNone(&self.author),
            OrNone(&self.reply_count)
        )
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub post_id: u64,
    pub discussion_id: u64,
    pub author: String,
    #[serde(with = "timestamp::option", rename = "timecreated")]
    pub created: Option<OffsetDateTime>,
    /// Plain text message.
    pub message: String,
}

impl PostRecord {
    #[must_use]
    pub fn new(discussion_id: u64, post: Post) -> Self {
        Self {
            post_id: post.id,
            discussion_id,
            author: post
                .author
                .and_then(|author| author.full_name)
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            created: post.created,
            message: strip_html(post.message.as_deref().unwrap_or_default()),
        }
    }

    /// The creation time as RFC 3339, or `None`.
    #[must_use]
    pub fn created_text(&self) -> String {
        timestamp_text(self.created)
    }
}

impl Display for PostRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- [post {}] {} @ {}: {}",
            self.post_id,
            self.author,
            self.created_text(),
            preview(&self.message, MESSAGE_PREVIEW_LIMIT)
        )
    }
}

/// Formats a timestamp as RFC 3339, or `None`.
fn timestamp_text(timestamp: Option<OffsetDateTime>) -> String {
    match timestamp {
        Some(timestamp) => timestamp
            .format(&Rfc3339)
            .unwrap_or_else(|_| timestamp.unix_timestamp().to_string()),
        None => "None".to_string(),
    }
}

/// Displays the value or `None`.
struct OrNone<'a, T>(&'a Option<T>);

impl<T: Display> Display for OrNone<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => Display::fmt(value, f),
            None => f.write_str("None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use edu_ws::response::post::Author;
    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    fn course() -> Course {
        Course {
            id: 9,
            full_name: Some("Biology".to_string()),
            short_name: Some("BIO".to_string()),
            category_id: Some(2),
            category_name: Some("Science".to_string()),
            visible: Some(true),
            start_date: Some(datetime!(2024-09-01 0:00 UTC)),
            end_date: None,
            summary: Some("<p>Cells &amp; more</p>".to_string()),
            format: Some("topics".to_string()),
            lang: Some("en".to_string()),
            enrollment_methods: vec!["manual".to_string(), "self".to_string()],
            ..Course::default()
        }
    }

    #[test]
    fn course_record_json() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::to_value(CourseRecord::from(course()))?,
            json!({
                "id": 9,
                "fullname": "Biology",
                "shortname": "BIO",
                "categoryid": 2,
                "categoryname": "Science",
                "visible": true,
                "startdate": 1725148800,
                "enddate": null,
                "summary": "Cells & more",
                "format": "topics",
                "lang": "en",
                "enrollmentmethods": ["manual", "self"]
            })
        );
        Ok(())
    }

    #[test]
    fn course_record_text() {
        assert_eq!(
            CourseRecord::from(course()).to_string(),
            "[9] Biology (BIO)\n\
             Category: 2 (Science) · Visible: true\n\
             Start: 2024-09-01T00:00:00Z · End: None · Format: topics · Lang: en\n\
             Enroll methods: manual, self\n\
             Summary: Cells & more"
        );
    }

    #[test]
    fn course_record_dates() -> serde_json::Result<()> {
        let record = CourseRecord::from(Course {
            start_date: Some(datetime!(2024-08-31 22:00 UTC)),
            end_date: Some(OffsetDateTime::UNIX_EPOCH),
            ..course()
        });
        assert_eq!(record.end_date, None);

        let json = serde_json::to_value(&record)?;
        assert_eq!(json["startdate"], 1725141600);
        assert_eq!(json["enddate"], serde_json::Value::Null);
        assert!(record
            .to_string()
            .contains("\nStart: 2024-08-31T22:00:00Z · End: None · Format: topics"));
        Ok(())
    }

    #[test]
    fn course_summary_text() {
        let mut summary = CourseSummary::from(&course());
        assert_eq!(summary.to_string(), "[9] Biology — Cells & more");
        summary.summary.clear();
        assert_eq!(summary.to_string(), "[9] Biology");
    }

    #[test]
    fn forum_record_text() {
        let record = ForumRecord::from(Forum {
            id: 7,
            name: Some("News".to_string()),
            ty: Some("news".to_string()),
            course_module_id: Some(70),
            ..Forum::default()
        });
        assert_eq!(record.to_string(), "[7] News · type=news · cmid=70");
    }

    #[test]
    fn post_record_defaults() -> serde_json::Result<()> {
        let record = PostRecord::new(
            12,
            Post {
                id: 5,
                author: Some(Author::default()),
                message: Some("<p>x".repeat(300)),
                ..Post::default()
            },
        );
        assert_eq!(record.author, UNKNOWN_AUTHOR);
        assert_eq!(record.message.chars().count(), 300);
        let text = record.to_string();
        assert!(text.starts_with("- [post 5] Unknown @ None: xxx"));
        assert!(text.ends_with("x…"));
        assert_eq!(
            serde_json::to_value(&record)?["timecreated"],
            serde_json::Value::Null
        );
        Ok(())
    }

    #[test]
    fn post_record_time() {
        let record = PostRecord::new(
            12,
            Post {
                id: 5,
                created: Some(datetime!(2002-08-20 0:00 UTC)),
                ..Post::default()
            },
        );
        assert_eq!(record.created_text(), "2002-08-20T00:00:00Z");
    }
}
