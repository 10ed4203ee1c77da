//! Responses from `core_course_search_courses` and
//! `core_course_get_courses_by_field`.

use serde::Deserialize;
use serde_with::{serde_as, PickFirst};
use time::{serde::timestamp, OffsetDateTime};

use crate::{
    response::{SummaryFormat, Warning},
    serde::{NumBool, StringAsHtml},
};

/// Placeholder shown for courses without any name.
pub const UNNAMED: &str = "(unnamed)";

#[derive(Deserialize, PartialEq, Debug, Default)]
pub struct SearchResult {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

#[derive(Deserialize, PartialEq, Debug, Default)]
pub struct Courses {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

#[serde_as]
#[derive(Deserialize, PartialEq, Debug, Default)]
pub struct Course {
    pub id: u64,
    #[serde_as(as = "Option<StringAsHtml>")]
    #[serde(default, rename = "fullname")]
    pub full_name: Option<String>,
    #[serde_as(as = "Option<StringAsHtml>")]
    #[serde(default, rename = "displayname")]
    pub display_name: Option<String>,
    #[serde_as(as = "Option<StringAsHtml>")]
    #[serde(default, rename = "shortname")]
    pub short_name: Option<String>,
    #[serde(default, rename = "categoryid")]
    pub category_id: Option<u64>,
    #[serde_as(as = "Option<StringAsHtml>")]
    #[serde(default, rename = "categoryname")]
    pub category_name: Option<String>,
    #[serde_as(as = "Option<PickFirst<(NumBool, _)>>")]
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(with = "timestamp::option", default, rename = "startdate")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(with = "timestamp::option", default, rename = "enddate")]
    pub end_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, rename = "summaryformat")]
    pub summary_format: Option<SummaryFormat>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default, rename = "enrollmentmethods")]
    pub enrollment_methods: Vec<String>,
}

impl Course {
    /// The first non-empty of full name, display name and short name.
    #[must_use]
    pub fn name(&self) -> &str {
        [&self.full_name, &self.display_name, &self.short_name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|name| !name.is_empty())
            .unwrap_or(UNNAMED)
    }
}
