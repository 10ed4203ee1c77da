//! A client for web service requests.

use std::{
    collections::BTreeMap,
    result,
    time::{Duration, Instant},
};

use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnNull};
use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

use crate::{
    response::{
        course::{Course, Courses, SearchResult},
        discussion::Discussions,
        forum::Forum,
        post::Posts,
    },
    token::Token,
};

/// Upper bound for a single web service round trip.
pub const TIMEOUT: Duration = Duration::from_secs(60);

const WS_PATH: &str = "webservice/rest/server.php";

/// An exception reported inside an otherwise successful response.
#[serde_as]
#[derive(Error, Deserialize, Debug, PartialEq)]
#[error("{message}")]
pub struct Exception {
    pub exception: String,
    #[serde(default, rename = "errorcode")]
    pub error_code: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "debuginfo")]
    pub debug_info: Option<String>,
}

impl Exception {
    fn from_response(value: &Value) -> Option<Self> {
        let exception = value.as_object()?.get("exception")?;
        if exception.is_null() {
            return None;
        }
        serde_json::from_value(value.clone())
            .ok()
            .or_else(|| {
                Some(Self {
                    exception: exception.to_string(),
                    error_code: None,
                    message: value
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    debug_info: None,
                })
            })
    }
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Missing MOODLE_BASE_URL or MOODLE_TOKEN in environment.")]
    MissingConfig,
    #[error("HTTP error: {}", .0.as_u16())]
    Status(StatusCode),
    #[error("Moodle error: {0}")]
    Exception(#[from] Exception),
    #[error(transparent)]
    HttpError(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] serde_path_to_error::Error<serde_json::Error>),
}

impl RequestError {
    pub fn is_http(&self) -> bool {
        matches!(self, Self::HttpError(_) | Self::Status(_))
    }
}

pub type Result<T> = result::Result<T, RequestError>;

#[derive(Debug)]
pub struct Client {
    http_client: reqwest::Client,
    ws_url: Option<Url>,
    token: Token,
    lang: Option<String>,
}

impl Client {
    /// Creates a client for the site at `site_url`.
    ///
    /// An empty or unparsable site URL or an empty token does not fail here.
    /// Every call made through such a client fails with
    /// [`RequestError::MissingConfig`] instead, without touching the network.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        site_url: &str,
        token: Token,
        lang: Option<String>,
    ) -> Self {
        Self {
            http_client,
            ws_url: ws_url(site_url),
            token,
            lang,
        }
    }

    #[must_use]
    pub fn ws_url(&self) -> Option<&Url> {
        self.ws_url.as_ref()
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.ws_url.is_some() && !self.token.is_empty()
    }

    /// Calls the web service function `function` with `params`.
    ///
    /// Makes exactly one attempt.
    pub async fn call<T, P>(&self, function: &str, params: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let ws_url = match &self.ws_url {
            Some(ws_url) if !self.token.is_empty() => ws_url,
            _ => {
                error!(
                    base_url_set = self.ws_url.is_some(),
                    token_set = !self.token.is_empty(),
                    "Missing configuration"
                );
                return Err(RequestError::MissingConfig);
            }
        };

        let start = Instant::now();
        let result = self
            .call_web_service(ws_url, function, params, start)
            .await
            .and_then(|value| {
                serde_path_to_error::deserialize(value).map_err(RequestError::Decode)
            });

        let duration_ms = elapsed_ms(start);
        match &result {
            Ok(_) => {}
            Err(RequestError::Exception(exception)) => warn!(
                wsfunction = function,
                duration_ms,
                message = %exception.message,
                "Moodle API exception"
            ),
            Err(RequestError::Status(status)) => error!(
                wsfunction = function,
                duration_ms,
                status_code = status.as_u16(),
                "HTTP status error"
            ),
            Err(err) => error!(
                wsfunction = function,
                duration_ms,
                %err,
                "Moodle request failed"
            ),
        }
        result
    }

    async fn call_web_service<P>(
        &self,
        ws_url: &Url,
        function: &str,
        params: &P,
        start: Instant,
    ) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        #[derive(Serialize)]
        struct WsForm<'a, P: ?Sized> {
            #[serde(rename = "wstoken")]
            token: &'a Token,
            #[serde(rename = "wsfunction")]
            function: &'a str,
            #[serde(rename = "moodlewsrestformat")]
            rest_format: &'a str,

            /// Filter text
            ///
            /// When deactivated, localization fails and versions in multiple
            /// languages are being concatenated.
            #[serde(rename = "moodlewssettingfilter")]
            filter: bool,

            /// Force a session language
            #[serde(
                rename = "moodlewssettinglang",
                skip_serializing_if = "Option::is_none"
            )]
            lang: Option<&'a str>,

            #[serde(flatten)]
            params: &'a P,
        }

        let response = self
            .http_client
            .post(ws_url.clone())
            .timeout(TIMEOUT)
            .form(&WsForm {
                token: &self.token,
                function,
                rest_format: "json",
                filter: true,
                lang: self.lang.as_deref(),
                params,
            })
            .send()
            .await?;

        let status = response.status();
        debug!(
            wsfunction = function,
            status_code = status.as_u16(),
            duration_ms = elapsed_ms(start),
            endpoint = %ws_url,
            params_keys = ?param_keys(params),
            token = %self.token.redacted(),
            "Moodle request"
        );
        if !status.is_success() {
            return Err(RequestError::Status(status));
        }

        let response = response.text().await?;
        let de = &mut serde_json::Deserializer::from_str(&response);
        let value: Value = serde_path_to_error::deserialize(de)?;
        match Exception::from_response(&value) {
            Some(exception) => Err(exception.into()),
            None => Ok(value),
        }
    }

    pub async fn search_courses(&self, query: &str, page: u64, per_page: u64) -> Result<SearchResult> {
        #[derive(Serialize)]
        struct Params<'a> {
            #[serde(rename = "criterianame")]
            criteria_name: &'a str,
            #[serde(rename = "criteriavalue")]
            criteria_value: &'a str,
            page: u64,
            #[serde(rename = "perpage")]
            per_page: u64,
        }

        self.call(
            "core_course_search_courses",
            &Params {
                criteria_name: "search",
                criteria_value: query,
                page,
                per_page,
            },
        )
        .await
    }

    pub async fn get_courses_by_field(&self, field: &str, value: &str) -> Result<Courses> {
        #[derive(Serialize)]
        struct Params<'a> {
            field: &'a str,
            value: &'a str,
        }

        self.call(
            "core_course_get_courses_by_field",
            &Params { field, value },
        )
        .await
    }

    /// Looks up a single course by id.
    pub async fn get_course(&self, course_id: u64) -> Result<Option<Course>> {
        // The lookup value is a string parameter upstream.
        let courses = self
            .get_courses_by_field("id", &course_id.to_string())
            .await?;
        Ok(courses.courses.into_iter().next())
    }

    pub async fn get_forums_by_courses(&self, course_ids: &[u64]) -> Result<Vec<Forum>> {
        let params = course_ids
            .iter()
            .enumerate()
            .map(|(i, course_id)| (format!("courseids[{i}]"), *course_id))
            .collect::<BTreeMap<_, _>>();

        self.call("mod_forum_get_forums_by_courses", &params).await
    }

    pub async fn get_forum_discussions(&self, forum_id: u64) -> Result<Discussions> {
        #[derive(Serialize)]
        struct Params {
            #[serde(rename = "forumid")]
            forum_id: u64,
        }

        self.call("mod_forum_get_forum_discussions", &Params { forum_id })
            .await
    }

    pub async fn get_discussion_posts(&self, discussion_id: u64) -> Result<Posts> {
        #[derive(Serialize)]
        struct Params {
            #[serde(rename = "discussionid")]
            discussion_id: u64,
        }

        self.call("mod_forum_get_discussion_posts", &Params { discussion_id })
            .await
    }
}

fn ws_url(site_url: &str) -> Option<Url> {
    let site_url = site_url.trim().trim_end_matches('/');
    if site_url.is_empty() {
        return None;
    }
    match Url::parse(&format!("{site_url}/{WS_PATH}")) {
        Ok(ws_url) => Some(ws_url),
        Err(err) => {
            warn!(%err, "Invalid site URL");
            None
        }
    }
}

fn param_keys<P: Serialize + ?Sized>(params: &P) -> Vec<String> {
    match serde_json::to_value(params) {
        Ok(Value::Object(map)) => map.into_iter().map(|(key, _)| key).collect(),
        _ => Vec::new(),
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 10_000.0).round() / 10.0
}
