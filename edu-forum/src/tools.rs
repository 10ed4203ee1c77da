use std::{sync::OnceLock, time::Instant};

use edu_ws::ws::{self, RequestError};
use tracing::{info, warn};

use crate::{
    config::{AiConfig, Config},
    record::{CourseRecord, CourseSummary, DiscussionRecord, ForumRecord, PostRecord},
    summarize::{self, CompletionClient, SummarizeError},
    util::{self, to_json},
};

pub const SUMMARIZE_UNAVAILABLE: &str = "Summarization requires OPENAI_API_KEY to be configured.";

/// The course and forum tools.
///
/// Owns everything a tool call needs: the web service client, the
/// configuration and the lazily created completion client.
#[derive(Debug)]
pub struct ForumTools {
    ws_client: ws::Client,
    http_client: reqwest::Client,
    smart_id_guard: bool,
    ai: Option<AiConfig>,
    completion_client: OnceLock<CompletionClient>,
}

impl ForumTools {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_http_client(config, util::shared_http())
    }

    #[must_use]
    pub fn with_http_client(config: Config, http_client: reqwest::Client) -> Self {
        let Config {
            site_url,
            token,
            lang,
            smart_id_guard,
            ai,
        } = config;
        Self {
            ws_client: ws::Client::new(http_client.clone(), &site_url, token, lang),
            http_client,
            smart_id_guard,
            ai,
            completion_client: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn ws_client(&self) -> &ws::Client {
        &self.ws_client
    }

    #[must_use]
    pub fn summarization_enabled(&self) -> bool {
        self.ai.is_some()
    }

    /// Searches courses by name, one page at a time.
    pub async fn search_courses(&self, query: &str, page: u64, per_page: u64, as_json: bool) -> String {
        info!(query, page, perpage = per_page, "search_courses called");
        let result = match self.ws_client.search_courses(query, page, per_page).await {
            Ok(result) => result,
            Err(err) => {
                let err = request_failed(&err);
                warn!(error = %err, "search_courses error");
                return err;
            }
        };
        info!(
            returned = result.courses.len(),
            total = result.total,
            "search_courses result"
        );

        if result.courses.is_empty() {
            return format!("No matching courses. (total={})", result.total);
        }

        let items = result
            .courses
            .iter()
            .map(CourseSummary::from)
            .collect::<Vec<_>>();
        if as_json {
            return to_json(&items);
        }

        let mut lines = vec![
            format!(
                "Total (this page): {} / overall: {}",
                items.len(),
                result.total
            ),
            "— Pick a course id —".to_string(),
        ];
        lines.extend(items.iter().map(ToString::to_string));
        if page.saturating_add(1).saturating_mul(per_page) < result.total {
            lines.push(format!(
                "(More available: call search_courses(query='{query}', page={}))",
                page.saturating_add(1)
            ));
        }
        lines.join("\n")
    }

    /// Shows the details of a single course.
    pub async fn confirm_course_by_id(&self, course_id: u64, as_json: bool) -> String {
        info!(course_id, "confirm_course_by_id called");
        let course = match self.ws_client.get_course(course_id).await {
            Ok(Some(course)) => course,
            Ok(None) => {
                info!(course_id, "confirm_course_by_id: not found");
                return course_not_found(course_id);
            }
            Err(err) => {
                let err = request_failed(&err);
                warn!(course_id, error = %err, "confirm_course_by_id error");
                return err;
            }
        };

        let record = CourseRecord::from(course);
        if as_json {
            to_json(&record)
        } else {
            record.to_string()
        }
    }

    /// Lists the forums of a course after checking that the course exists.
    pub async fn get_forums_by_course_id(&self, course_id: u64, as_json: bool) -> String {
        info!(course_id, "get_forums_by_course_id called");
        match self.ws_client.get_course(course_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                info!(course_id, "course not found");
                return course_not_found(course_id);
            }
            Err(err) => {
                let err = request_failed(&err);
                warn!(course_id, error = %err, "course check failed");
                return err;
            }
        }

        let forums = match self.ws_client.get_forums_by_courses(&[course_id]).await {
            Ok(forums) => forums,
            Err(err) => {
                let err = request_failed(&err);
                warn!(course_id, error = %err, "get_forums_by_course_id error");
                return err;
            }
        };
        info!(course_id, count = forums.len(), "forums fetched");
        if forums.is_empty() {
            return format!("No forums found in course {course_id}.");
        }

        let items = forums
            .into_iter()
            .map(ForumRecord::from)
            .collect::<Vec<_>>();
        if as_json {
            return to_json(&items);
        }

        let mut lines = vec![format!("Forums in course {course_id} — pick a forum id:")];
        lines.extend(items.iter().map(ToString::to_string));
        lines.join("\n")
    }

    /// Lists the discussions of a forum.
    pub async fn list_forum_discussions(&self, forum_id: u64, as_json: bool) -> String {
        info!(forum_id, "list_forum_discussions called");
        let discussions = match self.ws_client.get_forum_discussions(forum_id).await {
            Ok(discussions) => discussions.discussions,
            Err(err) => {
                let err = request_failed(&err);
                warn!(forum_id, error = %err, "list_forum_discussions error");
                return err;
            }
        };
        info!(forum_id, count = discussions.len(), "discussions fetched");
        if discussions.is_empty() {
            return format!("No discussions found for forum {forum_id}.");
        }

        let items = discussions
            .into_iter()
            .map(|discussion| DiscussionRecord::new(forum_id, discussion))
            .collect::<Vec<_>>();
        if as_json {
            return to_json(&items);
        }

        let mut lines = vec![format!(
            "Discussions in forum {forum_id} — pick a discussion_id for get_discussion_posts(discussion_id=...):"
        )];
        lines.extend(items.iter().map(ToString::to_string));
        lines.push(
            "\nNext: call get_discussion_posts(discussion_id=<one of the ids above>)".to_string(),
        );
        lines.join("\n")
    }

    /// Returns the plain text posts of a discussion.
    pub async fn get_discussion_posts(&self, discussion_id: u64, as_json: bool) -> String {
        let posts = match self.posts(discussion_id).await {
            Ok(posts) => posts,
            Err(message) => return message,
        };
        if posts.is_empty() {
            return format!("No posts found for discussion {discussion_id}.");
        }
        if as_json {
            return to_json(&posts);
        }

        let mut lines = vec![format!("Posts in discussion {discussion_id}:")];
        lines.extend(posts.iter().map(ToString::to_string));
        lines.join("\n")
    }

    /// Fetches the posts of a discussion, or the message to show instead.
    async fn posts(&self, discussion_id: u64) -> Result<Vec<PostRecord>, String> {
        info!(discussion_id, "get_discussion_posts called");

        // A forum with discussions under this id means the caller most
        // likely mixed up the two kinds of ids.
        if self.smart_id_guard {
            if let Ok(probe) = self.ws_client.get_forum_discussions(discussion_id).await {
                if !probe.discussions.is_empty() {
                    warn!(
                        value = discussion_id,
                        "SMART_ID_GUARD triggered (forum_id used as discussion_id)"
                    );
                    return Err(forum_id_passed(discussion_id));
                }
            }
        }

        let posts = match self.ws_client.get_discussion_posts(discussion_id).await {
            Ok(posts) => posts.posts,
            Err(err) => {
                let err = request_failed(&err);
                if looks_like_id_mixup(&err) {
                    warn!(discussion_id, "get_discussion_posts invalid parameter");
                    return Err(format!("{err}\n\n{DISCUSSION_ID_TIP}"));
                }
                warn!(discussion_id, error = %err, "get_discussion_posts error");
                return Err(err);
            }
        };
        info!(discussion_id, count = posts.len(), "posts fetched");

        Ok(posts
            .into_iter()
            .map(|post| PostRecord::new(discussion_id, post))
            .collect())
    }

    /// Summarizes a discussion with the configured completion backend.
    ///
    /// Only a failing completion request is an error, every other problem
    /// is described in the returned text.
    pub async fn summarize_discussion(
        &self,
        discussion_id: u64,
        focus: &str,
    ) -> Result<String, SummarizeError> {
        info!(
            discussion_id,
            focus_len = focus.chars().count(),
            "summarize_discussion called"
        );
        let Some(ai) = &self.ai else {
            warn!("summarize_discussion unavailable (no OPENAI_API_KEY)");
            return Ok(SUMMARIZE_UNAVAILABLE.to_string());
        };

        let posts = match self.posts(discussion_id).await {
            Ok(posts) => posts,
            Err(message) => {
                warn!(discussion_id, "Failed to load posts for summarization");
                return Ok(format!(
                    "Failed to load posts for summarization.\n\n{message}"
                ));
            }
        };
        if posts.is_empty() {
            info!(discussion_id, "No posts to summarize");
            return Ok("No posts to summarize.".to_string());
        }

        let completion_client = self.completion_client.get_or_init(|| {
            info!(model = %ai.model, "Initialized completion client");
            CompletionClient::new(self.http_client.clone(), ai.clone())
        });

        let start = Instant::now();
        let completion = completion_client
            .complete(
                &summarize::instruction(focus),
                &summarize::corpus(&posts),
            )
            .await?;
        info!(
            discussion_id,
            duration_ms = (start.elapsed().as_secs_f64() * 10_000.0).round() / 10.0,
            model = completion_client.model(),
            usage = ?completion.usage,
            "summarize_discussion completed"
        );
        Ok(completion.content.trim().to_string())
    }
}

const DISCUSSION_ID_TIP: &str = "Tip: 'get_discussion_posts' needs a *discussion_id*, not a forum_id. \
     Run 'list_forum_discussions(forum_id=...)' first and use the 'discussion_id' shown there.";

fn request_failed(err: &RequestError) -> String {
    format!("Request failed: {err}")
}

fn course_not_found(course_id: u64) -> String {
    format!("No course found with id={course_id}.")
}

fn forum_id_passed(id: u64) -> String {
    format!(
        "It looks like you passed a forum_id ({id}) to get_discussion_posts.\n\
         Please run list_forum_discussions(forum_id={id}) and choose a discussion_id, \
         then call get_discussion_posts(discussion_id=<chosen_id>)."
    )
}

fn looks_like_id_mixup(err: &str) -> bool {
    err.contains("Invalid parameter value") || err.to_lowercase().contains("discussion")
}
