//! The tool registry: definitions for `tools/list` and dispatch for
//! `tools/call`.

use edu_forum::{summarize::SummarizeError, ForumTools};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: &'static str,
        source: serde_json::Error,
    },
    #[error("Summarization failed: {0}")]
    Summarize(#[from] SummarizeError),
}

/// Definitions of all tools, in the shape of a `tools/list` result.
pub fn definitions() -> Value {
    let id = |description: &str| json!({ "type": "integer", "description": description });
    let as_json = |default: bool| {
        json!({
            "type": "boolean",
            "default": default,
            "description": "Return JSON instead of text"
        })
    };

    json!({
        "tools": [
            {
                "name": "search_courses",
                "description": "Search courses by name. Returns course ids to continue with.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "Search text" },
                        "page": { "type": "integer", "default": 0 },
                        "perpage": { "type": "integer", "default": 50 },
                        "as_json": as_json(false)
                    },
                    "required": ["query"]
                }
            },
            {
                "name": "confirm_course_by_id",
                "description": "Show the details of a course.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "course_id": id("Course id"),
                        "as_json": as_json(false)
                    },
                    "required": ["course_id"]
                }
            },
            {
                "name": "get_forums_by_course_id",
                "description": "List the forums of a course. Returns forum ids to continue with.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "course_id": id("Course id"),
                        "as_json": as_json(false)
                    },
                    "required": ["course_id"]
                }
            },
            {
                "name": "list_forum_discussions",
                "description": "List the discussions of a forum. Returns discussion ids to continue with.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "forum_id": id("Forum id"),
                        "as_json": as_json(false)
                    },
                    "required": ["forum_id"]
                }
            },
            {
                "name": "get_discussion_posts",
                "description": "Get the posts of a discussion as plain text. Needs a discussion id, not a forum id.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "discussion_id": id("Discussion id"),
                        "as_json": as_json(true)
                    },
                    "required": ["discussion_id"]
                }
            },
            {
                "name": "summarize_discussion",
                "description": "Summarize a discussion. Requires a configured OpenAI API key.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "discussion_id": id("Discussion id"),
                        "focus": {
                            "type": "string",
                            "default": "",
                            "description": "What the summary should focus on"
                        }
                    },
                    "required": ["discussion_id"]
                }
            }
        ]
    })
}

const fn default_per_page() -> u64 {
    50
}

const fn default_true() -> bool {
    true
}

// Clients sometimes send ids and page numbers as strings.
#[serde_as]
#[derive(Deserialize, Debug)]
struct SearchArgs {
    query: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    page: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default = "default_per_page")]
    perpage: u64,
    #[serde(default)]
    as_json: bool,
}

#[serde_as]
#[derive(Deserialize, Debug)]
struct CourseArgs {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    course_id: u64,
    #[serde(default)]
    as_json: bool,
}

#[serde_as]
#[derive(Deserialize, Debug)]
struct ForumArgs {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    forum_id: u64,
    #[serde(default)]
    as_json: bool,
}

#[serde_as]
#[derive(Deserialize, Debug)]
struct PostsArgs {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    discussion_id: u64,
    #[serde(default = "default_true")]
    as_json: bool,
}

#[serde_as]
#[derive(Deserialize, Debug)]
struct SummarizeArgs {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    discussion_id: u64,
    #[serde(default)]
    focus: String,
}

fn args<T: DeserializeOwned>(tool: &'static str, arguments: Value) -> Result<T, CallError> {
    // A missing arguments object means no arguments.
    let arguments = match arguments {
        Value::Null => json!({}),
        arguments => arguments,
    };
    serde_json::from_value(arguments).map_err(|source| CallError::InvalidArguments { tool, source })
}

/// Runs the tool `name` and returns its output.
pub async fn call(tools: &ForumTools, name: &str, arguments: Value) -> Result<String, CallError> {
    let output = match name {
        "search_courses" => {
            let args: SearchArgs = args("search_courses", arguments)?;
            tools
                .search_courses(&args.query, args.page, args.perpage, args.as_json)
                .await
        }
        "confirm_course_by_id" => {
            let args: CourseArgs = args("confirm_course_by_id", arguments)?;
            tools
                .confirm_course_by_id(args.course_id, args.as_json)
                .await
        }
        "get_forums_by_course_id" => {
            let args: CourseArgs = args("get_forums_by_course_id", arguments)?;
            tools
                .get_forums_by_course_id(args.course_id, args.as_json)
                .await
        }
        "list_forum_discussions" => {
            let args: ForumArgs = args("list_forum_discussions", arguments)?;
            tools
                .list_forum_discussions(args.forum_id, args.as_json)
                .await
        }
        "get_discussion_posts" => {
            let args: PostsArgs = args("get_discussion_posts", arguments)?;
            tools
                .get_discussion_posts(args.discussion_id, args.as_json)
                .await
        }
        "summarize_discussion" => {
            let args: SummarizeArgs = args("summarize_discussion", arguments)?;
            tools
                .summarize_discussion(args.discussion_id, &args.focus)
                .await?
        }
        name => return Err(CallError::UnknownTool(name.to_string())),
    };
    Ok(output)
}
