//! Moodle forum tools over the Model Context Protocol (stdio).

#![warn(rust_2018_idioms)]
#![warn(clippy::default_trait_access)]
#![warn(clippy::inconsistent_struct_constructor)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![deny(rustdoc::all)]

mod protocol;
mod tools;

use std::env;

use clap::{builder::BoolishValueParser, ArgAction, Parser, ValueEnum};
use edu_forum::{
    config::{AiConfig, Config, Token, DEFAULT_AI_BASE_URL, DEFAULT_AI_MODEL},
    ForumTools,
};
use human_panic::setup_panic;
use tokio::io::{self, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::protocol::Server;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogLevel {
    Debug,
    Info,
    #[value(alias = "warn")]
    Warning,
    #[value(alias = "critical")]
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Parser)]
#[clap(name = "edu-forum-mcp", author, version, about)]
struct Args {
    /// Base URL of the Moodle site
    #[clap(long, env = "MOODLE_BASE_URL", default_value = "")]
    base_url: String,

    /// Web service token
    #[clap(long, env = "MOODLE_TOKEN", default_value = "", hide_env_values = true)]
    token: Token,

    /// Force a session language, e.g. `en`
    #[clap(long, env = "MOODLE_LANG")]
    lang: Option<String>,

    /// API key for summarization
    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[clap(long, env = "OPENAI_MODEL", default_value = DEFAULT_AI_MODEL)]
    openai_model: String,

    /// Base URL of an OpenAI-compatible API
    #[clap(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_AI_BASE_URL)]
    openai_base_url: String,

    /// Check whether a discussion id is really a forum id before fetching
    /// posts
    #[clap(
        long,
        env = "SMART_ID_GUARD",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
    )]
    smart_id_guard: bool,

    /// Ignored if `RUST_LOG` is set
    #[clap(long, env = "LOG_LEVEL", value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log single-line JSON records
    #[clap(
        long,
        env = "LOG_JSON",
        default_value_t = false,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
    )]
    log_json: bool,
}

impl Args {
    fn config(&self) -> Config {
        let ai = AiConfig::from_key(self.openai_api_key.clone()).map(|ai| AiConfig {
            model: self.openai_model.clone(),
            base_url: self.openai_base_url.clone(),
            ..ai
        });
        Config {
            site_url: self.base_url.clone(),
            token: self.token.clone(),
            lang: self.lang.clone().filter(|lang| !lang.trim().is_empty()),
            smart_id_guard: self.smart_id_guard,
            ai,
        }
    }
}

/// Logs go to stderr, stdout carries the protocol.
fn init_logging(args: &Args) -> anyhow::Result<()> {
    let filter = if env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        EnvFilter::try_from_default_env()?
    } else {
        EnvFilter::new(args.log_level.directive())
    };
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if args.log_json {
        fmt.json().init();
    } else {
        fmt.init();
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();
    init_logging(&args)?;
    setup_panic!();
    if let Err(err) = dotenv {
        if !err.not_found() {
            warn!(%err, "Could not load .env file");
        }
    }

    let config = args.config();
    let tools = ForumTools::new(config.clone());
    info!(
        transport = "stdio",
        base_url_set = config.has_site(),
        token_present = !config.token.is_empty(),
        endpoint_set = tools.ws_client().ws_url().is_some(),
        log_level = ?args.log_level,
        json_logging = args.log_json,
        smart_id_guard = config.smart_id_guard,
        ai_enabled = tools.summarization_enabled(),
        "Starting Moodle forum MCP server"
    );

    Server::new(tools)
        .serve(BufReader::new(io::stdin()), io::stdout())
        .await?;
    Ok(())
}
