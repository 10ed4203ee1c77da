//! Moodle course and forum tools for agents.

#![warn(rust_2018_idioms)]
#![warn(clippy::default_trait_access)]
#![warn(clippy::inconsistent_struct_constructor)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![deny(rustdoc::all)]

pub mod config;
pub mod record;
pub mod sanitize;
pub mod summarize;
mod tools;
pub(crate) mod util;

pub use tools::{ForumTools, SUMMARIZE_UNAVAILABLE};
