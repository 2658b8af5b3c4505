//! ClipNote - turn clipboard content into markdown notes
//!
//! This crate classifies clipboard text (a YouTube link, a tweet, any web
//! page, or plain text), fetches what it needs, and renders a note from
//! user-editable templates.
//!
//! ## Parser System
//!
//! ClipNote uses a pluggable parser system where each parser claims the
//! inputs it recognizes. The [`ParserRegistry`] dispatches to the first
//! parser whose `test` accepts the input.
//!
//! Built-in parsers, in priority order:
//! - [`YoutubeParser`] - Video metadata from the Data API or the watch page
//! - [`TwitterParser`] - Tweets via the public oEmbed endpoint
//! - [`WebsiteParser`] - Any other http(s) page, converted to markdown
//! - [`TextSnippetParser`] - Catch-all for plain text
//!
//! ## Example
//!
//! ```no_run
//! use clipnote::{FsVault, Pipeline, SaveMode};
//!
//! # async fn run() -> Result<(), clipnote::NoteError> {
//! let pipeline = Pipeline::builder().build()?;
//! let vault = FsVault::new("/path/to/vault", &pipeline.settings().inbox_dir);
//! pipeline
//!     .process("https://youtu.be/dQw4w9WgXcQ", &vault, SaveMode::Create)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod convert;
mod date;
pub mod duration;
mod error;
pub mod http;
pub mod model;
pub mod parsers;
mod pipeline;
mod report;
pub mod template;
mod types;
pub mod vault;

pub use convert::html_to_markdown;
pub use date::{format_date, reformat_date};
pub use duration::Duration;
pub use error::NoteError;
pub use http::{HttpClient, HttpMethod, HttpRequest, ReqwestClient};
pub use model::TOKENS_HELP;
pub use parsers::{
    ParseContext, Parser, ParserRegistry, TextSnippetParser, TwitterParser, WebsiteParser,
    YoutubeParser,
};
pub use pipeline::{Pipeline, PipelineBuilder, SaveMode};
pub use report::{ErrorReporter, TracingReporter};
pub use template::{render, Tokens};
pub use types::{Note, NoteSettings, NOTE_EXTENSION};
pub use vault::{FsVault, VaultRepository};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Everruns ClipNote/1.0";
