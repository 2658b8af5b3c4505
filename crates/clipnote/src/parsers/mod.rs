//! Parser system for clipboard content
//!
//! Design: Each parser recognizes one content shape and turns it into a
//! [`Note`]. ParserRegistry dispatches to the first matching parser, with
//! the plain text parser registered last as the catch-all.

mod text;
mod twitter;
mod website;
mod youtube;

pub use text::TextSnippetParser;
pub use twitter::TwitterParser;
pub use website::WebsiteParser;
pub use youtube::YoutubeParser;

use crate::date::format_date;
use crate::error::NoteError;
use crate::http::HttpClient;
use crate::template::{render, Tokens};
use crate::types::{Note, NoteSettings, NOTE_EXTENSION};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use url::Url;

/// Trait for content parsers
///
/// `test()` decides whether the parser claims the input; `prepare_note()`
/// fetches whatever it needs and renders the note.
#[async_trait]
pub trait Parser: Send + Sync {
    /// Unique identifier for this parser (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Returns true if this parser handles the input
    ///
    /// Must be cheap and free of side effects.
    fn test(&self, input: &str) -> bool;

    /// Build a note for the input
    ///
    /// Called only if `test()` returned true.
    async fn prepare_note(&self, input: &str, ctx: &ParseContext<'_>) -> Result<Note, NoteError>;
}

/// Read-only inputs for one `prepare_note()` call
pub struct ParseContext<'a> {
    /// Template and date settings snapshot
    pub settings: &'a NoteSettings,
    /// Fetch capability
    pub client: &'a dyn HttpClient,
    /// Clock reading used for `%date%`
    pub now: DateTime<Local>,
}

impl<'a> ParseContext<'a> {
    /// Create a context reading the clock now
    pub fn new(settings: &'a NoteSettings, client: &'a dyn HttpClient) -> Self {
        Self {
            settings,
            client,
            now: Local::now(),
        }
    }

    /// Use a fixed clock reading
    pub fn at(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }

    /// `%date%` value for note bodies
    pub fn date_for_content(&self) -> String {
        format_date(&self.now, &self.settings.date_content_fmt)
    }

    /// `%date%` value for filenames
    pub fn date_for_filename(&self) -> String {
        format_date(&self.now, &self.settings.date_title_fmt)
    }
}

/// Render body and filename templates into a note
pub(crate) fn render_note(
    body_template: &str,
    body_tokens: &Tokens,
    title_template: &str,
    title_tokens: &Tokens,
) -> Note {
    let content = render(body_template, body_tokens);
    let filename = format!("{}{}", render(title_template, title_tokens), NOTE_EXTENSION);
    Note::new(filename, content)
}

/// True for absolute http(s) URLs
pub fn is_valid_url(input: &str) -> bool {
    Url::parse(input.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

/// Registry of parsers that dispatches to the appropriate handler
///
/// Maintains an ordered list of parsers. The first one whose `test()`
/// accepts the input wins.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Create a registry with default parsers pre-registered
    ///
    /// Includes (in order of priority):
    /// 1. YoutubeParser - YouTube video and shorts URLs
    /// 2. TwitterParser - tweet URLs on twitter.com and x.com
    /// 3. WebsiteParser - any other http(s) URL
    /// 4. TextSnippetParser - everything else
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(YoutubeParser::new()));
        registry.register(Box::new(TwitterParser::new()));
        registry.register(Box::new(WebsiteParser::new()));
        // Catch-all last
        registry.register(Box::new(TextSnippetParser::new()));
        registry
    }

    /// Register a parser
    ///
    /// Parsers are checked in registration order, so register more
    /// specific parsers before generic ones.
    pub fn register(&mut self, parser: Box<dyn Parser>) {
        self.parsers.push(parser);
    }

    /// Names of registered parsers in priority order
    pub fn parser_names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    /// Find the first parser accepting the input
    pub fn resolve(&self, input: &str) -> Result<&dyn Parser, NoteError> {
        let parser = self
            .parsers
            .iter()
            .find(|parser| parser.test(input))
            .ok_or(NoteError::NoParserMatched)?;
        tracing::debug!(parser = parser.name(), "Using parser");
        Ok(parser.as_ref())
    }

    /// Resolve a parser and build the note
    pub async fn prepare_note(
        &self,
        input: &str,
        ctx: &ParseContext<'_>,
    ) -> Result<Note, NoteError> {
        self.resolve(input)?.prepare_note(input, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        name: &'static str,
        prefix: &'static str,
    }

    #[async_trait]
    impl Parser for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn test(&self, input: &str) -> bool {
            input.starts_with(self.prefix)
        }

        async fn prepare_note(
            &self,
            input: &str,
            _ctx: &ParseContext<'_>,
        ) -> Result<Note, NoteError> {
            Ok(Note::new(format!("{}.md", self.name), input))
        }
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = ParserRegistry::with_defaults();
        assert_eq!(
            registry.parser_names(),
            vec!["youtube", "twitter", "website", "text_snippet"]
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = ParserRegistry::new();
        assert!(registry.parser_names().is_empty());
        assert!(matches!(
            registry.resolve("anything"),
            Err(NoteError::NoParserMatched)
        ));
    }

    #[test]
    fn test_first_registered_match_wins() {
        let mut registry = ParserRegistry::new();
        registry.register(Box::new(Fixed {
            name: "first",
            prefix: "https://",
        }));
        registry.register(Box::new(Fixed {
            name: "second",
            prefix: "https://example",
        }));

        let parser = registry.resolve("https://example.com").unwrap();
        assert_eq!(parser.name(), "first");
    }

    #[test]
    fn test_defaults_fall_back_to_catch_all() {
        let registry = ParserRegistry::with_defaults();
        assert_eq!(
            registry.resolve("just some text").unwrap().name(),
            "text_snippet"
        );
        assert_eq!(registry.resolve("").unwrap().name(), "text_snippet");
        assert_eq!(
            registry.resolve("https://youtu.be/abc123").unwrap().name(),
            "youtube"
        );
        assert_eq!(
            registry
                .resolve("https://x.com/rustlang/status/1234567890")
                .unwrap()
                .name(),
            "twitter"
        );
        assert_eq!(
            registry.resolve("https://example.com/post").unwrap().name(),
            "website"
        );
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("  http://example.com/a?b=c  "));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("note: remember this"));
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_render_note_appends_extension() {
        let body = Tokens::new().set("content", "hello");
        let title = Tokens::new().set("date", "2024-01-01");
        let note = render_note("> %content%", &body, "Notice %date%", &title);
        assert_eq!(note.filename(), "Notice 2024-01-01.md");
        assert_eq!(note.content(), "> hello");
    }

    #[test]
    fn test_context_dates() {
        use chrono::TimeZone;

        let settings = NoteSettings {
            date_content_fmt: "%d.%m.%Y".to_string(),
            date_title_fmt: "%Y%m%d".to_string(),
            ..Default::default()
        };
        let client = crate::http::ReqwestClient::new().unwrap();
        let now = Local.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap();
        let ctx = ParseContext::new(&settings, &client).at(now);

        assert_eq!(ctx.date_for_content(), "29.02.2024");
        assert_eq!(ctx.date_for_filename(), "20240229");
    }
}
