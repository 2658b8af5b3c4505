//! Plain text parser
//!
//! The catch-all: accepts any input and stores it verbatim. Register it
//! last.

use crate::error::NoteError;
use crate::model::TextSnippet;
use crate::parsers::{render_note, ParseContext, Parser};
use crate::types::Note;
use async_trait::async_trait;

/// Text snippet parser
pub struct TextSnippetParser;

impl TextSnippetParser {
    /// Create a new text snippet parser
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextSnippetParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Parser for TextSnippetParser {
    fn name(&self) -> &'static str {
        "text_snippet"
    }

    fn test(&self, _input: &str) -> bool {
        true
    }

    async fn prepare_note(&self, input: &str, ctx: &ParseContext<'_>) -> Result<Note, NoteError> {
        let snippet = TextSnippet {
            content: input.to_string(),
        };

        let settings = ctx.settings;
        Ok(render_note(
            &settings.text_snippet_note,
            &snippet.tokens(&ctx.date_for_content()),
            &settings.text_snippet_note_title,
            &snippet.title_tokens(&ctx.date_for_filename()),
        ))
    }
}
