//! Core types for ClipNote

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::NoteError;

/// File extension appended to every rendered filename
pub const NOTE_EXTENSION: &str = ".md";

/// A rendered note, ready to be handed to a vault
///
/// Notes are produced by parsers and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    filename: String,
    content: String,
}

impl Note {
    pub(crate) fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Filename including the extension
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Fully rendered note body
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Note and template settings
///
/// Read-only for the duration of a call. Every field has a default, so a
/// settings file only needs to list what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NoteSettings {
    /// Body template for YouTube notes
    pub youtube_note: String,
    /// Filename template for YouTube notes
    pub youtube_note_title: String,
    /// YouTube Data API key; the page is scraped when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_api_key: Option<String>,
    /// Embedded player width
    pub youtube_embed_width: u32,
    /// Embedded player height
    pub youtube_embed_height: u32,
    /// Embed from youtube-nocookie.com
    pub youtube_use_privacy_enhanced_embed: bool,
    /// Body template for tweets
    pub twitter_note: String,
    /// Filename template for tweets
    pub twitter_note_title: String,
    /// Body template for web pages
    pub website_note: String,
    /// Filename template for web pages
    pub website_note_title: String,
    /// Body template for plain text
    pub text_snippet_note: String,
    /// Filename template for plain text
    pub text_snippet_note_title: String,
    /// strftime format used for `%date%` in filenames
    pub date_title_fmt: String,
    /// strftime format used for `%date%` and dates inside note bodies
    pub date_content_fmt: String,
    /// Vault folder notes are saved into
    pub inbox_dir: String,
    /// Custom User-Agent for page requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for NoteSettings {
    fn default() -> Self {
        Self {
            youtube_note: "[[ReadItLater]] [[Youtube]]\n\n# [%videoTitle%](%videoURL%)\n\n%videoPlayer%"
                .to_string(),
            youtube_note_title: "Youtube - %title%".to_string(),
            youtube_api_key: None,
            youtube_embed_width: 560,
            youtube_embed_height: 315,
            youtube_use_privacy_enhanced_embed: true,
            twitter_note: "[[ReadItLater]] [[Tweet]]\n\n# [%tweetAuthorName%](%tweetURL%)\n\n%tweetContent%"
                .to_string(),
            twitter_note_title: "Tweet from %tweetAuthorName% (%date%)".to_string(),
            website_note: "[[ReadItLater]] [[Article]]\n\n# [%articleTitle%](%articleURL%)\n\n%articleContent%"
                .to_string(),
            website_note_title: "%title%".to_string(),
            text_snippet_note: "[[ReadItLater]] [[Textsnippet]]\n\n%content%".to_string(),
            text_snippet_note_title: "Notice %date%".to_string(),
            date_title_fmt: "%Y-%m-%d %H-%M-%S".to_string(),
            date_content_fmt: "%Y-%m-%d".to_string(),
            inbox_dir: "ReadItLater Inbox".to_string(),
            user_agent: None,
        }
    }
}

impl NoteSettings {
    /// Load settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, NoteError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| NoteError::Settings(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    /// Parse settings from JSON, filling unset fields with defaults
    pub fn from_json(raw: &str) -> Result<Self, NoteError> {
        serde_json::from_str(raw).map_err(|e| NoteError::Settings(e.to_string()))
    }

    /// Configured API key, ignoring blank values
    pub fn youtube_api_key(&self) -> Option<&str> {
        self.youtube_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// JSON schema describing the settings file
    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(NoteSettings);
        serde_json::to_value(schema).unwrap_or_default()
    }
}
