//! Content records produced by parsers
//!
//! Every field is concrete; missing provider data is stored as an empty
//! string, zero or an empty list so the token maps are always total.

use crate::template::Tokens;

/// Body tokens available to YouTube templates
pub const YOUTUBE_TOKENS: &[&str] = &[
    "date",
    "videoTitle",
    "videoId",
    "videoDescription",
    "videoThumbnail",
    "videoDuration",
    "videoDurationFormatted",
    "videoPublishDate",
    "videoViewsCount",
    "videoURL",
    "channelId",
    "channelName",
    "channelURL",
    "videoTags",
    "videoPlayer",
];

/// Filename tokens available to YouTube title templates
pub const YOUTUBE_TITLE_TOKENS: &[&str] = &["title", "date"];

/// Body tokens available to tweet templates
pub const TWITTER_TOKENS: &[&str] = &[
    "date",
    "tweetAuthorName",
    "tweetURL",
    "tweetContent",
    "tweetPublishDate",
];

/// Filename tokens available to tweet title templates
pub const TWITTER_TITLE_TOKENS: &[&str] = &["tweetAuthorName", "date"];

/// Body tokens available to web page templates
pub const WEBSITE_TOKENS: &[&str] = &["date", "articleTitle", "articleURL", "articleContent"];

/// Filename tokens available to web page title templates
pub const WEBSITE_TITLE_TOKENS: &[&str] = &["title", "date"];

/// Body tokens available to text snippet templates
pub const TEXT_SNIPPET_TOKENS: &[&str] = &["date", "content"];

/// Filename tokens available to text snippet title templates
pub const TEXT_SNIPPET_TITLE_TOKENS: &[&str] = &["date"];

/// Token vocabulary reference
pub const TOKENS_HELP: &str = r#"# ClipNote template tokens

Tokens are written as %name%. Unknown tokens are left untouched.
Filenames always get the `.md` extension appended.

## YouTube (youtube_note / youtube_note_title)
Body: %date% %videoTitle% %videoId% %videoDescription% %videoThumbnail%
      %videoDuration% (seconds) %videoDurationFormatted% (e.g. 1h 2m 3s)
      %videoPublishDate% %videoViewsCount% %videoURL% %channelId%
      %channelName% %channelURL% %videoTags% %videoPlayer%
Title: %title% %date%

## Tweets (twitter_note / twitter_note_title)
Body: %date% %tweetAuthorName% %tweetURL% %tweetContent% %tweetPublishDate%
Title: %tweetAuthorName% %date%

## Web pages (website_note / website_note_title)
Body: %date% %articleTitle% %articleURL% %articleContent%
Title: %title% %date%

## Text snippets (text_snippet_note / text_snippet_note_title)
Body: %date% %content%
Title: %date%

%date% in bodies uses date_content_fmt, in titles date_title_fmt.
"#;

/// Channel that published a video
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub url: String,
    pub name: String,
}

/// Video metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Video {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    /// Total length in seconds
    pub duration: u64,
    pub duration_formatted: String,
    /// Publish date already formatted with the content date format
    pub publish_date: String,
    pub views_count: u64,
    pub tags: Vec<String>,
    /// Embeddable player markup
    pub player: String,
    pub channel: Channel,
}

impl Video {
    pub fn tokens(&self, date: &str) -> Tokens {
        Tokens::new()
            .set("date", date)
            .set("videoTitle", self.title.as_str())
            .set("videoId", self.id.as_str())
            .set("videoDescription", self.description.as_str())
            .set("videoThumbnail", self.thumbnail.as_str())
            .set("videoDuration", self.duration.to_string())
            .set("videoDurationFormatted", self.duration_formatted.as_str())
            .set("videoPublishDate", self.publish_date.as_str())
            .set("videoViewsCount", self.views_count.to_string())
            .set("videoURL", self.url.as_str())
            .set("channelId", self.channel.id.as_str())
            .set("channelName", self.channel.name.as_str())
            .set("channelURL", self.channel.url.as_str())
            .set("videoTags", self.tags.join(" "))
            .set("videoPlayer", self.player.as_str())
    }

    pub fn title_tokens(&self, date: &str) -> Tokens {
        Tokens::new()
            .set("title", self.title.as_str())
            .set("date", date)
    }
}

/// Tweet metadata from the oEmbed endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tweet {
    pub author_name: String,
    pub url: String,
    /// Tweet body as markdown
    pub content: String,
    pub publish_date: String,
}

impl Tweet {
    pub fn tokens(&self, date: &str) -> Tokens {
        Tokens::new()
            .set("date", date)
            .set("tweetAuthorName", self.author_name.as_str())
            .set("tweetURL", self.url.as_str())
            .set("tweetContent", self.content.as_str())
            .set("tweetPublishDate", self.publish_date.as_str())
    }

    pub fn title_tokens(&self, date: &str) -> Tokens {
        Tokens::new()
            .set("tweetAuthorName", self.author_name.as_str())
            .set("date", date)
    }
}

/// Generic web page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
    /// Main content as markdown
    pub content: String,
}

impl Article {
    pub fn tokens(&self, date: &str) -> Tokens {
        Tokens::new()
            .set("date", date)
            .set("articleTitle", self.title.as_str())
            .set("articleURL", self.url.as_str())
            .set("articleContent", self.content.as_str())
    }

    pub fn title_tokens(&self, date: &str) -> Tokens {
        Tokens::new()
            .set("title", self.title.as_str())
            .set("date", date)
    }
}

/// Plain clipboard text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSnippet {
    pub content: String,
}

impl TextSnippet {
    pub fn tokens(&self, date: &str) -> Tokens {
        Tokens::new()
            .set("date", date)
            .set("content", self.content.as_str())
    }

    pub fn title_tokens(&self, date: &str) -> Tokens {
        Tokens::new().set("date", date)
    }
}
