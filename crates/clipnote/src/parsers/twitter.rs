//! Tweet parser
//!
//! Uses the public oEmbed endpoint, which needs no credentials. Links on
//! x.com are rewritten to twitter.com first.

use crate::convert::{element_text, html_to_markdown};
use crate::date::reformat_date;
use crate::error::NoteError;
use crate::http::HttpRequest;
use crate::model::Tweet;
use crate::parsers::{is_valid_url, render_note, ParseContext, Parser};
use crate::types::{Note, NoteSettings};
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// oEmbed endpoint for tweets
const OEMBED_BASE: &str = "https://publish.twitter.com/oembed";

static TWEET_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(?:www\.|mobile\.)?(?:twitter|x)\.com/[A-Za-z0-9_]+/[A-Za-z0-9_]+/[A-Za-z0-9_]+")
        .expect("tweet URL pattern is valid")
});

/// Tweet parser
///
/// Matches `https://twitter.com/<user>/status/<id>` and the x.com equivalent.
pub struct TwitterParser {
    oembed_base: String,
}

impl TwitterParser {
    /// Create a new tweet parser
    pub fn new() -> Self {
        Self {
            oembed_base: OEMBED_BASE.to_string(),
        }
    }

    /// Override the oEmbed endpoint
    pub fn with_oembed_base(mut self, base: impl Into<String>) -> Self {
        self.oembed_base = base.into();
        self
    }

    /// Canonical twitter.com URL without query or fragment
    fn canonical_url(input: &str) -> Result<Url, NoteError> {
        let mut url = Url::parse(input.trim())
            .map_err(|_| NoteError::InvalidInput(format!("Not a tweet URL: {}", input)))?;

        let host = url.host_str().unwrap_or_default();
        if host != "twitter.com" {
            url.set_host(Some("twitter.com"))
                .map_err(|_| NoteError::InvalidInput(format!("Not a tweet URL: {}", input)))?;
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }
}

impl Default for TwitterParser {
    fn default() -> Self {
        Self::new()
    }
}

/// oEmbed response (partial)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OEmbedResponse {
    author_name: Option<String>,
    url: Option<String>,
    html: Option<String>,
}

#[async_trait]
impl Parser for TwitterParser {
    fn name(&self) -> &'static str {
        "twitter"
    }

    fn test(&self, input: &str) -> bool {
        is_valid_url(input) && TWEET_URL_RE.is_match(input.trim())
    }

    async fn prepare_note(&self, input: &str, ctx: &ParseContext<'_>) -> Result<Note, NoteError> {
        if !self.test(input) {
            return Err(NoteError::InvalidInput(format!("Not a tweet URL: {}", input)));
        }
        let tweet_url = Self::canonical_url(input)?;

        let oembed_url = Url::parse_with_params(&self.oembed_base, &[("url", tweet_url.as_str())])
            .map_err(|e| NoteError::InvalidInput(format!("Invalid oEmbed endpoint: {}", e)))?;
        debug!(tweet = %tweet_url, "Fetching tweet oEmbed");

        let body = ctx
            .client
            .request(&HttpRequest::get(oembed_url.as_str()).content_type("application/json"))
            .await?;
        let tweet = tweet_from_oembed(&body, tweet_url.as_str(), ctx.settings)?;

        let settings = ctx.settings;
        Ok(render_note(
            &settings.twitter_note,
            &tweet.tokens(&ctx.date_for_content()),
            &settings.twitter_note_title,
            &tweet.title_tokens(&ctx.date_for_filename()),
        ))
    }
}

/// Build a tweet record from an oEmbed JSON body
///
/// The embed `html` is required. The author falls back to empty and the
/// URL to the requested one.
fn tweet_from_oembed(body: &str, tweet_url: &str, settings: &NoteSettings) -> Result<Tweet, NoteError> {
    let response: OEmbedResponse = serde_json::from_str(body)
        .map_err(|e| NoteError::Parse(format!("Invalid oEmbed response: {}", e)))?;
    let html = response
        .html
        .filter(|html| !html.trim().is_empty())
        .ok_or_else(|| NoteError::Parse(format!("oEmbed response for {} has no html", tweet_url)))?;

    Ok(Tweet {
        author_name: response.author_name.unwrap_or_default(),
        url: response
            .url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| tweet_url.to_string()),
        content: html_to_markdown(&html),
        publish_date: publish_date(&html, &settings.date_content_fmt),
    })
}

/// Date from the trailing permalink (`<blockquote>... <a>March 5, 2023</a>`)
fn publish_date(html: &str, fmt: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let Ok(selector) = Selector::parse("blockquote > a") else {
        return String::new();
    };
    fragment
        .select(&selector)
        .last()
        .and_then(|link| reformat_date(&element_text(link), fmt))
        .unwrap_or_default()
}
