//! YouTube video parser
//!
//! Handles watch, shorts, embed, live and youtu.be links. With an API key
//! configured the YouTube Data API is queried (video, then channel);
//! otherwise the watch page is fetched and its schema.org microdata read.

use crate::date::reformat_date;
use crate::duration::Duration;
use crate::error::NoteError;
use crate::http::HttpRequest;
use crate::model::{Channel, Video};
use crate::parsers::{is_valid_url, render_note, ParseContext, Parser};
use crate::types::{Note, NoteSettings};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

/// YouTube Data API v3 base URL
const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Base URL for watch pages
const WATCH_BASE: &str = "https://www.youtube.com";

/// Watch pages are served without microdata to unknown agents
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

const VIDEO_SCHEMA_SELECTOR: &str = r#"[itemtype*="http://schema.org/VideoObject"]"#;
const PERSON_SCHEMA_SELECTOR: &str = r#"[itemtype="http://schema.org/Person"]"#;

/// YouTube video parser
///
/// Matches YouTube video URLs and renders the `youtube_note` templates.
pub struct YoutubeParser {
    api_base: String,
    watch_base: String,
}

impl YoutubeParser {
    /// Create a new YouTube parser
    pub fn new() -> Self {
        Self {
            api_base: API_BASE.to_string(),
            watch_base: WATCH_BASE.to_string(),
        }
    }

    /// Override the Data API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the host watch pages are requested from
    ///
    /// `%videoURL%` keeps pointing at youtube.com.
    pub fn with_watch_base(mut self, base: impl Into<String>) -> Self {
        self.watch_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Extract the video id from a YouTube URL
    fn parse_video_id(url: &Url) -> Option<String> {
        let host = url.host_str()?.trim_start_matches("www.");
        let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();

        let id = match host {
            "youtu.be" => segments.first().map(|id| id.to_string()),
            "youtube.com" | "m.youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
                match segments.as_slice() {
                    ["watch"] => url
                        .query_pairs()
                        .find(|(key, _)| key == "v")
                        .map(|(_, value)| value.into_owned()),
                    ["shorts" | "embed" | "live" | "v", id, ..] => Some(id.to_string()),
                    _ => None,
                }
            }
            _ => None,
        }?;

        is_video_id(&id).then_some(id)
    }

    /// Canonical watch URL for a video id
    fn canonical_url(id: &str) -> String {
        format!("{}/watch?v={}", WATCH_BASE, id)
    }

    async fn fetch_from_api(
        &self,
        id: &str,
        url: &str,
        api_key: &str,
        ctx: &ParseContext<'_>,
    ) -> Result<Video, NoteError> {
        let video_url = format!(
            "{}/videos?part=contentDetails,snippet,statistics,status,topicDetails&id={}&key={}",
            self.api_base, id, api_key
        );
        let body = ctx
            .client
            .request(&HttpRequest::get(video_url).header("Accept", "application/json"))
            .await?;
        let videos: ApiList<ApiVideo> = serde_json::from_str(&body)
            .map_err(|e| NoteError::Parse(format!("Invalid video API response: {}", e)))?;
        let video = videos
            .items
            .into_iter()
            .next()
            .ok_or_else(|| NoteError::Fetch(format!("Video ({}) cannot be fetched from API", url)))?;

        let channel_id = video.snippet.channel_id.clone();
        let channel_url = format!(
            "{}/channels?part=snippet,contentDetails,statistics&id={}&key={}",
            self.api_base, channel_id, api_key
        );
        let body = ctx
            .client
            .request(&HttpRequest::get(channel_url).header("Accept", "application/json"))
            .await?;
        let channels: ApiList<ApiChannel> = serde_json::from_str(&body)
            .map_err(|e| NoteError::Parse(format!("Invalid channel API response: {}", e)))?;
        let channel = channels.items.into_iter().next().ok_or_else(|| {
            NoteError::Fetch(format!("Channel ({}) cannot be fetched from API", channel_id))
        })?;

        Ok(video_from_api(video, channel, url, ctx.settings))
    }

    async fn fetch_from_page(
        &self,
        id: &str,
        url: &str,
        ctx: &ParseContext<'_>,
    ) -> Result<Video, NoteError> {
        let page_url = format!("{}/watch?v={}", self.watch_base, id);
        let html = ctx
            .client
            .request(&HttpRequest::get(page_url).header("User-Agent", BROWSER_USER_AGENT))
            .await?;

        video_from_page(&html, id, url, ctx.settings)
    }
}

impl Default for YoutubeParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Parser for YoutubeParser {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn test(&self, input: &str) -> bool {
        is_valid_url(input)
            && Url::parse(input.trim())
                .ok()
                .and_then(|url| Self::parse_video_id(&url))
                .is_some()
    }

    async fn prepare_note(&self, input: &str, ctx: &ParseContext<'_>) -> Result<Note, NoteError> {
        let id = Url::parse(input.trim())
            .ok()
            .and_then(|url| Self::parse_video_id(&url))
            .ok_or_else(|| NoteError::InvalidInput(format!("Not a YouTube video URL: {}", input)))?;
        let url = Self::canonical_url(&id);

        let video = match ctx.settings.youtube_api_key() {
            Some(key) => {
                debug!(video = %id, "Fetching video from YouTube Data API");
                self.fetch_from_api(&id, &url, key, ctx).await?
            }
            None => {
                debug!(video = %id, "Scraping video page");
                self.fetch_from_page(&id, &url, ctx).await?
            }
        };

        let settings = ctx.settings;
        Ok(render_note(
            &settings.youtube_note,
            &video.tokens(&ctx.date_for_content()),
            &settings.youtube_note_title,
            &video.title_tokens(&ctx.date_for_filename()),
        ))
    }
}

fn is_video_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Embeddable iframe for a video
fn embed_player(id: &str, settings: &NoteSettings) -> String {
    let domain = if settings.youtube_use_privacy_enhanced_embed {
        "youtube-nocookie.com"
    } else {
        "youtube.com"
    };
    format!(
        r#"<iframe width="{}" height="{}" src="https://www.{}/embed/{}" title="YouTube video player" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe>"#,
        settings.youtube_embed_width, settings.youtube_embed_height, domain, id
    )
}

/// `#tag` form: separators stripped, hash prefixed
fn normalize_tag(tag: &str) -> Option<String> {
    let stripped: String = tag
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ':' | '-' | '_' | '.'))
        .collect();
    (!stripped.is_empty()).then(|| format!("#{}", stripped))
}

fn channel_url(channel_id: &str) -> String {
    format!("{}/channel/{}", WATCH_BASE, channel_id)
}

/// Data API list response (partial)
#[derive(Debug, Deserialize)]
struct ApiList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// Data API video resource (partial)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiVideo {
    #[serde(default)]
    id: String,
    #[serde(default)]
    snippet: ApiVideoSnippet,
    #[serde(default)]
    content_details: ApiContentDetails,
    #[serde(default)]
    statistics: ApiStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ApiVideoSnippet {
    channel_id: String,
    title: String,
    description: String,
    published_at: String,
    thumbnails: ApiThumbnails,
    tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiThumbnails {
    maxres: Option<ApiThumbnail>,
    medium: Option<ApiThumbnail>,
    default: Option<ApiThumbnail>,
}

#[derive(Debug, Deserialize)]
struct ApiThumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiContentDetails {
    duration: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ApiStatistics {
    view_count: Option<String>,
}

/// Data API channel resource (partial)
#[derive(Debug, Deserialize)]
struct ApiChannel {
    #[serde(default)]
    id: String,
    #[serde(default)]
    snippet: ApiChannelSnippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiChannelSnippet {
    title: Option<String>,
}

/// Map Data API resources onto a video record
fn video_from_api(video: ApiVideo, channel: ApiChannel, url: &str, settings: &NoteSettings) -> Video {
    let snippet = video.snippet;
    let thumbnails = snippet.thumbnails;
    let thumbnail = [thumbnails.maxres, thumbnails.medium, thumbnails.default]
        .into_iter()
        .flatten()
        .map(|t| t.url)
        .next()
        .unwrap_or_default();

    let duration = match Duration::parse(&video.content_details.duration) {
        Ok(duration) => duration,
        Err(e) => {
            warn!(video = %video.id, error = %e, "Ignoring video duration");
            Duration::default()
        }
    };

    Video {
        player: embed_player(&video.id, settings),
        id: video.id,
        url: url.to_string(),
        title: snippet.title,
        description: snippet.description,
        thumbnail,
        duration: duration.to_seconds(),
        duration_formatted: duration.format(),
        publish_date: reformat_date(&snippet.published_at, &settings.date_content_fmt)
            .unwrap_or_default(),
        views_count: video
            .statistics
            .view_count
            .and_then(|count| count.parse().ok())
            .unwrap_or(0),
        tags: snippet
            .tags
            .unwrap_or_default()
            .iter()
            .filter_map(|tag| normalize_tag(tag))
            .collect(),
        channel: Channel {
            url: channel_url(&channel.id),
            name: channel.snippet.title.unwrap_or_default(),
            id: channel.id,
        },
    }
}

/// Part of the page a microdata field is read from
#[derive(Debug, Clone, Copy)]
enum Scope {
    Document,
    Video,
    Person,
}

/// Microdata fields read from the watch page
#[derive(Debug, Clone, Copy)]
enum Field {
    Id,
    Title,
    Description,
    Thumbnail,
    ChannelId,
    ChannelUrl,
    ChannelName,
    Duration,
    PublishDate,
    Views,
}

/// Extraction table: (field, scope, selector, attribute)
///
/// Each field is read independently and stays empty when missing. A field
/// listed twice takes the first non-empty value.
const PAGE_FIELDS: &[(Field, Scope, &str, &str)] = &[
    (Field::Id, Scope::Video, r#"[itemprop="identifier"]"#, "content"),
    (Field::Title, Scope::Video, r#"[itemprop="name"]"#, "content"),
    (Field::Description, Scope::Video, r#"[itemprop="description"]"#, "content"),
    (Field::Thumbnail, Scope::Document, r#"meta[property="og:image"]"#, "content"),
    (Field::ChannelId, Scope::Video, r#"[itemprop="channelId"]"#, "content"),
    (Field::ChannelUrl, Scope::Person, r#"[itemprop="url"]"#, "href"),
    (Field::ChannelName, Scope::Person, r#"[itemprop="name"]"#, "content"),
    (Field::Duration, Scope::Video, r#"[itemprop="duration"]"#, "content"),
    (Field::PublishDate, Scope::Video, r#"[itemprop="datePublished"]"#, "content"),
    (Field::PublishDate, Scope::Video, r#"[itemprop="uploadDate"]"#, "content"),
    (Field::Views, Scope::Video, r#"[itemprop="interactionCount"]"#, "content"),
];

/// Raw microdata values, all defaulting to empty
#[derive(Debug, Default)]
struct PageFields {
    id: String,
    title: String,
    description: String,
    thumbnail: String,
    channel_id: String,
    channel_url: String,
    channel_name: String,
    duration: String,
    publish_date: String,
    views: String,
}

impl PageFields {
    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Id => &mut self.id,
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Thumbnail => &mut self.thumbnail,
            Field::ChannelId => &mut self.channel_id,
            Field::ChannelUrl => &mut self.channel_url,
            Field::ChannelName => &mut self.channel_name,
            Field::Duration => &mut self.duration,
            Field::PublishDate => &mut self.publish_date,
            Field::Views => &mut self.views,
        }
    }
}

/// Build a video record from watch page HTML
///
/// The VideoObject microdata container is required; everything else is optional.
fn video_from_page(
    html: &str,
    url_id: &str,
    url: &str,
    settings: &NoteSettings,
) -> Result<Video, NoteError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let video_scope = select_first(root, VIDEO_SCHEMA_SELECTOR).ok_or_else(|| {
        NoteError::Parse("Unable to find Schema.org VideoObject element in HTML".to_string())
    })?;
    let person_scope = select_first(video_scope, PERSON_SCHEMA_SELECTOR);

    let mut fields = PageFields::default();
    for &(field, scope, selector, attr) in PAGE_FIELDS {
        let value = match scope {
            Scope::Document => select_first(root, selector),
            Scope::Video => select_own_property(video_scope, selector),
            Scope::Person => person_scope.and_then(|person| select_own_property(person, selector)),
        }
        .and_then(|element| element.value().attr(attr))
        .map(str::trim)
        .unwrap_or_default();

        let slot = fields.slot(field);
        if slot.is_empty() {
            *slot = value.to_string();
        }
    }

    let id = if fields.id.is_empty() {
        url_id.to_string()
    } else {
        fields.id
    };
    let duration = Duration::parse(&fields.duration).unwrap_or_default();
    let channel_url = if fields.channel_url.is_empty() && !fields.channel_id.is_empty() {
        channel_url(&fields.channel_id)
    } else {
        fields.channel_url
    };

    Ok(Video {
        player: embed_player(&id, settings),
        id,
        url: url.to_string(),
        title: fields.title,
        description: fields.description,
        thumbnail: fields.thumbnail,
        duration: duration.to_seconds(),
        duration_formatted: duration.format(),
        publish_date: reformat_date(&fields.publish_date, &settings.date_content_fmt)
            .unwrap_or_default(),
        views_count: fields
            .views
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .unwrap_or(0),
        tags: Vec::new(),
        channel: Channel {
            id: fields.channel_id,
            url: channel_url,
            name: fields.channel_name,
        },
    })
}

fn select_first<'a>(scope: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    scope.select(&selector).next()
}

/// First match that belongs to `scope` itself rather than a nested item
fn select_own_property<'a>(scope: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    scope
        .select(&selector)
        .find(|element| belongs_to(*element, scope))
}

fn belongs_to(element: ElementRef<'_>, scope: ElementRef<'_>) -> bool {
    for ancestor in element.ancestors() {
        if ancestor.id() == (*scope).id() {
            return true;
        }
        if ElementRef::wrap(ancestor).is_some_and(|el| el.value().attr("itemscope").is_some()) {
            return false;
        }
    }
    false
}
