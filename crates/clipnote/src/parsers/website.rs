//! Generic web page parser
//!
//! Handles any http(s) URL not claimed by a more specific parser. The page
//! is fetched and its main content converted to markdown.

use crate::convert::{collapse_whitespace, element_text, element_to_markdown};
use crate::error::NoteError;
use crate::http::HttpRequest;
use crate::model::Article;
use crate::parsers::{is_valid_url, render_note, ParseContext, Parser};
use crate::types::{Note, NOTE_EXTENSION};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Containers tried in order for the main content
const CONTENT_SELECTORS: &[&str] = &["article", "main", "body"];

/// Web page parser
pub struct WebsiteParser;

impl WebsiteParser {
    /// Create a new web page parser
    pub fn new() -> Self {
        Self
    }
}

impl Default for WebsiteParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Parser for WebsiteParser {
    fn name(&self) -> &'static str {
        "website"
    }

    fn test(&self, input: &str) -> bool {
        is_valid_url(input)
    }

    async fn prepare_note(&self, input: &str, ctx: &ParseContext<'_>) -> Result<Note, NoteError> {
        if !self.test(input) {
            return Err(NoteError::InvalidInput(format!("Not a web URL: {}", input)));
        }
        let url = input.trim();

        debug!(url = %url, "Fetching web page");
        let request = HttpRequest::get(url).header("Accept", "text/html, application/xhtml+xml, */*;q=0.8");
        let body = ctx.client.request(&request).await?;
        let article = article_from_html(&body, url)?;

        let settings = ctx.settings;
        let filename_date = ctx.date_for_filename();
        let note = render_note(
            &settings.website_note,
            &article.tokens(&ctx.date_for_content()),
            &settings.website_note_title,
            &article.title_tokens(&filename_date),
        );

        if note.filename().trim() == NOTE_EXTENSION {
            return Ok(Note::new(
                format!("{}{}", filename_date, NOTE_EXTENSION),
                note.content(),
            ));
        }
        Ok(note)
    }
}

/// Check if a body looks like an HTML document
fn is_html(body: &str) -> bool {
    let head: String = body
        .trim_start()
        .chars()
        .take(1024)
        .collect::<String>()
        .to_lowercase();
    head.starts_with("<!doctype html") || head.contains("<html") || head.contains("<body")
}

/// Build an article record from a page
fn article_from_html(body: &str, url: &str) -> Result<Article, NoteError> {
    if !is_html(body) {
        return Err(NoteError::Parse(format!("{} did not return an HTML page", url)));
    }

    let document = Html::parse_document(body);
    let root = document.root_element();

    let title = select_first(root, r#"meta[property="og:title"]"#)
        .and_then(|meta| meta.value().attr("content"))
        .map(collapse_whitespace)
        .filter(|title| !title.is_empty())
        .or_else(|| select_first(root, "title").map(element_text))
        .unwrap_or_default();

    let content = CONTENT_SELECTORS
        .iter()
        .find_map(|selector| select_first(root, selector))
        .map(element_to_markdown)
        .unwrap_or_default();

    Ok(Article {
        title,
        url: url.to_string(),
        content,
    })
}

fn select_first<'a>(scope: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    scope.select(&selector).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_test() {
        let parser = WebsiteParser::new();
        assert!(parser.test("https://example.com/post"));
        assert!(parser.test("http://example.com"));
        assert!(!parser.test("plain text"));
        assert!(!parser.test("ftp://example.com/file"));
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("<!DOCTYPE html><html></html>"));
        assert!(is_html("  <html lang=\"en\">"));
        assert!(is_html("<body>hi</body>"));
        assert!(!is_html("{\"json\": true}"));
        assert!(!is_html("Hello world"));
    }

    #[test]
    fn test_article_prefers_og_title_and_article() {
        let html = r#"<!DOCTYPE html><html><head>
            <title>Fallback Title</title>
            <meta property="og:title" content="  Real   Title ">
            </head><body>
            <nav><a href="/">Home</a></nav>
            <article><h1>Heading</h1><p>Body text</p></article>
            <footer>Footer</footer>
            </body></html>"#;
        let article = article_from_html(html, "https://example.com/post").unwrap();

        assert_eq!(article.title, "Real Title");
        assert_eq!(article.url, "https://example.com/post");
        assert_eq!(article.content, "# Heading\n\nBody text");
    }

    #[test]
    fn test_article_falls_back_to_title_and_body() {
        let html = "<html><head><title>Page  Title</title></head><body><p>Only body</p></body></html>";
        let article = article_from_html(html, "https://example.com").unwrap();

        assert_eq!(article.title, "Page Title");
        assert_eq!(article.content, "Only body");
    }

    #[test]
    fn test_article_without_title() {
        let html = "<html><body><p>Text</p></body></html>";
        let article = article_from_html(html, "https://example.com").unwrap();
        assert_eq!(article.title, "");
    }

    #[test]
    fn test_non_html_rejected() {
        let result = article_from_html("{\"key\": \"value\"}", "https://example.com/api");
        assert!(matches!(result, Err(NoteError::Parse(_))));
    }
}
