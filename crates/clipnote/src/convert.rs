//! HTML to markdown conversion for note bodies
//!
//! Works on the parsed DOM from `scraper`, so entities are already decoded
//! and unbalanced markup is repaired before conversion.

use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Elements whose content never ends up in a note
const SKIP_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "template", "head", "nav",
];

/// Elements rendered as separate paragraphs
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "figure", "table", "tr",
];

/// Convert an HTML fragment to markdown
pub fn html_to_markdown(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    element_to_markdown(fragment.root_element())
}

/// Convert the children of an element to markdown
pub fn element_to_markdown(element: ElementRef<'_>) -> String {
    let mut writer = MarkdownWriter::default();
    writer.children(element);
    tidy(&writer.out)
}

/// Text content of an element with whitespace runs collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Collapse whitespace runs to single spaces and trim
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Default)]
struct MarkdownWriter {
    out: String,
    list_depth: usize,
    in_pre: bool,
}

impl MarkdownWriter {
    fn children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.element(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        if SKIP_ELEMENTS.contains(&name) {
            return;
        }

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                self.block_break();
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
                self.children(element);
                self.block_break();
            }
            "br" => self.out.push('\n'),
            "hr" => {
                self.block_break();
                self.out.push_str("---");
                self.block_break();
            }
            "ul" | "ol" => {
                self.list_depth += 1;
                self.children(element);
                self.list_depth -= 1;
                if self.list_depth == 0 {
                    self.block_break();
                }
            }
            "li" => {
                self.line_break();
                self.out
                    .push_str(&"  ".repeat(self.list_depth.saturating_sub(1)));
                self.out.push_str("- ");
                self.children(element);
            }
            "strong" | "b" => self.wrapped(element, "**"),
            "em" | "i" => self.wrapped(element, "*"),
            "code" if !self.in_pre => self.wrapped(element, "`"),
            "pre" => {
                self.block_break();
                self.out.push_str("```\n");
                self.in_pre = true;
                self.children(element);
                self.in_pre = false;
                self.line_break();
                self.out.push_str("```");
                self.block_break();
            }
            "blockquote" => {
                let inner = element_to_markdown(element);
                self.block_break();
                let quoted: Vec<String> = inner
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {}", line)
                        }
                    })
                    .collect();
                self.out.push_str(&quoted.join("\n"));
                self.block_break();
            }
            "a" => {
                let label = element_to_markdown(element);
                match element.value().attr("href").filter(|h| !h.is_empty()) {
                    Some(href) if !label.is_empty() => {
                        self.out.push_str(&format!("[{}]({})", label, href));
                    }
                    _ => self.out.push_str(&label),
                }
            }
            "img" => {
                if let Some(src) = element.value().attr("src") {
                    let alt = element.value().attr("alt").unwrap_or_default();
                    self.out.push_str(&format!("![{}]({})", alt, src));
                }
            }
            _ if BLOCK_ELEMENTS.contains(&name) => {
                self.block_break();
                self.children(element);
                self.block_break();
            }
            _ => self.children(element),
        }
    }

    fn wrapped(&mut self, element: ElementRef<'_>, marker: &str) {
        self.out.push_str(marker);
        self.children(element);
        self.out.push_str(marker);
    }

    fn text(&mut self, text: &str) {
        if self.in_pre {
            self.out.push_str(text);
            return;
        }
        for c in text.chars() {
            if c.is_whitespace() {
                if !self.out.is_empty() && !self.out.ends_with([' ', '\n']) {
                    self.out.push(' ');
                }
            } else {
                self.out.push(c);
            }
        }
    }

    fn line_break(&mut self) {
        trim_trailing_spaces(&mut self.out);
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn block_break(&mut self) {
        trim_trailing_spaces(&mut self.out);
        if self.out.is_empty() {
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }
}

fn trim_trailing_spaces(s: &mut String) {
    let trimmed = s.trim_end_matches(' ').len();
    s.truncate(trimmed);
}

/// Strip trailing spaces per line and keep at most one blank line
fn tidy(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut blank_run = 0;

    for line in s.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        result.push_str(line);
        result.push('\n');
    }

    result.trim().to_string()
}
