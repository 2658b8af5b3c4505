//! `%token%` substitution for note templates
//!
//! Templates are user-authored, so unknown tokens are left as-is and a
//! lone `%` is plain text. Values are inserted verbatim and never scanned
//! again, which keeps fetched text like `"100%done%"` from being expanded.

use std::collections::BTreeMap;

const DELIMITER: char = '%';

/// Token name to value mapping for one render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    values: BTreeMap<&'static str, String>,
}

impl Tokens {
    /// Create an empty token map
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a token value (name without the `%` delimiters)
    pub fn set(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    /// Look up a token value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Supplied token names, sorted
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Render a template by substituting every known `%token%`
pub fn render(template: &str, tokens: &Tokens) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find(DELIMITER) {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let Some(close) = after_open.find(DELIMITER) else {
            // No closing delimiter left
            output.push_str(&rest[open..]);
            return output;
        };

        match tokens.get(&after_open[..close]) {
            Some(value) => {
                output.push_str(value);
                rest = &after_open[close + 1..];
            }
            None => {
                // Keep the text; the closing `%` may open the next token
                output.push(DELIMITER);
                output.push_str(&after_open[..close]);
                rest = &after_open[close..];
            }
        }
    }

    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_tokens() -> Tokens {
        Tokens::new()
            .set("videoTitle", "Sample")
            .set("videoId", "abc123")
            .set("channelName", "")
            .set("date", "2024-01-01")
    }

    #[test]
    fn test_template_without_tokens_unchanged() {
        let tokens = video_tokens();
        for template in [
            "",
            "plain text",
            "100% sure",
            "50% off, 20% more",
            "%%",
            "%unknown%",
            "trailing %",
            "ünïcödé % text",
        ] {
            assert_eq!(render(template, &tokens), template);
        }
    }

    #[test]
    fn test_every_occurrence_substituted() {
        let tokens = video_tokens();
        let out = render("%videoTitle% (%videoId%) - %videoTitle%%videoTitle%", &tokens);
        assert_eq!(out, "Sample (abc123) - SampleSample");
        assert!(!out.contains("%videoTitle%"));
    }

    #[test]
    fn test_unknown_token_left_verbatim() {
        let tokens = video_tokens();
        assert_eq!(
            render("%videoTitle% by %author%", &tokens),
            "Sample by %author%"
        );
    }

    #[test]
    fn test_stray_percent_before_token() {
        let tokens = video_tokens();
        assert_eq!(render("100% of %videoTitle%", &tokens), "100% of Sample");
        assert_eq!(render("%%videoId%%", &tokens), "%abc123%");
    }

    #[test]
    fn test_text_between_stray_percents_kept() {
        let tokens = video_tokens();
        assert_eq!(
            render("%author% wrote %videoTitle%", &tokens),
            "%author% wrote Sample"
        );
        assert_eq!(
            render("50% off, 20% more for %videoId%", &tokens),
            "50% off, 20% more for abc123"
        );
        assert_eq!(render("%a%b%videoId%", &tokens), "%a%babc123");
    }

    #[test]
    fn test_empty_value_substituted() {
        let tokens = video_tokens();
        assert_eq!(render("[%channelName%]", &tokens), "[]");
    }

    #[test]
    fn test_values_not_rescanned() {
        let tokens = Tokens::new()
            .set("title", "%videoId%")
            .set("videoId", "abc123");
        assert_eq!(render("%title%", &tokens), "%videoId%");
    }

    #[test]
    fn test_token_names() {
        let tokens = video_tokens();
        let names: Vec<_> = tokens.names().collect();
        assert_eq!(names, vec!["channelName", "date", "videoId", "videoTitle"]);
        assert_eq!(tokens.len(), 4);
        assert!(Tokens::new().is_empty());
    }
}
