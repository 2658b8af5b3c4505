//! Clipboard-to-note pipeline
//!
//! Entry point for hosts: resolves a parser for the clipboard text, builds
//! the note, and optionally hands it to a vault. Failures are reported once
//! through the configured [`ErrorReporter`] and then returned.

use std::path::PathBuf;

use crate::error::NoteError;
use crate::http::{HttpClient, ReqwestClient};
use crate::parsers::{ParseContext, ParserRegistry};
use crate::report::{ErrorReporter, TracingReporter};
use crate::types::{Note, NoteSettings};
use crate::vault::VaultRepository;
use crate::DEFAULT_USER_AGENT;

/// How a note is written to the vault
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveMode {
    /// Create a new note, failing if it exists
    #[default]
    Create,
    /// Append to the note, creating it if missing
    Append,
}

/// Builder for configuring a [`Pipeline`]
#[derive(Default)]
pub struct PipelineBuilder {
    settings: Option<NoteSettings>,
    registry: Option<ParserRegistry>,
    client: Option<Box<dyn HttpClient>>,
    reporter: Option<Box<dyn ErrorReporter>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set note settings
    pub fn settings(mut self, settings: NoteSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Use a custom parser registry
    pub fn registry(mut self, registry: ParserRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use a custom HTTP client
    pub fn client(mut self, client: impl HttpClient + 'static) -> Self {
        self.client = Some(Box::new(client));
        self
    }

    /// Use a custom error reporter
    pub fn reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Build the pipeline
    ///
    /// Unset parts default to the built-in parsers, a reqwest client using
    /// the configured User-Agent, and tracing-based reporting.
    pub fn build(self) -> Result<Pipeline, NoteError> {
        let settings = self.settings.unwrap_or_default();
        let client = match self.client {
            Some(client) => client,
            None => {
                let user_agent = settings.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
                Box::new(ReqwestClient::with_user_agent(user_agent)?)
            }
        };

        Ok(Pipeline {
            settings,
            registry: self.registry.unwrap_or_else(ParserRegistry::with_defaults),
            client,
            reporter: self
                .reporter
                .unwrap_or_else(|| Box::new(TracingReporter)),
        })
    }
}

/// Configured clipboard-to-note pipeline
pub struct Pipeline {
    settings: NoteSettings,
    registry: ParserRegistry,
    client: Box<dyn HttpClient>,
    reporter: Box<dyn ErrorReporter>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Settings used for every note
    pub fn settings(&self) -> &NoteSettings {
        &self.settings
    }

    /// Parser names in priority order
    pub fn parser_names(&self) -> Vec<&'static str> {
        self.registry.parser_names()
    }

    /// Build a note from clipboard text
    pub async fn prepare(&self, input: &str) -> Result<Note, NoteError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(self.fail("pipeline", NoteError::InvalidInput("Clipboard is empty".to_string())));
        }

        let parser = self
            .registry
            .resolve(input)
            .map_err(|e| self.fail("dispatch", e))?;

        let ctx = ParseContext::new(&self.settings, self.client.as_ref());
        parser
            .prepare_note(input, &ctx)
            .await
            .map_err(|e| self.fail(parser.name(), e))
    }

    /// Write a note to the vault
    pub async fn save(
        &self,
        note: &Note,
        vault: &dyn VaultRepository,
        mode: SaveMode,
    ) -> Result<PathBuf, NoteError> {
        let result = match mode {
            SaveMode::Create => vault.save_note(note).await,
            SaveMode::Append => vault.append_to_existing_note(note).await,
        };
        result.map_err(|e| self.fail("vault", e))
    }

    /// Build a note from clipboard text and write it to the vault
    pub async fn process(
        &self,
        input: &str,
        vault: &dyn VaultRepository,
        mode: SaveMode,
    ) -> Result<PathBuf, NoteError> {
        let note = self.prepare(input).await?;
        self.save(&note, vault, mode).await
    }

    fn fail(&self, stage: &str, error: NoteError) -> NoteError {
        self.reporter.report(stage, &error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpRequest;
    use crate::vault::FsVault;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct FailingClient;

    #[async_trait]
    impl HttpClient for FailingClient {
        async fn request(&self, request: &HttpRequest) -> Result<String, NoteError> {
            Err(NoteError::Fetch(format!("unreachable: {}", request.url)))
        }
    }

    #[derive(Clone, Default)]
    struct Collecting(Arc<Mutex<Vec<(String, String)>>>);

    impl ErrorReporter for Collecting {
        fn report(&self, stage: &str, error: &NoteError) {
            self.0
                .lock()
                .unwrap()
                .push((stage.to_string(), error.to_string()));
        }
    }

    fn pipeline(reporter: Collecting) -> Pipeline {
        Pipeline::builder()
            .client(FailingClient)
            .reporter(reporter)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.settings(), &NoteSettings::default());
        assert_eq!(
            pipeline.parser_names(),
            vec!["youtube", "twitter", "website", "text_snippet"]
        );
    }

    #[tokio::test]
    async fn test_text_needs_no_network() {
        let reporter = Collecting::default();
        let note = pipeline(reporter.clone())
            .prepare("  buy milk  ")
            .await
            .unwrap();

        assert!(note.content().ends_with("\n\nbuy milk"));
        assert!(note.filename().starts_with("Notice "));
        assert!(reporter.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_reported_once() {
        let reporter = Collecting::default();
        let result = pipeline(reporter.clone())
            .prepare("https://youtu.be/abc123")
            .await;

        assert!(matches!(result, Err(NoteError::Fetch(_))));
        let reports = reporter.0.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, "youtube");
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let reporter = Collecting::default();
        let result = pipeline(reporter.clone()).prepare("   ").await;

        assert!(matches!(result, Err(NoteError::InvalidInput(_))));
        assert_eq!(reporter.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_registry_reports_no_match() {
        let reporter = Collecting::default();
        let pipeline = Pipeline::builder()
            .client(FailingClient)
            .registry(ParserRegistry::new())
            .reporter(reporter.clone())
            .build()
            .unwrap();

        let result = pipeline.prepare("anything").await;
        assert!(matches!(result, Err(NoteError::NoParserMatched)));
        assert_eq!(reporter.0.lock().unwrap()[0].0, "dispatch");
    }

    #[tokio::test]
    async fn test_process_saves_and_reports_duplicates() {
        let dir = tempfile::TempDir::new().unwrap();
        let vault = FsVault::new(dir.path(), "Inbox");
        let reporter = Collecting::default();
        let settings = NoteSettings {
            text_snippet_note_title: "Fixed".to_string(),
            ..Default::default()
        };
        let pipeline = Pipeline::builder()
            .settings(settings)
            .client(FailingClient)
            .reporter(reporter.clone())
            .build()
            .unwrap();

        let path = pipeline
            .process("first", &vault, SaveMode::Create)
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("Inbox").join("Fixed.md"));

        let result = pipeline.process("second", &vault, SaveMode::Create).await;
        assert!(matches!(result, Err(NoteError::NoteExists(_))));
        assert_eq!(reporter.0.lock().unwrap()[0].0, "vault");

        pipeline
            .process("second", &vault, SaveMode::Append)
            .await
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("first\n\n[[ReadItLater]] [[Textsnippet]]\n\nsecond"));
    }
}
