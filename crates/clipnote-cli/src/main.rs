//! ClipNote CLI - Turn clipboard content into markdown notes

use clap::{Parser, Subcommand, ValueEnum};
use clipnote::{FsVault, Note, NoteError, NoteSettings, Pipeline, SaveMode, TOKENS_HELP};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

/// Output format for the note subcommand
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Markdown with YAML frontmatter
    #[default]
    Md,
    /// JSON format
    Json,
}

/// ClipNote - save links and snippets as markdown notes
#[derive(Parser, Debug)]
#[command(name = "clipnote")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print the template token reference
    #[arg(long)]
    tokens: bool,

    /// Print the JSON schema of the settings file
    #[arg(long)]
    settings_schema: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a note from a URL or text (read from stdin when omitted)
    Note {
        /// Clipboard content
        input: Option<String>,

        /// Vault root directory
        #[arg(long, default_value = ".")]
        vault: PathBuf,

        /// JSON settings file
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Append to an existing note instead of failing
        #[arg(long)]
        append: bool,

        /// Print the note without saving it
        #[arg(long)]
        print: bool,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: OutputFormat,
    },
}

/// Options for a single note run
struct NoteArgs {
    input: Option<String>,
    vault: PathBuf,
    settings: Option<PathBuf>,
    append: bool,
    print: bool,
    output: OutputFormat,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.tokens {
        writeln_safe(TOKENS_HELP);
        std::process::exit(0);
    }

    if cli.settings_schema {
        match serde_json::to_string_pretty(&NoteSettings::json_schema()) {
            Ok(schema) => writeln_safe(&schema),
            Err(e) => {
                eprintln!("Error serializing schema: {}", e);
                std::process::exit(1);
            }
        }
        std::process::exit(0);
    }

    match cli.command {
        Some(Commands::Note {
            input,
            vault,
            settings,
            append,
            print,
            output,
        }) => {
            let args = NoteArgs {
                input,
                vault,
                settings,
                append,
                print,
                output,
            };
            if let Err(e) = run_note(args).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            eprintln!("Usage: clipnote note <INPUT>");
            eprintln!("   or: clipnote --tokens");
            eprintln!("   or: clipnote --help");
            std::process::exit(1);
        }
    }
}

async fn run_note(args: NoteArgs) -> Result<(), NoteError> {
    let settings = match args.settings {
        Some(ref path) => NoteSettings::from_file(path)?,
        None => NoteSettings::default(),
    };
    let input = match args.input {
        Some(input) => input,
        None => read_stdin().await?,
    };

    let pipeline = Pipeline::builder().settings(settings).build()?;
    let note = pipeline.prepare(&input).await?;

    let path = if args.print {
        None
    } else {
        let vault = FsVault::new(&args.vault, &pipeline.settings().inbox_dir);
        let mode = if args.append {
            SaveMode::Append
        } else {
            SaveMode::Create
        };
        Some(pipeline.save(&note, &vault, mode).await?)
    };

    match args.output {
        OutputFormat::Md => writeln_safe(&format_md_with_frontmatter(&note, path.as_deref())),
        OutputFormat::Json => {
            let output = NoteOutput {
                note: &note,
                path: path.as_deref().map(|p| p.display().to_string()),
            };
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| NoteError::Settings(format!("Error serializing note: {}", e)))?;
            writeln_safe(&json);
        }
    }
    Ok(())
}

async fn read_stdin() -> Result<String, NoteError> {
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    Ok(input)
}

/// JSON output: the note plus where it was saved
#[derive(Serialize)]
struct NoteOutput<'a> {
    #[serde(flatten)]
    note: &'a Note,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

/// Format a note as markdown with YAML frontmatter
fn format_md_with_frontmatter(note: &Note, path: Option<&Path>) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("filename: {}\n", note.filename()));
    if let Some(path) = path {
        output.push_str(&format!("saved_to: {}\n", path.display()));
    }
    output.push_str("---\n");
    output.push_str(note.content());

    output
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    async fn text_note(input: &str) -> Note {
        let settings = NoteSettings {
            text_snippet_note_title: "Snippet".to_string(),
            ..Default::default()
        };
        Pipeline::builder()
            .settings(settings)
            .build()
            .unwrap()
            .prepare(input)
            .await
            .unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_note_args() {
        let cli = Cli::parse_from([
            "clipnote",
            "note",
            "https://example.com",
            "--vault",
            "/tmp/vault",
            "--append",
            "-o",
            "json",
        ]);
        match cli.command {
            Some(Commands::Note {
                input,
                vault,
                append,
                print,
                output,
                ..
            }) => {
                assert_eq!(input.as_deref(), Some("https://example.com"));
                assert_eq!(vault, PathBuf::from("/tmp/vault"));
                assert!(append);
                assert!(!print);
                assert!(matches!(output, OutputFormat::Json));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_format_md_printed_only() {
        let note = text_note("hello").await;
        let output = format_md_with_frontmatter(&note, None);

        assert!(output.starts_with("---\nfilename: Snippet.md\n---\n"));
        assert!(!output.contains("saved_to"));
        assert!(output.ends_with("hello"));
    }

    #[tokio::test]
    async fn test_format_md_with_path() {
        let note = text_note("hello").await;
        let output = format_md_with_frontmatter(&note, Some(Path::new("/vault/Inbox/Snippet.md")));

        assert!(output.contains("saved_to: /vault/Inbox/Snippet.md\n"));
    }

    #[tokio::test]
    async fn test_json_output() {
        let note = text_note("hello").await;
        let output = NoteOutput {
            note: &note,
            path: None,
        };
        let value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["filename"], "Snippet.md");
        assert!(value["content"].as_str().unwrap().ends_with("hello"));
        assert!(value.get("path").is_none());
    }
}
