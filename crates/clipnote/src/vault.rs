//! Note storage
//!
//! [`VaultRepository`] is the storage seam; parsers never call it. The
//! [`Pipeline`](crate::Pipeline) hands finished notes to it.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::error::NoteError;
use crate::types::{Note, NOTE_EXTENSION};

/// Characters that are unsafe in note filenames
const FORBIDDEN_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|', '#', '^', '[', ']'];

/// Filename used when nothing usable is left after normalization
const UNTITLED: &str = "Untitled";

/// Storage capability for notes
#[async_trait]
pub trait VaultRepository: Send + Sync {
    /// Save a new note, failing if it already exists
    async fn save_note(&self, note: &Note) -> Result<PathBuf, NoteError>;

    /// Append to a note, creating it when missing
    async fn append_to_existing_note(&self, note: &Note) -> Result<PathBuf, NoteError>;

    /// Create a directory (and parents) inside the vault
    async fn create_directory(&self, path: &Path) -> Result<(), NoteError>;

    /// Check whether a vault path exists
    async fn exists(&self, path: &Path) -> bool;

    /// Resolve a vault path to an existing file
    fn get_file_by_path(&self, path: &Path) -> Option<PathBuf>;
}

/// Make a rendered filename safe to use as a single path segment
///
/// The `.md` extension is kept (or added).
pub fn normalize_filename(filename: &str) -> String {
    let stem = filename.strip_suffix(NOTE_EXTENSION).unwrap_or(filename);
    let cleaned: String = stem
        .chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c) && !c.is_control())
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = cleaned.trim_matches('.').trim();

    let stem = if cleaned.is_empty() { UNTITLED } else { cleaned };
    format!("{}{}", stem, NOTE_EXTENSION)
}

/// Write a freshly created note, deleting it again if the write fails
async fn write_or_remove<W>(mut writer: W, path: &Path, content: &[u8]) -> Result<(), NoteError>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(content).await?;
        writer.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(writer);
        if let Err(remove) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %remove, "Failed to remove partial note");
        }
        return Err(e.into());
    }
    Ok(())
}

/// Vault stored in a local directory
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    inbox_dir: PathBuf,
}

impl FsVault {
    /// Create a vault rooted at `root`, saving notes into `inbox_dir`
    pub fn new(root: impl Into<PathBuf>, inbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            inbox_dir: inbox_dir.into(),
        }
    }

    /// Absolute path for a vault-relative path
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Vault-relative path a note is stored at
    pub fn note_path(&self, note: &Note) -> PathBuf {
        self.inbox_dir.join(normalize_filename(note.filename()))
    }
}

#[async_trait]
impl VaultRepository for FsVault {
    async fn save_note(&self, note: &Note) -> Result<PathBuf, NoteError> {
        self.create_directory(&self.inbox_dir).await?;
        let path = self.resolve(&self.note_path(note));

        let file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(NoteError::NoteExists(path));
            }
            Err(e) => return Err(e.into()),
        };
        write_or_remove(file, &path, note.content().as_bytes()).await?;

        info!(path = %path.display(), "Saved note");
        Ok(path)
    }

    async fn append_to_existing_note(&self, note: &Note) -> Result<PathBuf, NoteError> {
        self.create_directory(&self.inbox_dir).await?;
        let path = self.resolve(&self.note_path(note));

        let has_content = fs::metadata(&path)
            .await
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        if has_content {
            file.write_all(b"\n\n").await?;
        }
        file.write_all(note.content().as_bytes()).await?;
        file.flush().await?;

        info!(path = %path.display(), "Appended to note");
        Ok(path)
    }

    async fn create_directory(&self, path: &Path) -> Result<(), NoteError> {
        fs::create_dir_all(self.resolve(path)).await?;
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }

    fn get_file_by_path(&self, path: &Path) -> Option<PathBuf> {
        let full = self.resolve(path);
        full.is_file().then_some(full)
    }
}
