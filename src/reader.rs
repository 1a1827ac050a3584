use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Reads daily notes named `YYYY-MM-DD.md` from a directory
pub struct MarkdownReader {
    directory: PathBuf,
}

impl MarkdownReader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the note for `date`, whether or not it exists
    pub fn daily_note_path(&self, date: NaiveDate) -> PathBuf {
        self.directory.join(format!("{}.md", date.format("%Y-%m-%d")))
    }

    /// Contents of the note for `date`, or `None` when there is no note
    pub fn read_daily_note(&self, date: NaiveDate) -> Result<Option<String>> {
        let path = self.daily_note_path(date);
        let content = read_note(&path)?;
        if content.is_none() {
            info!("No markdown file for {}", date);
        }
        Ok(content)
    }

    /// Markdown files directly inside the directory, sorted by name
    pub fn list_notes(&self) -> Result<Vec<PathBuf>> {
        let mut notes = Vec::new();
        for entry in WalkDir::new(&self.directory).min_depth(1).max_depth(1) {
            let entry = entry.with_context(|| format!("Failed to read {}", self.directory.display()))?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "md") {
                notes.push(path.to_path_buf());
            }
        }
        notes.sort();
        Ok(notes)
    }
}

/// Read a note, treating a missing file as `None`
pub fn read_note(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            debug!("Read {} bytes from {}", content.len(), path.display());
            Ok(Some(content))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}
