use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::chunking::{Chunker, InputFile};

// @module: File and directory utilities

/// Extensions accepted as input, lowercase
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["txt", "srt", "vtt", "csv", "json"];

/// Closed set of content formats understood by the formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Plain text
    Text,
    /// SubRip subtitles
    Srt,
    /// WebVTT subtitles
    Vtt,
    /// Comma separated values
    Csv,
    /// JSON document
    Json,
}

impl FileType {
    // @param ext: Extension without the dot, any case
    // @returns: Matching type, Text for anything unknown
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "srt" => Self::Srt,
            "vtt" => Self::Vtt,
            "csv" => Self::Csv,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    // @returns: Canonical extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @returns: Lowercase extension of a file name, if any
    pub fn extension_of(file_name: &str) -> Option<String> {
        Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    // @checks: Extension is in the accepted set
    pub fn has_supported_extension(file_name: &str) -> bool {
        Self::extension_of(file_name)
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    // @returns: MIME type for an output file name
    pub fn mime_type(file_name: &str) -> &'static str {
        match Self::extension_of(file_name).as_deref() {
            Some("txt") | Some("srt") => "text/plain",
            Some("vtt") => "text/vtt",
            Some("csv") => "text/csv",
            Some("json") => "application/json",
            _ => "text/plain",
        }
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Expand paths into input files
    ///
    /// Directories are walked recursively and only files with a supported
    /// extension are kept; plain file paths are taken as given so that the
    /// chunker can report rejections.
    pub fn collect_inputs<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                let mut found = Self::find_supported_files(path)?;
                found.sort();
                result.extend(found);
            } else {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Find files with a supported extension in a directory
    pub fn find_supported_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::has_supported_extension(&path.to_string_lossy()) {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Read a file into an `InputFile`
    ///
    /// The name and on-disk size are checked against `chunker` first, so a
    /// rejected file is never read.
    pub fn read_input<P: AsRef<Path>>(path: P, chunker: &Chunker) -> Result<InputFile> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let size = fs::metadata(path)
            .with_context(|| format!("Failed to read metadata: {:?}", path))?
            .len();
        chunker.check(&name, size)?;

        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read file: {:?}", path))?;

        Ok(InputFile::new(name, bytes))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
