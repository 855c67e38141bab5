/*!
 * File intake and chunking.
 *
 * Input files are validated against the extension allow-list and the size
 * limit, decoded as UTF-8, classified into a `FileType` and split into
 * ordered chunks small enough for a single backend request.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::app_config::ChunkingConfig;
use crate::errors::FileError;
use crate::file_utils::{FileManager, FileType};

/// Raw input as handed over by the caller
#[derive(Debug, Clone)]
pub struct InputFile {
    /// File name, used for classification and output naming
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Raw content
    pub bytes: Vec<u8>,
}

impl InputFile {
    /// Create an input file from a name and its bytes
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Create an input file from text
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::new(name, text.as_bytes().to_vec())
    }
}

/// A contiguous piece of a file's content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the file, 0-based and contiguous
    pub index: usize,

    /// Original text of this piece
    pub content: String,

    /// Whether a translation has been recorded
    pub translated: bool,

    /// Translated text, meaningful once `translated` is set
    pub translation: String,
}

impl Chunk {
    /// Create an untranslated chunk
    pub fn new(index: usize, content: String) -> Self {
        Self {
            index,
            content,
            translated: false,
            translation: String::new(),
        }
    }

    /// Record the translation of this chunk
    pub fn mark_translated(&mut self, translation: String) {
        self.translation = translation;
        self.translated = true;
    }

    /// Text to use when reassembling: the translation if present, else the original
    pub fn output_text(&self) -> &str {
        if self.translated && !self.translation.is_empty() {
            &self.translation
        } else {
            &self.content
        }
    }
}

/// An accepted input file with its chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// File name as given
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// Content format
    pub file_type: FileType,

    /// Decoded original content
    pub content: String,

    /// Chunks in index order
    pub chunks: Vec<Chunk>,
}

impl FileRecord {
    /// Number of chunks with a recorded translation
    pub fn translated_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.translated).count()
    }

    /// Whether every chunk has been translated
    pub fn is_complete(&self) -> bool {
        self.chunks.iter().all(|c| c.translated)
    }
}

/// Splits files into bounded chunks
#[derive(Debug, Clone)]
pub struct Chunker {
    max_chunk_length: usize,
    max_file_size: u64,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

impl Chunker {
    /// Create a chunker with explicit limits
    pub fn new(max_chunk_length: usize, max_file_size: u64) -> Self {
        Self {
            max_chunk_length: max_chunk_length.max(1),
            max_file_size,
        }
    }

    /// Create a chunker from the chunking configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.max_chunk_length, config.max_file_size)
    }

    /// Current maximum chunk length in characters
    pub fn max_chunk_length(&self) -> usize {
        self.max_chunk_length
    }

    /// Change the maximum chunk length; 0 is treated as 1
    pub fn set_max_chunk_length(&mut self, max_chunk_length: usize) {
        self.max_chunk_length = max_chunk_length.max(1);
    }

    /// Whether a file with this name and size may be loaded
    pub fn is_acceptable(&self, file_name: &str, byte_size: u64) -> bool {
        FileManager::has_supported_extension(file_name) && byte_size <= self.max_file_size
    }

    /// Content format for a file name; unknown extensions are plain text
    pub fn classify(file_name: &str) -> FileType {
        FileManager::extension_of(file_name)
            .map(|ext| FileType::from_extension(&ext))
            .unwrap_or(FileType::Text)
    }

    /// Split `content` into chunks of at most `max_chunk_length` characters
    ///
    /// Cuts are placed just after the rightmost newline, period or space in
    /// the window, falling back to a hard cut at the window edge. Lengths are
    /// counted in characters, never bytes.
    pub fn split(content: &str, max_chunk_length: usize) -> Vec<Chunk> {
        let max = max_chunk_length.max(1);
        let boundaries: Vec<(usize, char)> = content.char_indices().collect();
        let total = boundaries.len();

        if total <= max {
            return vec![Chunk::new(0, content.to_string())];
        }

        let byte_offset = |char_pos: usize| -> usize {
            if char_pos < total {
                boundaries[char_pos].0
            } else {
                content.len()
            }
        };

        let mut chunks = Vec::with_capacity(total / max + 1);
        let mut cursor = 0;

        while cursor < total {
            let mut end = (cursor + max).min(total);

            if end < total {
                // rightmost break strictly after the cursor
                if let Some(pos) = (cursor + 1..end)
                    .rev()
                    .find(|&i| matches!(boundaries[i].1, '\n' | '.' | ' '))
                {
                    end = pos + 1;
                }
            }

            let piece = &content[byte_offset(cursor)..byte_offset(end)];
            chunks.push(Chunk::new(chunks.len(), piece.to_string()));
            cursor = end;
        }

        chunks
    }

    /// First `max_length` characters of `content`, with "..." when truncated
    pub fn preview(content: &str, max_length: usize) -> String {
        match content.char_indices().nth(max_length) {
            Some((byte_pos, _)) => format!("{}...", &content[..byte_pos]),
            None => content.to_string(),
        }
    }

    /// Like `is_acceptable`, but says why a file is rejected
    pub fn check(&self, file_name: &str, byte_size: u64) -> Result<(), FileError> {
        if !FileManager::has_supported_extension(file_name) {
            return Err(FileError::Unsupported(file_name.to_string()));
        }

        if byte_size > self.max_file_size {
            return Err(FileError::TooLarge {
                name: file_name.to_string(),
                size: byte_size,
                limit: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate, decode, classify and split an input file
    pub fn load_file(&self, input: InputFile) -> Result<FileRecord, FileError> {
        self.check(&input.name, input.size)?;

        let InputFile { name, size, bytes } = input;
        let mut content = String::from_utf8(bytes).map_err(|_| FileError::Decode(name.clone()))?;
        if content.starts_with('\u{feff}') {
            content.remove(0);
        }

        let file_type = Self::classify(&name);
        let chunks = Self::split(&content, self.max_chunk_length);

        debug!("Loaded {} ({} bytes, {}) into {} chunks", name, size, file_type, chunks.len());

        Ok(FileRecord {
            name,
            size,
            file_type,
            content,
            chunks,
        })
    }

    /// Re-split a record with the current chunk length, discarding translations
    pub fn resplit(&self, record: &mut FileRecord) {
        record.chunks = Self::split(&record.content, self.max_chunk_length);
    }
}
