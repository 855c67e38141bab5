/*!
 * Translation session.
 *
 * This module handles:
 * - Loading and replacing the current file set
 * - Re-chunking when the chunk size changes
 * - Running the orchestrator over every loaded file
 * - Producing download artifacts
 */

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::app_config::Config;
use crate::chunking::{Chunker, FileRecord, InputFile};
use crate::formatter::{self, DownloadArtifact};
use crate::storage::KeyValueStore;
use crate::translation::{
    BatchSummary, CancellationFlag, HistoryEntry, HistoryLog, Orchestrator, ProgressObserver,
    ProviderChain,
};

use super::models::LoadReport;

/// Owns the loaded files and everything needed to translate them
pub struct TranslationSession {
    chunker: Chunker,
    orchestrator: Orchestrator,
    files: Vec<FileRecord>,
    preview_length: usize,
}

impl TranslationSession {
    /// Create a session from explicit parts
    pub fn new(chunker: Chunker, orchestrator: Orchestrator, preview_length: usize) -> Self {
        Self {
            chunker,
            orchestrator,
            files: Vec::new(),
            preview_length,
        }
    }

    /// Create the configured session over a durable store
    pub fn from_config(config: &Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        config.validate()?;

        let chain = ProviderChain::from_config(config, store.clone());
        let history = HistoryLog::new(store, config.history.max_entries);

        Ok(Self::new(
            Chunker::from_config(&config.chunking),
            Orchestrator::new(chain, history),
            config.chunking.preview_length,
        ))
    }

    /// Replace the current file set
    ///
    /// Rejected files are reported and skipped; they never prevent the
    /// others from loading.
    pub fn load_files(&mut self, inputs: Vec<InputFile>) -> LoadReport {
        self.files.clear();
        let mut report = LoadReport::default();

        for input in inputs {
            let name = input.name.clone();
            match self.chunker.load_file(input) {
                Ok(record) => {
                    info!("Loaded {} ({} chunks)", record.name, record.chunks.len());
                    report.accepted.push(name);
                    self.files.push(record);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", name, e);
                    report.rejected.push((name, e));
                }
            }
        }

        report
    }

    /// Drop every loaded file
    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    /// Change the chunk size and re-split every loaded file
    ///
    /// Translations recorded so far are discarded.
    pub fn set_chunk_size(&mut self, max_chunk_length: usize) {
        self.chunker.set_max_chunk_length(max_chunk_length);
        for record in &mut self.files {
            self.chunker.resplit(record);
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunker.max_chunk_length()
    }

    /// Chunks across all loaded files
    pub fn total_chunks(&self) -> usize {
        self.files.iter().map(|f| f.chunks.len()).sum()
    }

    /// Translated chunks across all loaded files
    pub fn translated_chunks(&self) -> usize {
        self.files.iter().map(|f| f.translated_count()).sum()
    }

    /// Beginning of a loaded file's content
    pub fn preview(&self, index: usize) -> Option<String> {
        self.files
            .get(index)
            .map(|f| Chunker::preview(&f.content, self.preview_length))
    }

    /// Translate every pending chunk of every loaded file
    pub async fn translate_all(
        &mut self,
        source_language: &str,
        target_language: &str,
        observer: &mut dyn ProgressObserver,
    ) -> BatchSummary {
        self.orchestrator
            .translate_all(&mut self.files, source_language, target_language, observer)
            .await
    }

    /// Use an existing cancellation flag
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.orchestrator = self.orchestrator.with_cancellation(cancellation);
        self
    }

    /// Handle that stops a running `translate_all`
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.orchestrator.cancellation_flag()
    }

    /// Artifact for one loaded file
    pub fn download(&self, index: usize) -> Option<DownloadArtifact> {
        self.files.get(index).map(formatter::render)
    }

    /// Single artifact for all loaded files
    pub fn download_all(&self) -> Option<DownloadArtifact> {
        let artifacts: Vec<DownloadArtifact> = self.files.iter().map(formatter::render).collect();
        formatter::bundle(&artifacts)
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.orchestrator.history().entries()
    }

    pub fn clear_history(&self) {
        self.orchestrator.history().clear();
    }

    /// Cache hits, misses and hit rate since the session started
    pub fn cache_stats(&self) -> (usize, usize, f64) {
        self.orchestrator.chain().cache().stats()
    }

    /// Empty the translation cache, returning the number of durable entries removed
    pub fn clear_cache(&self) -> usize {
        self.orchestrator.chain().cache().clear()
    }
}
