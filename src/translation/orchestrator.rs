/*!
 * Sequential translation of loaded files.
 *
 * Files are processed strictly in order and chunks strictly by index, one
 * chain call at a time. Progress is reported to a `ProgressObserver` and a
 * shared `CancellationFlag` is checked before every chunk.
 */

use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::chain::ProviderChain;
use super::history::{HistoryEntry, HistoryLog};
use crate::chunking::FileRecord;

/// Snapshot reported after each chunk
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Position of the current file in the batch
    pub file_index: usize,
    pub file_name: String,
    pub total_files: usize,
    /// Completed chunks over all chunks in the batch, 0.0 to 1.0
    pub overall_progress: f64,
    /// Completed chunks over the chunks of the current file, 0.0 to 1.0
    pub file_progress: f64,
    /// Index of the chunk just completed
    pub chunk_index: usize,
}

/// Receives progress while a batch runs
pub trait ProgressObserver {
    /// Called after every chunk, including chunks skipped as already translated
    fn on_progress(&mut self, progress: &Progress);

    /// Called once a file has every chunk translated
    fn on_file_complete(&mut self, _file_index: usize, _record: &FileRecord) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&mut self, _progress: &Progress) {}
}

/// Event forwarded by `ChannelObserver`
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Progress(Progress),
    FileComplete { file_index: usize, file_name: String },
}

/// Observer forwarding events over an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelObserver {
    /// Observer and the receiving end of its channel
    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    fn forward(&self, event: ProgressEvent) {
        // receiver may be gone; progress is best effort
        let _ = self.sender.send(event);
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(&mut self, progress: &Progress) {
        self.forward(ProgressEvent::Progress(progress.clone()));
    }

    fn on_file_complete(&mut self, file_index: usize, record: &FileRecord) {
        self.forward(ProgressEvent::FileComplete {
            file_index,
            file_name: record.name.clone(),
        });
    }
}

/// Cloneable flag that stops a running batch before its next chunk
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag so that a new batch can run
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Outcome of `translate_all`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files with every chunk translated
    pub files_completed: usize,
    /// Chunks translated during this run, skipped chunks excluded
    pub chunks_translated: usize,
    /// Whether the run stopped early
    pub cancelled: bool,
}

/// Result of running one file
struct FileOutcome {
    completed: bool,
    translated: usize,
}

/// Drives the chain over files and records history
pub struct Orchestrator {
    chain: ProviderChain,
    history: HistoryLog,
    cancellation: CancellationFlag,
}

impl Orchestrator {
    pub fn new(chain: ProviderChain, history: HistoryLog) -> Self {
        Self {
            chain,
            history,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Share an existing cancellation flag
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Handle for cancelling from elsewhere
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Translate every pending chunk of one file
    ///
    /// `on_chunk(chunk_index, completed, total)` is called after each chunk.
    /// Returns whether the file finished; a cancelled file gets no history
    /// entry.
    pub async fn translate_file<F>(
        &self,
        record: &mut FileRecord,
        source_language: &str,
        target_language: &str,
        mut on_chunk: F,
    ) -> bool
    where
        F: FnMut(usize, usize, usize),
    {
        self.run_file(record, source_language, target_language, &mut on_chunk)
            .await
            .completed
    }

    /// Translate files in order, reporting progress across the whole batch
    pub async fn translate_all(
        &self,
        records: &mut [FileRecord],
        source_language: &str,
        target_language: &str,
        observer: &mut dyn ProgressObserver,
    ) -> BatchSummary {
        let total_files = records.len();
        let total_chunks: usize = records.iter().map(|r| r.chunks.len()).sum();
        let mut completed_chunks = 0usize;
        let mut summary = BatchSummary::default();

        info!(
            "Translating {} files ({} chunks) from {} to {}",
            total_files, total_chunks, source_language, target_language
        );

        for (file_index, record) in records.iter_mut().enumerate() {
            let file_name = record.name.clone();

            let outcome = {
                let mut report = |chunk_index: usize, done: usize, file_total: usize| {
                    completed_chunks += 1;
                    observer.on_progress(&Progress {
                        file_index,
                        file_name: file_name.clone(),
                        total_files,
                        overall_progress: ratio(completed_chunks, total_chunks),
                        file_progress: ratio(done, file_total),
                        chunk_index,
                    });
                };
                self.run_file(record, source_language, target_language, &mut report).await
            };

            summary.chunks_translated += outcome.translated;

            if !outcome.completed {
                summary.cancelled = true;
                warn!("Translation cancelled during {}", file_name);
                break;
            }

            summary.files_completed += 1;
            observer.on_file_complete(file_index, record);
        }

        summary
    }

    async fn run_file(
        &self,
        record: &mut FileRecord,
        source_language: &str,
        target_language: &str,
        on_chunk: &mut dyn FnMut(usize, usize, usize),
    ) -> FileOutcome {
        let start = Instant::now();
        let total = record.chunks.len();
        let mut translated = 0;

        for position in 0..total {
            if self.cancellation.is_cancelled() {
                return FileOutcome { completed: false, translated };
            }

            let chunk = &record.chunks[position];
            let chunk_index = chunk.index;

            if !chunk.translated {
                let content = chunk.content.clone();
                let translation = self.chain.translate(&content, source_language, target_language).await;
                record.chunks[position].mark_translated(translation);
                translated += 1;
            }

            on_chunk(chunk_index, position + 1, total);
        }

        let duration_secs = start.elapsed().as_secs_f64().round() as u64;
        self.history.add(HistoryEntry::new(
            record.name.clone(),
            source_language,
            target_language,
            duration_secs,
            total,
            record.size,
        ));

        info!("Translated {} ({} chunks) in {}s", record.name, total, duration_secs);

        FileOutcome { completed: true, translated }
    }
}

fn ratio(done: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        done as f64 / total as f64
    }
}
