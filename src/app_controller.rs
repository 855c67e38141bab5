use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::chunking::{Chunker, FileRecord, InputFile};
use crate::file_utils::FileManager;
use crate::formatter::DownloadArtifact;
use crate::language_utils;
use crate::session::{TranslationSession, format_file_size};
use crate::storage::{KeyValueStore, MemoryStore, SqliteStore};
use crate::translation::{
    BatchSummary, CancellationFlag, HistoryEntry, HistoryLog, Progress, ProgressObserver,
    TranslationCache,
};

// @module: Application controller for file translation

/// What a `translate` run should do
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    // @field: Files or directories to translate
    pub inputs: Vec<PathBuf>,
    // @field: Where artifacts are written, current directory when absent
    pub output_dir: Option<PathBuf>,
    // @field: Write one bundled file instead of one file per input
    pub bundle: bool,
}

/// Outcome of a `translate` run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub summary: BatchSummary,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

/// Summary shown by the `preview` command
#[derive(Debug, Clone)]
pub struct FilePreview {
    pub name: String,
    pub size: String,
    pub file_type: String,
    pub chunk_count: usize,
    pub detected_language: String,
    pub preview: String,
}

/// Main application controller for file translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Durable store for cache and history
    store: Arc<dyn KeyValueStore>,
    // @field: Shared with the Ctrl-C handler
    cancellation: CancellationFlag,
}

impl Controller {
    /// Create a new controller for test purposes with an in-memory store
    pub fn new_for_test() -> Self {
        Self::with_store(Config::default(), Arc::new(MemoryStore::new()))
    }

    // @method: Create a controller backed by the configured SQLite store
    pub fn with_config(config: Config) -> Result<Self> {
        let store = match &config.cache.database_path {
            Some(path) => SqliteStore::open(path)?,
            None => SqliteStore::open_default()?,
        };
        Ok(Self::with_store(config, Arc::new(store)))
    }

    // @method: Create a controller over any store
    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            config,
            store,
            cancellation: CancellationFlag::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Flag that stops a running translation before its next chunk
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Translate the inputs and write the artifacts
    pub async fn run(&self, options: RunOptions) -> Result<RunReport> {
        let start_time = std::time::Instant::now();
        let source_language = language_utils::normalize_code(&self.config.source_language)?;
        let target_language = language_utils::normalize_code(&self.config.target_language)?;

        let paths = FileManager::collect_inputs(options.inputs.as_slice())?;
        if paths.is_empty() {
            return Err(anyhow!("No input files found"));
        }

        let chunker = Chunker::from_config(&self.config.chunking);
        let mut report = RunReport::default();
        let mut inputs = Vec::with_capacity(paths.len());
        for path in &paths {
            match FileManager::read_input(path, &chunker) {
                Ok(input) => inputs.push(input),
                Err(e) => {
                    error!("{:#}", e);
                    report.skipped.push(path.to_string_lossy().to_string());
                }
            }
        }

        let mut session = TranslationSession::from_config(&self.config, self.store.clone())?
            .with_cancellation(self.cancellation.clone());

        let load = session.load_files(inputs);
        report.skipped.extend(load.rejected.into_iter().map(|(name, _)| name));

        if session.files().is_empty() {
            return Err(anyhow!("None of the inputs could be loaded"));
        }

        info!(
            "Translating {} file(s), {} chunk(s), {} -> {}",
            session.files().len(),
            session.total_chunks(),
            source_language,
            target_language
        );

        let mut observer = ProgressBarObserver::new(session.files());
        report.summary = session
            .translate_all(&source_language, &target_language, &mut observer)
            .await;
        observer.finish();

        if report.summary.cancelled {
            warn!("Translation cancelled, writing what was translated so far");
        }

        let output_dir = options.output_dir.unwrap_or_else(|| PathBuf::from("."));
        FileManager::ensure_dir(&output_dir)?;

        let artifacts: Vec<DownloadArtifact> = if options.bundle {
            session.download_all().into_iter().collect()
        } else {
            (0..session.files().len())
                .filter_map(|index| session.download(index))
                .collect()
        };

        let mut used_names = HashSet::new();
        for artifact in artifacts {
            let file_name = unique_file_name(&artifact.file_name, &mut used_names);
            if file_name != artifact.file_name {
                warn!(
                    "{} was already written in this run, saving the next one as {}",
                    artifact.file_name, file_name
                );
            }
            report.written.push(write_artifact(&output_dir, &file_name, &artifact)?);
        }

        let (hits, misses, _) = session.cache_stats();
        info!(
            "Done in {:.1}s: {} file(s) completed, {} chunk(s) translated, cache {} hit(s) / {} miss(es)",
            start_time.elapsed().as_secs_f64(),
            report.summary.files_completed,
            report.summary.chunks_translated,
            hits,
            misses
        );

        Ok(report)
    }

    /// Describe a file without translating it
    pub fn preview<P: AsRef<Path>>(&self, path: P, length: Option<usize>) -> Result<FilePreview> {
        let record = self.load_single(path)?;
        let length = length.unwrap_or(self.config.chunking.preview_length);

        Ok(FilePreview {
            size: format_file_size(record.size),
            file_type: record.file_type.to_string(),
            chunk_count: record.chunks.len(),
            detected_language: language_utils::detect_language(&record.content),
            preview: Chunker::preview(&record.content, length),
            name: record.name,
        })
    }

    /// Guess the language of a file
    pub fn detect<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let record = self.load_single(path)?;
        Ok(language_utils::detect_language(&record.content))
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history_log().entries()
    }

    pub fn clear_history(&self) {
        self.history_log().clear();
    }

    /// Remove every cached translation, returning how many were removed
    pub fn clear_cache(&self) -> usize {
        TranslationCache::from_config(&self.config.cache, self.store.clone()).clear()
    }

    fn history_log(&self) -> HistoryLog {
        HistoryLog::new(self.store.clone(), self.config.history.max_entries)
    }

    fn load_single<P: AsRef<Path>>(&self, path: P) -> Result<FileRecord> {
        let chunker = Chunker::from_config(&self.config.chunking);
        let input: InputFile = FileManager::read_input(path, &chunker)?;
        chunker
            .load_file(input)
            .map_err(|e| anyhow!(e))
            .context("Failed to load file")
    }
}

/// `name`, or `name` with `_2`, `_3`, ... before the extension when taken
fn unique_file_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };

    let mut counter = 2;
    loop {
        let candidate = format!("{}_{}{}", stem, counter, extension);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Write an artifact into `dir` as `file_name`, returning its path
fn write_artifact(dir: &Path, file_name: &str, artifact: &DownloadArtifact) -> Result<PathBuf> {
    let path = dir.join(file_name);
    FileManager::write_to_file(&path, &artifact.content)?;
    info!("Wrote {:?} ({})", path, artifact.mime_type);
    Ok(path)
}

fn bar_style(unit: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
            unit
        ))
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░")
}

/// Overall and per-file progress bars
struct ProgressBarObserver {
    // @field: Keeps the bars drawn together
    _multi: MultiProgress,
    overall: ProgressBar,
    file: ProgressBar,
    file_lengths: Vec<u64>,
    current_file: Option<usize>,
}

impl ProgressBarObserver {
    fn new(files: &[FileRecord]) -> Self {
        let multi = MultiProgress::new();
        let total: u64 = files.iter().map(|f| f.chunks.len() as u64).sum();

        let overall = multi.add(ProgressBar::new(total));
        overall.set_style(bar_style("chunks"));
        overall.set_message("Translating");

        let file = multi.add(ProgressBar::new(0));
        file.set_style(bar_style("chunks"));

        Self {
            _multi: multi,
            overall,
            file,
            file_lengths: files.iter().map(|f| f.chunks.len() as u64).collect(),
            current_file: None,
        }
    }

    fn finish(&self) {
        self.file.finish_and_clear();
        self.overall.finish_with_message("Done");
    }
}

impl ProgressObserver for ProgressBarObserver {
    fn on_progress(&mut self, progress: &Progress) {
        if self.current_file != Some(progress.file_index) {
            self.current_file = Some(progress.file_index);
            self.file.reset();
            self.file.set_length(self.file_lengths.get(progress.file_index).copied().unwrap_or(0));
            self.file.set_message(format!(
                "{} ({}/{})",
                progress.file_name,
                progress.file_index + 1,
                progress.total_files
            ));
        }

        let file_len = self.file.length().unwrap_or(0);
        self.file.set_position((progress.file_progress * file_len as f64).round() as u64);

        let overall_len = self.overall.length().unwrap_or(0);
        self.overall.set_position((progress.overall_progress * overall_len as f64).round() as u64);
    }

    fn on_file_complete(&mut self, _file_index: usize, record: &FileRecord) {
        info!("Finished {}", record.name);
    }
}
