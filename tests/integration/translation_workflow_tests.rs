/*!
 * End-to-end translation workflow tests
 */

use anyhow::Result;
use std::sync::Arc;

use textmill::app_config::BackendKind;
use textmill::app_controller::{Controller, RunOptions};
use textmill::chunking::{Chunker, FileRecord};
use textmill::formatter;
use textmill::providers::MockBackend;
use textmill::storage::MemoryStore;
use textmill::translation::{
    CancellationFlag, ChannelObserver, NoopObserver, Progress, ProgressEvent, ProgressObserver,
};

use crate::common::mock_server::{MockResponse, MockServer};
use crate::common::{
    SAMPLE_SRT, create_temp_dir, create_test_file, fast_config, init_test_logging, load_record,
    memory_store, orchestrator_with,
};

#[tokio::test]
async fn test_csv_file_shouldKeepHeaderAndTranslateRows() {
    let backend = MockBackend::working().with_custom_response(|_| "id,nombre\n1,gato\n2,perro".to_string());
    let orchestrator = orchestrator_with(vec![Box::new(backend)], memory_store());

    let mut record = load_record("pets.csv", "id,name\n1,cat\n2,dog");
    let completed = orchestrator.translate_file(&mut record, "en", "es", |_, _, _| {}).await;
    assert!(completed);

    let artifact = formatter::render(&record);
    assert_eq!(artifact.content, "id,name\n1,gato\n2,perro");
    assert_eq!(artifact.file_name, "pets_translated.csv");
    assert_eq!(artifact.mime_type, "text/csv");
}

#[tokio::test]
async fn test_translate_file_shouldReportEachChunkAndRecordHistory() {
    let store = memory_store();
    let orchestrator = orchestrator_with(vec![Box::new(MockBackend::working())], store);

    let mut record = load_record("story.txt", "one two three four");
    record.chunks = Chunker::split(&record.content, 4);
    let total = record.chunks.len();

    let mut calls = Vec::new();
    orchestrator
        .translate_file(&mut record, "en", "fr", |index, done, of| calls.push((index, done, of)))
        .await;

    let expected: Vec<(usize, usize, usize)> = (0..total).map(|i| (i, i + 1, total)).collect();
    assert_eq!(calls, expected);
    assert!(record.is_complete());

    let history = orchestrator.history().entries();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].file_name, "story.txt");
    assert_eq!(history[0].chunk_count, total);
    assert_eq!(history[0].target_language, "fr");
}

#[tokio::test]
async fn test_translate_all_shouldReportOverallProgressInOrder() {
    let backend = MockBackend::working();
    let orchestrator = orchestrator_with(vec![Box::new(backend.clone())], memory_store());

    let mut first = load_record("a.txt", "aaa bbb");
    first.chunks = Chunker::split(&first.content, 4);
    let mut second = load_record("b.txt", "ccc ddd eee");
    second.chunks = Chunker::split(&second.content, 4);

    // an already translated chunk is skipped but still counts
    second.chunks[0].mark_translated("CCC ".to_string());

    let mut records = vec![first, second];
    let (mut observer, mut events) = ChannelObserver::channel();
    let summary = orchestrator.translate_all(&mut records, "en", "es", &mut observer).await;
    drop(observer);

    assert_eq!(summary.files_completed, 2);
    assert_eq!(summary.chunks_translated, 4);
    assert!(!summary.cancelled);
    assert_eq!(backend.request_count(), 4);

    let mut progress: Vec<Progress> = Vec::new();
    let mut completed_files = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            ProgressEvent::Progress(p) => progress.push(p),
            ProgressEvent::FileComplete { file_index, file_name } => completed_files.push((file_index, file_name)),
        }
    }

    assert_eq!(progress.len(), 5);
    assert!(progress.windows(2).all(|w| w[0].overall_progress < w[1].overall_progress));
    assert!((progress[4].overall_progress - 1.0).abs() < 1e-9);
    assert_eq!(progress[2].file_index, 1);
    assert_eq!(progress[2].chunk_index, 0);
    assert_eq!(
        completed_files,
        vec![(0, "a.txt".to_string()), (1, "b.txt".to_string())]
    );
    assert_eq!(records[1].chunks[0].translation, "CCC ");
}

/// Cancels the batch as soon as the first chunk is reported
struct CancelAfterFirstChunk {
    flag: CancellationFlag,
    reports: usize,
}

impl ProgressObserver for CancelAfterFirstChunk {
    fn on_progress(&mut self, _progress: &Progress) {
        self.reports += 1;
        self.flag.cancel();
    }

    fn on_file_complete(&mut self, _file_index: usize, _record: &FileRecord) {
        panic!("no file should complete after cancellation");
    }
}

#[tokio::test]
async fn test_translate_all_withCancellation_shouldStopBeforeNextChunk() {
    let store = memory_store();
    let flag = CancellationFlag::new();
    let orchestrator = orchestrator_with(vec![Box::new(MockBackend::working())], store)
        .with_cancellation(flag.clone());

    let mut record = load_record("long.txt", "aaa bbb ccc");
    record.chunks = Chunker::split(&record.content, 4);
    let mut records = vec![record, load_record("other.txt", "never")];

    let mut observer = CancelAfterFirstChunk { flag: flag.clone(), reports: 0 };
    let summary = orchestrator.translate_all(&mut records, "en", "es", &mut observer).await;

    assert!(summary.cancelled);
    assert_eq!(summary.files_completed, 0);
    assert_eq!(summary.chunks_translated, 1);
    assert_eq!(observer.reports, 1);
    assert!(records[0].chunks[0].translated);
    assert!(!records[0].chunks[1].translated);
    assert!(!records[1].chunks[0].translated);
    assert!(orchestrator.history().entries().is_empty());

    // a reset flag lets the batch resume where it stopped
    flag.reset();
    let resumed = orchestrator.translate_all(&mut records, "en", "es", &mut NoopObserver).await;
    assert_eq!(resumed.files_completed, 2);
    assert_eq!(resumed.chunks_translated, 3);
}

#[test]
fn test_translate_file_withBlockOn_shouldTranslateEveryChunk() {
    let orchestrator = orchestrator_with(vec![Box::new(MockBackend::working())], memory_store());
    let mut record = load_record("notes.txt", "hello");

    let completed = tokio_test::block_on(orchestrator.translate_file(&mut record, "en", "de", |_, _, _| {}));

    assert!(completed);
    assert_eq!(formatter::combine(&record), "[TRANSLATED to de] hello");
}

#[tokio::test]
async fn test_controller_run_shouldWriteTranslatedFiles() -> Result<()> {
    init_test_logging();
    let server = MockServer::start(vec![MockResponse::ok(r#"{"translation":"TRADUCIDO"}"#)]).await;
    let config = fast_config(BackendKind::Lingva, vec![server.url("/api/v1")]);

    let input_dir = create_temp_dir()?;
    create_test_file(input_dir.path(), "notes.txt", "Hello there")?;
    create_test_file(input_dir.path(), "movie.srt", SAMPLE_SRT)?;
    create_test_file(input_dir.path(), "ignored.pdf", "binary")?;
    let output_dir = create_temp_dir()?;

    let controller = Controller::with_store(config, Arc::new(MemoryStore::new()));
    let report = controller
        .run(RunOptions {
            inputs: vec![input_dir.path().to_path_buf(), input_dir.path().join("missing.txt")],
            output_dir: Some(output_dir.path().to_path_buf()),
            bundle: false,
        })
        .await?;

    assert_eq!(report.summary.files_completed, 2);
    assert_eq!(report.written.len(), 2);
    assert_eq!(report.skipped.len(), 1);

    let notes = std::fs::read_to_string(output_dir.path().join("notes_translated.txt"))?;
    assert_eq!(notes, "TRADUCIDO");

    let movie = std::fs::read_to_string(output_dir.path().join("movie_translated.srt"))?;
    assert!(movie.starts_with("1\n00:00:01,000 --> 00:00:04,000\nTRADUCIDO\n"));
    assert!(movie.contains("00:00:10,000 --> 00:00:14,000\nFor testing purposes.\n"));

    assert_eq!(controller.history().len(), 2);
    assert_eq!(controller.clear_cache(), 2);
    Ok(())
}

#[tokio::test]
async fn test_controller_run_withBundle_shouldWriteOneFile() -> Result<()> {
    let server = MockServer::start(vec![MockResponse::ok(r#"{"translation":"listo"}"#)]).await;
    let config = fast_config(BackendKind::Lingva, vec![server.url("/api/v1")]);

    let input_dir = create_temp_dir()?;
    let first = create_test_file(input_dir.path(), "a.txt", "ready")?;
    let second = create_test_file(input_dir.path(), "b.txt", "done")?;
    let output_dir = create_temp_dir()?;

    let controller = Controller::with_store(config, Arc::new(MemoryStore::new()));
    let report = controller
        .run(RunOptions {
            inputs: vec![first, second],
            output_dir: Some(output_dir.path().to_path_buf()),
            bundle: true,
        })
        .await?;

    assert_eq!(report.written, vec![output_dir.path().join("translated_files.txt")]);
    let bundled = std::fs::read_to_string(&report.written[0])?;
    assert_eq!(
        bundled,
        "=== a_translated.txt ===\nlisto\n\n=== b_translated.txt ===\nlisto\n\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_controller_run_withOnlyRejectedInputs_shouldFail() -> Result<()> {
    let input_dir = create_temp_dir()?;
    let pdf = create_test_file(input_dir.path(), "slides.pdf", "binary")?;

    let controller = Controller::new_for_test();
    let result = controller
        .run(RunOptions {
            inputs: vec![pdf],
            output_dir: Some(input_dir.path().to_path_buf()),
            bundle: false,
        })
        .await;

    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_controller_run_withSameNamedInputs_shouldKeepBothOutputs() -> Result<()> {
    let server = MockServer::start(vec![MockResponse::ok(r#"{"translation":"hola"}"#)]).await;
    let config = fast_config(BackendKind::Lingva, vec![server.url("/api/v1")]);

    let input_dir = create_temp_dir()?;
    create_test_file(input_dir.path(), "a.txt", "hello from the top")?;
    std::fs::create_dir(input_dir.path().join("sub"))?;
    create_test_file(&input_dir.path().join("sub"), "a.txt", "hello from below")?;
    let output_dir = create_temp_dir()?;

    let controller = Controller::with_store(config, Arc::new(MemoryStore::new()));
    let report = controller
        .run(RunOptions {
            inputs: vec![input_dir.path().to_path_buf()],
            output_dir: Some(output_dir.path().to_path_buf()),
            bundle: false,
        })
        .await?;

    assert_eq!(
        report.written,
        vec![
            output_dir.path().join("a_translated.txt"),
            output_dir.path().join("a_translated_2.txt"),
        ]
    );
    assert!(report.written.iter().all(|path| path.exists()));
    Ok(())
}

#[tokio::test]
async fn test_controller_run_withOversizedInput_shouldSkipIt() -> Result<()> {
    let server = MockServer::start(vec![MockResponse::ok(r#"{"translation":"hola"}"#)]).await;
    let mut config = fast_config(BackendKind::Lingva, vec![server.url("/api/v1")]);
    config.chunking.max_file_size = 16;

    let input_dir = create_temp_dir()?;
    let small = create_test_file(input_dir.path(), "small.txt", "hello")?;
    let large = create_test_file(input_dir.path(), "large.txt", &"word ".repeat(10))?;
    let output_dir = create_temp_dir()?;

    let controller = Controller::with_store(config, Arc::new(MemoryStore::new()));
    let report = controller
        .run(RunOptions {
            inputs: vec![small, large.clone()],
            output_dir: Some(output_dir.path().to_path_buf()),
            bundle: false,
        })
        .await?;

    assert_eq!(report.summary.files_completed, 1);
    assert_eq!(report.skipped, vec![large.to_string_lossy().to_string()]);
    assert!(!output_dir.path().join("large_translated.txt").exists());
    Ok(())
}
