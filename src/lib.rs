/*!
 * # textmill - chunked file translation
 *
 * A Rust library for translating text-bearing files through free web
 * translation services.
 *
 * ## Features
 *
 * - Plain text, SRT and WebVTT subtitles, CSV and JSON input
 * - Bounded-size chunking that prefers newline, period and space boundaries
 * - A priority-ordered chain of translation backends:
 *   - Google Translate web endpoint
 *   - LibreTranslate mirrors
 *   - Lingva mirrors
 * - Two-tier translation cache (memory plus SQLite) with expiry
 * - Retry with exponential backoff and an offline dictionary fallback
 * - Format-aware reassembly of the translated chunks
 * - Bounded translation history
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `chunking`: File validation, classification and splitting
 * - `translation`: Translation of chunks and files:
 *   - `translation::cache`: Two-tier translation cache
 *   - `translation::chain`: Backend chain with retries and fallback
 *   - `translation::fallback`: Offline dictionary translation
 *   - `translation::orchestrator`: Per-file and batch translation with progress
 *   - `translation::history`: Bounded history of completed files
 * - `formatter`: Reassembly of translated chunks into output files
 * - `providers`: Clients for the translation services
 * - `storage`: Key/value stores backing the cache and history
 * - `session`: The current set of loaded files
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Language table, ISO code utilities and detection
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![cfg_attr(test, allow(non_snake_case))]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod chunking;
pub mod errors;
pub mod file_utils;
pub mod formatter;
pub mod language_utils;
pub mod providers;
pub mod session;
pub mod storage;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use chunking::{Chunk, Chunker, FileRecord, InputFile};
pub use errors::{FileError, ProviderError, StoreError};
pub use file_utils::FileType;
pub use formatter::DownloadArtifact;
pub use language_utils::{detect_language, get_language_name, supported_languages};
pub use session::TranslationSession;
pub use translation::{Orchestrator, ProviderChain, TranslationCache};
