/*!
 * Chunk translation for loaded files.
 *
 * This module contains the core functionality for turning chunks into
 * translations. It is split into several submodules:
 *
 * - `cache`: Two-tier cache of earlier translations
 * - `chain`: Priority-ordered backends with retry and backoff
 * - `fallback`: Offline dictionary used when every backend fails
 * - `history`: Bounded log of completed files
 * - `orchestrator`: Sequential batch runner with progress and cancellation
 */

// Re-export main types for easier usage
pub use self::cache::TranslationCache;
pub use self::chain::ProviderChain;
pub use self::history::{HistoryEntry, HistoryLog};
pub use self::orchestrator::{
    BatchSummary, CancellationFlag, ChannelObserver, NoopObserver, Orchestrator, Progress,
    ProgressEvent, ProgressObserver,
};

// Submodules
pub mod cache;
pub mod chain;
pub mod fallback;
pub mod history;
pub mod orchestrator;
