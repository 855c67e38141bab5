/*!
 * Session management for a set of loaded files.
 *
 * This module provides:
 * - The current file list and its chunking
 * - Batch translation with progress and cancellation
 * - Downloads of single files or a bundle of all files
 * - Access to the history log and the cache
 */

pub mod manager;
pub mod models;

// Re-export main types
pub use manager::TranslationSession;
pub use models::{LoadReport, format_file_size};
