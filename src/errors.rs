//! Error Types
//!
//! This module defines the error types used by the watcher subsystem.
//!
//! # Overview
//!
//! The main error type [`WatcherError`] covers the few failure modes that
//! can surface from this crate:
//! - Programming errors (triggering a watcher that is not registered)
//! - Side-effect failures reported by collaborators
//! - Settings loading errors
//!
//! Transient graph inconsistencies (a container that shrank between two
//! runs) are never errors; watchers recover from them locally.

use thiserror::Error;

/// The main error type for the scene watcher subsystem.
#[derive(Error, Debug)]
pub enum WatcherError {
    // ========================================================================
    // Programming Errors
    // ========================================================================
    /// A watcher was triggered by a name that is not in the registry.
    #[error("Scene watcher is not registered: {0}")]
    UnregisteredWatcher(String),

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    /// A collaborator failed to materialize a side effect.
    #[error("Side effect of {watcher} failed: {reason}")]
    SideEffectFailed {
        /// Name of the watcher whose side effect failed
        watcher: &'static str,
        /// Description of what went wrong
        reason: String,
    },

    // ========================================================================
    // Settings Errors
    // ========================================================================
    /// Settings JSON could not be parsed.
    #[error("Settings parse error: {0}")]
    Settings(#[from] serde_json::Error),

    /// Settings file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, WatcherError>`.
pub type Result<T> = std::result::Result<T, WatcherError>;
