//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Categorie di errori:
//! - `Pattern` / `Enumeration`: glob non valido o errore durante il listing (fatale per il run)
//! - `SizeProbe`: stat fallito prima o dopo la compressione (fatale solo per quel file)
//! - `Spawn` / `ToolFailed`: zopflipng non avviabile o terminato con errore
//! - `InvalidOutput` / `Replace`: output temporaneo non valido o rename fallito
//! - `DuplicateEntry` / `UnknownEntry` / `AlreadyCompleted`: uso scorretto del ledger
//! - `MissingDependency`: zopflipng non trovato
//! - `Validation`: errori di validazione input
//!
//! ## Esempio:
//! ```rust,ignore
//! if resolver.resolve().is_none() {
//!     return Err(OptimizeError::MissingDependency("zopflipng".to_string()));
//! }
//! ```

use std::path::PathBuf;
use std::process::ExitStatus;

/// Custom error types for PNG optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to enumerate files: {0}")]
    Enumeration(#[from] glob::GlobError),

    #[error("Failed to read size of {}: {source}", path.display())]
    SizeProbe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start compressor for {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compressor failed for {} ({status}): {stderr}", path.display())]
    ToolFailed {
        path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Compressor output is not a PNG: {}", path.display())]
    InvalidOutput { path: PathBuf },

    #[error("Failed to replace {} with optimized output: {source}", path.display())]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File already recorded in ledger: {}", .0.display())]
    DuplicateEntry(PathBuf),

    #[error("File not recorded in ledger: {}", .0.display())]
    UnknownEntry(PathBuf),

    #[error("File already completed in ledger: {}", .0.display())]
    AlreadyCompleted(PathBuf),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
