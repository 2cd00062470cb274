//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione di un run.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` risolta una sola volta all'avvio e poi immutabile
//! - Definisce `ZopfliFlags`, i flag inoltrati a zopflipng senza validazione
//! - Definisce `OutputMode` (in-place oppure temp + rename)
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `concurrency`: Processi zopflipng in parallelo (default: metà delle CPU logiche, arrotondato per eccesso)
//! - `flags`: Flag per zopflipng (`-m`, `--lossy_transparent`, `--iterations=N`, ...)
//! - `output_mode`: `in-place` (default) oppure `temp-replace`
//! - `zopflipng_path`: Path esplicito dell'eseguibile (default: None = risoluzione automatica)
//! - `json_output`: Eventi JSON su stdout (default: false)
//! - `show_progress`: Progress bar su stderr (default: false)
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     concurrency: 8,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::OptimizeError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Where zopflipng writes its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Input and output are the same path
    #[default]
    InPlace,
    /// Write a sibling `<name>.optimized.tmp`, then rename it over the original
    TempReplace,
}

/// Flags forwarded verbatim to zopflipng
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZopfliFlags {
    /// `-m`: more iterations, depending on file size
    pub more: bool,
    /// `--lossy_transparent`: remove colors behind alpha channel 0
    pub lossy_transparent: bool,
    /// `--lossy_8bit`: convert 16-bit per channel images to 8-bit
    pub lossy_8bit: bool,
    /// `-q`: quick but weaker compression
    pub quick: bool,
    /// `--iterations=N`, left to zopflipng when None
    pub iterations: Option<u32>,
    /// `--filters=...`, omitted when empty
    pub filters: String,
    /// `--keepchunks=...`, omitted when empty
    pub keepchunks: String,
}

impl ZopfliFlags {
    /// Build the flag list shared by every invocation of a run
    pub fn to_args(&self) -> Arc<[String]> {
        let mut args = Vec::new();
        if self.more {
            args.push("-m".to_string());
        }
        if self.lossy_transparent {
            args.push("--lossy_transparent".to_string());
        }
        if self.lossy_8bit {
            args.push("--lossy_8bit".to_string());
        }
        if self.quick {
            args.push("-q".to_string());
        }
        if let Some(iterations) = self.iterations {
            args.push(format!("--iterations={}", iterations));
        }
        if !self.filters.is_empty() {
            args.push(format!("--filters={}", self.filters));
        }
        if !self.keepchunks.is_empty() {
            args.push(format!("--keepchunks={}", self.keepchunks));
        }
        args.into()
    }
}

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of concurrent zopflipng processes
    pub concurrency: usize,
    /// Flags forwarded to zopflipng
    pub flags: ZopfliFlags,
    /// In-place or temp-then-replace
    pub output_mode: OutputMode,
    /// Explicit compressor executable (None = ZOPFLIPNG env var, then PATH)
    pub zopflipng_path: Option<PathBuf>,
    /// Output progress and summary as JSON lines on stdout
    pub json_output: bool,
    /// Show a progress bar on stderr
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: Self::default_concurrency(),
            flags: ZopfliFlags::default(),
            output_mode: OutputMode::default(),
            zopflipng_path: None,
            json_output: false,
            show_progress: false,
        }
    }
}

impl Config {
    /// Half of the logical CPUs, rounded up
    pub fn default_concurrency() -> usize {
        num_cpus::get().div_ceil(2).max(1)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.concurrency == 0 {
            return Err(OptimizeError::Validation(
                "Concurrency must be greater than 0".to_string(),
            ));
        }

        if let Some(ref path) = self.zopflipng_path {
            if path.as_os_str().is_empty() {
                return Err(OptimizeError::Validation(
                    "zopflipng path must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
