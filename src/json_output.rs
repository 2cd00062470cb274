//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per uso programmatico.
//!
//! ## Responsabilità:
//! - Emette una riga JSON su stdout per ogni evento (stderr resta per i log)
//! - Riutilizza `RunSummary` e le dimensioni del ledger
//!
//! ## Tipi di messaggi:
//! - `start`: Enumerazione completata, prima del rilascio della coda
//! - `file_complete`: Fine elaborazione di un file (con errore opzionale)
//! - `complete`: Fine del run con il riepilogo finale

use crate::file_manager::FileManager;
use crate::reporter::RunSummary;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Totale prima del run
    #[serde(rename = "start")]
    Start {
        total_files: usize,
        total_before_size: u64,
        concurrency: usize,
    },

    /// Fine elaborazione di un file specifico
    #[serde(rename = "file_complete")]
    FileComplete {
        path: PathBuf,
        before_size: u64,
        after_size: Option<u64>,
        reduction_percent: Option<f64>,
        error: Option<String>,
    },

    /// Run completato
    #[serde(rename = "complete")]
    Complete {
        succeeded: usize,
        total: usize,
        total_before_size: u64,
        total_after_size: u64,
        bytes_saved: i64,
        percent_saved: f64,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(total_files: usize, total_before_size: u64, concurrency: usize) -> Self {
        Self::Start {
            total_files,
            total_before_size,
            concurrency,
        }
    }

    pub fn file_succeeded(path: PathBuf, before_size: u64, after_size: u64) -> Self {
        Self::FileComplete {
            path,
            before_size,
            after_size: Some(after_size),
            reduction_percent: Some(FileManager::calculate_reduction(before_size, after_size)),
            error: None,
        }
    }

    pub fn file_failed(path: PathBuf, before_size: u64, error: String) -> Self {
        Self::FileComplete {
            path,
            before_size,
            after_size: None,
            reduction_percent: None,
            error: Some(error),
        }
    }

    pub fn complete(summary: &RunSummary) -> Self {
        Self::Complete {
            succeeded: summary.succeeded,
            total: summary.total,
            total_before_size: summary.total_before_size,
            total_after_size: summary.total_after_size,
            bytes_saved: summary.bytes_saved(),
            percent_saved: summary.percent_saved(),
        }
    }
}
