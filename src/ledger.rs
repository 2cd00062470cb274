//! # Size Ledger Module
//!
//! Tiene traccia delle dimensioni prima/dopo di ogni PNG scoperto in un run.
//!
//! ## Regole:
//! - Una sola entry per path, creata prima che il task relativo parta
//! - `after_size` viene impostato al massimo una volta, solo dopo una compressione riuscita
//! - Nessuna cancellazione: il ledger cresce in ordine di discovery
//! - Un solo proprietario (l'orchestratore) lo modifica, i task riportano i risultati via queue
//!
//! ## Esempio:
//! ```rust,ignore
//! let mut ledger = SizeLedger::new();
//! ledger.record(path.clone(), 100_000)?;
//! ledger.complete(&path, 60_000)?;
//! ```

use crate::error::OptimizeError;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Before/after sizes of one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeRecord {
    pub before_size: u64,
    pub after_size: Option<u64>,
}

impl SizeRecord {
    pub fn is_completed(&self) -> bool {
        self.after_size.is_some()
    }
}

/// Path -> sizes, kept in discovery order
#[derive(Debug, Default)]
pub struct SizeLedger {
    entries: Vec<(PathBuf, SizeRecord)>,
    index: HashMap<PathBuf, usize>,
}

impl SizeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly discovered file with its size before compression
    pub fn record(&mut self, path: PathBuf, before_size: u64) -> Result<(), OptimizeError> {
        if self.index.contains_key(&path) {
            return Err(OptimizeError::DuplicateEntry(path));
        }

        self.index.insert(path.clone(), self.entries.len());
        self.entries.push((
            path,
            SizeRecord {
                before_size,
                after_size: None,
            },
        ));
        Ok(())
    }

    /// Set the size after a successful compression
    pub fn complete(&mut self, path: &Path, after_size: u64) -> Result<(), OptimizeError> {
        let position = *self
            .index
            .get(path)
            .ok_or_else(|| OptimizeError::UnknownEntry(path.to_path_buf()))?;

        let record = &mut self.entries[position].1;
        if record.is_completed() {
            return Err(OptimizeError::AlreadyCompleted(path.to_path_buf()));
        }
        record.after_size = Some(after_size);
        Ok(())
    }

    /// Read-only view in discovery order
    pub fn snapshot(&self) -> &[(PathBuf, SizeRecord)] {
        &self.entries
    }

    pub fn get(&self, path: &Path) -> Option<&SizeRecord> {
        self.index.get(path).map(|&position| &self.entries[position].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every before-size recorded so far
    pub fn total_before(&self) -> u64 {
        self.entries.iter().map(|(_, record)| record.before_size).sum()
    }
}
