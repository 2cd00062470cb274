//! # Task Optimizer Module
//!
//! Worker per l'ottimizzazione di un singolo file.
//! Gli errori si fermano qui: il task termina sempre con un `TaskReport`.

use crate::{
    compressor::Compressor,
    error::OptimizeError,
    file_manager::FileManager,
    reporter::display_size,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Terminal state of one task, sent back to the ledger owner
#[derive(Debug)]
pub struct TaskReport {
    pub path: PathBuf,
    pub before_size: u64,
    /// Size after compression, or why it failed
    pub outcome: Result<u64, OptimizeError>,
}

/// Worker per elaborazione singoli file
#[derive(Debug, Clone)]
pub struct TaskOptimizer {
    compressor: Arc<Compressor>,
}

impl TaskOptimizer {
    pub fn new(compressor: Arc<Compressor>) -> Self {
        Self { compressor }
    }

    /// Processa un singolo file
    pub async fn process_single_file(&self, path: PathBuf, before_size: u64) -> TaskReport {
        info!("Optimizing [{}] {}", FileManager::format_size(before_size), path.display());

        let outcome = self.compressor.compress(&path).await;
        match outcome {
            Ok(after_size) => {
                info!("Optimized [{}] {}", display_size(before_size, after_size), path.display());
            }
            Err(ref e) => {
                error!("Failed to optimize {}: {}", path.display(), e);
            }
        }

        TaskReport {
            path,
            before_size,
            outcome,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::OutputMode;
    use crate::test_support::{fake_zopflipng, write_png};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_report_carries_path_and_sizes() {
        let temp_dir = TempDir::new().unwrap();
        let tool = fake_zopflipng(temp_dir.path());
        let a = write_png(temp_dir.path(), "a.png", 100_000);
        let b = write_png(temp_dir.path(), "b.png", 200_000);

        let compressor = Compressor::new(tool, Arc::from(Vec::new()), OutputMode::InPlace);
        let task = TaskOptimizer::new(Arc::new(compressor));

        let ok = task.process_single_file(a.clone(), 100_000).await;
        assert!(ok.outcome.is_ok());
        assert_eq!(ok.path, a);
        assert_eq!(ok.outcome.unwrap(), 60_000);

        let failed = task.process_single_file(b.clone(), 200_000).await;
        assert!(failed.outcome.is_err());
        assert_eq!(failed.path, b);
        assert_eq!(failed.before_size, 200_000);
    }
}
