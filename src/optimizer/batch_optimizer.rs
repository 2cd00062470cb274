//! # Batch Optimizer Main Orchestrator
//!
//! Orchestratore di un run completo.
//!
//! ## Flusso di esecuzione:
//! 1. **Dependency check**: zopflipng deve essere risolvibile
//! 2. **Discovery**: il glob viene consumato una volta sola; ogni PNG entra nel
//!    ledger con la sua dimensione e il suo task viene ammesso nella coda (in pausa)
//! 3. **Pre-run total**: emesso quando l'enumerazione è finita, prima di ogni task
//! 4. **Release**: `queue.start()`, al massimo `concurrency` zopflipng in parallelo
//! 5. **Drain**: ogni `TaskReport` torna qui; solo questo thread modifica il ledger
//! 6. **Final total**: riepilogo calcolato dal ledger dopo la barriera
//!
//! ## Error handling:
//! - Pattern non valido o errore di listing: il run si interrompe prima di ogni task
//! - Errore su un singolo file: loggato, il file resta senza `after_size`
//! - Dimensione illeggibile prima del dispatch: il file non entra nel ledger ma
//!   conta comunque nel totale finale
//! - Nessun retry, nessun timeout

use crate::{
    compressor::Compressor,
    config::Config,
    error::OptimizeError,
    file_manager::FileManager,
    json_output::JsonMessage,
    ledger::SizeLedger,
    optimizer::{
        task_optimizer::{TaskOptimizer, TaskReport},
        work_queue::WorkQueue,
    },
    progress::ProgressManager,
    reporter::{self, RunSummary},
    tool_resolver::ToolPathResolver,
};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// A file that did not reach a successful terminal state
#[derive(Debug, Clone)]
pub struct TaskFailure {
    /// None when the task was lost before it could report its path
    pub path: Option<PathBuf>,
    pub message: String,
}

/// Everything a caller needs once a run is over
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub ledger: SizeLedger,
    pub failures: Vec<TaskFailure>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Orchestratore principale
pub struct BatchOptimizer {
    config: Config,
    compressor: Arc<Compressor>,
    progress: ProgressManager,
}

impl BatchOptimizer {
    /// Validate the config and resolve zopflipng
    pub fn new(config: Config) -> Result<Self> {
        let progress = if config.show_progress {
            ProgressManager::new()
        } else {
            ProgressManager::hidden()
        };
        Self::with_progress(config, progress)
    }

    /// Like `new`, drawing on a bar the caller already owns
    pub fn with_progress(config: Config, progress: ProgressManager) -> Result<Self> {
        config.validate()?;

        let tool = ToolPathResolver::new(config.zopflipng_path.clone()).require()?;
        info!("Using compressor: {}", tool.display());

        let compressor = Compressor::new(tool, config.flags.to_args(), config.output_mode);

        Ok(Self {
            config,
            compressor: Arc::new(compressor),
            progress,
        })
    }

    /// Optimize every PNG matched by `pattern`
    pub async fn run(&self, pattern: &str) -> Result<RunOutcome> {
        info!("Starting optimization of: {}", pattern);
        self.run_paths(FileManager::find_png_files(pattern)?).await
    }

    /// Optimize an already enumerated set of candidates
    pub(crate) async fn run_paths<I>(&self, candidates: I) -> Result<RunOutcome>
    where
        I: IntoIterator<Item = Result<PathBuf, OptimizeError>>,
    {
        debug!(
            "Concurrency: {}, mode: {:?}",
            self.config.concurrency, self.config.output_mode
        );

        let mut ledger = SizeLedger::new();
        let mut failures = Vec::new();
        let mut queue = WorkQueue::new(self.config.concurrency);
        let task_optimizer = TaskOptimizer::new(self.compressor.clone());

        for entry in candidates {
            let path = entry?;

            let before_size = match FileManager::file_size(&path).await {
                Ok(size) => size,
                Err(e) => {
                    error!("{}", e);
                    failures.push(TaskFailure {
                        path: Some(path),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            ledger.record(path.clone(), before_size)?;

            let task_optimizer = task_optimizer.clone();
            queue.enqueue(async move { task_optimizer.process_single_file(path, before_size).await });
        }
        let unrecorded = failures.len();

        reporter::report_pre_run(&ledger);
        if self.config.json_output {
            JsonMessage::start(ledger.len(), ledger.total_before(), self.config.concurrency).emit();
        }
        self.progress.start(ledger.len() as u64);

        queue.start();
        while let Some(joined) = queue.join_next().await {
            match joined {
                Ok(report) => self.apply_report(&mut ledger, report, &mut failures)?,
                Err(e) => {
                    error!("{}", e);
                    failures.push(TaskFailure {
                        path: None,
                        message: e.to_string(),
                    });
                }
            }
        }

        let summary = RunSummary::from_ledger(&ledger, unrecorded);
        self.progress.finish(&summary.format_summary());
        reporter::report_final(&summary);
        if self.config.json_output {
            JsonMessage::complete(&summary).emit();
        }

        Ok(RunOutcome {
            summary,
            ledger,
            failures,
        })
    }

    /// Record one terminal task in the ledger
    fn apply_report(
        &self,
        ledger: &mut SizeLedger,
        report: TaskReport,
        failures: &mut Vec<TaskFailure>,
    ) -> Result<()> {
        let TaskReport {
            path,
            before_size,
            outcome,
        } = report;

        match outcome {
            Ok(after_size) => {
                ledger.complete(&path, after_size)?;
                self.progress.file_done(
                    &path,
                    Some(FileManager::calculate_reduction(before_size, after_size)),
                );
                if self.config.json_output {
                    JsonMessage::file_succeeded(path, before_size, after_size).emit();
                }
            }
            Err(e) => {
                self.progress.file_done(&path, None);
                if self.config.json_output {
                    JsonMessage::file_failed(path.clone(), before_size, e.to_string()).emit();
                }
                failures.push(TaskFailure {
                    path: Some(path),
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }
}
