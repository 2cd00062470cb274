//! # Optimizer Module
//!
//! Separa le responsabilità in sottomoduli:
//! - `batch_optimizer`: Orchestratore di un run
//! - `task_optimizer`: Worker per singoli file
//! - `work_queue`: Coda con limite di concorrenza e avvio esplicito

pub mod batch_optimizer;
pub mod task_optimizer;
pub mod work_queue;

pub use batch_optimizer::{BatchOptimizer, RunOutcome, TaskFailure};
pub use task_optimizer::{TaskOptimizer, TaskReport};
pub use work_queue::WorkQueue;
