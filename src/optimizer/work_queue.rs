//! # Bounded Work Queue
//!
//! Coda di task con limite di concorrenza e protocollo build-then-start.
//!
//! - `enqueue()` ammette un task; finché la coda è in pausa il task resta fermo
//! - `start()` rilascia i task in attesa, nell'ordine di ammissione
//! - Un semaforo con `concurrency` permessi limita i task in esecuzione
//! - I permessi vengono presi a turno: ogni task aspetta che il precedente
//!   abbia ottenuto il suo, quindi l'avvio segue l'ordine di ammissione
//! - `join_next()` / `drain()` sono la barriera di completamento
//!
//! Un task che fallisce (o va in panic) non cancella gli altri: il suo
//! risultato arriva come `Err` al chiamante. Il panic viene contenuto solo con
//! `panic = "unwind"`, che è il profilo usato anche in release.

use anyhow::Result;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::JoinSet;
use tracing::debug;

/// Concurrency-bounded queue of async tasks, paused until `start()`
pub struct WorkQueue<T> {
    semaphore: Arc<Semaphore>,
    held: Vec<BoxFuture<'static, T>>,
    running: JoinSet<Result<T>>,
    started: bool,
    admitted: usize,
    /// Fires once the most recently dispatched task holds its permit
    last_turn: Option<oneshot::Receiver<()>>,
}

impl<T: Send + 'static> WorkQueue<T> {
    /// Create a paused queue running at most `concurrency` tasks at once
    pub fn new(concurrency: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            held: Vec::new(),
            running: JoinSet::new(),
            started: false,
            admitted: 0,
            last_turn: None,
        }
    }

    /// Admit a task. Held until `start()` if the queue is still paused.
    pub fn enqueue<F>(&mut self, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.admitted += 1;
        if self.started {
            self.dispatch(Box::pin(task));
        } else {
            self.held.push(Box::pin(task));
        }
    }

    /// Release held tasks, subject to the concurrency cap
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        debug!("Releasing {} queued tasks", self.held.len());
        for task in std::mem::take(&mut self.held) {
            self.dispatch(task);
        }
    }

    fn dispatch(&mut self, task: BoxFuture<'static, T>) {
        let semaphore = self.semaphore.clone();
        let (turn_taken, next_turn) = oneshot::channel();
        let my_turn = self.last_turn.replace(next_turn);

        self.running.spawn(async move {
            if let Some(my_turn) = my_turn {
                // a dropped sender still means the previous task is out of the way
                let _ = my_turn.await;
            }
            let permit = semaphore.acquire_owned().await;
            let _ = turn_taken.send(());

            let _permit = permit?;
            Ok::<T, anyhow::Error>(task.await)
        });
    }

    /// Wait for the next task to reach a terminal state.
    ///
    /// Returns `None` once every released task has been collected.
    pub async fn join_next(&mut self) -> Option<Result<T>> {
        let joined = self.running.join_next().await?;
        Some(match joined {
            Ok(result) => result,
            Err(e) => Err(anyhow::anyhow!("Task did not complete: {}", e)),
        })
    }

    /// Start the queue if needed and wait for every admitted task
    pub async fn drain(mut self) -> Vec<Result<T>> {
        self.start();

        let mut results = Vec::with_capacity(self.admitted);
        while let Some(result) = self.join_next().await {
            results.push(result);
        }
        results
    }

    /// Number of tasks admitted so far
    pub fn len(&self) -> usize {
        self.admitted
    }

    pub fn is_empty(&self) -> bool {
        self.admitted == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio_test::assert_ok;

    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        high_water: AtomicUsize,
        finished: AtomicUsize,
    }

    fn tracked_task(gauge: Arc<Gauge>) -> impl Future<Output = ()> + Send + 'static {
        async move {
            let now = gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
            gauge.high_water.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            gauge.current.fetch_sub(1, Ordering::SeqCst);
            gauge.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_concurrency_cap() {
        let gauge = Arc::new(Gauge::default());
        let mut queue = WorkQueue::new(2);
        for _ in 0..8 {
            queue.enqueue(tracked_task(gauge.clone()));
        }
        queue.start();

        let results = queue.drain().await;
        assert_eq!(results.len(), 8);
        assert_eq!(gauge.finished.load(Ordering::SeqCst), 8);
        assert_eq!(gauge.high_water.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_cap_of_one_on_many_threads() {
        let gauge = Arc::new(Gauge::default());
        let mut queue = WorkQueue::new(1);
        for _ in 0..3 {
            queue.enqueue(tracked_task(gauge.clone()));
        }
        queue.start();

        for result in queue.drain().await {
            assert_ok!(result);
        }
        assert_eq!(gauge.finished.load(Ordering::SeqCst), 3);
        assert_eq!(gauge.high_water.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_nothing_runs_before_start() {
        let ran = Arc::new(AtomicBool::new(false));
        let mut queue = WorkQueue::new(4);
        let flag = ran.clone();
        queue.enqueue(async move { flag.store(true, Ordering::SeqCst) });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!ran.load(Ordering::SeqCst));
        assert!(!queue.started);
        assert_eq!(queue.len(), 1);

        queue.start();
        assert!(queue.started);
        assert_eq!(queue.drain().await.len(), 1);
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_enqueue_after_start_still_capped() {
        let gauge = Arc::new(Gauge::default());
        let mut queue = WorkQueue::new(2);
        queue.enqueue(tracked_task(gauge.clone()));
        queue.start();
        for _ in 0..4 {
            queue.enqueue(tracked_task(gauge.clone()));
        }

        assert_eq!(queue.drain().await.len(), 5);
        assert!(gauge.high_water.load(Ordering::SeqCst) <= 2);
        assert_eq!(gauge.finished.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_siblings() {
        let mut queue = WorkQueue::new(2);
        for i in 0..5u32 {
            queue.enqueue(async move {
                if i == 1 {
                    Err(format!("task {} failed", i))
                } else {
                    Ok(i)
                }
            });
        }
        queue.start();

        let results: Vec<Result<u32, String>> = queue
            .drain()
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 4);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[tokio::test]
    async fn test_panicking_task_is_contained() {
        let mut queue: WorkQueue<u32> = WorkQueue::new(2);
        queue.enqueue(async { panic!("boom") });
        queue.enqueue(async { 7u32 });
        queue.start();

        let results = queue.drain().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
        assert!(results.iter().any(|r| matches!(r, Ok(7))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_tasks_start_in_admission_order() {
        let started = Arc::new(Mutex::new(Vec::new()));
        let mut queue = WorkQueue::new(1);
        for i in 0..6 {
            let started = started.clone();
            queue.enqueue(async move {
                started.lock().unwrap().push(i);
                tokio::time::sleep(Duration::from_millis(5)).await;
            });
        }
        queue.start();
        queue.enqueue({
            let started = started.clone();
            async move { started.lock().unwrap().push(6) }
        });

        assert_eq!(queue.drain().await.len(), 7);
        assert_eq!(*started.lock().unwrap(), (0..7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_empty_queue_drains_immediately() {
        let queue: WorkQueue<()> = WorkQueue::new(3);
        assert!(queue.is_empty());
        assert!(queue.drain().await.is_empty());
    }
}
