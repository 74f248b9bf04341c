use crate::analysis::{self, AnalysisConfig, HistogramAnalysis};
use crate::errors::{HistogramError, Result};
use crate::histogram::PixelBuffer;
use std::collections::BinaryHeap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

/// Priority levels for queued analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskPriority {
    Low = 0,
    Normal = 1,
    High = 2,
    Critical = 3, // image the user just selected
}

#[derive(Debug)]
struct PrioritizedTask {
    priority: TaskPriority,
    task_id: u64,
    task: HistogramTask,
}

impl PartialEq for PrioritizedTask {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.task_id == other.task_id
    }
}

impl Eq for PrioritizedTask {}

impl PartialOrd for PrioritizedTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrioritizedTask {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // BinaryHeap pops the greatest: higher priority, then the earlier task
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.task_id.cmp(&self.task_id))
    }
}

#[derive(Debug, Clone)]
pub enum HistogramTask {
    Analyze {
        buffer: Arc<PixelBuffer>,
        config: AnalysisConfig,
        priority: TaskPriority,
    },
    LoadAndAnalyze {
        path: PathBuf,
        config: AnalysisConfig,
        priority: TaskPriority,
    },
}

impl HistogramTask {
    pub fn priority(&self) -> TaskPriority {
        match self {
            HistogramTask::Analyze { priority, .. } => *priority,
            HistogramTask::LoadAndAnalyze { priority, .. } => *priority,
        }
    }
}

#[derive(Debug)]
pub enum TaskResult {
    Completed {
        task_id: u64,
        analysis: Box<HistogramAnalysis>,
    },
    Failed {
        task_id: u64,
        error: HistogramError,
    },
}

impl TaskResult {
    pub fn task_id(&self) -> u64 {
        match self {
            TaskResult::Completed { task_id, .. } | TaskResult::Failed { task_id, .. } => *task_id,
        }
    }
}

type TaskQueue = Arc<Mutex<BinaryHeap<PrioritizedTask>>>;

fn lock_queue(queue: &TaskQueue) -> MutexGuard<'_, BinaryHeap<PrioritizedTask>> {
    // a worker that panicked mid-push leaves the heap intact
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Priority-based worker pool that runs analyses off the calling thread.
/// Work that has started always runs to completion.
pub struct TaskScheduler {
    task_queue: TaskQueue,
    result_rx: Receiver<TaskResult>,
    next_task_id: AtomicU64,
    workers: Vec<thread::JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl TaskScheduler {
    pub fn new(num_workers: usize) -> Result<Self> {
        let (result_tx, result_rx) = mpsc::channel();
        let task_queue: TaskQueue = Arc::new(Mutex::new(BinaryHeap::new()));
        let running = Arc::new(AtomicBool::new(true));

        let mut workers = Vec::with_capacity(num_workers.max(1));
        for i in 0..num_workers.max(1) {
            let task_queue = Arc::clone(&task_queue);
            let result_tx = result_tx.clone();
            let running = Arc::clone(&running);

            let worker = thread::Builder::new()
                .name(format!("histogram-worker-{}", i))
                .spawn(move || Self::worker_loop(task_queue, result_tx, running))
                .map_err(|e| HistogramError::ThreadPool {
                    message: format!("failed to spawn worker {}: {}", i, e),
                })?;
            workers.push(worker);
        }

        tracing::debug!(workers = workers.len(), "task scheduler started");
        Ok(Self {
            task_queue,
            result_rx,
            next_task_id: AtomicU64::new(0),
            workers,
            running,
        })
    }

    fn worker_loop(task_queue: TaskQueue, result_tx: Sender<TaskResult>, running: Arc<AtomicBool>) {
        while running.load(Ordering::Acquire) {
            let next = lock_queue(&task_queue).pop();

            if let Some(prioritized) = next {
                let result = Self::execute_task(prioritized.task_id, prioritized.task);
                if result_tx.send(result).is_err() {
                    // receiver dropped, nobody wants results any more
                    break;
                }
            } else {
                // No tasks available, sleep briefly to avoid busy waiting
                thread::sleep(Duration::from_millis(1));
            }
        }
    }

    fn execute_task(task_id: u64, task: HistogramTask) -> TaskResult {
        let outcome = match &task {
            HistogramTask::Analyze { buffer, config, .. } => analysis::analyze(buffer, config),
            HistogramTask::LoadAndAnalyze { path, config, .. } => {
                crate::image_loader::load_pixel_buffer(path)
                    .and_then(|buffer| analysis::analyze(&buffer, config))
            }
        };

        // per-task timings; the worker's profiler outlives the task
        crate::profiler::with_profiler(|p| p.take_stats().log_summary());

        match outcome {
            Ok(analysis) => TaskResult::Completed {
                task_id,
                analysis: Box::new(analysis),
            },
            Err(error) => {
                error.log_and_report();
                TaskResult::Failed { task_id, error }
            }
        }
    }

    pub fn submit_task(&self, task: HistogramTask) -> u64 {
        let task_id = self.next_task_id.fetch_add(1, Ordering::Relaxed);
        let priority = task.priority();
        tracing::trace!(task_id, ?priority, "task submitted");

        lock_queue(&self.task_queue).push(PrioritizedTask {
            priority,
            task_id,
            task,
        });
        task_id
    }

    pub fn try_recv_result(&self) -> Option<TaskResult> {
        self.result_rx.try_recv().ok()
    }

    pub fn recv_result(&self) -> Result<TaskResult> {
        self.result_rx.recv().map_err(|e| HistogramError::ThreadPool {
            message: e.to_string(),
        })
    }

    /// Returns `Ok(None)` when nothing arrived within `timeout`.
    pub fn recv_result_timeout(&self, timeout: Duration) -> Result<Option<TaskResult>> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => Ok(Some(result)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(HistogramError::ThreadPool {
                message: "all workers have stopped".to_string(),
            }),
        }
    }

    pub fn queue_size(&self) -> usize {
        lock_queue(&self.task_queue).len()
    }

    /// Stops the workers after their current task and waits for them.
    pub fn shutdown(mut self) {
        self.stop_workers();
    }

    fn stop_workers(&mut self) {
        self.running.store(false, Ordering::Release);
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }

    /// One worker per CPU, at least two.
    pub fn default_worker_count() -> usize {
        num_cpus::get().max(2)
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        self.stop_workers();
    }
}

/// Tracks the most recent image selection. Results of earlier selections are
/// dropped when they arrive instead of being cancelled.
pub struct HistogramSession {
    scheduler: TaskScheduler,
    latest: Option<u64>,
    pending: bool,
}

impl HistogramSession {
    pub fn new(scheduler: TaskScheduler) -> Self {
        Self {
            scheduler,
            latest: None,
            pending: false,
        }
    }

    pub fn select_buffer(&mut self, buffer: PixelBuffer, config: AnalysisConfig) -> u64 {
        self.select(HistogramTask::Analyze {
            buffer: Arc::new(buffer),
            config,
            priority: TaskPriority::Critical,
        })
    }

    pub fn select_file(&mut self, path: PathBuf, config: AnalysisConfig) -> u64 {
        self.select(HistogramTask::LoadAndAnalyze {
            path,
            config,
            priority: TaskPriority::Critical,
        })
    }

    fn select(&mut self, task: HistogramTask) -> u64 {
        let task_id = self.scheduler.submit_task(task);
        if let Some(previous) = self.latest.replace(task_id) {
            if self.pending {
                tracing::debug!(previous, task_id, "selection superseded");
            }
        }
        self.pending = true;
        task_id
    }

    /// True while the latest selection has not produced a result.
    pub fn is_loading(&self) -> bool {
        self.pending
    }

    fn accept(&mut self, result: TaskResult) -> Option<Result<HistogramAnalysis>> {
        if Some(result.task_id()) != self.latest {
            tracing::debug!(task_id = result.task_id(), "discarding stale result");
            return None;
        }
        self.pending = false;
        Some(match result {
            TaskResult::Completed { analysis, .. } => Ok(*analysis),
            TaskResult::Failed { error, .. } => Err(error),
        })
    }

    /// Non-blocking: the latest selection's outcome if it has arrived.
    pub fn poll(&mut self) -> Option<Result<HistogramAnalysis>> {
        while let Some(result) = self.scheduler.try_recv_result() {
            if let Some(outcome) = self.accept(result) {
                return Some(outcome);
            }
        }
        None
    }

    /// Blocks until the latest selection completes. Returns `None` if nothing is pending.
    pub fn wait(&mut self) -> Option<Result<HistogramAnalysis>> {
        while self.pending {
            match self.scheduler.recv_result() {
                Ok(result) => {
                    if let Some(outcome) = self.accept(result) {
                        return Some(outcome);
                    }
                }
                Err(e) => {
                    self.pending = false;
                    return Some(Err(e));
                }
            }
        }
        None
    }

    pub fn shutdown(self) {
        self.scheduler.shutdown();
    }
}
