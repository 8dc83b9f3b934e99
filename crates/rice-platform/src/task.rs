//! A small pool of worker threads for blocking fetches.
//!
//! Work runs off the UI thread; results come back through a completion
//! queue that only the UI thread drains. Callbacks therefore run on the UI
//! thread with mutable access to its context, and never race the view tree.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use web_time::Instant;

use crate::request::{Fetcher, Payload, build_get_url};
use crate::runner::RepaintSignal;

/// How long a task may run before `drain` gives up on it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("connection timed out")]
    TimedOut,

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("task pool has shut down")]
    Disconnected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

type Job = Box<dyn FnOnce() + Send>;
type Callback<C> = Box<dyn FnOnce(&mut C, Result<Payload, TaskError>)>;

struct Worker {
    handle: JoinHandle<()>,
    busy: Arc<AtomicBool>,
}

struct Pending<C> {
    deadline: Instant,
    on_done: Callback<C>,
}

/// Worker threads plus the UI-side bookkeeping of in-flight tasks.
///
/// `C` is the context handed to completion callbacks.
pub struct TaskPool<C> {
    jobs: Option<Sender<Job>>,
    workers: Vec<Worker>,
    shutdown: Arc<AtomicBool>,
    completions: Arc<Mutex<VecDeque<(TaskId, Result<Payload, TaskError>)>>>,
    pending: HashMap<TaskId, Pending<C>>,
    next_id: u64,
    timeout: Duration,
    signal: Option<RepaintSignal>,
}

impl<C> TaskPool<C> {
    /// Spawns `workers` threads (at least one).
    pub fn new(workers: usize) -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let shutdown = Arc::new(AtomicBool::new(false));
        let workers = (0..workers.max(1))
            .filter_map(|i| {
                let rx = rx.clone();
                let busy = Arc::new(AtomicBool::new(false));
                let flags = (busy.clone(), shutdown.clone());
                thread::Builder::new()
                    .name(format!("rice-worker-{i}"))
                    .spawn(move || worker_loop(&rx, &flags.0, &flags.1))
                    .map(|handle| Worker { handle, busy })
                    .map_err(|e| log::error!("could not spawn worker {i}: {e}"))
                    .ok()
            })
            .collect();
        Self {
            jobs: Some(tx),
            workers,
            shutdown,
            completions: Arc::new(Mutex::new(VecDeque::new())),
            pending: HashMap::new(),
            next_id: 0,
            timeout: DEFAULT_TIMEOUT,
            signal: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Raises `signal` whenever a worker posts a result.
    pub fn with_signal(mut self, signal: RepaintSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of tasks whose callback has not run yet.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Runs `fetch` on a worker. `on_done` runs later inside [`drain`].
    ///
    /// [`drain`]: TaskPool::drain
    pub fn spawn<F, D>(&mut self, fetch: F, on_done: D) -> Result<TaskId, TaskError>
    where
        F: FnOnce() -> Result<Payload, TaskError> + Send + 'static,
        D: FnOnce(&mut C, Result<Payload, TaskError>) + 'static,
    {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        let completions = self.completions.clone();
        let signal = self.signal.clone();
        let job: Job = Box::new(move || {
            let result = fetch();
            completions.lock().push_back((id, result));
            if let Some(signal) = signal {
                signal.request();
            }
        });
        self.jobs
            .as_ref()
            .ok_or(TaskError::Disconnected)?
            .send(job)
            .map_err(|_| TaskError::Disconnected)?;

        log::debug!("task {id:?} queued");
        self.pending.insert(
            id,
            Pending {
                deadline: Instant::now() + self.timeout,
                on_done: Box::new(on_done),
            },
        );
        Ok(id)
    }

    /// GETs `url` with `params` through `fetcher` and interprets the body.
    pub fn get<D>(
        &mut self,
        fetcher: Arc<dyn Fetcher>,
        url: &str,
        params: &[(&str, &str)],
        on_done: D,
    ) -> Result<TaskId, TaskError>
    where
        D: FnOnce(&mut C, Result<Payload, TaskError>) + 'static,
    {
        let url = build_get_url(url, params);
        self.spawn(
            move || fetcher.get(&url).and_then(Payload::from_response),
            on_done,
        )
    }

    /// Delivers finished and overdue tasks. Returns how many callbacks ran.
    pub fn drain(&mut self, ctx: &mut C) -> usize {
        self.drain_at(ctx, Instant::now())
    }

    pub fn drain_at(&mut self, ctx: &mut C, now: Instant) -> usize {
        let finished: Vec<_> = self.completions.lock().drain(..).collect();
        let mut ran = 0;
        for (id, result) in finished {
            match self.pending.remove(&id) {
                Some(task) => {
                    log::debug!("task {id:?} done");
                    (task.on_done)(ctx, result);
                    ran += 1;
                }
                None => log::debug!("dropping late result of task {id:?}"),
            }
        }

        let mut overdue: Vec<TaskId> = self
            .pending
            .iter()
            .filter(|(_, task)| task.deadline <= now)
            .map(|(&id, _)| id)
            .collect();
        overdue.sort();
        for id in overdue {
            if let Some(task) = self.pending.remove(&id) {
                log::warn!("task {id:?} timed out");
                (task.on_done)(ctx, Err(TaskError::TimedOut));
                ran += 1;
            }
        }
        ran
    }
}

impl<C> Drop for TaskPool<C> {
    fn drop(&mut self) {
        // Idle workers are joined. A worker still inside a fetch is detached
        // and exits once the fetch returns.
        self.shutdown.store(true, Ordering::SeqCst);
        self.jobs = None;
        for worker in self.workers.drain(..) {
            if worker.busy.load(Ordering::SeqCst) {
                log::debug!("detaching busy worker {:?}", worker.handle.thread().name());
                continue;
            }
            if worker.handle.join().is_err() {
                log::error!("worker thread panicked");
            }
        }
    }
}

fn worker_loop(jobs: &Mutex<Receiver<Job>>, busy: &AtomicBool, shutdown: &AtomicBool) {
    loop {
        let job = jobs.lock().recv();
        let Ok(job) = job else {
            break;
        };
        busy.store(true, Ordering::SeqCst);
        // Queued jobs are skipped once the pool is gone.
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        job();
        busy.store(false, Ordering::SeqCst);
    }
}
