use std::thread;

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, error};

use super::ThreadPool;
use crate::Result;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A thread pool whose workers pull jobs from one shared queue.
///
/// The queue is a crossbeam MPMC [`channel`], used as single producer (the pool) and multiple
/// consumers (the workers).
///
/// A worker whose job panics is replaced by a fresh thread. Workers exit once the pool is
/// dropped and the queue drains.
///
/// [`channel`]: https://docs.rs/crossbeam/0.8.1/crossbeam/channel/index.html
pub struct SharedQueueThreadPool {
    tx: Sender<Job>,
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(threads: u32) -> Result<Self> {
        let (tx, rx) = channel::unbounded::<Job>();
        for _ in 0..threads {
            spawn_worker(Worker(rx.clone()))?;
        }
        debug!(threads, "created shared queue thread pool");
        Ok(SharedQueueThreadPool { tx })
    }

    /// Queues `job` for the next free worker.
    ///
    /// # Panics
    ///
    /// Panics if every worker is gone.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx
            .send(Box::new(job))
            .expect("There are no threads in the pool");
    }
}

/// The receiving end of the queue, owned by one worker thread.
/// Dropping it during a panic starts a replacement worker.
#[derive(Clone)]
struct Worker(Receiver<Job>);

impl Drop for Worker {
    fn drop(&mut self) {
        if thread::panicking() {
            debug!("worker panicked, starting a new one");
            if let Err(e) = spawn_worker(self.clone()) {
                error!("Failed to spawn a thread: {}", e);
            }
        }
    }
}

fn spawn_worker(worker: Worker) -> Result<()> {
    thread::Builder::new()
        .name("yatta-worker".to_string())
        .spawn(move || run_jobs(worker))?;
    Ok(())
}

fn run_jobs(worker: Worker) {
    while let Ok(job) = worker.0.recv() {
        job();
    }
    debug!("worker exited because the thread pool was dropped");
}
