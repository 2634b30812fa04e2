//! Thread pools used by the server to handle connections.
use crate::Result;

mod rayon_pool;
mod shared_queue;

pub use self::rayon_pool::RayonThreadPool;
pub use self::shared_queue::SharedQueueThreadPool;

/// A pool of threads that runs jobs handed to it
pub trait ThreadPool {
    /// Creates a pool that runs jobs on `threads` threads.
    ///
    /// # Errors
    /// Fails if the threads could not be created.
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// Runs `job` on one of the pool's threads, without waiting for it to finish.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;
}
