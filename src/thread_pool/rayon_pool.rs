use tracing::{debug, error};

use super::ThreadPool;
use crate::{Result, YattaError};

/// A thread pool that uses the work stealing pool of the [`Rayon`] library.
///
/// [`Rayon`]: https://docs.rs/rayon/latest/rayon/index.html
pub struct RayonThreadPool {
    pool: rayon::ThreadPool,
}

impl ThreadPool for RayonThreadPool {
    fn new(threads: u32) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads as usize)
            .thread_name(|i| format!("yatta-rayon-{}", i))
            .panic_handler(|_| error!("job panicked"))
            .build()
            .map_err(|e| YattaError::StringErr(format!("could not build thread pool: {}", e)))?;
        debug!(threads, "created rayon thread pool");

        Ok(RayonThreadPool { pool })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(job);
    }
}
