//! Settings for running a yatta server.
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::info;

use crate::models::PasswordHash;
use crate::store::{open_database, FileTaskStore, FileUserStore};
use crate::{Result, YattaError};

/// default IP_ADDR:PORT the server listens on
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8000";
/// file name of the task database, inside the data dir
pub const TASK_DB_FILE_NAME: &str = "todos.db.json";
/// file name of the user database, inside the data dir
pub const USER_DB_FILE_NAME: &str = "users.db.json";
/// default number of threads serving connections
pub const DEFAULT_THREADS: u32 = 4;

/// The kinds of [`ThreadPool`](crate::ThreadPool) a server can run on
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PoolKind {
    /// [`SharedQueueThreadPool`](crate::SharedQueueThreadPool)
    Shared,
    /// [`RayonThreadPool`](crate::RayonThreadPool)
    Rayon,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKind::Shared => f.write_str("shared"),
            PoolKind::Rayon => f.write_str("rayon"),
        }
    }
}

impl FromStr for PoolKind {
    type Err = YattaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "shared" => Ok(PoolKind::Shared),
            "rayon" => Ok(PoolKind::Rayon),
            other => Err(YattaError::Parsing(format!(
                "unknown thread pool {:?}, expected 'shared' or 'rayon'",
                other
            ))),
        }
    }
}

/// Everything needed to start a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// address to listen on
    pub addr: SocketAddr,
    /// directory holding both database files
    pub data_dir: PathBuf,
    /// which thread pool serves connections
    pub pool: PoolKind,
    /// how many threads the pool has
    pub threads: u32,
    /// Argon2 time cost for new password hashes
    pub hash_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            data_dir: PathBuf::from("."),
            pool: PoolKind::Shared,
            threads: DEFAULT_THREADS,
            hash_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

impl ServerConfig {
    /// path of the task database file
    pub fn task_db_path(&self) -> PathBuf {
        self.data_dir.join(TASK_DB_FILE_NAME)
    }

    /// path of the user database file
    pub fn user_db_path(&self) -> PathBuf {
        self.data_dir.join(USER_DB_FILE_NAME)
    }

    /// Creates the data dir if needed and opens both stores from it.
    ///
    /// # Errors
    /// Fails if a database file cannot be opened or holds a corrupt document.
    pub fn open_stores(&self) -> Result<(FileTaskStore, FileUserStore)> {
        fs::create_dir_all(&self.data_dir)?;
        info!("data dir: {}", self.data_dir.display());

        let tasks = FileTaskStore::open(open_database(&self.task_db_path())?)?;
        let users = FileUserStore::open(open_database(&self.user_db_path())?)?;
        Ok((tasks, users))
    }
}

/// parses an IP_ADDR:PORT string
pub fn parse_addr(addr: &str) -> Result<SocketAddr> {
    addr.parse().map_err(|_| {
        YattaError::Parsing(format!(
            "could not parse {} into an IP address and port",
            addr
        ))
    })
}
