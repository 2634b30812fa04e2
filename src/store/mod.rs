//! This module provides the file backed task and user stores, along with the contracts the
//! server depends on.
//!
//! Both stores keep a full in-memory mirror of their database file. Reads are served from the
//! mirror. Every write re-encodes the whole mirror as one JSON document and replaces the file
//! contents through a [`Tape`], so the file never holds a partial or mixed document.
//!
//! A store handle is cheap to clone; clones share one mirror and one file. Mutations are
//! serialized on a write lock for the full read-modify-write cycle.
use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::Path;

use crate::models::{PasswordHash, Task, User};
use crate::Result;

pub mod codec;
mod tape;
mod task_store;
mod user_store;

pub use self::tape::Tape;
pub use self::task_store::FileTaskStore;
pub use self::user_store::FileUserStore;

/// Handles the creation and retrieval of tasks.
pub trait TaskStore: Clone + Send + Sync + 'static {
    /// Gets all tasks for `user`, in the order they were added.
    ///
    /// Returns `None` if `user` has never had a task list, which is not an error.
    fn get_tasks(&self, user: &str) -> Result<Option<Vec<Task>>>;

    /// Gets a single task by its `id`, searching every user's list.
    ///
    /// Returns `None` if no task has that `id`.
    fn get_task(&self, id: u64) -> Result<Option<Task>>;

    /// Creates a task for `user`, creating the user's list if needed, and persists it.
    ///
    /// The id is assigned by the store. Returns the stored task.
    fn add_task(&self, user: &str, description: &str) -> Result<Task>;
}

/// Handles the creation and retrieval of user accounts.
pub trait UserStore: Clone + Send + Sync + 'static {
    /// Adds a new user and persists it. Returns the stored user.
    ///
    /// The store does not check that `email` is unique. Callers are expected to check
    /// [`UserStore::email_in_use`] first.
    fn add_user(&self, email: &str, password: PasswordHash) -> Result<User>;

    /// Gets a user by id. Returns `None` if there is no such user.
    fn get_user(&self, id: u64) -> Result<Option<User>>;

    /// Gets every user, in registration order.
    fn get_users(&self) -> Result<Vec<User>>;

    /// Returns true if some user already has exactly this `email`.
    fn email_in_use(&self, email: &str) -> bool;
}

/// A random access handle that a store can read from and rewrite in full.
pub trait Database: Read + Write + Seek + Send + Sync + 'static {
    /// Cuts the underlying storage down to zero bytes.
    fn truncate(&mut self) -> io::Result<()>;
}

impl Database for File {
    fn truncate(&mut self) -> io::Result<()> {
        self.set_len(0)
    }
}

impl Database for Cursor<Vec<u8>> {
    fn truncate(&mut self) -> io::Result<()> {
        self.get_mut().clear();
        Ok(())
    }
}

/// Opens the database file at `path` for reading and writing, creating an empty one if it does
/// not exist yet.
pub fn open_database(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)?;
    Ok(file)
}

/// Returns one more than the largest of `ids`, or 1 when there are none.
fn next_id(ids: impl Iterator<Item = u64>) -> Result<u64> {
    ids.max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or(crate::YattaError::IdsExhausted)
}
