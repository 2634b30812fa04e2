use std::fs::File;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use super::{codec, next_id, Database, Tape, TaskStore};
use crate::models::{Task, TaskList};
use crate::Result;

/// The primary struct for working with persisted task lists.
///
/// On [`open`](FileTaskStore::open) the whole database is read into an in-memory mirror. Reads
/// are served from the mirror. Each [`add_task`](TaskStore::add_task) stages the change on a
/// copy of the mirror, rewrites the whole database from that copy, and only then commits it,
/// so a failed write leaves the mirror exactly as the file last held it.
///
/// Cloning the store gives another handle onto the same mirror and file.
pub struct FileTaskStore<D: Database = File> {
    state: Arc<RwLock<TaskState<D>>>,
}

struct TaskState<D: Database> {
    // sink for full rewrites of the database
    tape: Tape<D>,

    // every user's list, in the order the lists were created
    task_lists: Vec<TaskList>,
}

impl<D: Database> FileTaskStore<D> {
    /// Creates a [`FileTaskStore`] over `database`, loading every task list it holds.
    ///
    /// An empty database is an empty store.
    ///
    /// # Errors
    /// Fails if the database cannot be read or does not hold a valid task list document.
    /// No store is returned in that case.
    #[instrument(skip(database))]
    pub fn open(mut database: D) -> Result<Self> {
        let task_lists: Vec<TaskList> = codec::load(&mut database)?;
        info!(
            users = task_lists.len(),
            tasks = task_lists.iter().map(|l| l.tasks.len()).sum::<usize>(),
            "loaded task store"
        );

        Ok(FileTaskStore {
            state: Arc::new(RwLock::new(TaskState {
                tape: Tape::new(database),
                task_lists,
            })),
        })
    }
}

impl<D: Database> Clone for FileTaskStore<D> {
    fn clone(&self) -> Self {
        FileTaskStore {
            state: Arc::clone(&self.state),
        }
    }
}

impl<D: Database> TaskStore for FileTaskStore<D> {
    fn get_tasks(&self, user: &str) -> Result<Option<Vec<Task>>> {
        let state = self.state.read();
        Ok(find(&state.task_lists, user).map(|list| list.tasks.clone()))
    }

    fn get_task(&self, id: u64) -> Result<Option<Task>> {
        let state = self.state.read();
        let task = state
            .task_lists
            .iter()
            .flat_map(|list| list.tasks.iter())
            .find(|task| task.id == id)
            .cloned();
        Ok(task)
    }

    #[instrument(skip(self, description))]
    fn add_task(&self, user: &str, description: &str) -> Result<Task> {
        let mut state = self.state.write();

        let id = next_id(
            state
                .task_lists
                .iter()
                .flat_map(|list| list.tasks.iter())
                .map(|task| task.id),
        )?;
        let task = Task {
            id,
            description: description.to_string(),
        };

        // stage on a copy, the mirror only changes once the file has
        let mut staged = state.task_lists.clone();
        match staged.iter_mut().find(|list| list.user == user) {
            Some(list) => list.tasks.push(task.clone()),
            None => {
                debug!("creating task list");
                staged.push(TaskList {
                    user: user.to_string(),
                    tasks: vec![task.clone()],
                });
            }
        }

        let document = codec::encode(&staged)?;
        if let Err(e) = state.tape.write(&document) {
            warn!(id, "task was not persisted: {}", e);
            return Err(e);
        }
        state.task_lists = staged;

        debug!(id, bytes = document.len(), "task added");
        Ok(task)
    }
}

/// searches `task_lists` for the list owned by `user`
fn find<'a>(task_lists: &'a [TaskList], user: &str) -> Option<&'a TaskList> {
    task_lists.iter().find(|list| list.user == user)
}
