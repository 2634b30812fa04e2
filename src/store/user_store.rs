use std::fs::File;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use super::{codec, next_id, Database, Tape, UserStore};
use crate::models::{PasswordHash, User};
use crate::Result;

/// Persists registered users to a database file.
///
/// Works like [`FileTaskStore`](super::FileTaskStore): a full in-memory mirror, rebuilt from
/// the file on open and rewritten to it in full on every add. Only password hashes are ever
/// stored.
///
/// Email uniqueness is the caller's job. `add_user` will happily store a second user with an
/// email that is already taken; check [`UserStore::email_in_use`] first.
pub struct FileUserStore<D: Database = File> {
    state: Arc<RwLock<UserState<D>>>,
}

struct UserState<D: Database> {
    tape: Tape<D>,
    users: Vec<User>,
}

impl<D: Database> FileUserStore<D> {
    /// Creates a [`FileUserStore`] over `database`, loading every user it holds.
    ///
    /// # Errors
    /// Fails if the database cannot be read or does not hold a valid user document.
    #[instrument(skip(database))]
    pub fn open(mut database: D) -> Result<Self> {
        let users: Vec<User> = codec::load(&mut database)?;
        info!(users = users.len(), "loaded user store");

        Ok(FileUserStore {
            state: Arc::new(RwLock::new(UserState {
                tape: Tape::new(database),
                users,
            })),
        })
    }
}

impl<D: Database> Clone for FileUserStore<D> {
    fn clone(&self) -> Self {
        FileUserStore {
            state: Arc::clone(&self.state),
        }
    }
}

impl<D: Database> UserStore for FileUserStore<D> {
    #[instrument(skip(self, password))]
    fn add_user(&self, email: &str, password: PasswordHash) -> Result<User> {
        let mut state = self.state.write();

        let user = User {
            id: next_id(state.users.iter().map(|user| user.id))?,
            email: email.to_string(),
            password,
        };

        let mut staged = state.users.clone();
        staged.push(user.clone());

        let document = codec::encode(&staged)?;
        if let Err(e) = state.tape.write(&document) {
            warn!(id = user.id, "user was not persisted: {}", e);
            return Err(e);
        }
        state.users = staged;

        debug!(id = user.id, "user added");
        Ok(user)
    }

    fn get_user(&self, id: u64) -> Result<Option<User>> {
        let state = self.state.read();
        Ok(state.users.iter().find(|user| user.id == id).cloned())
    }

    fn get_users(&self) -> Result<Vec<User>> {
        Ok(self.state.read().users.clone())
    }

    fn email_in_use(&self, email: &str) -> bool {
        self.state.read().users.iter().any(|user| user.email == email)
    }
}
