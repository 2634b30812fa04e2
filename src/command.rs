use serde::{Deserialize, Serialize};

use crate::models::{Account, Task};

/// These are the requests a client can make of a yatta server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// get every task of a user
    GetTasks {
        /// the owner of the task list
        user: String,
    },
    /// get one task by id
    GetTask {
        /// the task id
        id: u64,
    },
    /// add a task to a user's list, creating the list if needed
    AddTask {
        /// the owner of the task list
        user: String,
        /// what needs doing
        description: String,
    },
    /// register a new account
    AddUser {
        /// must not already be registered
        email: String,
        /// plaintext, the server hashes it before storing
        password: String,
    },
    /// get one account by id
    GetUser {
        /// the user id
        id: u64,
    },
    /// get every account
    GetUsers,
    /// check an email and password pair
    Authenticate {
        /// the account's email
        email: String,
        /// plaintext password to check
        password: String,
    },
}

/// The responses a server can send back for a [`Request`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// a user's task list
    Tasks(Vec<Task>),
    /// a single task, either found or just created
    Task(Task),
    /// a single account, either found, just registered, or just authenticated
    User(Account),
    /// every account
    Users(Vec<Account>),
    /// the requested user, task or task list does not exist
    NotFound,
    /// the request clashes with existing data
    Conflict(String),
    /// the email and password did not match an account
    Unauthorized,
    /// the server failed while processing the request
    Err(String),
}
