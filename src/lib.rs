#![deny(missing_docs)]
//! A multithreaded, persistent, multi-user task list service.
//!
//! This crate provides the [`FileTaskStore`] and [`FileUserStore`] storage engines, as well as
//! a [`yatta-client`] and [`yatta-server`] executable that can be used to work with them over
//! the network.
//!
//! ## Supported Operations
//! Task lists are keyed by a plain user name:
//!
//! - `GET TASKS` of a user (absent if the user has never added one)
//! - `GET TASK` by id, across all users
//! - `ADD TASK` to a user's list, creating the list on first use
//!
//! Accounts are registered with an email address and a password, of which only an Argon2id
//! hash is stored:
//!
//! - `ADD USER`, rejected by the server if the email is already in use
//! - `GET USER` by id, and `GET USERS`
//! - `AUTHENTICATE` an email and password pair
//!
//! See the [`TaskStore`] and [`UserStore`] traits and the [`Request`] and [`Response`] types for
//! more information on these operations.
//!
//! ## Stores
//! Each store owns one database file, which always holds one JSON document: an array of task
//! lists, or an array of users. The store keeps the whole document in memory and serves reads
//! from it. Every add rewrites the whole file through a [`Tape`], which truncates before it
//! writes so that a shorter document never leaves bytes of an older, longer one behind.
//!
//! Ids are assigned by the stores. A new id is one more than the largest id currently held,
//! so task ids are unique across all users, not just within one list.
//!
//! ## Client / Server
//! Client and server logic is contained in the [`YattaClient`] and [`YattaServer`] structs.
//! A [`Request`] is encoded to a JSON string and sent over a TCP stream; the server answers
//! each one with a [`Response`]. Records that do not exist come back as
//! [`Response::NotFound`], failures as [`Response::Err`].
//!
//! ## Database Files
//! By default the server keeps `todos.db.json` and `users.db.json` in the directory it was
//! started from. See [`ServerConfig`].
//!
//! [`yatta-server`]: ./yatta-server.rs
//! [`yatta-client`]: ./yatta-client.rs

pub use client::YattaClient;
pub use command::{Request, Response};
pub use config::{PoolKind, ServerConfig};
pub use error::{Phase, Result, YattaError};
pub use models::{Account, PasswordHash, Task, TaskList, User};
pub use server::YattaServer;
pub use store::{open_database, Database, FileTaskStore, FileUserStore, Tape, TaskStore, UserStore};
pub use thread_pool::{RayonThreadPool, SharedQueueThreadPool, ThreadPool};

mod client;
mod command;
pub mod config;
mod error;
pub mod models;
mod server;
pub mod store;
pub mod thread_pool;
