use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};

use serde::Deserialize;
use serde_json::de::IoRead;
use serde_json::Deserializer;

use crate::command::{Request, Response};
use crate::models::{Account, Task};
use crate::{Result, YattaError};

/// `YattaClient` contains the functionality for communication with a [`YattaServer`]
///
/// [`YattaServer`]: crate::YattaServer
pub struct YattaClient {
    reader: Deserializer<IoRead<BufReader<TcpStream>>>,
    writer: BufWriter<TcpStream>,
}

impl YattaClient {
    /// creates a client and establishes a socket connection to the server at the given `addr`
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let tcp_reader = TcpStream::connect(addr)?;
        let tcp_writer = tcp_reader.try_clone()?;

        Ok(YattaClient {
            reader: Deserializer::from_reader(BufReader::new(tcp_reader)),
            writer: BufWriter::new(tcp_writer),
        })
    }

    /// gets every task of `user`
    /// ## Returns
    /// `Ok(None)` if the user has no task list
    pub fn get_tasks(&mut self, user: &str) -> Result<Option<Vec<Task>>> {
        match self.send(Request::GetTasks { user: user.to_string() })? {
            Response::Tasks(tasks) => Ok(Some(tasks)),
            Response::NotFound => Ok(None),
            other => Err(unexpected(other)),
        }
    }

    /// gets the task with the given `id`, or `None` if there is no such task
    pub fn get_task(&mut self, id: u64) -> Result<Option<Task>> {
        match self.send(Request::GetTask { id })? {
            Response::Task(task) => Ok(Some(task)),
            Response::NotFound => Ok(None),
            other => Err(unexpected(other)),
        }
    }

    /// adds a task for `user` and returns it with its assigned id
    pub fn add_task(&mut self, user: &str, description: &str) -> Result<Task> {
        let req = Request::AddTask {
            user: user.to_string(),
            description: description.to_string(),
        };
        match self.send(req)? {
            Response::Task(task) => Ok(task),
            other => Err(unexpected(other)),
        }
    }

    /// registers a new account
    /// # Errors
    /// `YattaError::EmailInUse` if `email` already belongs to an account
    pub fn register(&mut self, email: &str, password: &str) -> Result<Account> {
        let req = Request::AddUser {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.send(req)? {
            Response::User(account) => Ok(account),
            Response::Conflict(_) => Err(YattaError::EmailInUse(email.to_string())),
            other => Err(unexpected(other)),
        }
    }

    /// gets the account with the given `id`, or `None` if there is no such account
    pub fn get_user(&mut self, id: u64) -> Result<Option<Account>> {
        match self.send(Request::GetUser { id })? {
            Response::User(account) => Ok(Some(account)),
            Response::NotFound => Ok(None),
            other => Err(unexpected(other)),
        }
    }

    /// gets every account
    pub fn get_users(&mut self) -> Result<Vec<Account>> {
        match self.send(Request::GetUsers)? {
            Response::Users(accounts) => Ok(accounts),
            other => Err(unexpected(other)),
        }
    }

    /// checks `email` and `password`
    /// ## Returns
    /// the account if they match, `Ok(None)` if they don't
    pub fn authenticate(&mut self, email: &str, password: &str) -> Result<Option<Account>> {
        let req = Request::Authenticate {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.send(req)? {
            Response::User(account) => Ok(Some(account)),
            Response::Unauthorized => Ok(None),
            other => Err(unexpected(other)),
        }
    }

    fn send(&mut self, req: Request) -> Result<Response> {
        serde_json::to_writer(&mut self.writer, &req)?;
        self.writer.flush()?;
        Ok(Response::deserialize(&mut self.reader)?)
    }
}

/// turns a response the caller did not ask for into an error, re-throwing server errors
fn unexpected(resp: Response) -> YattaError {
    match resp {
        Response::Err(msg) => YattaError::Server(msg),
        other => YattaError::StringErr(format!("unexpected response: {:?}", other)),
    }
}
