use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Deserializer;
use tracing::{debug, error, info, warn};

use crate::command::{Request, Response};
use crate::models::{Account, PasswordHash};
use crate::store::{TaskStore, UserStore};
use crate::thread_pool::ThreadPool;
use crate::{Result, YattaError};

/// A TCP socket server over a task store and a user store.
///
/// It listens for incoming [`Request`]s, and handles each connection on a thread of its
/// [`ThreadPool`]. Every thread gets its own handle to both stores.
///
/// # Example
/// Serve stores kept in the current directory on "127.0.0.1:8000", with 4 threads:
/// ```rust
/// use std::path::Path;
/// use yatta::{open_database, FileTaskStore, FileUserStore, PasswordHash, YattaServer};
/// use yatta::thread_pool::{SharedQueueThreadPool, ThreadPool};
/// # fn main() -> yatta::Result<()> {
/// let tasks = FileTaskStore::open(open_database(Path::new("todos.db.json"))?)?;
/// let users = FileUserStore::open(open_database(Path::new("users.db.json"))?)?;
/// let pool = SharedQueueThreadPool::new(4)?;
/// let server = YattaServer::new(tasks, users, pool, PasswordHash::DEFAULT_COST);
/// // server.run("127.0.0.1:8000")?;
/// # Ok(())
/// # }
/// ```
pub struct YattaServer<T: TaskStore, U: UserStore, P: ThreadPool> {
    handler: Handler<T, U>,
    pool: P,
}

impl<T: TaskStore, U: UserStore, P: ThreadPool> YattaServer<T, U, P> {
    /// Creates a server. New passwords are hashed with `hash_cost`.
    pub fn new(tasks: T, users: U, pool: P, hash_cost: u32) -> Self {
        YattaServer {
            handler: Handler {
                tasks,
                users,
                hash_cost,
                registration: Arc::new(Mutex::new(())),
            },
            pool,
        }
    }

    /// Binds to `addr` and serves connections until the listener fails.
    ///
    /// # Errors
    /// Returns an error if the address could not be bound.
    pub fn run<A: ToSocketAddrs>(self, addr: A) -> Result<()> {
        let listener = TcpListener::bind(addr)?;
        self.serve(listener)
    }

    /// Serves connections arriving on an already bound `listener`.
    pub fn serve(self, listener: TcpListener) -> Result<()> {
        info!("Listening on {}", listener.local_addr()?);
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let handler = self.handler.clone();
                    self.pool.spawn(move || {
                        if let Err(e) = serve(handler, stream) {
                            error!("Error on serving client: {}", e);
                        }
                    });
                }
                Err(e) => error!("Connection failed: {}", e),
            }
        }
        Ok(())
    }
}

/// Everything a connection needs to answer requests.
struct Handler<T: TaskStore, U: UserStore> {
    tasks: T,
    users: U,
    hash_cost: u32,
    // held across the email check and the add, so two registrations of one email can't both pass
    registration: Arc<Mutex<()>>,
}

impl<T: TaskStore, U: UserStore> Clone for Handler<T, U> {
    fn clone(&self) -> Self {
        Handler {
            tasks: self.tasks.clone(),
            users: self.users.clone(),
            hash_cost: self.hash_cost,
            registration: Arc::clone(&self.registration),
        }
    }
}

impl<T: TaskStore, U: UserStore> Handler<T, U> {
    fn handle(&self, req: Request) -> Response {
        let result = match req {
            Request::GetTasks { user } => self
                .tasks
                .get_tasks(&user)
                .map(|tasks| tasks.map_or(Response::NotFound, Response::Tasks)),
            Request::GetTask { id } => self
                .tasks
                .get_task(id)
                .map(|task| task.map_or(Response::NotFound, Response::Task)),
            Request::AddTask { user, description } => {
                self.tasks.add_task(&user, &description).map(Response::Task)
            }
            Request::AddUser { email, password } => self.register(&email, &password),
            Request::GetUser { id } => self
                .users
                .get_user(id)
                .map(|user| user.map_or(Response::NotFound, |u| Response::User(Account::from(&u)))),
            Request::GetUsers => self
                .users
                .get_users()
                .map(|users| Response::Users(users.iter().map(Account::from).collect())),
            Request::Authenticate { email, password } => self.authenticate(&email, &password),
        };

        result.unwrap_or_else(|e| {
            error!("request failed: {}", e);
            Response::Err(e.to_string())
        })
    }

    fn register(&self, email: &str, password: &str) -> Result<Response> {
        let _guard = self.registration.lock();
        if self.users.email_in_use(email) {
            debug!("rejected registration of an email in use");
            return Ok(Response::Conflict(
                YattaError::EmailInUse(email.to_string()).to_string(),
            ));
        }

        let hash = PasswordHash::new(password, self.hash_cost)?;
        let user = self.users.add_user(email, hash)?;
        info!(id = user.id, "registered user");
        Ok(Response::User(Account::from(&user)))
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Response> {
        let users = self.users.get_users()?;
        let user = match users.iter().find(|user| user.email == email) {
            Some(user) => user,
            None => return Ok(Response::Unauthorized),
        };

        match user.password.verify(password) {
            Ok(()) => Ok(Response::User(Account::from(user))),
            Err(YattaError::PasswordMismatch) => {
                warn!(id = user.id, "failed login");
                Ok(Response::Unauthorized)
            }
            Err(e) => Err(e),
        }
    }
}

/// Reads [`Request`]s off the `tcp` stream until the client hangs up, answering each with a
/// [`Response`].
fn serve<T: TaskStore, U: UserStore>(handler: Handler<T, U>, tcp: TcpStream) -> Result<()> {
    let peer_addr = tcp.peer_addr()?;
    let stream_reader = BufReader::new(&tcp);
    let mut stream_writer = BufWriter::new(&tcp);
    let req_reader = Deserializer::from_reader(stream_reader).into_iter::<Request>();

    let mut send_resp = move |resp: Response| -> Result<()> {
        serde_json::to_writer(&mut stream_writer, &resp)?;
        stream_writer.flush()?;
        debug!("Response sent to {}: {:?}", peer_addr, resp);
        Ok(())
    };

    for req in req_reader {
        let req = req?;
        debug!("Receive request from {}: {:?}", peer_addr, redact(&req));
        send_resp(handler.handle(req))?;
    }
    Ok(())
}

/// a loggable copy of `req` without plaintext passwords
fn redact(req: &Request) -> Request {
    match req {
        Request::AddUser { email, .. } => Request::AddUser {
            email: email.clone(),
            password: "***".to_string(),
        },
        Request::Authenticate { email, .. } => Request::Authenticate {
            email: email.clone(),
            password: "***".to_string(),
        },
        other => other.clone(),
    }
}
