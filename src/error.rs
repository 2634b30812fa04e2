use std::fmt;
use std::io;
use thiserror::Error;

/// type alias for all operations in this crate that could fail with a [`YattaError`]
pub type Result<T> = std::result::Result<T, YattaError>;

/// The step of a database file access that failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// repositioning the cursor
    Seek,
    /// reading the whole file
    Read,
    /// cutting the file to zero length
    Truncate,
    /// writing the new document
    Write,
    /// flushing the written bytes
    Flush,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Seek => "seek",
            Phase::Read => "read",
            Phase::Truncate => "truncate",
            Phase::Write => "write",
            Phase::Flush => "flush",
        };
        f.write_str(name)
    }
}

/// The Error variants used throughout yatta.
///
/// "Not found" is never an error here: lookups return `Ok(None)` for absent records.
#[derive(Error, Debug)]
pub enum YattaError {
    /// an access to a store's database file failed
    #[error("could not {phase} database: {source}")]
    Database {
        /// which step failed
        phase: Phase,
        /// the underlying failure
        #[source]
        source: io::Error,
    },

    /// any other IO failure (sockets, directories, thread spawning)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// the persisted document is not valid JSON for the store
    #[error("could not decode database {:?}: {source}", String::from_utf8_lossy(.content))]
    Decode {
        /// the raw document that failed to parse, byte for byte
        content: Vec<u8>,
        /// the parse failure
        #[source]
        source: serde_json::Error,
    },

    /// a document or protocol message could not be serialized or deserialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// the password could not be hashed, or a stored hash is malformed
    #[error("password hashing error: {0}")]
    Password(String),

    /// a password did not match its stored hash
    #[error("password does not match")]
    PasswordMismatch,

    /// a registration used an email address that already has an account
    #[error("email address already in use: {0}")]
    EmailInUse(String),

    /// the largest id is already `u64::MAX`
    #[error("no more ids are available")]
    IdsExhausted,

    /// a command line value could not be parsed
    #[error("{0}")]
    Parsing(String),

    /// the server answered a request with an error
    #[error("server error: {0}")]
    Server(String),

    /// catch-all for errors that carry only a message
    #[error("{0}")]
    StringErr(String),
}

impl YattaError {
    pub(crate) fn database(phase: Phase) -> impl FnOnce(io::Error) -> YattaError {
        move |source| YattaError::Database { phase, source }
    }
}
