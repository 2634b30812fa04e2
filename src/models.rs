//! The records kept by the task and user stores.
//!
//! Field names on the wire and on disk are capitalized (`"ID"`, `"User"`, ...). The lowercase
//! spellings are accepted when reading so that hand-written seed files load as well.
use argon2::password_hash::{self, rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use crate::error::{Result, YattaError};

/// A single task. Ids are unique across every user of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// assigned by the store when the task is added
    #[serde(rename = "ID", alias = "id")]
    pub id: u64,
    /// free-form text
    #[serde(rename = "Description", alias = "description")]
    pub description: String,
}

/// All tasks belonging to one user key, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    /// case-sensitive owner key
    #[serde(rename = "User", alias = "user")]
    pub user: String,
    /// append-only
    #[serde(rename = "Tasks", alias = "tasks")]
    pub tasks: Vec<Task>,
}

/// A registered account, as persisted by the user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// assigned by the store when the user is added
    #[serde(rename = "ID", alias = "id")]
    pub id: u64,
    /// login name, expected to be unique
    #[serde(rename = "Email", alias = "email")]
    pub email: String,
    /// hash of the password, never the plaintext
    #[serde(rename = "Password", alias = "password")]
    pub password: PasswordHash,
}

/// The public view of a [`User`]. This is what leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// the user's id
    pub id: u64,
    /// the user's email address
    pub email: String,
}

impl From<&User> for Account {
    fn from(user: &User) -> Self {
        Account {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// A salted Argon2id password hash in PHC string format.
///
/// The value is opaque: it is only ever produced by [`PasswordHash::new`] (or loaded back from
/// a store) and only ever consumed by [`PasswordHash::verify`]. It serializes as a plain JSON
/// string and is never rewritten on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// smallest accepted cost, handy for tests
    pub const MIN_COST: u32 = 1;

    /// cost used by the server unless configured otherwise
    pub const DEFAULT_COST: u32 = 2;

    /// Hashes and salts `password`. `cost` is the Argon2 time cost (number of passes).
    ///
    /// # Errors
    /// `YattaError::Password` if `cost` is outside what Argon2 accepts (e.g. zero).
    pub fn new(password: &str, cost: u32) -> Result<Self> {
        let params = Params::new(Params::DEFAULT_M_COST, cost, Params::DEFAULT_P_COST, None)
            .map_err(|e| YattaError::Password(format!("invalid cost {}: {}", cost, e)))?;
        let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);

        let hash = hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| YattaError::Password(e.to_string()))?;
        Ok(PasswordHash(hash.to_string()))
    }

    /// Checks a plaintext `password` against this hash.
    ///
    /// # Errors
    /// `YattaError::PasswordMismatch` when the password is wrong, `YattaError::Password` when
    /// this value is not a parseable hash.
    pub fn verify(&self, password: &str) -> Result<()> {
        let parsed = password_hash::PasswordHash::new(&self.0)
            .map_err(|e| YattaError::Password(e.to_string()))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(()),
            Err(password_hash::Error::Password) => Err(YattaError::PasswordMismatch),
            Err(e) => Err(YattaError::Password(e.to_string())),
        }
    }

    /// Wraps an already-encoded hash without checking it.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        PasswordHash(encoded.into())
    }

    /// the encoded hash string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
