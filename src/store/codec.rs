//! Whole-document JSON encoding of a store's records.
//!
//! A store's file is always a single JSON array holding every record. There is no append
//! format and nothing incremental to reconcile.
use std::io::{Read, Seek, SeekFrom};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use super::Database;
use crate::error::{Phase, Result, YattaError};

/// Reads the whole of `database` from its start and decodes it.
pub fn load<T: DeserializeOwned, D: Database>(database: &mut D) -> Result<Vec<T>> {
    database
        .seek(SeekFrom::Start(0))
        .map_err(YattaError::database(Phase::Seek))?;

    let mut raw = Vec::new();
    database
        .read_to_end(&mut raw)
        .map_err(YattaError::database(Phase::Read))?;
    trace!(bytes = raw.len(), "read database");

    decode(&raw)
}

/// Decodes a JSON array of records.
///
/// An empty input is an empty collection: a freshly created database file has zero bytes.
///
/// # Errors
/// `YattaError::Decode`, carrying the offending document, if `raw` is not empty and not a
/// valid array of `T`.
pub fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<Vec<T>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_slice(raw).map_err(|source| YattaError::Decode {
        content: raw.to_vec(),
        source,
    })
}

/// Encodes `records` as one compact JSON array.
pub fn encode<T: Serialize>(records: &[T]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(records)?)
}
