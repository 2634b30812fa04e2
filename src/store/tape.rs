use std::io::{Seek, SeekFrom, Write};

use super::Database;
use crate::error::{Phase, Result, YattaError};

/// A write-only sink over a [`Database`] where every write replaces the whole file.
///
/// Writing a shorter document over a longer one through a plain seek-and-write would leave
/// the tail of the old document behind. The tape truncates first, on every write.
///
/// A tape deliberately does not implement [`std::io::Write`]: a streaming serializer issues
/// many small writes, and each one would wipe the last. Hand it complete documents only.
#[derive(Debug)]
pub struct Tape<D: Database> {
    database: D,
}

impl<D: Database> Tape<D> {
    /// wraps `database`; nothing is written until [`Tape::write`] is called
    pub fn new(database: D) -> Self {
        Tape { database }
    }

    /// Replaces the entire contents of the database with `bytes`.
    ///
    /// # Errors
    /// Returns `YattaError::Database` naming the phase (truncate, seek, write or flush) that
    /// failed. Nothing is retried, so after a failure the file may be empty or partial.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.database
            .truncate()
            .map_err(YattaError::database(Phase::Truncate))?;
        self.database
            .seek(SeekFrom::Start(0))
            .map_err(YattaError::database(Phase::Seek))?;
        self.database
            .write_all(bytes)
            .map_err(YattaError::database(Phase::Write))?;
        self.database
            .flush()
            .map_err(YattaError::database(Phase::Flush))?;
        Ok(bytes.len())
    }

    /// gives back the wrapped database
    pub fn into_inner(self) -> D {
        self.database
    }
}
