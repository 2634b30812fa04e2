#![allow(dead_code)]

use std::fs;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tempfile::NamedTempFile;
use yatta::Database;

/// Creates a temporary database file holding `initial_data`.
/// The file is removed when the returned value is dropped.
pub fn create_temp_file(initial_data: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("could not create temporary file");
    file.write_all(initial_data.as_bytes())
        .expect("could not write initial data to temp file");
    file
}

/// reads back everything currently in the file at `path`
pub fn contents(path: &Path) -> String {
    fs::read_to_string(path).expect("could not read database file")
}

/// An in-memory database whose writes can be switched to fail.
pub struct FlakyDatabase {
    inner: Cursor<Vec<u8>>,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyDatabase {
    pub fn new(initial_data: &str) -> (Self, Arc<AtomicBool>) {
        let fail_writes = Arc::new(AtomicBool::new(false));
        let db = FlakyDatabase {
            inner: Cursor::new(initial_data.as_bytes().to_vec()),
            fail_writes: Arc::clone(&fail_writes),
        };
        (db, fail_writes)
    }
}

impl Read for FlakyDatabase {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for FlakyDatabase {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl Write for FlakyDatabase {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Database for FlakyDatabase {
    fn truncate(&mut self) -> io::Result<()> {
        self.inner.get_mut().clear();
        Ok(())
    }
}
