//! Contact repository contract and JSON file implementation.
//!
//! # Responsibility
//! - Load the whole contact book from disk at startup.
//! - Write the whole contact book back after mutations.
//!
//! # Invariants
//! - A missing file loads as an empty book.
//! - Read paths reject invalid persisted entries instead of masking them.
//! - Saves overwrite the full document, pretty-printed with 4-space indent,
//!   non-ASCII text written literally, keys in book order.

use crate::model::contact::{BookError, ContactBook};
use crate::model::validation::validate_name;
use log::{error, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

const JSON_INDENT: &[u8] = b"    ";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for contact book storage.
#[derive(Debug)]
pub enum RepoError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// File parsed, but an entry breaks the book invariants.
    InvalidData {
        identifier: String,
        reason: BookError,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error on `{}`: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "malformed contact file `{}`: {source}", path.display())
            }
            Self::InvalidData { identifier, reason } => {
                write!(f, "invalid persisted contact `{identifier}`: {reason}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidData { reason, .. } => Some(reason),
        }
    }
}

/// Storage interface for whole-book load/save.
pub trait ContactRepository {
    fn load(&self) -> RepoResult<ContactBook>;
    fn save(&self, book: &ContactBook) -> RepoResult<()>;
}

/// JSON-file-backed contact repository.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> RepoError {
        RepoError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn json_error(&self, source: serde_json::Error) -> RepoError {
        RepoError::Json {
            path: self.path.clone(),
            source,
        }
    }

    fn read_book(&self) -> RepoResult<ContactBook> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(ContactBook::new()),
            Err(err) => return Err(self.io_error(err)),
        };
        let book: ContactBook = serde_json::from_str(&text).map_err(|err| self.json_error(err))?;
        validate_persisted(&book)?;
        Ok(book)
    }

    fn write_book(&self, book: &ContactBook) -> RepoResult<()> {
        let bytes = to_pretty_json(book).map_err(|err| self.json_error(err))?;
        std::fs::write(&self.path, bytes).map_err(|err| self.io_error(err))
    }
}

impl ContactRepository for JsonFileRepository {
    fn load(&self) -> RepoResult<ContactBook> {
        let started_at = Instant::now();
        match self.read_book() {
            Ok(book) => {
                info!(
                    "event=store_load module=repo status=ok duration_ms={} count={}",
                    started_at.elapsed().as_millis(),
                    book.len()
                );
                Ok(book)
            }
            Err(err) => {
                error!(
                    "event=store_load module=repo status=error duration_ms={} error_code={}",
                    started_at.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    fn save(&self, book: &ContactBook) -> RepoResult<()> {
        let started_at = Instant::now();
        match self.write_book(book) {
            Ok(()) => {
                info!(
                    "event=store_save module=repo status=ok duration_ms={} count={}",
                    started_at.elapsed().as_millis(),
                    book.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=repo status=error duration_ms={} error_code={}",
                    started_at.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }
}

fn validate_persisted(book: &ContactBook) -> RepoResult<()> {
    for entry in book.iter() {
        let invalid = |reason| RepoError::InvalidData {
            identifier: entry.identifier.to_string(),
            reason,
        };
        if !validate_name(entry.identifier) {
            return Err(invalid(BookError::InvalidName(entry.identifier.to_string())));
        }
        entry.contact.validate().map_err(invalid)?;
    }
    Ok(())
}

fn to_pretty_json(book: &ContactBook) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    book.serialize(&mut serializer)?;
    Ok(out)
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Io { .. } => "store_io_failed",
        RepoError::Json { .. } => "store_json_failed",
        RepoError::InvalidData { .. } => "store_invalid_data",
    }
}
