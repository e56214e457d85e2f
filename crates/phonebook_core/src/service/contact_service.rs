//! Contact use-case service.
//!
//! # Responsibility
//! - Own the in-memory contact book and its repository.
//! - Persist the whole book after every successful mutation.
//!
//! # Invariants
//! - A failed book operation never triggers a save.
//! - Log events carry counts and outcomes only, never contact fields.

use crate::model::contact::{
    BookError, Contact, ContactBook, ContactEntry, ContactUpdate, NewContact,
};
use crate::repo::json_repo::{ContactRepository, RepoError};
use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for contact use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Recoverable validation or lookup failure.
    Book(BookError),
    /// Persistence failure.
    Repo(RepoError),
}

impl ServiceError {
    /// Returns the domain error when this failure is user-recoverable.
    pub fn as_book_error(&self) -> Option<&BookError> {
        match self {
            Self::Book(err) => Some(err),
            Self::Repo(_) => None,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Book(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Book(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<BookError> for ServiceError {
    fn from(value: BookError) -> Self {
        Self::Book(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service wrapping a contact book and its storage.
pub struct ContactService<R: ContactRepository> {
    repo: R,
    book: ContactBook,
}

impl<R: ContactRepository> ContactService<R> {
    /// Loads the book from `repo` and returns a ready service.
    pub fn open(repo: R) -> ServiceResult<Self> {
        let book = repo.load()?;
        info!("event=service_open module=service status=ok count={}", book.len());
        Ok(Self { repo, book })
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn len(&self) -> usize {
        self.book.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }

    pub fn get(&self, identifier: &str) -> Option<&Contact> {
        self.book.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.book.contains(identifier)
    }

    /// Runs the name and duplicate checks of `add` without inserting.
    pub fn check_identifier(&self, first_name: &str, last_name: &str) -> ServiceResult<String> {
        Ok(self.book.check_identifier(first_name, last_name)?)
    }

    /// Adds a contact and saves. Returns the new identifier.
    pub fn add(&mut self, input: &NewContact) -> ServiceResult<String> {
        let identifier = self
            .book
            .add(input)
            .inspect_err(|err| log_rejected("contact_add", err))?;
        self.persist("contact_add")?;
        Ok(identifier)
    }

    /// Deletes a contact and saves. Returns the removed record.
    pub fn delete(&mut self, identifier: &str) -> ServiceResult<Contact> {
        let removed = self
            .book
            .remove(identifier)
            .inspect_err(|err| log_rejected("contact_delete", err))?;
        self.persist("contact_delete")?;
        Ok(removed)
    }

    /// Applies a partial update and saves. Returns the updated record.
    pub fn update(&mut self, identifier: &str, update: &ContactUpdate) -> ServiceResult<Contact> {
        let updated = self
            .book
            .update(identifier, update)
            .inspect_err(|err| log_rejected("contact_update", err))?
            .clone();
        debug!(
            "event=contact_update module=service phone_changed={} birth_date_changed={}",
            update.phone.is_some(),
            update.birth_date.is_some()
        );
        self.persist("contact_update")?;
        Ok(updated)
    }

    pub fn search(&self, query: &str) -> Vec<ContactEntry<'_>> {
        let hits = self.book.search(query);
        debug!("event=contact_search module=service hits={}", hits.len());
        hits
    }

    /// Lists every contact in store order.
    pub fn list(&self) -> Vec<ContactEntry<'_>> {
        self.book.iter().collect()
    }

    /// Approximate age in whole years as of the local current date.
    pub fn age_of(&self, identifier: &str) -> ServiceResult<i64> {
        self.age_on(identifier, Local::now().date_naive())
    }

    pub fn age_on(&self, identifier: &str, today: NaiveDate) -> ServiceResult<i64> {
        let age = self
            .book
            .age_on(identifier, today)
            .inspect_err(|err| log_rejected("contact_age", err))?;
        Ok(age)
    }

    /// Saves the current book unconditionally.
    pub fn flush(&self) -> ServiceResult<()> {
        self.persist("flush")
    }

    fn persist(&self, operation: &str) -> ServiceResult<()> {
        self.repo.save(&self.book)?;
        info!(
            "event={} module=service status=ok count={}",
            operation,
            self.book.len()
        );
        Ok(())
    }
}

fn log_rejected(operation: &str, err: &BookError) {
    warn!(
        "event={} module=service status=rejected error_code={}",
        operation,
        book_error_code(err)
    );
}

fn book_error_code(err: &BookError) -> &'static str {
    match err {
        BookError::InvalidName(_) => "invalid_name",
        BookError::InvalidPhone(_) => "invalid_phone",
        BookError::InvalidDate(_) => "invalid_date",
        BookError::DuplicateIdentifier(_) => "duplicate_identifier",
        BookError::RecordNotFound(_) => "record_not_found",
        BookError::MissingBirthDate(_) => "missing_birth_date",
    }
}
