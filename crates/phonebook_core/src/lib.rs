//! Core domain logic for the phonebook.
//! This crate is the single source of truth for contact invariants.

pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::contact::{
    check_birth_date, check_phone, BookError, BookResult, Contact, ContactBook, ContactEntry,
    ContactUpdate, NewContact,
};
pub use model::validation::{
    compose_identifier, normalize_name, title_case, validate_date, validate_name, validate_phone,
};
pub use repo::json_repo::{ContactRepository, JsonFileRepository, RepoError, RepoResult};
pub use service::contact_service::{ContactService, ServiceError, ServiceResult};
