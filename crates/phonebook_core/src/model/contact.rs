//! Contact record and in-memory contact book.
//!
//! # Responsibility
//! - Define the persisted record shape (`phone`, `birth_date`).
//! - Own the ordered identifier -> contact mapping and its mutations.
//!
//! # Invariants
//! - Every key passes `validate_name`.
//! - Every phone is 11 ASCII digits after normalization.
//! - Every birth date is empty or a valid `dd.mm.yyyy` calendar date.
//! - A failed operation leaves the book unchanged.
//!
//! # See also
//! - crate::model::validation

use crate::model::validation::{
    compose_identifier, normalize_name, parse_birth_date, validate_date, validate_name,
    validate_phone,
};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DAYS_PER_YEAR: i64 = 365;

pub type BookResult<T> = Result<T, BookError>;

/// Domain error for contact validation and lookups.
///
/// Every variant is recoverable: the operation is aborted and the book is
/// left as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    /// First or last name is not title-cased alphanumeric text.
    InvalidName(String),
    /// Phone is not 11 digits after `+7` normalization.
    InvalidPhone(String),
    /// Birth date is neither empty nor a valid `dd.mm.yyyy` date.
    InvalidDate(String),
    /// A contact with this identifier already exists.
    DuplicateIdentifier(String),
    RecordNotFound(String),
    /// Contact exists but has no birth date to compute an age from.
    MissingBirthDate(String),
}

impl Display for BookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(name) => write!(
                f,
                "invalid name `{name}`: use letters, digits and spaces, each word capitalized"
            ),
            Self::InvalidPhone(phone) => {
                write!(f, "invalid phone number `{phone}`: expected 11 digits")
            }
            Self::InvalidDate(date) => {
                write!(f, "invalid birth date `{date}`: expected dd.mm.yyyy")
            }
            Self::DuplicateIdentifier(id) => write!(f, "record already exists: {id}"),
            Self::RecordNotFound(id) => write!(f, "record not found: {id}"),
            Self::MissingBirthDate(id) => write!(f, "record has no birth date: {id}"),
        }
    }
}

impl Error for BookError {}

/// Persisted contact attributes. The identifier is the book key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Normalized 11-digit phone number.
    pub phone: String,
    /// `dd.mm.yyyy`, or empty when unknown.
    pub birth_date: String,
}

impl Contact {
    pub fn new(phone: impl Into<String>, birth_date: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            birth_date: birth_date.into(),
        }
    }

    /// Checks phone and birth date against the store rules.
    ///
    /// The phone must already be in normalized form; a stored `+7...` value
    /// is rejected even though it would normalize to a valid number.
    pub fn validate(&self) -> BookResult<()> {
        let (valid, normalized) = validate_phone(&self.phone);
        if !valid || normalized != self.phone {
            return Err(BookError::InvalidPhone(self.phone.clone()));
        }
        if !validate_date(&self.birth_date) {
            return Err(BookError::InvalidDate(self.birth_date.clone()));
        }
        Ok(())
    }

    /// Parsed birth date, `None` when unknown.
    pub fn parsed_birth_date(&self) -> Option<NaiveDate> {
        if self.birth_date.is_empty() {
            return None;
        }
        parse_birth_date(&self.birth_date)
    }
}

/// Raw input for creating a contact.
///
/// All fields are taken as typed by the user; [`ContactBook::add`] trims and
/// normalizes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    /// Empty means unknown.
    pub birth_date: String,
}

/// Partial update for an existing contact. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactUpdate {
    pub phone: Option<String>,
    pub birth_date: Option<String>,
}

impl ContactUpdate {
    /// Builds an update from prompt input where blank means "keep".
    pub fn from_input(phone: &str, birth_date: &str) -> Self {
        Self {
            phone: non_blank(phone),
            birth_date: non_blank(birth_date),
        }
    }
}

/// Borrowed view of one book entry, rendered as a display line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEntry<'a> {
    pub identifier: &'a str,
    pub contact: &'a Contact,
}

impl Display for ContactEntry<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: Phone: {}, Birth date: {}",
            self.identifier, self.contact.phone, self.contact.birth_date
        )
    }
}

/// Ordered identifier -> contact mapping.
///
/// Serialized as a plain JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactBook {
    entries: IndexMap<String, Contact>,
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a contact by raw identifier input (trimmed, title-cased).
    pub fn get(&self, identifier: &str) -> Option<&Contact> {
        self.entries.get(&normalize_name(identifier))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    /// Iterates entries in store order.
    pub fn iter(&self) -> impl Iterator<Item = ContactEntry<'_>> {
        self.entries
            .iter()
            .map(|(identifier, contact)| ContactEntry {
                identifier: identifier.as_str(),
                contact,
            })
    }

    /// Validates and inserts a new contact, returning its identifier.
    ///
    /// # Errors
    /// Checks run in order and the first failure is returned:
    /// `InvalidName`, `DuplicateIdentifier`, `InvalidPhone`, `InvalidDate`.
    pub fn add(&mut self, input: &NewContact) -> BookResult<String> {
        let identifier = self.check_identifier(&input.first_name, &input.last_name)?;
        let phone = check_phone(&input.phone)?;
        let birth_date = check_birth_date(&input.birth_date)?;

        self.entries
            .insert(identifier.clone(), Contact::new(phone, birth_date));
        Ok(identifier)
    }

    /// Normalizes both name parts and returns the identifier `add` would use.
    ///
    /// # Errors
    /// `InvalidName` for the first bad part, then `DuplicateIdentifier`.
    pub fn check_identifier(&self, first_name: &str, last_name: &str) -> BookResult<String> {
        let first_name = normalize_name(first_name);
        let last_name = normalize_name(last_name);
        for name in [&first_name, &last_name] {
            if !validate_name(name) {
                return Err(BookError::InvalidName(name.clone()));
            }
        }

        let identifier = compose_identifier(&first_name, &last_name);
        if self.entries.contains_key(&identifier) {
            return Err(BookError::DuplicateIdentifier(identifier));
        }
        Ok(identifier)
    }

    /// Removes a contact and returns it.
    ///
    /// Remaining entries keep their relative order.
    pub fn remove(&mut self, identifier: &str) -> BookResult<Contact> {
        let identifier = normalize_name(identifier);
        self.entries
            .shift_remove(&identifier)
            .ok_or(BookError::RecordNotFound(identifier))
    }

    /// Applies a partial update atomically.
    ///
    /// Phone is validated before birth date; the first invalid field aborts
    /// the whole update and nothing is written.
    pub fn update(&mut self, identifier: &str, update: &ContactUpdate) -> BookResult<&Contact> {
        let identifier = normalize_name(identifier);
        let Some(slot) = self.entries.get_mut(&identifier) else {
            return Err(BookError::RecordNotFound(identifier));
        };

        let mut next = slot.clone();
        if let Some(phone) = &update.phone {
            next.phone = check_phone(phone)?;
        }
        if let Some(birth_date) = &update.birth_date {
            next.birth_date = check_birth_date(birth_date)?;
        }

        *slot = next;
        Ok(&*slot)
    }

    /// Finds contacts by identifier substring or exact field value.
    ///
    /// The query is trimmed and title-cased. It matches a contact when it is
    /// contained in the identifier, or when it equals the phone or the birth
    /// date exactly. Field values are never substring-matched.
    pub fn search(&self, query: &str) -> Vec<ContactEntry<'_>> {
        let query = normalize_name(query);
        self.iter()
            .filter(|entry| {
                entry.identifier.contains(query.as_str())
                    || entry.contact.phone == query
                    || entry.contact.birth_date == query
            })
            .collect()
    }

    /// Approximate age in whole years on `today`.
    ///
    /// Computed as elapsed days floor-divided by 365; leap days and whether
    /// the birthday already passed this year are ignored.
    pub fn age_on(&self, identifier: &str, today: NaiveDate) -> BookResult<i64> {
        let identifier = normalize_name(identifier);
        let Some(contact) = self.entries.get(&identifier) else {
            return Err(BookError::RecordNotFound(identifier));
        };
        if contact.birth_date.is_empty() {
            return Err(BookError::MissingBirthDate(identifier));
        }
        let born = contact
            .parsed_birth_date()
            .ok_or_else(|| BookError::InvalidDate(contact.birth_date.clone()))?;
        Ok((today - born).num_days().div_euclid(DAYS_PER_YEAR))
    }
}

/// Trims and normalizes a phone, failing with `InvalidPhone`.
pub fn check_phone(raw: &str) -> BookResult<String> {
    let raw = raw.trim();
    let (valid, normalized) = validate_phone(raw);
    if !valid {
        return Err(BookError::InvalidPhone(raw.to_string()));
    }
    Ok(normalized)
}

/// Trims a birth date and checks it, failing with `InvalidDate`.
pub fn check_birth_date(raw: &str) -> BookResult<String> {
    let raw = raw.trim();
    if !validate_date(raw) {
        return Err(BookError::InvalidDate(raw.to_string()));
    }
    Ok(raw.to_string())
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
