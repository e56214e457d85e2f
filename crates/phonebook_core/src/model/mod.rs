//! Contact domain model.
//!
//! # Responsibility
//! - Define the contact record, the ordered contact book and its errors.
//! - Keep every field rule in one pure validation module.
//!
//! # Invariants
//! - Contacts are identified by `"<First> <Last>"`, title-cased and unique.
//! - The book never holds a record that fails validation.

pub mod contact;
pub mod validation;
