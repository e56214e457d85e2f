//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the whole-book load/save contract.
//! - Isolate file format details from service orchestration.
//!
//! # Invariants
//! - Loaded books satisfy the same invariants as books built via `add`.
//! - Repository APIs report I/O, format and data errors separately.

pub mod json_repo;
