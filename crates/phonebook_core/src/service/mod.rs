//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate book operations and repository saves into use-case APIs.
//! - Keep the CLI decoupled from storage details.

pub mod contact_service;
