//! # randtoken-vault
//!
//! Issues, stores and retires batches of random tokens.
//!
//! This crate provides:
//! - Token generation from a configurable character pool ([`TokenGenerator`])
//! - A password-gated record store persisted atomically to JSON ([`RecordStore`])
//! - One-time export: a confirmed export writes an artifact and deletes the record
//!   ([`LifecycleManager::export`])
//!
//! ## Record Lifecycle
//!
//! | Operation | Precondition | Effect |
//! |-----------|--------------|--------|
//! | `generate` | id absent | record created, tokens returned once |
//! | `export` | id present, password matches, confirmed | artifact written, record removed |
//! | `delete` | id present | record removed |
//! | `list` | none | read only |
//!
//! Formatting results for people is left to the caller.

pub mod error;
pub mod export;
pub mod generator;
pub mod lifecycle;
pub mod password;
pub mod record;
pub mod store;

pub use error::{LifecycleError, StoreError};
pub use export::{ExportArtifact, ExportWriter, StagedExport};
pub use generator::TokenGenerator;
pub use lifecycle::{
    CONFIRMATION_LITERAL, ExportOutcome, ExportReceipt, GeneratedBatch, LifecycleManager,
    ListingSummary, RecordView, SummaryEntry, is_confirmed,
};
pub use password::{hash_password, verify_password};
pub use record::{CREATED_AT_FORMAT, Store, TokenRecord};
pub use store::RecordStore;
