//! Token record lifecycle.
//!
//! Each sequence id moves `NONE -> EXISTS -> NONE`: `generate` creates the
//! record, and either `delete` or a confirmed `export` retires it. Mutating
//! operations hold the store's write lock across modify-and-persist; if
//! persisting fails the in-memory change is rolled back, so memory and disk
//! never disagree.

use crate::error::LifecycleError;
use crate::export::ExportWriter;
use crate::generator::TokenGenerator;
use crate::password::{hash_password, verify_password};
use crate::record::{Store, TokenRecord};
use crate::store::RecordStore;
use chrono::{Local, NaiveDateTime, Timelike};
use randtoken_core::{RandtokenConfig, TokenPolicy};
use std::fmt;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Literal a caller must pass (any case) to confirm an export.
pub const CONFIRMATION_LITERAL: &str = "confirm";

/// Tokens issued by a successful `generate`. This is the only time they are
/// returned before export.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedBatch {
    pub sequence_id: String,
    pub remark: String,
    pub created_at: NaiveDateTime,
    pub tokens: Vec<String>,
}

impl fmt::Debug for GeneratedBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedBatch")
            .field("sequence_id", &self.sequence_id)
            .field("remark", &self.remark)
            .field("created_at", &self.created_at)
            .field("tokens", &format_args!("[{} REDACTED]", self.tokens.len()))
            .finish()
    }
}

/// Result of an export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Password matched but the confirmation literal was missing or wrong.
    /// Nothing was changed; the caller should retry with confirmation.
    ConfirmationRequired { sequence_id: String },

    /// The record was exported and removed.
    Exported(ExportReceipt),
}

/// Everything a confirmed export hands back.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub sequence_id: String,
    pub remark: String,
    pub created_at: NaiveDateTime,
    pub tokens: Vec<String>,
    /// Location of the export file. `None` if the record was retired but
    /// the file could not be published.
    pub artifact_path: Option<PathBuf>,
}

impl fmt::Debug for ExportReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportReceipt")
            .field("sequence_id", &self.sequence_id)
            .field("remark", &self.remark)
            .field("created_at", &self.created_at)
            .field("tokens", &format_args!("[{} REDACTED]", self.tokens.len()))
            .field("artifact_path", &self.artifact_path)
            .finish()
    }
}

/// A record as shown in listings. Never carries tokens or the password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub sequence_id: String,
    pub remark: String,
    pub created_at: NaiveDateTime,
    pub token_count: usize,
}

impl From<&TokenRecord> for RecordView {
    fn from(record: &TokenRecord) -> Self {
        Self {
            sequence_id: record.sequence_id().to_string(),
            remark: record.remark().to_string(),
            created_at: record.created_at(),
            token_count: record.tokens().len(),
        }
    }
}

/// One line of a truncated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub sequence_id: String,
    pub remark: String,
}

/// Truncated listing: the first entries by sequence id plus the count of the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSummary {
    pub entries: Vec<SummaryEntry>,
    pub hidden: usize,
    pub total: usize,
}

/// Owns the store and enforces the record lifecycle.
pub struct LifecycleManager {
    store: RwLock<Store>,
    records: RecordStore,
    exports: ExportWriter,
    generator: TokenGenerator,
    token_count: usize,
}

impl LifecycleManager {
    /// Load the store from disk and wire up generation and export.
    pub fn new(records: RecordStore, exports: ExportWriter, policy: &TokenPolicy) -> Self {
        let store = records.load();
        Self {
            store: RwLock::new(store),
            records,
            exports,
            generator: TokenGenerator::from_policy(policy),
            token_count: policy.token_count,
        }
    }

    /// Build a manager from configuration, using the configured data directory.
    pub fn open(config: &RandtokenConfig) -> Self {
        Self::new(
            RecordStore::new(config.storage.store_path()),
            ExportWriter::new(config.storage.exports_dir()),
            &config.tokens,
        )
    }

    /// Issue a new batch of tokens under `sequence_id`.
    pub fn generate(
        &self,
        sequence_id: &str,
        password: &str,
        remark: &str,
    ) -> Result<GeneratedBatch, LifecycleError> {
        validate_sequence_id(sequence_id)?;
        require("password", password)?;
        require("remark", remark)?;

        let mut store = self.write()?;
        if store.contains(sequence_id) {
            return Err(LifecycleError::DuplicateId(sequence_id.to_string()));
        }

        let tokens = self.generator.generate_batch(self.token_count);
        let created_at = now();
        let record = TokenRecord::new(
            sequence_id,
            hash_password(password),
            remark,
            tokens.clone(),
            created_at,
        );

        let previous_next_id = store.next_id();
        store.insert(record)?;
        store.advance_next_id();

        if let Err(e) = self.records.persist(&store) {
            store.take(sequence_id);
            store.set_next_id(previous_next_id);
            tracing::error!(
                "Rolled back generate for sequence id {}: {}",
                sequence_id,
                e
            );
            return Err(e.into());
        }

        tracing::info!(
            "Generated {} tokens for sequence id {}",
            tokens.len(),
            sequence_id
        );

        Ok(GeneratedBatch {
            sequence_id: sequence_id.to_string(),
            remark: remark.to_string(),
            created_at,
            tokens,
        })
    }

    /// Export the tokens for `sequence_id` and retire the record.
    ///
    /// The password is checked before the confirmation literal. On success
    /// the removal is persisted before the export file becomes visible.
    pub fn export(
        &self,
        sequence_id: &str,
        password: &str,
        confirm: Option<&str>,
    ) -> Result<ExportOutcome, LifecycleError> {
        require("sequence id", sequence_id)?;
        require("password", password)?;

        let mut store = self.write()?;
        let record = store
            .find(sequence_id)
            .ok_or_else(|| LifecycleError::NotFound(sequence_id.to_string()))?;

        if !verify_password(password, record.password_hash()) {
            tracing::warn!("Export refused for sequence id {}: wrong password", sequence_id);
            return Err(LifecycleError::AuthFailed);
        }

        if !is_confirmed(confirm) {
            return Ok(ExportOutcome::ConfirmationRequired {
                sequence_id: sequence_id.to_string(),
            });
        }

        let staged = self.exports.stage(record, now())?;

        let record = store.take(sequence_id).ok_or_else(|| {
            LifecycleError::Internal(format!("record {sequence_id} vanished during export"))
        })?;

        if let Err(e) = self.records.persist(&store) {
            store.insert(record)?;
            tracing::error!(
                "Rolled back export for sequence id {}: {}",
                sequence_id,
                e
            );
            return Err(e.into());
        }
        drop(store);

        let artifact_path = match staged.publish() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::error!(
                    "Record {} was exported but its export file could not be written: {}",
                    sequence_id,
                    e
                );
                None
            }
        };

        tracing::info!("Exported and removed sequence id {}", sequence_id);

        Ok(ExportOutcome::Exported(ExportReceipt {
            sequence_id: record.sequence_id().to_string(),
            remark: record.remark().to_string(),
            created_at: record.created_at(),
            tokens: record.tokens().to_vec(),
            artifact_path,
        }))
    }

    /// All records, sorted by sequence id.
    pub fn list(&self) -> Result<Vec<RecordView>, LifecycleError> {
        let store = self.read()?;
        Ok(store.list_all().into_iter().map(RecordView::from).collect())
    }

    /// The first `limit` records (id and remark only) and the number left out.
    pub fn list_summary(&self, limit: usize) -> Result<ListingSummary, LifecycleError> {
        let store = self.read()?;
        let records = store.list_all();
        let total = records.len();
        let entries: Vec<_> = records
            .into_iter()
            .take(limit)
            .map(|r| SummaryEntry {
                sequence_id: r.sequence_id().to_string(),
                remark: r.remark().to_string(),
            })
            .collect();

        Ok(ListingSummary {
            hidden: total - entries.len(),
            total,
            entries,
        })
    }

    /// Look up a single record.
    pub fn find(&self, sequence_id: &str) -> Result<Option<RecordView>, LifecycleError> {
        let store = self.read()?;
        Ok(store.find(sequence_id).map(RecordView::from))
    }

    /// Remove the record for `sequence_id` without exporting it.
    pub fn delete(&self, sequence_id: &str) -> Result<(), LifecycleError> {
        require("sequence id", sequence_id)?;

        let mut store = self.write()?;
        let record = store
            .take(sequence_id)
            .ok_or_else(|| LifecycleError::NotFound(sequence_id.to_string()))?;

        if let Err(e) = self.records.persist(&store) {
            store.insert(record)?;
            tracing::error!(
                "Rolled back delete for sequence id {}: {}",
                sequence_id,
                e
            );
            return Err(e.into());
        }

        tracing::info!("Deleted sequence id {}", sequence_id);
        Ok(())
    }

    /// Copy of the current in-memory store.
    pub fn snapshot(&self) -> Result<Store, LifecycleError> {
        Ok(self.read()?.clone())
    }

    /// Flush the store one last time.
    pub fn shutdown(&self) -> Result<(), LifecycleError> {
        let store = self.read()?;
        self.records.persist(&store)?;
        tracing::info!("Token store flushed to {}", self.records.path().display());
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store>, LifecycleError> {
        self.store
            .read()
            .map_err(|_| LifecycleError::Internal("token store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Store>, LifecycleError> {
        self.store
            .write()
            .map_err(|_| LifecycleError::Internal("token store lock poisoned".to_string()))
    }
}

/// Whether `confirm` carries the confirmation literal, ignoring case.
pub fn is_confirmed(confirm: Option<&str>) -> bool {
    confirm.is_some_and(|c| c.trim().eq_ignore_ascii_case(CONFIRMATION_LITERAL))
}

/// Local time truncated to whole seconds, matching the persisted format.
fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

fn require(field: &'static str, value: &str) -> Result<(), LifecycleError> {
    if value.trim().is_empty() {
        return Err(LifecycleError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Sequence ids end up in export file names, so they must be a single path component.
fn validate_sequence_id(sequence_id: &str) -> Result<(), LifecycleError> {
    require("sequence id", sequence_id)?;

    if sequence_id == "." || sequence_id == ".." {
        return Err(LifecycleError::validation(
            "sequence id",
            "must not be `.` or `..`",
        ));
    }
    if sequence_id
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(LifecycleError::validation(
            "sequence id",
            "must not contain path separators or control characters",
        ));
    }
    Ok(())
}
