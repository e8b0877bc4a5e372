//! Token records and the in-memory store.
//!
//! SECURITY: `TokenRecord` holds plaintext tokens (export must return them).
//! Its `Debug` output never includes the tokens or the password digest.

use crate::error::StoreError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Timestamp format used for `created_at` in the store and export artifacts.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One batch of tokens issued under a sequence id.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(rename = "seq_id")]
    sequence_id: String,
    password_hash: String,
    remark: String,
    tokens: Vec<String>,
    #[serde(with = "created_at_format")]
    created_at: NaiveDateTime,
}

impl TokenRecord {
    pub fn new(
        sequence_id: impl Into<String>,
        password_hash: impl Into<String>,
        remark: impl Into<String>,
        tokens: Vec<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            sequence_id: sequence_id.into(),
            password_hash: password_hash.into(),
            remark: remark.into(),
            tokens,
            created_at,
        }
    }

    pub fn sequence_id(&self) -> &str {
        &self.sequence_id
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn remark(&self) -> &str {
        &self.remark
    }

    /// Plaintext tokens. Only export hands these out.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }
}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("sequence_id", &self.sequence_id)
            .field("password_hash", &"[REDACTED]")
            .field("remark", &self.remark)
            .field("tokens", &format_args!("[{} REDACTED]", self.tokens.len()))
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// All live records, keyed by sequence id.
///
/// Serializes to `{"next_id": n, "tokens": [record, ...]}` with records in
/// ascending sequence id order, so saving an unchanged store is byte-stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoreFile", into = "StoreFile")]
pub struct Store {
    next_id: u64,
    records: BTreeMap<String, TokenRecord>,
}

impl Store {
    /// Empty store with `next_id = 1`.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            records: BTreeMap::new(),
        }
    }

    /// Advisory counter, bumped on every successful generate.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, sequence_id: &str) -> bool {
        self.records.contains_key(sequence_id)
    }

    pub fn find(&self, sequence_id: &str) -> Option<&TokenRecord> {
        self.records.get(sequence_id)
    }

    /// Insert a new record. Fails if the sequence id is already present.
    pub fn insert(&mut self, record: TokenRecord) -> Result<(), StoreError> {
        if self.records.contains_key(record.sequence_id()) {
            return Err(StoreError::DuplicateKey(record.sequence_id().to_string()));
        }
        self.records.insert(record.sequence_id().to_string(), record);
        Ok(())
    }

    /// Remove a record, reporting whether it was present.
    pub fn remove(&mut self, sequence_id: &str) -> bool {
        self.take(sequence_id).is_some()
    }

    /// Remove a record and return it.
    pub fn take(&mut self, sequence_id: &str) -> Option<TokenRecord> {
        self.records.remove(sequence_id)
    }

    /// Records sorted by sequence id ascending.
    pub fn list_all(&self) -> Vec<&TokenRecord> {
        self.records.values().collect()
    }

    pub(crate) fn advance_next_id(&mut self) {
        self.next_id = self.next_id.saturating_add(1);
    }

    pub(crate) fn set_next_id(&mut self, next_id: u64) {
        self.next_id = next_id;
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk shape of the store.
#[derive(Serialize, Deserialize)]
struct StoreFile {
    next_id: u64,
    #[serde(default)]
    tokens: Vec<TokenRecord>,
}

impl From<StoreFile> for Store {
    fn from(file: StoreFile) -> Self {
        let mut store = Store {
            next_id: file.next_id,
            records: BTreeMap::new(),
        };
        for record in file.tokens {
            let sequence_id = record.sequence_id().to_string();
            if store.insert(record).is_err() {
                tracing::warn!(
                    "Ignoring duplicate record for sequence id {} in store file",
                    sequence_id
                );
            }
        }
        store
    }
}

impl From<Store> for StoreFile {
    fn from(store: Store) -> Self {
        StoreFile {
            next_id: store.next_id,
            tokens: store.records.into_values().collect(),
        }
    }
}

/// Serde adapter for `YYYY-MM-DD HH:MM:SS` timestamps.
pub(crate) mod created_at_format {
    use super::CREATED_AT_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(CREATED_AT_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, CREATED_AT_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    fn record(id: &str) -> TokenRecord {
        TokenRecord::new(
            id,
            "ab".repeat(32),
            format!("remark {id}"),
            vec!["tok-one".to_string(), "tok-two".to_string()],
            timestamp(),
        )
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = Store::new();
        assert_eq!(store.next_id(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut store = Store::new();
        store.insert(record("001")).unwrap();
        let err = store.insert(record("001")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(ref id) if id == "001"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sequence_ids_are_case_sensitive() {
        let mut store = Store::new();
        store.insert(record("abc")).unwrap();
        store.insert(record("ABC")).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.find("Abc").is_none());
    }

    #[test]
    fn test_remove_reports_presence() {
        let mut store = Store::new();
        store.insert(record("001")).unwrap();
        assert!(store.remove("001"));
        assert!(!store.remove("001"));
        assert!(store.find("001").is_none());
    }

    #[test]
    fn test_list_all_sorted_by_sequence_id() {
        let mut store = Store::new();
        for id in ["010", "002", "b", "A"] {
            store.insert(record(id)).unwrap();
        }
        let ids: Vec<_> = store
            .list_all()
            .into_iter()
            .map(|r| r.sequence_id())
            .collect();
        assert_eq!(ids, vec!["002", "010", "A", "b"]);
    }

    #[test]
    fn test_json_shape() {
        let mut store = Store::new();
        store.insert(record("001")).unwrap();
        store.advance_next_id();

        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(value["next_id"], 2);
        assert_eq!(value["tokens"][0]["seq_id"], "001");
        assert_eq!(value["tokens"][0]["created_at"], "2024-05-01 12:30:00");
        assert_eq!(value["tokens"][0]["tokens"][1], "tok-two");
    }

    #[test]
    fn test_parse_legacy_document() {
        let json = r#"{
  "next_id": 3,
  "tokens": [
    {
      "seq_id": "001",
      "password_hash": "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8",
      "remark": "key A",
      "tokens": ["aaa", "bbb"],
      "created_at": "2024-01-02 03:04:05"
    }
  ]
}"#;
        let store: Store = serde_json::from_str(json).unwrap();
        assert_eq!(store.next_id(), 3);
        let record = store.find("001").unwrap();
        assert_eq!(record.remark(), "key A");
        assert_eq!(record.tokens(), ["aaa", "bbb"]);
        assert_eq!(
            record.created_at().format(CREATED_AT_FORMAT).to_string(),
            "2024-01-02 03:04:05"
        );
    }

    #[test]
    fn test_duplicate_ids_in_file_keep_first() {
        let json = r#"{"next_id": 1, "tokens": [
            {"seq_id": "x", "password_hash": "", "remark": "first", "tokens": [], "created_at": "2024-01-01 00:00:00"},
            {"seq_id": "x", "password_hash": "", "remark": "second", "tokens": [], "created_at": "2024-01-01 00:00:00"}
        ]}"#;
        let store: Store = serde_json::from_str(json).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.find("x").unwrap().remark(), "first");
    }

    #[test]
    fn test_debug_redacts_tokens_and_hash() {
        let debug_output = format!("{:?}", record("001"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("tok-one"));
        assert!(!debug_output.contains(&"ab".repeat(32)));
    }
}
