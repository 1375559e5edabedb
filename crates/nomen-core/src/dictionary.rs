//! Terminology dictionary loaded from the Gold Book JSON export
//!
//! The export nests every entry under `terms.list`, keyed by identifier:
//!
//! ```json
//! {"terms": {"list": {"A00001": {"title": "absorbance", "status": "current", "url": "..."}}}}
//! ```
//!
//! A [`TermDictionary`] is built once and never mutated afterwards. Entries are
//! kept ordered by identifier so that every walk over the dictionary, and every
//! title match, comes out in the same order on every run.

use crate::errors::NomenError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use tokio::fs;

/// Lifecycle tag attached to each dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TermStatus {
    Current,
    Obsolete,
    Provisional,
    Rejected,
    Other(String),
}

impl TermStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TermStatus::Current => "current",
            TermStatus::Obsolete => "obsolete",
            TermStatus::Provisional => "provisional",
            TermStatus::Rejected => "rejected",
            TermStatus::Other(tag) => tag,
        }
    }
}

impl From<String> for TermStatus {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "current" => TermStatus::Current,
            "obsolete" => TermStatus::Obsolete,
            "provisional" => TermStatus::Provisional,
            "rejected" => TermStatus::Rejected,
            _ => TermStatus::Other(tag),
        }
    }
}

impl From<TermStatus> for String {
    fn from(status: TermStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TermStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRecord {
    #[serde(skip)]
    pub identifier: String,
    pub title: String,
    #[serde(default = "default_status")]
    pub status: TermStatus,
    #[serde(default)]
    pub url: String,
}

fn default_status() -> TermStatus {
    TermStatus::Other(String::new())
}

impl TermRecord {
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        status: TermStatus,
        url: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            status,
            url: url.into(),
        }
    }
}

#[derive(Deserialize)]
struct DictionaryFile {
    terms: TermsSection,
}

#[derive(Deserialize)]
struct TermsSection {
    list: HashMap<String, TermRecord>,
}

/// Immutable identifier → record store.
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    entries: BTreeMap<String, TermRecord>,
    by_title: HashMap<String, Vec<String>>,
}

impl TermDictionary {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = TermRecord>,
    {
        let entries: BTreeMap<String, TermRecord> = records
            .into_iter()
            .map(|record| (record.identifier.clone(), record))
            .collect();

        // BTreeMap iteration keeps each title's identifiers sorted.
        let mut by_title: HashMap<String, Vec<String>> = HashMap::new();
        for (identifier, record) in &entries {
            by_title
                .entry(record.title.clone())
                .or_default()
                .push(identifier.clone());
        }

        Self { entries, by_title }
    }

    /// Load the dictionary from a JSON file. Any failure is a `ConfigError`.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, NomenError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            NomenError::ConfigError(format!(
                "Failed to read dictionary file {}: {}",
                path.display(),
                e
            ))
        })?;

        let dictionary = Self::from_json_str(&content)?;
        log::info!(
            "Loaded {} dictionary entries from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    pub fn from_json_str(content: &str) -> Result<Self, NomenError> {
        let file: DictionaryFile = serde_json::from_str(content).map_err(|e| {
            NomenError::ConfigError(format!("Failed to parse dictionary JSON: {}", e))
        })?;

        let records = file
            .terms
            .list
            .into_iter()
            .map(|(identifier, mut record)| {
                record.identifier = identifier;
                record
            });
        Ok(Self::from_records(records))
    }

    pub fn get(&self, identifier: &str) -> Option<&TermRecord> {
        self.entries.get(identifier)
    }

    pub fn title_of(&self, identifier: &str) -> Option<&str> {
        self.get(identifier).map(|record| record.title.as_str())
    }

    /// Every record whose title equals `title` exactly, in identifier order.
    pub fn find_by_title(&self, title: &str) -> Vec<&TermRecord> {
        self.by_title
            .get(title)
            .map(|ids| ids.iter().filter_map(|id| self.entries.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
