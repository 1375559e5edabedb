//! Record assembly: requested names in, enriched rows out
//!
//! Every requested name is matched exactly against dictionary titles. Each
//! match runs its own pipeline:
//!
//! 1. fetch the raw definition from the entry's URL
//! 2. extract every marker
//! 3. resolve every marker payload
//! 4. substitute the resolved terms back in
//! 5. decode HTML entities, so escaped delimiters never become markers
//!
//! A failure in any step is recorded against that entry and the run carries
//! on. Rows come out in request order, then identifier order within a title.

use crate::dictionary::{TermDictionary, TermRecord};
use crate::errors::NomenError;
use crate::export::OutputRow;
use crate::fetcher::{decode_entities, DefinitionFetcher};
use crate::markers::{extract_markers, Delimiters};
use crate::resolver::{ReferenceResolver, Resolution};
use crate::substitution::substitute_markers;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What to do with a reference the resolver could not turn into a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Drop the row and record a `SubstitutionError`.
    Skip,
    /// Emit the row with the placeholder text in place of the reference.
    #[default]
    Placeholder,
}

pub const DEFAULT_PLACEHOLDER: &str = "[unresolved reference: {id}]";

#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    pub delimiters: Delimiters,
    pub unresolved: UnresolvedPolicy,
    pub placeholder: String,
    pub concurrency: usize,
    pub metadata_only: bool,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            unresolved: UnresolvedPolicy::default(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            concurrency: 1,
            metadata_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermFailure {
    pub term: String,
    pub identifier: String,
    pub error: NomenError,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub requested: usize,
    pub matched: usize,
    pub rows: Vec<OutputRow>,
    pub failures: Vec<TermFailure>,
    pub unmatched: Vec<String>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Requested {} terms matching {} entries: {} rows written, {} failed, {} unmatched",
            self.requested,
            self.matched,
            self.rows.len(),
            self.failures.len(),
            self.unmatched.len()
        )?;
        for failure in &self.failures {
            writeln!(
                f,
                "  failed: '{}' [{}]: {}",
                failure.term, failure.identifier, failure.error
            )?;
        }
        for term in &self.unmatched {
            writeln!(f, "  no dictionary entry titled '{}'", term)?;
        }
        Ok(())
    }
}

pub struct RecordAssembler {
    dictionary: Arc<TermDictionary>,
    fetcher: Arc<dyn DefinitionFetcher>,
    resolver: ReferenceResolver,
    options: AssemblerOptions,
}

impl RecordAssembler {
    pub fn new(
        dictionary: Arc<TermDictionary>,
        fetcher: Arc<dyn DefinitionFetcher>,
        resolver: ReferenceResolver,
        options: AssemblerOptions,
    ) -> Self {
        Self {
            dictionary,
            fetcher,
            resolver,
            options,
        }
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    pub async fn assemble(&self, requested: &[String]) -> RunReport {
        let mut report = RunReport {
            requested: requested.len(),
            ..Default::default()
        };

        let mut candidates: Vec<(&str, &TermRecord)> = Vec::new();
        for term in requested {
            let matches = self.dictionary.find_by_title(term);
            if matches.is_empty() {
                log::warn!("No dictionary entry titled '{}'", term);
                report.unmatched.push(term.clone());
            }
            candidates.extend(matches.into_iter().map(|record| (term.as_str(), record)));
        }
        log::info!(
            "{} requested terms matched {} dictionary entries",
            requested.len(),
            candidates.len()
        );
        report.matched = candidates.len();

        // buffered() yields in input order regardless of completion order
        let outcomes: Vec<_> = stream::iter(candidates)
            .map(|(term, record)| async move { (term, record, self.build_row(record).await) })
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        for (term, record, outcome) in outcomes {
            match outcome {
                Ok(row) => report.rows.push(row),
                Err(error) => {
                    log::warn!("Skipping '{}' [{}]: {}", term, record.identifier, error);
                    report.failures.push(TermFailure {
                        term: term.to_string(),
                        identifier: record.identifier.clone(),
                        error,
                    });
                }
            }
        }
        report
    }

    pub async fn build_row(&self, record: &TermRecord) -> Result<OutputRow, NomenError> {
        if self.options.metadata_only {
            return Ok(OutputRow::from_record(record, String::new()));
        }

        let raw = self.fetcher.fetch(&record.url).await?;
        let definition = self.resolve_definition(&raw).await?;
        Ok(OutputRow::from_record(record, decode_entities(&definition)))
    }

    /// Extract, resolve and substitute every marker in `raw`.
    pub async fn resolve_definition(&self, raw: &str) -> Result<String, NomenError> {
        let markers = extract_markers(raw, &self.options.delimiters);
        if markers.is_empty() {
            return Ok(raw.to_string());
        }

        let payloads: Vec<String> = markers.iter().map(|m| m.payload.clone()).collect();
        let resolutions = self.resolver.resolve_all(&payloads).await?;
        let replacements = self.replacements(&resolutions);
        substitute_markers(raw, &markers, &replacements)
    }

    fn replacements(&self, resolutions: &[Resolution]) -> Vec<String> {
        match self.options.unresolved {
            // Unresolved entries are left out so the shortfall reaches substitution.
            UnresolvedPolicy::Skip => resolutions
                .iter()
                .filter_map(|r| r.term().map(str::to_string))
                .collect(),
            UnresolvedPolicy::Placeholder => resolutions
                .iter()
                .map(|r| match r {
                    Resolution::Resolved(term) => term.clone(),
                    Resolution::Unresolved { payload, .. } => {
                        self.options.placeholder.replace("{id}", payload)
                    }
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::TermStatus;
    use crate::resolver::{ExternalLookup, ResolutionMode};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MockFetcher {
        pages: HashMap<String, String>,
    }

    impl MockFetcher {
        fn new(pages: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl DefinitionFetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<String, NomenError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| NomenError::fetch(url, "HTTP 503"))
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl ExternalLookup for FailingLookup {
        async fn lookup(&self, payload: &str) -> Result<String, NomenError> {
            Err(NomenError::fetch(payload, "connection refused"))
        }
    }

    fn dictionary() -> Arc<TermDictionary> {
        Arc::new(TermDictionary::from_records(vec![
            TermRecord::new("id1", "Subterm 1", TermStatus::Current, "u:id1"),
            TermRecord::new("id2", "Subterm 2", TermStatus::Current, "u:id2"),
            TermRecord::new("X2", "X", TermStatus::Obsolete, "u:X2"),
            TermRecord::new("X1", "X", TermStatus::Current, "u:X1"),
            TermRecord::new("T1", "broken", TermStatus::Provisional, "u:T1"),
            TermRecord::new("T2", "dangling", TermStatus::Current, "u:T2"),
            TermRecord::new("E1", "contact", TermStatus::Current, "u:E1"),
        ]))
    }

    fn pages() -> Arc<MockFetcher> {
        MockFetcher::new(&[
            ("u:id1", "A leaf entry."),
            ("u:id2", "Built from @id1@."),
            ("u:X1", "First X, see @id1@ and @id2@."),
            ("u:X2", "Second X."),
            ("u:T2", "Refers to @nowhere@."),
            ("u:E1", "Write to iupac&#64;example.org or me&commat;host about @id1@."),
        ])
    }

    fn local_assembler(options: AssemblerOptions) -> RecordAssembler {
        let dictionary = dictionary();
        RecordAssembler::new(
            dictionary.clone(),
            pages(),
            ReferenceResolver::local(dictionary),
            options,
        )
    }

    fn terms(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_duplicate_titles_yield_one_row_each() {
        let report = local_assembler(AssemblerOptions::default())
            .assemble(&terms(&["X"]))
            .await;

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].url, "u:X1");
        assert_eq!(report.rows[0].status, TermStatus::Current);
        assert_eq!(report.rows[0].definition, "First X, see Subterm 1 and Subterm 2.");
        assert_eq!(report.rows[1].url, "u:X2");
        assert_eq!(report.rows[1].status, TermStatus::Obsolete);
        assert_eq!(report.rows[1].definition, "Second X.");
    }

    #[tokio::test]
    async fn test_fetch_failure_is_isolated() {
        let report = local_assembler(AssemblerOptions::default())
            .assemble(&terms(&["broken", "Subterm 2", "Subterm 1"]))
            .await;

        let titles: Vec<&str> = report.rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Subterm 2", "Subterm 1"]);
        assert_eq!(report.rows[0].definition, "Built from Subterm 1.");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].identifier, "T1");
        assert!(matches!(report.failures[0].error, NomenError::FetchError { .. }));
    }

    #[tokio::test]
    async fn test_local_miss_is_recorded() {
        let report = local_assembler(AssemblerOptions::default())
            .assemble(&terms(&["dangling", "Subterm 1"]))
            .await;

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].error,
            NomenError::LookupError {
                identifier: "nowhere".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_escaped_delimiters_are_not_markers() {
        let report = local_assembler(AssemblerOptions::default())
            .assemble(&terms(&["contact"]))
            .await;

        assert!(!report.has_failures());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(
            report.rows[0].definition,
            "Write to iupac@example.org or me@host about Subterm 1."
        );
    }

    #[tokio::test]
    async fn test_unmatched_terms_are_reported() {
        let report = local_assembler(AssemblerOptions::default())
            .assemble(&terms(&["unknown", "Subterm 1"]))
            .await;

        assert_eq!(report.requested, 2);
        assert_eq!(report.matched, 1);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.unmatched, vec!["unknown"]);
        assert!(!report.has_failures());
        assert!(report.to_string().contains("no dictionary entry titled 'unknown'"));
    }

    #[tokio::test]
    async fn test_metadata_only_skips_fetch() {
        let options = AssemblerOptions {
            metadata_only: true,
            ..Default::default()
        };
        let report = local_assembler(options).assemble(&terms(&["broken"])).await;
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].definition, "");
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn test_concurrency_preserves_order() {
        let options = AssemblerOptions {
            concurrency: 4,
            ..Default::default()
        };
        let report = local_assembler(options)
            .assemble(&terms(&["Subterm 2", "X", "Subterm 1"]))
            .await;
        let urls: Vec<&str> = report.rows.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["u:id2", "u:X1", "u:X2", "u:id1"]);
    }

    fn external_assembler(policy: UnresolvedPolicy) -> RecordAssembler {
        let dictionary = dictionary();
        let resolver = ReferenceResolver::new(
            dictionary.clone(),
            ResolutionMode::Auto,
            Some(Arc::new(FailingLookup)),
        )
        .unwrap();
        RecordAssembler::new(
            dictionary,
            pages(),
            resolver,
            AssemblerOptions {
                unresolved: policy,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_unresolved_reference_uses_placeholder() {
        let report = external_assembler(UnresolvedPolicy::Placeholder)
            .assemble(&terms(&["dangling"]))
            .await;
        assert_eq!(report.rows.len(), 1);
        assert_eq!(
            report.rows[0].definition,
            "Refers to [unresolved reference: nowhere]."
        );
    }

    #[tokio::test]
    async fn test_unresolved_reference_skips_row() {
        let report = external_assembler(UnresolvedPolicy::Skip)
            .assemble(&terms(&["dangling", "Subterm 2"]))
            .await;
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].title, "Subterm 2");
        assert_eq!(
            report.failures[0].error,
            NomenError::SubstitutionError {
                markers: 1,
                replacements: 0
            }
        );
    }

    #[tokio::test]
    async fn test_zero_markers_is_identity() {
        let assembler = local_assembler(AssemblerOptions::default());
        let raw = "Plain text with no references at all.";
        assert_eq!(assembler.resolve_definition(raw).await.unwrap(), raw);
    }
}
