//! Per-entity records and the batch report.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::analysis::{EntityAnalysis, SourceConfidence};

/// Outcome classification for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Structured findings extracted end to end.
    Success,
    /// The model replied but its output could not be parsed; the raw
    /// reply is preserved as the summary.
    Partial,
    /// The entity produced no findings; `error_detail` says why.
    Failed,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// The research outcome for a single entity.
///
/// A batch produces exactly one record per input entity, whatever
/// happened along the way. Failures land here as data instead of
/// propagating as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRecord {
    /// The entity as given in the input.
    pub entity: String,

    /// The rendered query this entity was searched with.
    pub search_query: String,

    /// Outcome classification.
    pub status: RecordStatus,

    /// Narrative summary. For `Partial` records this is the raw model
    /// reply; for `Failed` records it is empty.
    pub summary: String,

    /// Discrete findings. Empty unless `status` is `Success`.
    #[serde(default)]
    pub key_findings: Vec<String>,

    /// Model's source quality assessment, when available.
    #[serde(default)]
    pub source_quality: Option<String>,

    /// Model's confidence in the extraction.
    #[serde(default)]
    pub confidence: SourceConfidence,

    /// Model's caveats, when available.
    #[serde(default)]
    pub notes: Option<String>,

    /// URLs whose content reached the model, in hit order.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Why the entity failed. `None` unless `status` is `Failed`.
    #[serde(default)]
    pub error_detail: Option<String>,

    /// When this record was produced.
    pub completed_at: DateTime<Utc>,
}

impl ResearchRecord {
    /// Record for a fully successful extraction.
    pub fn success(
        entity: impl Into<String>,
        search_query: impl Into<String>,
        analysis: EntityAnalysis,
        sources: Vec<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            search_query: search_query.into(),
            status: RecordStatus::Success,
            summary: analysis.summary,
            key_findings: analysis.key_findings,
            source_quality: analysis.source_quality,
            confidence: analysis.confidence,
            notes: analysis.notes,
            sources,
            error_detail: None,
            completed_at: Utc::now(),
        }
    }

    /// Record for a completed call whose output could not be parsed.
    /// The raw model reply is kept as the summary so nothing is lost.
    pub fn partial(
        entity: impl Into<String>,
        search_query: impl Into<String>,
        raw_reply: impl Into<String>,
        sources: Vec<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            search_query: search_query.into(),
            status: RecordStatus::Partial,
            summary: raw_reply.into(),
            key_findings: vec![],
            source_quality: None,
            confidence: SourceConfidence::Unknown,
            notes: None,
            sources,
            error_detail: None,
            completed_at: Utc::now(),
        }
    }

    /// Record for an entity that produced no findings.
    pub fn failed(
        entity: impl Into<String>,
        search_query: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            search_query: search_query.into(),
            status: RecordStatus::Failed,
            summary: String::new(),
            key_findings: vec![],
            source_quality: None,
            confidence: SourceConfidence::Unknown,
            notes: None,
            sources: vec![],
            error_detail: Some(detail.into()),
            completed_at: Utc::now(),
        }
    }

    /// Whether the record carries any summary text.
    pub fn has_summary(&self) -> bool {
        !self.summary.trim().is_empty()
    }
}

/// Ordered collection of records for one batch run.
///
/// Record order matches input entity order exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    records: Vec<ResearchRecord>,
}

impl BatchReport {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, record: ResearchRecord) {
        self.records.push(record);
    }

    /// All records, in input order.
    pub fn records(&self) -> &[ResearchRecord] {
        &self.records
    }

    /// Consume the report, yielding the records.
    pub fn into_records(self) -> Vec<ResearchRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResearchRecord> {
        self.records.iter()
    }

    fn count_with_status(&self, status: RecordStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    /// Number of `Success` records.
    pub fn success_count(&self) -> usize {
        self.count_with_status(RecordStatus::Success)
    }

    /// Number of `Partial` records.
    pub fn partial_count(&self) -> usize {
        self.count_with_status(RecordStatus::Partial)
    }

    /// Number of `Failed` records.
    pub fn failed_count(&self) -> usize {
        self.count_with_status(RecordStatus::Failed)
    }
}

impl<'a> IntoIterator for &'a BatchReport {
    type Item = &'a ResearchRecord;
    type IntoIter = std::slice::Iter<'a, ResearchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
