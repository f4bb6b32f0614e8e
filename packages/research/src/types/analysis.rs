//! Structured output of a model extraction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Model's self-reported confidence in its extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceConfidence {
    High,
    Medium,
    Low,
    /// Missing or unrecognized in the model output.
    #[default]
    Unknown,
}

impl SourceConfidence {
    /// Parse a free-form confidence label from model output.
    ///
    /// Models drift between label spellings; anything unrecognized maps
    /// to `Unknown` rather than failing the parse.
    pub fn parse(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
            Some("high") => Self::High,
            Some("medium") | Some("med") => Self::Medium,
            Some("low") => Self::Low,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for SourceConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Structured findings for one entity, as extracted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityAnalysis {
    /// Narrative summary of what the sources say about the entity.
    pub summary: String,

    /// Discrete findings, one per line item.
    #[serde(default)]
    pub key_findings: Vec<String>,

    /// Model's assessment of the source material quality.
    #[serde(default)]
    pub source_quality: Option<String>,

    /// Model's confidence in the extraction.
    #[serde(default)]
    pub confidence: SourceConfidence,

    /// Caveats or context the model chose to add.
    #[serde(default)]
    pub notes: Option<String>,
}

impl EntityAnalysis {
    /// Create an analysis with just a summary.
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            key_findings: vec![],
            source_quality: None,
            confidence: SourceConfidence::Unknown,
            notes: None,
        }
    }

    /// Set the key findings.
    pub fn with_key_findings(
        mut self,
        findings: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.key_findings = findings.into_iter().map(|f| f.into()).collect();
        self
    }

    /// Set the source quality assessment.
    pub fn with_source_quality(mut self, quality: impl Into<String>) -> Self {
        self.source_quality = Some(quality.into());
        self
    }

    /// Set the confidence level.
    pub fn with_confidence(mut self, confidence: SourceConfidence) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_parse_variants() {
        assert_eq!(SourceConfidence::parse(Some("High")), SourceConfidence::High);
        assert_eq!(SourceConfidence::parse(Some(" medium ")), SourceConfidence::Medium);
        assert_eq!(SourceConfidence::parse(Some("med")), SourceConfidence::Medium);
        assert_eq!(SourceConfidence::parse(Some("LOW")), SourceConfidence::Low);
        assert_eq!(
            SourceConfidence::parse(Some("very sure")),
            SourceConfidence::Unknown
        );
        assert_eq!(SourceConfidence::parse(None), SourceConfidence::Unknown);
    }

    #[test]
    fn test_analysis_builders() {
        let analysis = EntityAnalysis::new("Acme expanded into Europe.")
            .with_key_findings(["Opened Berlin office", "Hired 200 staff"])
            .with_confidence(SourceConfidence::High)
            .with_notes("Coverage is recent.");
        assert_eq!(analysis.summary, "Acme expanded into Europe.");
        assert_eq!(analysis.key_findings.len(), 2);
        assert_eq!(analysis.confidence, SourceConfidence::High);
        assert_eq!(analysis.notes.as_deref(), Some("Coverage is recent."));
    }

    #[test]
    fn test_confidence_serializes_lowercase() {
        let json = serde_json::to_string(&SourceConfidence::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
