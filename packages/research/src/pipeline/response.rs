//! Resilient parsing of model replies.
//!
//! Models asked for JSON still wrap it in markdown fences or prose
//! often enough that strict parsing would throw away good output. The
//! parse here tries three shapes in order: the raw reply, the reply
//! with code fences stripped, and the first-`{`-to-last-`}` slice.
//! A reply that survives none of them is the caller's problem
//! (`ModelResponse::Degraded`), not an error.

use serde::Deserialize;

use crate::types::{EntityAnalysis, SourceConfidence};

/// Reply shape the extraction prompt asks for. Every field is optional
/// so a partially-conforming reply still parses.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    extracted_info: Option<String>,

    #[serde(default)]
    key_points: Vec<String>,

    #[serde(default)]
    source_quality: Option<String>,

    #[serde(default)]
    confidence: Option<String>,

    #[serde(default)]
    additional_notes: Option<String>,
}

/// Parse a model reply into an analysis, salvaging what's salvageable.
///
/// Returns `None` when no JSON object can be recovered, or when the
/// recovered object has no usable `extracted_info` (the prompt tells
/// the model to leave it empty when the content had nothing relevant).
pub fn parse_analysis(raw: &str) -> Option<EntityAnalysis> {
    let parsed: RawAnalysis = serde_json::from_str(raw)
        .or_else(|_| serde_json::from_str(strip_code_fences(raw)))
        .or_else(|_| match slice_json_object(raw) {
            Some(candidate) => serde_json::from_str(candidate),
            None => serde_json::from_str(raw),
        })
        .ok()?;

    let summary = parsed.extracted_info?.trim().to_string();
    if summary.is_empty() {
        return None;
    }

    let key_findings: Vec<String> = parsed
        .key_points
        .into_iter()
        .map(|point| point.trim().to_string())
        .filter(|point| !point.is_empty())
        .collect();

    let mut analysis = EntityAnalysis::new(summary)
        .with_key_findings(key_findings)
        .with_confidence(SourceConfidence::parse(parsed.confidence.as_deref()));

    if let Some(quality) = normalize(parsed.source_quality) {
        analysis = analysis.with_source_quality(quality);
    }
    if let Some(notes) = normalize(parsed.additional_notes) {
        analysis = analysis.with_notes(notes);
    }

    Some(analysis)
}

fn normalize(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Strip markdown code fences from around a reply.
fn strip_code_fences(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Slice from the first `{` to the last `}`, for JSON embedded in prose.
fn slice_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_REPLY: &str = r#"{
        "extracted_info": "Acme Corp opened a Berlin office.",
        "key_points": ["Berlin office opened", "200 hires planned"],
        "source_quality": "high",
        "confidence": "medium",
        "additional_notes": "Coverage is from the last month."
    }"#;

    #[test]
    fn test_parses_direct_json() {
        let analysis = parse_analysis(FULL_REPLY).unwrap();
        assert_eq!(analysis.summary, "Acme Corp opened a Berlin office.");
        assert_eq!(
            analysis.key_findings,
            vec!["Berlin office opened", "200 hires planned"]
        );
        assert_eq!(analysis.source_quality.as_deref(), Some("high"));
        assert_eq!(analysis.confidence, SourceConfidence::Medium);
        assert_eq!(
            analysis.notes.as_deref(),
            Some("Coverage is from the last month.")
        );
    }

    #[test]
    fn test_parses_fenced_json() {
        let fenced = format!("```json\n{}\n```", FULL_REPLY);
        let analysis = parse_analysis(&fenced).unwrap();
        assert_eq!(analysis.summary, "Acme Corp opened a Berlin office.");
    }

    #[test]
    fn test_salvages_json_from_prose() {
        let chatty = format!(
            "Here is the analysis you asked for:\n\n{}\n\nLet me know if you need more.",
            FULL_REPLY
        );
        let analysis = parse_analysis(&chatty).unwrap();
        assert_eq!(analysis.summary, "Acme Corp opened a Berlin office.");
    }

    #[test]
    fn test_rejects_pure_prose() {
        assert!(parse_analysis("I could not find anything useful.").is_none());
    }

    #[test]
    fn test_rejects_empty_summary() {
        let empty = r#"{"extracted_info": "", "additional_notes": "Nothing relevant found."}"#;
        assert!(parse_analysis(empty).is_none());

        let whitespace = r#"{"extracted_info": "   "}"#;
        assert!(parse_analysis(whitespace).is_none());

        let missing = r#"{"key_points": ["a point"]}"#;
        assert!(parse_analysis(missing).is_none());
    }

    #[test]
    fn test_missing_optional_fields_get_defaults() {
        let minimal = r#"{"extracted_info": "Just a summary."}"#;
        let analysis = parse_analysis(minimal).unwrap();
        assert_eq!(analysis.summary, "Just a summary.");
        assert!(analysis.key_findings.is_empty());
        assert!(analysis.source_quality.is_none());
        assert_eq!(analysis.confidence, SourceConfidence::Unknown);
        assert!(analysis.notes.is_none());
    }

    #[test]
    fn test_blank_points_and_notes_are_dropped() {
        let padded = r#"{
            "extracted_info": "Summary.",
            "key_points": [" real point ", "", "   "],
            "additional_notes": "  "
        }"#;
        let analysis = parse_analysis(padded).unwrap();
        assert_eq!(analysis.key_findings, vec!["real point"]);
        assert!(analysis.notes.is_none());
    }
}
