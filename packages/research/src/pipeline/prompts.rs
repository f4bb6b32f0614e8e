//! Model prompts for the research pipeline.
//!
//! The extraction prompt pins an exact JSON shape so replies parse
//! mechanically; `pipeline::response` handles the replies that drift
//! anyway.

/// System message for extraction calls.
pub const EXTRACTION_SYSTEM: &str =
    "You are a precise data extraction assistant. Always provide responses in valid JSON format.";

/// Prompt for extracting a structured analysis from aggregated page text.
pub const EXTRACTION_PROMPT: &str = r#"Analyze the following web content about "{entity}" and extract key information.

Web content:
{text}

Provide your analysis as JSON with this exact structure:
{
  "extracted_info": "A concise summary of the most important information found",
  "key_points": ["point 1", "point 2", "point 3"],
  "source_quality": "assessment of how reliable/relevant the sources appear (high/medium/low)",
  "confidence": "high/medium/low",
  "additional_notes": "any caveats or context worth noting"
}

If the content contains nothing relevant about "{entity}", set extracted_info to an empty string and explain in additional_notes."#;

/// Fill the extraction prompt slots.
///
/// The entity goes in first so page text containing the literal
/// placeholder cannot inject itself into the entity slots.
pub fn build_extraction_prompt(entity: &str, text: &str) -> String {
    EXTRACTION_PROMPT
        .replace("{entity}", entity)
        .replace("{text}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_substitutes_both_slots() {
        let prompt = build_extraction_prompt("Acme Corp", "Page text here.");
        assert!(prompt.contains("about \"Acme Corp\""));
        assert!(prompt.contains("Page text here."));
        assert!(!prompt.contains("{entity}"));
        assert!(!prompt.contains("{text}"));
    }

    #[test]
    fn test_prompt_keeps_schema_braces() {
        let prompt = build_extraction_prompt("Acme", "text");
        assert!(prompt.contains("\"extracted_info\""));
        assert!(prompt.contains("\"key_points\""));
        assert!(prompt.contains("\"additional_notes\""));
    }
}
