//! Search query rendering from a user-supplied template.

/// Placeholder token substituted with the entity name.
pub const ENTITY_PLACEHOLDER: &str = "{entity}";

/// Render a search query for an entity from a template.
///
/// Every occurrence of `{entity}` is replaced with the entity name. A
/// template without the placeholder gets the entity appended, so a plain
/// keyword template still produces a usable query instead of a constant
/// one.
pub fn render_query(template: &str, entity: &str) -> String {
    if template.contains(ENTITY_PLACEHOLDER) {
        template.replace(ENTITY_PLACEHOLDER, entity)
    } else if template.trim().is_empty() {
        entity.to_string()
    } else {
        format!("{} {}", template.trim_end(), entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_placeholder() {
        assert_eq!(
            render_query("Latest news about {entity}", "Acme Corp"),
            "Latest news about Acme Corp"
        );
    }

    #[test]
    fn test_substitutes_every_occurrence() {
        assert_eq!(
            render_query("{entity} review, {entity} pricing", "Acme"),
            "Acme review, Acme pricing"
        );
    }

    #[test]
    fn test_appends_entity_when_placeholder_missing() {
        assert_eq!(
            render_query("quarterly earnings", "Acme Corp"),
            "quarterly earnings Acme Corp"
        );
    }

    #[test]
    fn test_blank_template_yields_bare_entity() {
        assert_eq!(render_query("   ", "Acme Corp"), "Acme Corp");
        assert_eq!(render_query("", "Acme Corp"), "Acme Corp");
    }

    #[test]
    fn test_trailing_whitespace_does_not_double_space() {
        assert_eq!(render_query("news about ", "Acme"), "news about Acme");
    }
}
