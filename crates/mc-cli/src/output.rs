//! Report rendering.

use mc_core::{CheckReport, Palette};

/// Text reports, one after another.
pub fn render_text(reports: &[CheckReport], palette: &Palette) -> String {
    reports
        .iter()
        .map(|r| r.format_report(palette))
        .collect::<Vec<_>>()
        .join("\n")
}

/// All reports as a pretty-printed JSON array.
pub fn render_json(reports: &[CheckReport]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::{Category, RuleMeta};

    const GOTO: RuleMeta = RuleMeta::new("Rule 15.1", "No goto.", Category::Advisory);

    fn report() -> CheckReport {
        CheckReport::from_violations(
            "main.c",
            vec![GOTO.violation(3, "goto out", "Restructure.")],
            None,
        )
    }

    #[test]
    fn test_render_json_fields() {
        let json = render_json(&[report()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let v = &value[0]["violations"][0];
        assert_eq!(value[0]["path"], "main.c");
        assert_eq!(v["rule_id"], "Rule 15.1");
        assert_eq!(v["line"], 3);
        assert_eq!(v["match"], "goto out");
        assert_eq!(v["category"], "advisory");
        assert!(value[0].get("ast_error").is_none());
    }

    #[test]
    fn test_render_text_joins_reports() {
        let text = render_text(&[report(), report()], &Palette::plain());
        assert_eq!(text.matches("Checking main.c for MISRA compliance...").count(), 2);
    }
}
