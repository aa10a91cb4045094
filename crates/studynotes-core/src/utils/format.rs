use serde_json::Value;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Turn a camelCase key into words: "keyPoints" -> "Key Points".
pub fn humanize_key(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_uppercase() && !spaced.is_empty() {
            spaced.push(' ');
        }
        spaced.push(if c == '_' { ' ' } else { c });
    }

    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render generated summary content as indented plain text.
///
/// Strings are kept verbatim, arrays become `- ` bullets and objects become
/// `Key: value` lines with nested content indented under their key. Sections
/// keep the order the generator wrote them in.
pub fn render_summary(summary: &Value) -> String {
    let mut lines = Vec::new();
    render_value(summary, 0, &mut lines);
    lines.join("\n")
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn render_value(value: &Value, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                let mut nested = Vec::new();
                render_value(item, 0, &mut nested);
                for (i, line) in nested.iter().enumerate() {
                    let marker = if i == 0 { "- " } else { "  " };
                    lines.push(format!("{}{}{}", indent, marker, line));
                }
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                let heading = humanize_key(key);
                match scalar_text(item) {
                    Some(text) => lines.push(format!("{}{}: {}", indent, heading, text)),
                    None => {
                        lines.push(format!("{}{}:", indent, heading));
                        render_value(item, depth + 1, lines);
                    }
                }
            }
        }
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                lines.extend(text.lines().map(|line| format!("{}{}", indent, line)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Ærlig talt", 6), "Ærl...");
    }

    #[test]
    fn test_humanize_key() {
        assert_eq!(humanize_key("keyPoints"), "Key Points");
        assert_eq!(humanize_key("summary"), "Summary");
        assert_eq!(humanize_key("main_ideas"), "Main Ideas");
        assert_eq!(humanize_key("A"), "A");
    }

    #[test]
    fn test_render_plain_string() {
        assert_eq!(render_summary(&json!("Line one\nLine two")), "Line one\nLine two");
        assert_eq!(render_summary(&Value::Null), "");
    }

    #[test]
    fn test_render_object_with_nested_values() {
        let summary = json!({
            "overview": "Loops repeat work.",
            "keyPoints": ["for loops", "while loops"],
            "details": {"exitCondition": "checked each pass", "count": 2}
        });
        let rendered = render_summary(&summary);
        let expected = [
            "Overview: Loops repeat work.",
            "Key Points:",
            "  - for loops",
            "  - while loops",
            "Details:",
            "  Exit Condition: checked each pass",
            "  Count: 2",
        ]
        .join("\n");
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_keeps_generator_section_order() {
        let summary: Value =
            serde_json::from_str(r#"{"overview":"O","keyPoints":["k"],"details":"D"}"#).unwrap();
        assert_eq!(render_summary(&summary), "Overview: O\nKey Points:\n  - k\nDetails: D");
    }

    #[test]
    fn test_render_array_of_objects() {
        let summary = json!([{"term": "loop", "meaning": "repetition"}]);
        assert_eq!(render_summary(&summary), "- Term: loop\n  Meaning: repetition");
    }
}
