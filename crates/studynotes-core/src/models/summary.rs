use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A generated summary of one chapter. The content shape is up to the
/// generator, so it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Summary {
    #[serde(rename = "_id")]
    pub id: String,
    pub course: String,
    #[serde(default)]
    pub chapter: Option<u32>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "unknown"))]
    pub summary: Value,
}

/// Order summaries by chapter. Summaries without a chapter go last.
pub fn sort_by_chapter(summaries: &mut [Summary]) {
    summaries.sort_by_key(|s| (s.chapter.is_none(), s.chapter));
}

/// Request to generate a summary from a chapter's notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct GenerateSummary {
    pub course: String,
    pub chapter: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary(id: &str, chapter: Option<u32>) -> Summary {
        Summary {
            id: id.into(),
            course: "CS101".into(),
            chapter,
            user: None,
            summary: json!("text"),
        }
    }

    #[test]
    fn test_sort_by_chapter_puts_unnumbered_last() {
        let mut summaries = vec![
            summary("s3", Some(3)),
            summary("sx", None),
            summary("s1", Some(1)),
            summary("s2", Some(2)),
        ];
        sort_by_chapter(&mut summaries);

        let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s1", "s2", "s3", "sx"]);
    }
}
