use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where a document came from this run. Existing records always iterate
/// before ingested ones, so they win identifier collisions at dedup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Existing,
    Ingested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Research,
    Industry,
}

/// A curated landscape node as persisted in the document store. Everything
/// beyond the named fields is passthrough payload (citation, url, year,
/// levers, questions, ...) carried through the pipeline unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<[f64; 2]>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A freshly ingested feed item awaiting its first clustering run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub source: SourceKind,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub feed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CandidateStore {
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub items: Vec<CandidateItem>,
}

/// The persisted pipeline output: labeled clusters plus positioned nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasStore {
    #[serde(default)]
    pub clusters: Vec<ClusterSummary>,
    pub nodes: Vec<DocRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub id: String,
    pub label: String,
    pub terms: Vec<String>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

/// Internal pipeline unit: a record plus its run-scoped metadata.
#[derive(Debug, Clone)]
pub struct Document {
    pub record: DocRecord,
    pub origin: Origin,
    pub levers: Vec<String>,
}

impl CandidateItem {
    /// Shape a candidate like a stored node; feed metadata moves into the
    /// passthrough payload so nothing is lost on the way to the store.
    pub fn into_record(self) -> DocRecord {
        let mut extra = Map::new();
        extra.insert("url".to_string(), Value::String(self.url));
        if !self.published.is_empty() {
            extra.insert("published".to_string(), Value::String(self.published));
        }
        if !self.tags.is_empty() {
            extra.insert(
                "tags".to_string(),
                Value::Array(self.tags.into_iter().map(Value::String).collect()),
            );
        }
        if !self.feed.is_empty() {
            extra.insert("feed".to_string(), Value::String(self.feed));
        }
        DocRecord {
            id: self.id,
            title: self.title,
            summary: self.summary,
            source: self.source,
            cluster: None,
            embedding: None,
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_record_round_trips_passthrough_fields() {
        let raw = r#"{"id":"p1","title":"T","summary":"S","source":"research",
                      "citation":"Someone 2024","year":2024}"#;
        let rec: DocRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.extra["citation"], "Someone 2024");
        assert_eq!(rec.extra["year"], 2024);

        let out = serde_json::to_value(&rec).unwrap();
        assert_eq!(out["citation"], "Someone 2024");
        assert_eq!(out["year"], 2024);
        // unset pipeline fields stay off the wire
        assert!(out.get("cluster").is_none());
        assert!(out.get("embedding").is_none());
    }

    #[test]
    fn candidate_into_record_preserves_feed_metadata() {
        let item = CandidateItem {
            id: "c1".into(),
            title: "A post".into(),
            url: "https://example.org/a".into(),
            summary: "".into(),
            published: "2026-08-01".into(),
            source: SourceKind::Industry,
            tags: vec!["agents".into()],
            feed: "example-blog".into(),
        };
        let rec = item.into_record();
        assert_eq!(rec.extra["url"], "https://example.org/a");
        assert_eq!(rec.extra["feed"], "example-blog");
        assert_eq!(rec.source, SourceKind::Industry);
    }
}
