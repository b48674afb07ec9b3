//! Topical relevance filter shared by ingest and merge.
//!
//! Deliberately crude: a case-insensitive literal substring scan over the
//! configured phrase list. Items that discuss the topic without using any
//! listed phrase are silently dropped; that precision-over-recall tradeoff
//! keeps the curated landscape free of drive-by matches.

/// True if any topic phrase occurs in `title + summary`.
pub fn is_relevant(title: &str, summary: &str, phrases: &[String]) -> bool {
    let haystack = format!("{} {}", title, summary).to_lowercase();
    phrases.iter().any(|p| haystack.contains(p.as_str()))
}
