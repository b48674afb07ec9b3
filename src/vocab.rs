use std::collections::{HashMap, HashSet};

/// Build the shared vocabulary: up to `cap` distinct terms ranked by
/// descending document frequency (documents containing the term at least
/// once, not occurrence counts, so one long document cannot dominate the
/// selection). Ties break by first appearance in corpus order.
pub fn build_vocabulary(token_seqs: &[Vec<String>], cap: usize) -> Vec<String> {
    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut next_rank = 0usize;

    for seq in token_seqs {
        let mut seen_in_doc: HashSet<&str> = HashSet::new();
        for term in seq {
            if seen_in_doc.insert(term.as_str()) {
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
                first_seen.entry(term.as_str()).or_insert_with(|| {
                    let r = next_rank;
                    next_rank += 1;
                    r
                });
            }
        }
    }

    let mut terms: Vec<&str> = doc_freq.keys().copied().collect();
    terms.sort_by(|a, b| {
        doc_freq[b]
            .cmp(&doc_freq[a])
            .then(first_seen[a].cmp(&first_seen[b]))
    });
    terms.truncate(cap);
    terms.into_iter().map(str::to_string).collect()
}
