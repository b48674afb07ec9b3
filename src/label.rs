use std::collections::HashSet;

use itertools::Itertools;
use tracing::debug;

use crate::levers;
use crate::matrix::Matrix;

const THEME_BOOST: f64 = 1.6;
const PRESENCE_THRESHOLD: f64 = 0.01;
const RANKED_POOL: usize = 10;
const MAX_LABEL_TERMS: usize = 3;
const MAX_RAW_TERMS: usize = 5;

/// Label material for one cluster. `terms` is the unfiltered top-5 raw list
/// kept for "why this cluster" UI, independent of the deduplicated label.
#[derive(Debug, Clone)]
pub struct ClusterLabeling {
    pub label: String,
    pub terms: Vec<String>,
    pub focus: Option<String>,
}

/// Derive a human-readable label per cluster from term statistics:
/// mean member TF-IDF, boosted for theme vocabulary, penalized for terms
/// that fail to differentiate clusters, then deduplicated morphologically.
pub fn label_clusters(
    features: &Matrix,
    vocab: &[String],
    assignments: &[usize],
    cluster_count: usize,
    theme_terms: &HashSet<String>,
    doc_levers: &[Vec<String>],
) -> Vec<ClusterLabeling> {
    let means = cluster_means(features, assignments, cluster_count, vocab.len());

    // in how many clusters each term is meaningfully present
    let presence: Vec<usize> = (0..vocab.len())
        .map(|t| {
            means
                .iter()
                .filter(|m| m[t] > PRESENCE_THRESHOLD)
                .count()
        })
        .collect();

    (0..cluster_count)
        .map(|c| {
            let adjusted: Vec<f64> = (0..vocab.len())
                .map(|t| {
                    let mut score = means[c][t];
                    if theme_terms.contains(&vocab[t]) {
                        score *= THEME_BOOST;
                    }
                    score * ubiquity_factor(presence[t], cluster_count)
                })
                .collect();

            let ranked: Vec<usize> = (0..vocab.len())
                .filter(|&t| adjusted[t] > 0.0)
                .sorted_by(|&a, &b| {
                    adjusted[b]
                        .partial_cmp(&adjusted[a])
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then(a.cmp(&b))
                })
                .take(RANKED_POOL)
                .collect();

            let raw_terms: Vec<String> = (0..vocab.len())
                .filter(|&t| means[c][t] > 0.0)
                .sorted_by(|&a, &b| {
                    means[c][b]
                        .partial_cmp(&means[c][a])
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then(a.cmp(&b))
                })
                .take(MAX_RAW_TERMS)
                .map(|t| vocab[t].clone())
                .collect();

            let mut kept: Vec<&str> = Vec::new();
            for &t in &ranked {
                let term = vocab[t].as_str();
                if !kept.iter().any(|k| is_variant(k, term)) {
                    kept.push(term);
                }
                if kept.len() == MAX_LABEL_TERMS {
                    break;
                }
            }

            let mut label = if kept.is_empty() {
                format!("Cluster {c}")
            } else {
                kept.iter().map(|t| capitalize(t)).join(" & ")
            };

            let focus = dominant_lever(assignments, doc_levers, c);
            if let Some(tag) = &focus {
                let segments = label.matches(" & ").count() + 1;
                let label_lower = label.to_lowercase();
                let mentioned = tag.split('-').any(|w| label_lower.contains(w));
                if segments < MAX_LABEL_TERMS && !mentioned {
                    label = format!("{} & {}", levers::humanize(tag), label);
                }
            }

            debug!("Cluster labeled - cluster={}, label=\"{}\"", c, label);
            ClusterLabeling {
                label,
                terms: raw_terms,
                focus,
            }
        })
        .collect()
}

fn cluster_means(
    features: &Matrix,
    assignments: &[usize],
    cluster_count: usize,
    dims: usize,
) -> Vec<Vec<f64>> {
    let mut sums = vec![vec![0.0f64; dims]; cluster_count];
    let mut counts = vec![0usize; cluster_count];
    for (row, &c) in assignments.iter().enumerate() {
        counts[c] += 1;
        for (s, v) in sums[c].iter_mut().zip(features.row(row)) {
            *s += v;
        }
    }
    for (sum, &n) in sums.iter_mut().zip(&counts) {
        if n > 0 {
            for s in sum.iter_mut() {
                *s /= n as f64;
            }
        }
    }
    sums
}

/// Terms meaningfully present in most clusters cannot tell clusters apart,
/// however high they score individually.
fn ubiquity_factor(present_in: usize, cluster_count: usize) -> f64 {
    if cluster_count == 0 {
        return 1.0;
    }
    let share = present_in as f64 / cluster_count as f64;
    if share > 0.5 {
        0.3
    } else if share > 0.35 {
        0.6
    } else {
        1.0
    }
}

/// Morphological duplicate: prefix relation either way, or equal after
/// stripping a trailing "s" ("agent"/"agents", "team"/"teaming").
fn is_variant(a: &str, b: &str) -> bool {
    a.starts_with(b) || b.starts_with(a) || strip_plural(a) == strip_plural(b)
}

fn strip_plural(t: &str) -> &str {
    t.strip_suffix('s').unwrap_or(t)
}

fn capitalize(t: &str) -> String {
    let mut chars = t.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Most common lever tag among the cluster's members, when it shows up at
/// least twice. Ties break lexicographically for determinism.
fn dominant_lever(
    assignments: &[usize],
    doc_levers: &[Vec<String>],
    cluster: usize,
) -> Option<String> {
    let counts = assignments
        .iter()
        .zip(doc_levers)
        .filter(|(&a, _)| a == cluster)
        .flat_map(|(_, tags)| tags.iter())
        .counts();
    counts
        .into_iter()
        .sorted_by(|(ta, ca), (tb, cb)| cb.cmp(ca).then(ta.cmp(tb)))
        .next()
        .filter(|(_, count)| *count >= 2)
        .map(|(tag, _)| tag.clone())
}
