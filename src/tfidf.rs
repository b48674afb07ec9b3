use std::collections::HashMap;

use crate::matrix::Matrix;

/// Smoothed inverse document frequency: `ln((N+1)/(df+1)) + 1`. Always
/// positive, bounded below by 1 for a term present in every document.
fn smoothed_idf(n_docs: usize, doc_freq: usize) -> f64 {
    ((n_docs as f64 + 1.0) / (doc_freq as f64 + 1.0)).ln() + 1.0
}

/// One dense row per document, columns in vocabulary order. Entry = TF * IDF
/// where TF is the raw term count divided by the sequence length (divisor 1
/// for empty documents, whose row is all zero anyway).
pub fn vectorize(token_seqs: &[Vec<String>], vocab: &[String]) -> Matrix {
    let n_docs = token_seqs.len();
    let term_col: HashMap<&str, usize> = vocab
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    // document frequency per vocabulary term, computed once over the corpus
    let mut doc_freq = vec![0usize; vocab.len()];
    for seq in token_seqs {
        let mut seen = vec![false; vocab.len()];
        for term in seq {
            if let Some(&col) = term_col.get(term.as_str()) {
                if !seen[col] {
                    seen[col] = true;
                    doc_freq[col] += 1;
                }
            }
        }
    }
    let idf: Vec<f64> = doc_freq.iter().map(|&df| smoothed_idf(n_docs, df)).collect();

    let mut matrix = Matrix::zeros(n_docs, vocab.len());
    for (r, seq) in token_seqs.iter().enumerate() {
        let denom = seq.len().max(1) as f64;
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for term in seq {
            if let Some(&col) = term_col.get(term.as_str()) {
                *counts.entry(col).or_insert(0) += 1;
            }
        }
        let row = matrix.row_mut(r);
        for (col, count) in counts {
            row[col] = (count as f64 / denom) * idf[col];
        }
    }
    matrix
}
