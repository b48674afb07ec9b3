use std::collections::HashSet;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Text normalizer for the whole pipeline. Compiled once and passed down so
/// every stage sees identical token sequences.
pub struct Tokenizer {
    tag_re: Regex,
    url_re: Regex,
    stop_words: HashSet<String>,
}

impl Tokenizer {
    pub fn new(stop_words: &HashSet<String>) -> Self {
        Tokenizer {
            tag_re: Regex::new(r"<[^>]*>").expect("static pattern"),
            url_re: Regex::new(r"https?://\S+|www\.\S+").expect("static pattern"),
            stop_words: stop_words.clone(),
        }
    }

    /// Free text -> ordered lowercase tokens. HTML tags and URLs removed,
    /// non-alphanumeric runs collapsed, tokens of length <= 1 and stop words
    /// dropped. Repeats are kept; term frequency depends on them.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let stripped = self.tag_re.replace_all(text, " ");
        let stripped = self.url_re.replace_all(&stripped, " ");
        let normalized: String = stripped.nfc().collect::<String>().to_lowercase();

        normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() > 1)
            .filter(|t| !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }

    /// Token sequence for a document: the title twice (title terms carry
    /// double weight) followed by the summary.
    pub fn document_tokens(&self, title: &str, summary: &str) -> Vec<String> {
        let title_tokens = self.tokens(title);
        let mut out = Vec::with_capacity(title_tokens.len() * 2);
        out.extend(title_tokens.iter().cloned());
        out.extend(title_tokens);
        out.extend(self.tokens(summary));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(words: &[&str]) -> Tokenizer {
        Tokenizer::new(&words.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn strips_html_and_urls() {
        let t = tok(&[]);
        let out = t.tokens("<p>Trust <b>signals</b></p> at https://example.org/x?id=1 matter");
        assert_eq!(out, vec!["trust", "signals", "at", "matter"]);
    }

    #[test]
    fn drops_stop_words_and_short_tokens() {
        let t = tok(&["the", "of"]);
        let out = t.tokens("the state of A.I. teaming");
        assert_eq!(out, vec!["state", "teaming"]);
    }

    #[test]
    fn keeps_repeats_in_order() {
        let t = tok(&[]);
        let out = t.tokens("trust, trust, delegation");
        assert_eq!(out, vec!["trust", "trust", "delegation"]);
    }

    #[test]
    fn title_tokens_are_doubled() {
        let t = tok(&[]);
        let out = t.document_tokens("Trust calibration", "delegation patterns");
        assert_eq!(
            out,
            vec!["trust", "calibration", "trust", "calibration", "delegation", "patterns"]
        );
    }

    #[test]
    fn punctuation_runs_collapse() {
        let t = tok(&[]);
        let out = t.tokens("mixed-initiative///interfaces!!");
        assert_eq!(out, vec!["mixed", "initiative", "interfaces"]);
    }
}
