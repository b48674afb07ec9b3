//! Heuristic design-lever classifier. Curated records usually carry their
//! own `levers` array; ingested items get tagged here by keyword scan so
//! the labeler can still compute a dominant focus per cluster.

/// Lever tags whose keywords appear in the text, in configured tag order.
pub fn classify(text: &str, lever_keywords: &[(String, Vec<String>)]) -> Vec<String> {
    let haystack = text.to_lowercase();
    lever_keywords
        .iter()
        .filter(|(_, kws)| kws.iter().any(|kw| haystack.contains(kw.as_str())))
        .map(|(tag, _)| tag.clone())
        .collect()
}

/// "trust-calibration" -> "Trust Calibration", for label display.
pub fn humanize(tag: &str) -> String {
    tag.split('-')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    #[test]
    fn tags_documents_by_keyword() {
        let cfg = PipelineConfig::default();
        let tags = classify(
            "Calibrating trust through explanation interfaces",
            &cfg.lever_keywords,
        );
        assert!(tags.contains(&"trust-calibration".to_string()));
        assert!(tags.contains(&"explainability".to_string()));
    }

    #[test]
    fn no_keywords_no_tags() {
        let cfg = PipelineConfig::default();
        assert!(classify("Completely unrelated cooking recipe", &cfg.lever_keywords).is_empty());
    }

    #[test]
    fn humanize_splits_and_capitalizes() {
        assert_eq!(humanize("trust-calibration"), "Trust Calibration");
        assert_eq!(humanize("handoff"), "Handoff");
    }
}
