use std::collections::HashSet;

/// Fixed rectangle all node positions are rescaled into. The front-end SVG
/// assumes these bounds, so they ride along in the config rather than being
/// baked into the projection code.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            x_min: 80.0,
            x_max: 920.0,
            y_min: 60.0,
            y_max: 640.0,
        }
    }
}

/// Everything the pipeline consumes beyond the documents themselves. The
/// curated word lists are injected here instead of living as module-level
/// constants so tests can swap in small fixtures.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub k: usize,
    pub vocab_cap: usize,
    pub min_cluster_size: usize,
    pub seed: u64,
    pub viewport: Viewport,
    pub stop_words: HashSet<String>,
    pub theme_terms: HashSet<String>,
    pub relevance_phrases: Vec<String>,
    /// lever tag -> keywords that mark a document as pulling that lever
    pub lever_keywords: Vec<(String, Vec<String>)>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            k: 10,
            vocab_cap: 600,
            min_cluster_size: 3,
            seed: 42,
            viewport: Viewport::default(),
            stop_words: STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            theme_terms: THEME_TERMS.iter().map(|s| s.to_string()).collect(),
            relevance_phrases: RELEVANCE_PHRASES.iter().map(|s| s.to_string()).collect(),
            lever_keywords: LEVER_KEYWORDS
                .iter()
                .map(|(tag, kws)| {
                    (
                        tag.to_string(),
                        kws.iter().map(|k| k.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

/// Topic phrases for the relevance filter. Literal lowercase substrings;
/// precision over recall is the accepted tradeoff, so stay specific.
pub const RELEVANCE_PHRASES: &[&str] = &[
    "human-ai",
    "human ai",
    "human–ai",
    "ai teaming",
    "teaming",
    "human-agent",
    "human agent",
    "human-in-the-loop",
    "human in the loop",
    "human-centered ai",
    "human-centred ai",
    "mixed-initiative",
    "mixed initiative",
    "co-creation",
    "cocreation",
    "co-creative",
    "copilot",
    "co-pilot",
    "ai assistant",
    "ai assistants",
    "ai collaboration",
    "collaborating with ai",
    "collaboration with ai",
    "working with ai",
    "shared autonomy",
    "interactive machine learning",
    "trust in ai",
    "trust calibration",
    "appropriate reliance",
    "delegation to ai",
    "ai delegation",
    "human oversight",
    "agentic workflow",
    "pair programming with ai",
];

/// Stop words for the tokenizer: function words, web/HTML artifacts,
/// tech-company names, and domain-generic filler that would otherwise
/// dominate every cluster label.
pub const STOP_WORDS: &[&str] = &[
    // function words
    "a", "an", "and", "are", "as", "at", "be", "been", "being", "but", "by", "can", "could",
    "did", "do", "does", "doing", "for", "from", "had", "has", "have", "he", "her", "here",
    "him", "his", "how", "if", "in", "into", "is", "it", "its", "just", "may", "me", "might",
    "more", "most", "must", "my", "no", "nor", "not", "now", "of", "on", "once", "only", "or",
    "other", "our", "out", "over", "own", "same", "shall", "she", "should", "so", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "upon", "very", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with",
    "would", "you", "your",
    // web/HTML artifacts
    "http", "https", "www", "com", "org", "html", "htm", "amp", "nbsp", "quot", "href",
    "rss", "feed", "via", "link", "click", "read", "blog", "post", "posts", "article",
    "articles", "page", "site", "website", "email", "newsletter", "subscribe",
    // tech-company names
    "google", "microsoft", "openai", "anthropic", "meta", "amazon", "apple", "deepmind",
    "nvidia", "ibm", "github",
    // domain-generic filler
    "ai", "artificial", "intelligence", "ml", "llm", "llms", "gpt", "model", "models",
    "paper", "papers", "abstract", "arxiv", "preprint", "study", "studies", "research",
    "researchers", "new", "using", "use", "used", "uses", "based", "approach", "approaches",
    "results", "method", "methods", "toward", "towards", "propose", "proposed",
    "present", "presents", "show", "shows",
];

/// Terms the labeler boosts so labels lean toward the domain vocabulary
/// instead of incidental high scorers.
pub const THEME_TERMS: &[&str] = &[
    "trust", "teaming", "collaboration", "collaborative", "autonomy", "delegation",
    "oversight", "transparency", "explainability", "interpretability", "agency", "agents",
    "agent", "copilot", "coordination", "handoff", "feedback", "alignment", "calibration",
    "reliance", "workflow", "initiative", "supervision", "control", "interaction",
    "interface", "creativity", "cocreation", "teamwork", "safety", "accountability",
];

/// Heuristic design-lever classifier data: a document mentioning any keyword
/// gets the tag. Curated records may carry their own `levers` array instead.
pub const LEVER_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "trust-calibration",
        &["trust", "calibrat", "reliance", "overreliance", "confidence"],
    ),
    (
        "explainability",
        &["explain", "interpret", "transparen", "rationale", "why"],
    ),
    (
        "control-autonomy",
        &["autonomy", "control", "delegat", "initiative", "oversight", "takeover"],
    ),
    (
        "feedback-loops",
        &["feedback", "correction", "steer", "iterat", "revision"],
    ),
    (
        "shared-context",
        &["context", "memory", "grounding", "shared mental", "common ground"],
    ),
    (
        "handoff-escalation",
        &["handoff", "hand-off", "escalat", "interrupt", "fallback"],
    ),
];
