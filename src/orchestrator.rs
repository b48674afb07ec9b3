use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::fetch::{fetch_feed, FeedSpec};
use crate::kmeans;
use crate::label::label_clusters;
use crate::levers;
use crate::models::{
    AtlasStore, CandidateStore, ClusterSummary, DocRecord, Document, Origin,
};
use crate::project::{pca_2d, scale_to_viewport};
use crate::relevance::is_relevant;
use crate::smallmerge::enforce_min_size;
use crate::tfidf::vectorize;
use crate::tokenize::Tokenizer;
use crate::vocab::build_vocabulary;

const MAX_QUESTIONS_PER_CLUSTER: usize = 2;

pub struct MergeOptions {
    pub store_path: PathBuf,
    pub candidates_path: PathBuf,
    pub dry_run: bool,
}

pub struct IngestOptions {
    pub candidates_path: PathBuf,
    pub delay_ms: u64,
}

/// Pipeline result before it is stitched back onto the records.
pub struct PipelineOutcome {
    pub clusters: Vec<ClusterSummary>,
    pub assignments: Vec<usize>,
    pub positions: Vec<[f64; 2]>,
}

/// The core pipeline: tokenize, build vocabulary, vectorize, then cluster
/// and project in parallel branches, merge undersized clusters on the 2D
/// layout, and label what survives. Pure and deterministic for a given
/// document list and config.
pub fn run_pipeline(documents: &[Document], cfg: &PipelineConfig) -> Result<PipelineOutcome> {
    if documents.is_empty() {
        bail!("No documents to cluster");
    }
    let start = std::time::Instant::now();

    let tokenizer = Tokenizer::new(&cfg.stop_words);
    let token_seqs: Vec<Vec<String>> = documents
        .iter()
        .map(|d| tokenizer.document_tokens(&d.record.title, &d.record.summary))
        .collect();

    let vocabulary = build_vocabulary(&token_seqs, cfg.vocab_cap);
    let features = vectorize(&token_seqs, &vocabulary);
    debug!(
        "Vectorized corpus - documents={}, vocabulary={}",
        features.rows(),
        vocabulary.len()
    );

    let mut assignments = kmeans::cluster(&features, cfg.k, cfg.seed);
    let requested_k = cfg.k.min(documents.len()).min(20).max(1);

    let raw_positions = pca_2d(&features);
    let positions = scale_to_viewport(&raw_positions, cfg.viewport);

    let final_k = enforce_min_size(&mut assignments, &positions, cfg.min_cluster_size);
    info!(
        "Clustering completed - duration={:.2}s, requested_k={}, final_k={}",
        start.elapsed().as_secs_f32(),
        requested_k,
        final_k
    );

    let doc_levers: Vec<Vec<String>> = documents.iter().map(|d| d.levers.clone()).collect();
    let labelings = label_clusters(
        &features,
        &vocabulary,
        &assignments,
        final_k,
        &cfg.theme_terms,
        &doc_levers,
    );

    let clusters = labelings
        .into_iter()
        .enumerate()
        .map(|(i, l)| ClusterSummary {
            id: format!("cluster-{i}"),
            label: l.label,
            terms: l.terms,
            questions: sample_questions(documents, &assignments, i),
            focus: l.focus,
        })
        .collect();

    Ok(PipelineOutcome {
        clusters,
        assignments,
        positions,
    })
}

/// Up to two design questions pulled from member payloads, in member order.
fn sample_questions(documents: &[Document], assignments: &[usize], cluster: usize) -> Vec<String> {
    let mut out = Vec::new();
    for (doc, &a) in documents.iter().zip(assignments) {
        if a != cluster {
            continue;
        }
        if let Some(Value::Array(qs)) = doc.record.extra.get("questions") {
            for q in qs {
                if let Value::String(q) = q {
                    out.push(q.clone());
                    if out.len() == MAX_QUESTIONS_PER_CLUSTER {
                        return out;
                    }
                }
            }
        }
    }
    out
}

/// Turn existing records and relevance-filtered candidates into the one
/// document list the pipeline sees, existing first so they win id dedup.
pub fn assemble_documents(
    store: AtlasStore,
    candidates: CandidateStore,
    cfg: &PipelineConfig,
) -> Vec<Document> {
    let mut documents: Vec<Document> = store
        .nodes
        .into_iter()
        .map(|record| {
            let levers = curated_levers(&record).unwrap_or_else(|| {
                levers::classify(
                    &format!("{} {}", record.title, record.summary),
                    &cfg.lever_keywords,
                )
            });
            Document {
                record,
                origin: Origin::Existing,
                levers,
            }
        })
        .collect();

    let before = candidates.items.len();
    let mut kept = 0usize;
    for item in candidates.items {
        // re-filter persisted candidates in case the phrase list changed
        if !is_relevant(&item.title, &item.summary, &cfg.relevance_phrases) {
            continue;
        }
        kept += 1;
        let record = item.into_record();
        let levers = levers::classify(
            &format!("{} {}", record.title, record.summary),
            &cfg.lever_keywords,
        );
        documents.push(Document {
            record,
            origin: Origin::Ingested,
            levers,
        });
    }
    if before > 0 {
        info!(
            "Relevance filter - candidates={}, kept={}, dropped={}",
            before,
            kept,
            before - kept
        );
    }
    let existing = documents
        .iter()
        .filter(|d| d.origin == Origin::Existing)
        .count();
    debug!(
        "Corpus assembled - existing={}, ingested={}",
        existing,
        documents.len() - existing
    );
    documents
}

fn curated_levers(record: &DocRecord) -> Option<Vec<String>> {
    match record.extra.get("levers") {
        Some(Value::Array(tags)) => Some(
            tags.iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}

/// Merge step: load stores, run the pipeline over the union, attach cluster
/// ids and coordinates, dedup by id (existing wins), persist atomically.
pub fn run_merge(opts: &MergeOptions, cfg: &PipelineConfig) -> Result<()> {
    let start = std::time::Instant::now();
    info!(
        "Merge started - store={}, candidates={}, k={}, dry_run={}",
        opts.store_path.display(),
        opts.candidates_path.display(),
        cfg.k,
        opts.dry_run
    );

    let raw = fs::read_to_string(&opts.store_path)
        .with_context(|| format!("Reading document store {}", opts.store_path.display()))?;
    let store: AtlasStore = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing document store {}", opts.store_path.display()))?;

    let candidates = match fs::read_to_string(&opts.candidates_path) {
        Ok(raw) => serde_json::from_str::<CandidateStore>(&raw).with_context(|| {
            format!("Parsing candidate store {}", opts.candidates_path.display())
        })?,
        Err(_) => {
            warn!(
                "Candidate store missing - path={}, re-clustering existing documents only",
                opts.candidates_path.display()
            );
            CandidateStore::default()
        }
    };

    let documents = assemble_documents(store, candidates, cfg);
    let outcome = run_pipeline(&documents, cfg)?;

    // attach results, then dedup by id keeping the first occurrence
    let mut nodes: Vec<DocRecord> = documents
        .into_iter()
        .zip(outcome.assignments.iter().zip(&outcome.positions))
        .map(|(doc, (&a, &pos))| {
            let mut record = doc.record;
            record.cluster = Some(format!("cluster-{a}"));
            record.embedding = Some(pos);
            record
        })
        .collect();
    let before = nodes.len();
    let mut seen: HashSet<String> = HashSet::new();
    nodes.retain(|n| seen.insert(n.id.clone()));
    if before > nodes.len() {
        info!(
            "Deduplication - removed={} duplicate ids, retained={}",
            before - nodes.len(),
            nodes.len()
        );
    }

    for c in &outcome.clusters {
        let size = nodes
            .iter()
            .filter(|n| n.cluster.as_deref() == Some(c.id.as_str()))
            .count();
        info!("{} - label=\"{}\", members={}", c.id, c.label, size);
    }

    let result = AtlasStore {
        clusters: outcome.clusters,
        nodes,
    };

    if opts.dry_run {
        if let Some(c) = result.clusters.first() {
            info!("Sample cluster:\n{}", serde_json::to_string_pretty(c)?);
        }
        if let Some(n) = result.nodes.first() {
            info!("Sample node:\n{}", serde_json::to_string_pretty(n)?);
        }
        info!(
            "Dry run - store not modified, duration={:.2}s",
            start.elapsed().as_secs_f32()
        );
        return Ok(());
    }

    write_json_atomic(&opts.store_path, &result)?;
    info!(
        "Merge completed - duration={:.2}s, clusters={}, nodes={}",
        start.elapsed().as_secs_f32(),
        result.clusters.len(),
        result.nodes.len()
    );
    Ok(())
}

/// Ingest step: poll all feeds sequentially, relevance-filter, dedup against
/// the persisted candidate set, write back.
pub async fn run_ingest(opts: &IngestOptions, cfg: &PipelineConfig, feeds: &[FeedSpec]) -> Result<()> {
    let start = std::time::Instant::now();
    info!(
        "Ingest started - feeds={}, candidates={}",
        feeds.len(),
        opts.candidates_path.display()
    );

    let client = Client::builder().build()?;
    let mut fetched = Vec::new();
    for (i, spec) in feeds.iter().enumerate() {
        if i > 0 && opts.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(opts.delay_ms)).await;
        }
        match fetch_feed(&client, spec).await {
            Ok(items) => fetched.extend(items),
            Err(e) => warn!("Feed failed - label={}, error={:#}", spec.label, e),
        }
    }

    let before = fetched.len();
    fetched.retain(|item| is_relevant(&item.title, &item.summary, &cfg.relevance_phrases));
    info!(
        "Relevance filter - fetched={}, kept={}, dropped={}",
        before,
        fetched.len(),
        before - fetched.len()
    );

    let mut store = match fs::read_to_string(&opts.candidates_path) {
        Ok(raw) => serde_json::from_str::<CandidateStore>(&raw).with_context(|| {
            format!("Parsing candidate store {}", opts.candidates_path.display())
        })?,
        Err(_) => {
            debug!("No candidate store yet - starting fresh");
            CandidateStore::default()
        }
    };

    let mut known: HashSet<String> = store.items.iter().map(|i| i.id.clone()).collect();
    let mut added = 0usize;
    for item in fetched {
        if known.insert(item.id.clone()) {
            store.items.push(item);
            added += 1;
        }
    }
    store.updated = Utc::now().to_rfc3339();

    write_json_atomic(&opts.candidates_path, &store)?;
    info!(
        "Ingest completed - duration={:.2}s, added={}, total={}",
        start.elapsed().as_secs_f32(),
        added,
        store.items.len()
    );
    Ok(())
}

/// One atomic write after the whole run succeeds: temp file, then rename.
fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating directory {}", parent.display()))?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("Writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Renaming {} into place", tmp.display()))?;
    Ok(())
}
