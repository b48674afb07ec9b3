use serde_json::{json, Map, Value};

use teaming_atlas::config::PipelineConfig;
use teaming_atlas::models::{AtlasStore, Document, Origin, SourceKind};
use teaming_atlas::orchestrator::{run_merge, run_pipeline, MergeOptions};

fn doc(id: &str, title: &str, summary: &str) -> Document {
    doc_with_extra(id, title, summary, Map::new())
}

fn doc_with_extra(id: &str, title: &str, summary: &str, extra: Map<String, Value>) -> Document {
    Document {
        record: teaming_atlas::models::DocRecord {
            id: id.to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            source: SourceKind::Research,
            cluster: None,
            embedding: None,
            extra,
        },
        origin: Origin::Existing,
        levers: Vec::new(),
    }
}

/// 12 documents over three themes, two of them outliers with single-word
/// titles and no shared vocabulary.
fn scenario_corpus() -> Vec<Document> {
    vec![
        doc("t1", "Trust calibration in human-AI teaming", "How operators calibrate trust and reliance on automation"),
        doc("t2", "Measuring trust and reliance", "Trust calibration experiments with automation operators"),
        doc("t3", "Overtrust and reliance failures", "When operators overtrust automation and calibration breaks"),
        doc("t4", "Calibrated trust for teaming", "Reliance, calibration and trust repair in teaming settings"),
        doc("h1", "Handoff protocols for escalation", "Designing handoff and escalation between agent and operator"),
        doc("h2", "Escalation and takeover timing", "Takeover requests, handoff friction and escalation policies"),
        doc("h3", "Interruption and handoff cost", "Escalation interruptions and takeover handoff budgets"),
        doc("c1", "Co-creation in creative writing", "Creative co-creation workflows for writers and drafting"),
        doc("c2", "Creative drafting together", "Co-creation and creative drafting support for writers"),
        doc("c3", "Writers and co-creation tools", "Creative workflows where writers steer co-creation drafting"),
        doc("x1", "Zebra", ""),
        doc("x2", "Quasar", ""),
    ]
}

fn scenario_config() -> PipelineConfig {
    PipelineConfig {
        k: 3,
        ..PipelineConfig::default()
    }
}

#[test]
fn pipeline_is_deterministic() {
    let docs = scenario_corpus();
    let cfg = scenario_config();
    let a = run_pipeline(&docs, &cfg).unwrap();
    let b = run_pipeline(&docs, &cfg).unwrap();
    assert_eq!(a.assignments, b.assignments);
    let labels_a: Vec<&str> = a.clusters.iter().map(|c| c.label.as_str()).collect();
    let labels_b: Vec<&str> = b.clusters.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels_a, labels_b);
    assert_eq!(a.positions, b.positions);
}

#[test]
fn partition_is_complete_and_ids_dense() {
    let docs = scenario_corpus();
    let out = run_pipeline(&docs, &scenario_config()).unwrap();
    assert_eq!(out.assignments.len(), docs.len());
    let k = out.clusters.len();
    assert!(out.assignments.iter().all(|&a| a < k));
    // every cluster id in the dense range is actually used
    for c in 0..k {
        assert!(out.assignments.contains(&c), "cluster {c} has no members");
        assert_eq!(out.clusters[c].id, format!("cluster-{c}"));
    }
}

#[test]
fn outliers_are_absorbed_and_min_size_holds() {
    let docs = scenario_corpus();
    let cfg = scenario_config();
    let out = run_pipeline(&docs, &cfg).unwrap();
    assert!(out.clusters.len() <= 3);
    for c in 0..out.clusters.len() {
        let size = out.assignments.iter().filter(|&&a| a == c).count();
        assert!(
            size >= cfg.min_cluster_size || docs.len() < cfg.min_cluster_size,
            "cluster {c} has {size} members"
        );
    }
}

#[test]
fn positions_stay_inside_the_viewport() {
    let docs = scenario_corpus();
    let cfg = scenario_config();
    let out = run_pipeline(&docs, &cfg).unwrap();
    for p in &out.positions {
        assert!(p[0] >= cfg.viewport.x_min - 1e-9 && p[0] <= cfg.viewport.x_max + 1e-9);
        assert!(p[1] >= cfg.viewport.y_min - 1e-9 && p[1] <= cfg.viewport.y_max + 1e-9);
    }
}

#[test]
fn labels_come_from_cluster_vocabulary() {
    let docs = scenario_corpus();
    let out = run_pipeline(&docs, &scenario_config()).unwrap();
    // with three clean themes, at least one label should mention a theme term
    let joined = out
        .clusters
        .iter()
        .map(|c| c.label.to_lowercase())
        .collect::<Vec<_>>()
        .join(" | ");
    assert!(
        joined.contains("trust") || joined.contains("handoff") || joined.contains("creat"),
        "unexpected labels: {joined}"
    );
    for c in &out.clusters {
        assert!(c.terms.len() <= 5);
        assert!(c.questions.len() <= 2);
    }
}

#[test]
fn sample_questions_surface_from_member_payloads() {
    let mut docs = scenario_corpus();
    let mut extra = Map::new();
    extra.insert(
        "questions".to_string(),
        json!(["How should trust be repaired?", "What signals calibrate reliance?", "A third question"]),
    );
    docs[0] = doc_with_extra(
        "t1",
        "Trust calibration in human-AI teaming",
        "How operators calibrate trust and reliance on automation",
        extra,
    );
    let out = run_pipeline(&docs, &scenario_config()).unwrap();
    let cluster = out.assignments[0];
    let qs = &out.clusters[cluster].questions;
    assert!(!qs.is_empty() && qs.len() <= 2);
    assert_eq!(qs[0], "How should trust be repaired?");
}

#[test]
fn tiny_corpus_collapses_without_crashing() {
    let docs = vec![doc("a", "Trust", "trust trust"), doc("b", "Handoff", "handoff")];
    let out = run_pipeline(&docs, &scenario_config()).unwrap();
    assert_eq!(out.clusters.len(), 1);
    assert!(out.assignments.iter().all(|&a| a == 0));
}

#[test]
fn merge_dedups_and_is_identity_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("landscape.json");
    let candidates_path = dir.path().join("candidates.json");

    let nodes: Vec<Value> = scenario_corpus()
        .iter()
        .map(|d| {
            json!({
                "id": d.record.id,
                "title": d.record.title,
                "summary": d.record.summary,
                "source": "research",
                "citation": format!("{} et al.", d.record.id),
            })
        })
        .collect();
    std::fs::write(
        &store_path,
        serde_json::to_vec_pretty(&json!({ "nodes": nodes })).unwrap(),
    )
    .unwrap();

    // one genuinely new candidate plus one colliding with an existing id
    std::fs::write(
        &candidates_path,
        serde_json::to_vec_pretty(&json!({
            "items": [
                {
                    "id": "n1",
                    "title": "Shared autonomy for teaming robots",
                    "url": "https://example.org/n1",
                    "summary": "Shared autonomy and human oversight in teaming",
                    "source": "industry"
                },
                {
                    "id": "t1",
                    "title": "Duplicate about human-ai teaming",
                    "url": "https://example.org/dup",
                    "summary": "",
                    "source": "industry"
                }
            ]
        }))
        .unwrap(),
    )
    .unwrap();

    let cfg = scenario_config();
    let opts = MergeOptions {
        store_path: store_path.clone(),
        candidates_path: candidates_path.clone(),
        dry_run: false,
    };
    run_merge(&opts, &cfg).unwrap();

    let out: AtlasStore =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    // 12 existing + 1 new; the colliding candidate lost to the existing record
    assert_eq!(out.nodes.len(), 13);
    let t1 = out.nodes.iter().find(|n| n.id == "t1").unwrap();
    assert_eq!(t1.title, "Trust calibration in human-AI teaming");
    assert_eq!(t1.extra["citation"], "t1 et al.");
    for n in &out.nodes {
        assert!(n.cluster.is_some());
        assert!(n.embedding.is_some());
    }
    assert!(!out.clusters.is_empty());

    // feed the output back in as "existing" with no candidates: identifiers
    // and payload fields must survive (cluster/coords may legitimately move)
    let missing = dir.path().join("no-candidates.json");
    let opts2 = MergeOptions {
        store_path: store_path.clone(),
        candidates_path: missing,
        dry_run: false,
    };
    run_merge(&opts2, &cfg).unwrap();
    let again: AtlasStore =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    let mut ids_a: Vec<&str> = out.nodes.iter().map(|n| n.id.as_str()).collect();
    let mut ids_b: Vec<&str> = again.nodes.iter().map(|n| n.id.as_str()).collect();
    ids_a.sort_unstable();
    ids_b.sort_unstable();
    assert_eq!(ids_a, ids_b);
    let t1_again = again.nodes.iter().find(|n| n.id == "t1").unwrap();
    assert_eq!(t1_again.extra["citation"], "t1 et al.");
}

#[test]
fn dry_run_leaves_the_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("landscape.json");
    let nodes: Vec<Value> = scenario_corpus()
        .iter()
        .map(|d| json!({ "id": d.record.id, "title": d.record.title, "summary": d.record.summary }))
        .collect();
    let original = serde_json::to_vec_pretty(&json!({ "nodes": nodes })).unwrap();
    std::fs::write(&store_path, &original).unwrap();

    let opts = MergeOptions {
        store_path: store_path.clone(),
        candidates_path: dir.path().join("absent.json"),
        dry_run: true,
    };
    run_merge(&opts, &scenario_config()).unwrap();
    assert_eq!(std::fs::read(&store_path).unwrap(), original);
}

#[test]
fn malformed_store_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("landscape.json");
    std::fs::write(&store_path, b"{ not json").unwrap();
    let opts = MergeOptions {
        store_path,
        candidates_path: dir.path().join("absent.json"),
        dry_run: true,
    };
    assert!(run_merge(&opts, &scenario_config()).is_err());
}
