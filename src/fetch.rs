use anyhow::{Context, Result};
use chrono::DateTime;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;
use xxhash_rust::xxh3::xxh3_64;

use crate::models::{CandidateItem, SourceKind};

const MAX_ATTEMPTS: u32 = 3;

/// A feed to poll. The list is small and curated, so it lives in code
/// rather than a config file.
#[derive(Debug, Clone, Copy)]
pub struct FeedSpec {
    pub label: &'static str,
    pub url: &'static str,
    pub source: SourceKind,
}

pub const DEFAULT_FEEDS: &[FeedSpec] = &[
    FeedSpec {
        label: "arxiv-hci",
        url: "https://rss.arxiv.org/rss/cs.HC",
        source: SourceKind::Research,
    },
    FeedSpec {
        label: "arxiv-ai",
        url: "https://rss.arxiv.org/rss/cs.AI",
        source: SourceKind::Research,
    },
    FeedSpec {
        label: "hn-frontpage",
        url: "https://hnrss.org/frontpage",
        source: SourceKind::Industry,
    },
];

fn make_candidate_id(url: &str, title: &str) -> String {
    format!("{:016x}", xxh3_64(format!("{}|{}", url, title).as_bytes()))
}

/// Fetch one feed with bounded retry on 429. Other HTTP failures bubble up
/// so the caller can log and move on to the next feed.
pub async fn fetch_feed(client: &Client, spec: &FeedSpec) -> Result<Vec<CandidateItem>> {
    let start = std::time::Instant::now();
    debug!("Fetching feed - label={}, url={}", spec.label, spec.url);

    let mut attempt = 0u32;
    let body = loop {
        attempt += 1;
        let resp = client
            .get(spec.url)
            .send()
            .await
            .with_context(|| format!("Request failed for {}", spec.url))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS && attempt < MAX_ATTEMPTS {
            let backoff = std::time::Duration::from_millis(500 * 2u64.pow(attempt));
            warn!(
                "Rate limited (429) - feed={}, attempt={}/{}, backoff={:?}",
                spec.label, attempt, MAX_ATTEMPTS, backoff
            );
            tokio::time::sleep(backoff).await;
            continue;
        }

        let resp = resp
            .error_for_status()
            .with_context(|| format!("HTTP error for {}", spec.url))?;
        break resp
            .text()
            .await
            .with_context(|| format!("Reading body for {}", spec.url))?;
    };

    let items = parse_items(&body, spec);
    info!(
        "Feed fetch completed - feed={}, duration={:.2}s, items={}",
        spec.label,
        start.elapsed().as_secs_f32(),
        items.len()
    );
    Ok(items)
}

/// Extract RSS `<item>` / Atom `<entry>` blocks with regexes. Crude but
/// sufficient for the handful of well-formed feeds we poll; anything without
/// a parseable title and link is skipped.
fn parse_items(xml: &str, spec: &FeedSpec) -> Vec<CandidateItem> {
    let item_re = Regex::new(r"(?s)<(item|entry)[\s>].*?</(item|entry)>").expect("static pattern");
    let title_re = Regex::new(r"(?s)<title[^>]*>(.*?)</title>").expect("static pattern");
    let link_re =
        Regex::new(r#"(?s)<link[^>]*href="([^"]+)"|<link[^>]*>(.*?)</link>"#).expect("static pattern");
    let summary_re = Regex::new(r"(?s)<(?:description|summary|content)[^>]*>(.*?)</(?:description|summary|content)>")
        .expect("static pattern");
    let date_re = Regex::new(r"(?s)<(?:pubDate|published|updated)[^>]*>(.*?)</(?:pubDate|published|updated)>")
        .expect("static pattern");
    let category_re =
        Regex::new(r#"(?s)<category[^>]*(?:term="([^"]+)"[^>]*/?>|>(.*?)</category>)"#)
            .expect("static pattern");

    let mut out = Vec::new();
    for block in item_re.find_iter(xml) {
        let block = block.as_str();

        let Some(title) = title_re
            .captures(block)
            .map(|c| clean_text(&c[1]))
            .filter(|t| !t.is_empty())
        else {
            continue;
        };

        let link = link_re.captures(block).and_then(|c| {
            c.get(1)
                .or_else(|| c.get(2))
                .map(|m| clean_text(m.as_str()))
        });
        let Some(link) = link.filter(|l| Url::parse(l).is_ok()) else {
            debug!("Skipping item without a valid link - title=\"{}\"", title);
            continue;
        };

        let summary = summary_re
            .captures(block)
            .map(|c| clean_text(&c[1]))
            .unwrap_or_default();
        let published = date_re
            .captures(block)
            .map(|c| normalize_date(&clean_text(&c[1])))
            .unwrap_or_default();
        let tags: Vec<String> = category_re
            .captures_iter(block)
            .filter_map(|c| {
                c.get(1)
                    .or_else(|| c.get(2))
                    .map(|m| clean_text(m.as_str()))
            })
            .filter(|t| !t.is_empty())
            .collect();

        out.push(CandidateItem {
            id: make_candidate_id(&link, &title),
            title,
            url: link,
            summary,
            published,
            source: spec.source,
            tags,
            feed: spec.label.to_string(),
        });
    }
    out
}

/// Strip CDATA wrappers and decode the entities that show up in practice.
fn clean_text(raw: &str) -> String {
    let s = raw
        .trim()
        .trim_start_matches("<![CDATA[")
        .trim_end_matches("]]>")
        .trim();
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
}

/// RFC 2822 dates (RSS) become RFC 3339; anything else passes through as-is.
fn normalize_date(raw: &str) -> String {
    match DateTime::parse_from_rfc2822(raw) {
        Ok(dt) => dt.to_rfc3339(),
        Err(_) => raw.to_string(),
    }
}
