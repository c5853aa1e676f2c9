use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::extract::extract_days;
use super::vocab::{list_item_re, match_subsection_header};

const MAX_CANDIDATES: usize = 20;

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold pattern"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link pattern"))
}

fn link_strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[.*?\]\(.*?\)").expect("link strip pattern"))
}

/// "move N min" style annotations the generator attaches to list items.
pub fn move_annotation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)move\s*(\d+)\s*min(?:ute)?s?").expect("move pattern"))
}

/// A geocodable place name pulled from a list item, with enough metadata to
/// re-attach the looked-up point to its day and section.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceCandidate {
    pub name: String,
    pub day_num: u32,
    pub order: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

fn plain_name(trimmed: &str) -> Option<String> {
    let stripped = list_item_re().replace(trimmed, "");
    let stripped = link_strip_re().replace_all(&stripped, "");
    let stripped = move_annotation_re().replace_all(&stripped, "");
    let first = stripped
        .split(['.', '\u{00B7}', '|', '-'])
        .next()
        .unwrap_or("")
        .trim()
        .to_string();
    if first.is_empty() {
        None
    } else {
        Some(first)
    }
}

fn item_name(trimmed: &str) -> Option<String> {
    if let Some(caps) = bold_re().captures(trimmed) {
        let name = caps[1].trim().to_string();
        if !name.is_empty() {
            return Some(name);
        }
    }
    if let Some(caps) = link_re().captures(trimmed) {
        let name = caps[1].trim().to_string();
        if !name.is_empty() {
            return Some(name);
        }
    }
    plain_name(trimmed)
}

/// Flat list of place names for a geocoding request: bold span first, then
/// link text, then the text before the first separator. Exact-string dedupe,
/// capped at 20.
pub fn extract_place_candidates(markdown: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for line in markdown.split('\n') {
        let trimmed = line.trim();
        if !trimmed.starts_with("- ") {
            continue;
        }
        let Some(name) = item_name(trimmed) else {
            continue;
        };
        if seen.insert(name.clone()) {
            candidates.push(name);
            if candidates.len() >= MAX_CANDIDATES {
                break;
            }
        }
    }

    candidates
}

/// Same name heuristic, scoped per day and section. `order` is a 1-based
/// running index per day across all of its sections, so map markers can be
/// labeled D2-3 style.
pub fn extract_place_candidates_with_meta(markdown: &str) -> Vec<PlaceCandidate> {
    let mut all = Vec::new();

    for day in extract_days(markdown) {
        let mut section: Option<String> = None;
        let mut order = 0u32;
        for line in day.raw.split('\n') {
            let trimmed = line.trim();
            if let Some(title) = match_subsection_header(trimmed) {
                section = Some(title.to_string());
                continue;
            }
            let is_bullet = list_item_re().is_match(trimmed);
            if !is_bullet && !bold_re().is_match(trimmed) {
                continue;
            }
            let Some(name) = item_name(trimmed) else {
                continue;
            };
            order += 1;
            all.push(PlaceCandidate {
                name,
                day_num: day.day_num,
                order,
                section: section.clone(),
            });
        }
    }

    all
}
