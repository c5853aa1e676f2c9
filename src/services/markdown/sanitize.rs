use std::collections::HashMap;
use std::sync::OnceLock;

use super::extract::{extract_subsections, Subsection};
use super::vocab::{match_bare_label, match_subsection_header, SectionLabel};

/// Canonical body of a freshly cleared day.
pub fn empty_day_template() -> &'static str {
    static TEMPLATE: OnceLock<String> = OnceLock::new();
    TEMPLATE.get_or_init(|| {
        SectionLabel::TEMPLATE_ORDER
            .iter()
            .map(|label| format!("### {}\n{}", label.as_str(), label.placeholder_line()))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// Promotes bare vocabulary-label lines to proper `### Label` headers. The
/// generator intermittently drops the header marker; both forms must act as
/// section boundaries.
pub fn normalize_day_raw(raw: &str) -> String {
    raw.split('\n')
        .map(|line| match match_bare_label(line) {
            Some(label) => format!("### {}", label.as_str()),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keeps only the last occurrence of each recognized label, at its original
/// position. Later duplicates are regeneration drift and supersede earlier
/// ones; unrecognized sections are all kept.
pub fn dedupe_subsections(sections: Vec<Subsection>) -> Vec<Subsection> {
    let mut last_index: HashMap<SectionLabel, usize> = HashMap::new();
    for (idx, section) in sections.iter().enumerate() {
        if let Some(label) = SectionLabel::parse(&section.title) {
            last_index.insert(label, idx);
        }
    }

    sections
        .into_iter()
        .enumerate()
        .filter(|(idx, section)| match SectionLabel::parse(&section.title) {
            Some(label) => last_index.get(&label) == Some(idx),
            None => true,
        })
        .map(|(_, section)| section)
        .collect()
}

fn is_single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// A one-character line that is the tail glyph of a label, sitting above any
/// real content. Kept as its own named check so the heuristic can be dropped
/// or extended if the vocabulary changes.
fn is_leaked_label_tail(line: &str, section_title: Option<&str>) -> bool {
    let Some(c) = is_single_char(line) else {
        return false;
    };
    let from_vocab = SectionLabel::ALL
        .iter()
        .any(|label| label.as_str().chars().count() > 1 && label.tail_char() == c);
    let from_title = section_title
        .filter(|t| t.chars().count() > 1)
        .and_then(|t| t.chars().last())
        .map(|tail| tail == c)
        .unwrap_or(false);
    from_vocab || from_title
}

/// Strips generator artifacts from a section body: leaked label tail glyphs,
/// stray bare-label lines, and one-character echoes of the previous line's
/// last character.
pub fn clean_section_body(body: &str, section_title: Option<&str>) -> String {
    let mut cleaned: Vec<&str> = Vec::new();
    let mut prev_trimmed = String::new();
    let mut seen_content = false;

    for line in body.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            cleaned.push(line);
            prev_trimmed.clear();
            continue;
        }

        if !seen_content && is_leaked_label_tail(trimmed, section_title) {
            continue;
        }

        if let Some(label) = match_bare_label(trimmed) {
            prev_trimmed = label.as_str().to_string();
            continue;
        }

        if let Some(title) = match_subsection_header(trimmed) {
            if let Some(label) = SectionLabel::parse(title) {
                prev_trimmed = label.as_str().to_string();
                continue;
            }
        }

        if let Some(c) = is_single_char(trimmed) {
            if !prev_trimmed.is_empty() && prev_trimmed.ends_with(c) {
                continue;
            }
        }

        cleaned.push(line);
        prev_trimmed = trimmed.to_string();
        seen_content = true;
    }

    cleaned.join("\n").trim().to_string()
}

fn section_body(section_raw: &str) -> String {
    match section_raw.split_once('\n') {
        Some((_, rest)) => rest.trim().to_string(),
        None => String::new(),
    }
}

/// Recognized labels in order of first appearance within a day's raw text.
pub fn recognized_section_order(day_raw: &str) -> Vec<SectionLabel> {
    let mut order = Vec::new();
    for section in extract_subsections(day_raw) {
        if let Some(label) = SectionLabel::parse(&section.title) {
            if !order.contains(&label) {
                order.push(label);
            }
        }
    }
    order
}

/// Repairs possibly-malformed raw day text into the canonical layout:
/// header, preamble, one block per recognized section in effective order
/// (placeholder-filled when absent), then unrecognized sections verbatim.
/// Never fails; the worst case is the template-filled day. Idempotent.
pub fn sanitize_day_raw(raw: &str, day_num: u32) -> String {
    let normalized = normalize_day_raw(raw);
    let lines: Vec<&str> = normalized.split('\n').collect();

    let header_line = match lines.first() {
        Some(first) if first.starts_with("## Day ") => first.to_string(),
        _ => format!("## Day {}", day_num),
    };

    let mut preamble_lines: Vec<&str> = Vec::new();
    for line in lines.iter().skip(1) {
        if match_subsection_header(line).is_some() {
            break;
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() && match_bare_label(trimmed).is_none() {
            preamble_lines.push(*line);
        }
    }

    let sections = dedupe_subsections(extract_subsections(&normalized));

    let mut bodies: HashMap<SectionLabel, String> = HashMap::new();
    let mut extras: Vec<&Subsection> = Vec::new();
    for section in &sections {
        match SectionLabel::parse(&section.title) {
            Some(label) => {
                let cleaned = clean_section_body(&section_body(&section.raw), Some(&section.title));
                bodies.insert(label, cleaned);
            }
            None => extras.push(section),
        }
    }

    let order = recognized_section_order(&normalized);
    let effective_order: Vec<SectionLabel> = if order.is_empty() {
        SectionLabel::TEMPLATE_ORDER.to_vec()
    } else {
        order
    };

    let mut chunks: Vec<String> = vec![header_line];
    let preamble = preamble_lines.join("\n").trim_end().to_string();
    if !preamble.is_empty() {
        chunks.push(preamble);
    }

    for label in effective_order {
        let block = match bodies.get(&label).filter(|body| !body.is_empty()) {
            Some(body) => format!("### {}\n{}", label.as_str(), body),
            None => format!("### {}\n{}", label.as_str(), label.placeholder_line()),
        };
        chunks.push(block);
    }

    for section in extras {
        let cleaned = clean_section_body(&section_body(&section.raw), Some(&section.title));
        let block = if cleaned.is_empty() {
            format!("### {}", section.title)
        } else {
            format!("### {}\n{}", section.title, cleaned)
        };
        chunks.push(block);
    }

    chunks.join("\n\n").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_is_idempotent() {
        let raw = "## Day 1 - Markets\nA quick intro line.\nLunch\n- **Old market** street food stalls\nh\n### Morning\n- **River walk** move 10 min\n### Morning\n- **Castle hill** better view\n";
        let once = sanitize_day_raw(raw, 1);
        let twice = sanitize_day_raw(&once, 1);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_duplicate_section_keeps_last_body() {
        let raw = "## Day 2 - Food\n### Lunch\n- **First pick** noodles\n### Lunch\n- **Second pick** dumplings\n";
        let sanitized = sanitize_day_raw(raw, 2);
        assert_eq!(sanitized.matches("### Lunch").count(), 1);
        assert!(sanitized.contains("Second pick"));
        assert!(!sanitized.contains("First pick"));
    }

    #[test]
    fn test_bare_labels_become_headers() {
        let raw = "## Day 1 - Intro\nMorning\n- **Plaza** fountains\n";
        let sanitized = sanitize_day_raw(raw, 1);
        assert!(sanitized.contains("### Morning\n- **Plaza** fountains"));
    }

    #[test]
    fn test_leaked_tail_glyph_is_dropped_before_content_only() {
        let body = "h\n- **Cafe** espresso bar\nh";
        let cleaned = clean_section_body(body, Some("Lunch"));
        assert!(cleaned.starts_with("- **Cafe**"));
        // The later single-character line no longer precedes content but also
        // does not echo the previous line's tail, so it stays.
        assert!(cleaned.ends_with('h'));
    }

    #[test]
    fn test_previous_line_echo_is_dropped() {
        let body = "- Walk the old wall\nl";
        let cleaned = clean_section_body(body, None);
        assert_eq!(cleaned, "- Walk the old wall");
    }

    #[test]
    fn test_section_order_follows_the_source() {
        let sanitized = sanitize_day_raw("## Day 3 - Short day\n### Dinner\n- **Bistro** book ahead\n", 3);
        let dinner_pos = sanitized.find("### Dinner").expect("dinner kept");
        // Dinner was the only recognized section, so it defines the order.
        assert_eq!(sanitized.matches("###").count(), 1);
        assert!(sanitized[dinner_pos..].contains("Bistro"));
    }

    #[test]
    fn test_empty_day_falls_back_to_template() {
        let sanitized = sanitize_day_raw("", 4);
        assert!(sanitized.starts_with("## Day 4"));
        for label in SectionLabel::TEMPLATE_ORDER {
            assert!(sanitized.contains(&format!("### {}", label.as_str())));
        }
        assert!(sanitized.contains("- Add a meal here"));
        assert!(sanitized.contains("- Add a place here"));
    }

    #[test]
    fn test_unrecognized_sections_pass_through_after_known_ones() {
        let raw = "## Day 1 - Mixed\n### Notes\n- bring an umbrella\n### Morning\n- **Garden** open early\n";
        let sanitized = sanitize_day_raw(raw, 1);
        let morning = sanitized.find("### Morning").expect("morning");
        let notes = sanitized.find("### Notes").expect("notes");
        assert!(morning < notes);
        assert!(sanitized.contains("bring an umbrella"));
    }
}
