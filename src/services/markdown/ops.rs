use std::sync::OnceLock;

use regex::Regex;

use super::extract::{extract_days, DocumentTree};
use super::sanitize::{
    dedupe_subsections, empty_day_template, normalize_day_raw, sanitize_day_raw,
};
use super::vocab::{
    day_header_prefix_re, day_header_re, loose_day_header_re, match_bare_label,
    match_subsection_header, SectionLabel,
};

fn blank_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("blank run pattern"))
}

fn finish(document: String) -> String {
    blank_run_re()
        .replace_all(&document, "\n\n")
        .trim_end()
        .to_string()
}

/// Removes a leading day-header line from a block, leaving just the body.
pub fn strip_day_header(block: &str) -> String {
    day_header_prefix_re().replace(block, "").trim().to_string()
}

fn titles_match(a: &str, b: &str) -> bool {
    match (SectionLabel::parse(a), SectionLabel::parse(b)) {
        (Some(la), Some(lb)) => la == lb,
        (None, None) => a == b,
        _ => false,
    }
}

/// Replaces day `day_num` with `new_block`, keeping the existing header line
/// (title included) and stripping any duplicate header from the block body.
/// Returns the input unchanged when the day is absent.
pub fn replace_day(markdown: &str, day_num: u32, new_block: &str) -> String {
    let mut tree = DocumentTree::parse(markdown);
    let Some(idx) = tree.day_index(day_num) else {
        return markdown.to_string();
    };

    let header = tree.days[idx]
        .raw
        .lines()
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| format!("## Day {}", day_num));
    let new_body = day_header_prefix_re()
        .replace(new_block, "")
        .trim()
        .to_string();

    tree.days[idx].raw = format!("{}\n{}", header, new_body).trim_end().to_string();
    finish(tree.serialize())
}

/// Same splice as `replace_day` but the caller's block is taken as-is; used
/// when the replacement is already a well-formed whole-day block.
pub fn replace_day_raw(markdown: &str, day_num: u32, new_block: &str) -> String {
    let mut tree = DocumentTree::parse(markdown);
    let Some(idx) = tree.day_index(day_num) else {
        return markdown.to_string();
    };

    tree.days[idx].raw = new_block.trim_end().to_string();
    finish(tree.serialize())
}

/// Reduces a generated section block to `### {title}` plus the body lines
/// that belong to that section, dropping any smuggled day header or sibling
/// sections.
pub fn normalize_section_block(block: &str, section_title: &str) -> String {
    let canonical_title = SectionLabel::parse(section_title)
        .map(|label| label.as_str().to_string())
        .unwrap_or_else(|| section_title.to_string());

    let normalized = block.replace("\r\n", "\n");
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return format!("### {}", canonical_title);
    }

    let without_day_header = loose_day_header_re().replace(normalized, "");
    let without_day_header = without_day_header.trim();
    let lines: Vec<&str> = without_day_header.split('\n').collect();

    let section_line_title = |line: &str| -> Option<String> {
        if let Some(title) = match_subsection_header(line) {
            return Some(title.to_string());
        }
        match_bare_label(line).map(|label| label.as_str().to_string())
    };

    let start_idx = lines
        .iter()
        .position(|line| {
            section_line_title(line)
                .map(|t| titles_match(&t, section_title))
                .unwrap_or(false)
        })
        .unwrap_or(0);

    let mut body_lines: Vec<&str> = Vec::new();
    for (i, line) in lines.iter().enumerate().skip(start_idx) {
        match section_line_title(line) {
            Some(title) if i == start_idx && titles_match(&title, section_title) => continue,
            Some(title) if i != start_idx && !titles_match(&title, section_title) => break,
            _ => body_lines.push(*line),
        }
    }

    let body = body_lines.join("\n").trim().to_string();
    if body.is_empty() {
        format!("### {}", canonical_title)
    } else {
        format!("### {}\n{}", canonical_title, body)
    }
}

/// Replaces (or appends) one section within a day, then re-sanitizes the day
/// and splices it back. No-op when the day is missing or has no subsections.
pub fn replace_section(
    markdown: &str,
    day_num: u32,
    section_title: &str,
    new_section_block: &str,
) -> String {
    let days = extract_days(markdown);
    let Some(day) = days.iter().find(|d| d.day_num == day_num) else {
        return markdown.to_string();
    };

    let normalized = normalize_day_raw(&day.raw);
    let lines: Vec<&str> = normalized.split('\n').collect();
    let header = lines
        .first()
        .map(|l| l.to_string())
        .unwrap_or_else(|| format!("## Day {}", day_num));

    let mut preamble_lines: Vec<&str> = Vec::new();
    for line in lines.iter().skip(1) {
        if match_subsection_header(line).is_some() {
            break;
        }
        preamble_lines.push(*line);
    }

    let sections = dedupe_subsections(super::extract::extract_subsections(&normalized));
    if sections.is_empty() {
        return markdown.to_string();
    }

    let normalized_section = normalize_section_block(new_section_block, section_title);

    let mut replaced = false;
    let mut next_sections: Vec<String> = sections
        .iter()
        .map(|s| {
            if titles_match(&s.title, section_title) {
                replaced = true;
                normalized_section.clone()
            } else {
                s.raw.clone()
            }
        })
        .collect();
    if !replaced {
        next_sections.push(normalized_section);
    }

    let mut chunks: Vec<String> = vec![header];
    let preamble = preamble_lines.join("\n").trim_end().to_string();
    if !preamble.is_empty() {
        chunks.push(preamble);
    }
    chunks.extend(next_sections);

    let rebuilt = chunks.join("\n\n").trim_end().to_string();
    let sanitized = sanitize_day_raw(&rebuilt, day_num);
    replace_day(markdown, day_num, &sanitized)
}

/// Appends a fresh template day numbered max existing + 1. The caller
/// recomputes nights as day count - 1 afterwards.
pub fn append_day(markdown: &str) -> String {
    let next_num = DocumentTree::parse(markdown).max_day_num() + 1;
    let block = format!("## Day {} - New day\n{}", next_num, empty_day_template());
    format!("{}\n\n{}\n", markdown.trim_end(), block)
}

/// "Removes" a day by resetting it to the empty template, keeping its number
/// and title in place. Use `rebuild_sequential` for physical removal.
pub fn clear_day(markdown: &str, day_num: u32) -> String {
    let days = extract_days(markdown);
    let Some(day) = days.iter().find(|d| d.day_num == day_num) else {
        return markdown.to_string();
    };

    let block = format!("## Day {} - {}\n{}", day_num, day.title, empty_day_template());
    let sanitized = sanitize_day_raw(&block, day_num);
    replace_day_raw(markdown, day_num, &sanitized)
}

/// Drops the named day (when given) and renumbers the rest 1..N with no
/// gaps, keeping titles in their original relative order and reattaching any
/// text that preceded the first day header.
pub fn rebuild_sequential(markdown: &str, remove_day_num: Option<u32>) -> String {
    let mut days = extract_days(markdown);
    if let Some(remove) = remove_day_num {
        days.retain(|d| d.day_num != remove);
    }
    days.sort_by_key(|d| d.day_num);

    let prefix = match day_header_re().find(markdown) {
        Some(first) => markdown[..first.start()].trim_end().to_string(),
        None => String::new(),
    };

    let rebuilt: Vec<String> = days
        .iter()
        .enumerate()
        .map(|(idx, day)| {
            format!("## Day {} - {}\n{}", idx + 1, day.title, strip_day_header(&day.raw))
                .trim_end()
                .to_string()
        })
        .collect();

    if rebuilt.is_empty() {
        return prefix;
    }
    if prefix.is_empty() {
        format!("{}\n", rebuilt.join("\n\n"))
    } else {
        format!("{}\n\n{}\n", prefix, rebuilt.join("\n\n"))
    }
}

/// Appends a `### Notes` subsection to the day; embedded newlines in the
/// note collapse into one " / "-joined line. No-op on a missing day or an
/// empty note.
pub fn append_note(markdown: &str, day_num: u32, note: &str) -> String {
    let clean = note.trim();
    if clean.is_empty() {
        return markdown.to_string();
    }

    let mut tree = DocumentTree::parse(markdown);
    let Some(idx) = tree.day_index(day_num) else {
        return markdown.to_string();
    };

    let raw = tree.days[idx].raw.clone();
    let (header, body) = raw
        .split_once('\n')
        .map(|(h, b)| (h.to_string(), b.to_string()))
        .unwrap_or_else(|| (raw.clone(), String::new()));

    let note_line = clean
        .split('\n')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" / ");

    let next_body = format!("{}\n\n### Notes\n- {}", body.trim_end(), note_line)
        .trim_end()
        .to_string();
    tree.days[idx].raw = format!("{}\n{}", header, next_body).trim_end().to_string();
    finish(tree.serialize())
}

/// Nights derived from the document: day count minus one, floored at zero.
pub fn nights_from_markdown(markdown: &str) -> u32 {
    (extract_days(markdown).len() as u32).saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_day_doc() -> String {
        [
            "## Day 1 - Arrival",
            "### Morning",
            "- **Harbor walk** easy start move 10 min",
            "",
            "## Day 2 - Museums",
            "### Afternoon",
            "- **City museum** move 15 min",
            "",
            "## Day 3 - Departure",
            "### Morning",
            "- **Last stroll** pack first",
        ]
        .join("\n")
    }

    #[test]
    fn test_replace_day_keeps_other_days_byte_identical() {
        let doc = three_day_doc();
        let before = extract_days(&doc);
        let updated = replace_day(&doc, 2, "## Day 2 - Museums\n### Morning\n- **New stop** fresh pick");
        let after = extract_days(&updated);
        assert_eq!(after.len(), 3);
        assert_eq!(before[0].raw, after[0].raw);
        assert_eq!(before[2].raw, after[2].raw);
        assert!(after[1].raw.contains("New stop"));
    }

    #[test]
    fn test_replace_day_missing_day_is_noop() {
        let doc = three_day_doc();
        assert_eq!(replace_day(&doc, 9, "## Day 9 - Ghost\n- nothing"), doc);
    }

    #[test]
    fn test_replace_day_strips_duplicate_header_and_keeps_title() {
        let doc = three_day_doc();
        let updated = replace_day(&doc, 1, "## Day 1 - Totally different title\n### Morning\n- **Swap**");
        let days = extract_days(&updated);
        // The existing header (and its title) wins over the block's header.
        assert_eq!(days[0].title, "Arrival");
        assert_eq!(updated.matches("## Day 1").count(), 1);
    }

    #[test]
    fn test_replace_section_swaps_only_that_body() {
        let doc = three_day_doc();
        let updated = replace_section(&doc, 2, "Afternoon", "### Afternoon\n- **Sculpture park** move 5 min");
        assert!(updated.contains("Sculpture park"));
        assert!(!updated.contains("City museum"));
        assert!(updated.contains("Harbor walk"));
    }

    #[test]
    fn test_replace_section_appends_when_absent() {
        let doc = three_day_doc();
        let updated = replace_section(&doc, 3, "Dinner", "- **Pier bistro** sunset table");
        let day3 = extract_days(&updated).into_iter().find(|d| d.day_num == 3).expect("day 3");
        assert!(day3.raw.contains("### Dinner"));
        assert!(day3.raw.contains("Pier bistro"));
    }

    #[test]
    fn test_normalize_section_block_drops_siblings_and_day_header() {
        let block = "## Day 2 - sneaky\n### Lunch\n- **Soup place**\n### Dinner\n- **Grill**";
        let normalized = normalize_section_block(block, "Lunch");
        assert_eq!(normalized, "### Lunch\n- **Soup place**");
    }

    #[test]
    fn test_append_day_numbers_past_the_max() {
        let doc = three_day_doc();
        let updated = append_day(&doc);
        let days = extract_days(&updated);
        assert_eq!(days.len(), 4);
        assert_eq!(days[3].day_num, 4);
        assert_eq!(days[3].title, "New day");
        assert_eq!(nights_from_markdown(&updated), 3);
    }

    #[test]
    fn test_clear_day_keeps_title_and_position() {
        let doc = three_day_doc();
        let updated = clear_day(&doc, 2);
        let days = extract_days(&updated);
        assert_eq!(days.len(), 3);
        assert_eq!(days[1].title, "Museums");
        assert!(days[1].raw.contains("- Add a place here"));
        assert!(!updated.contains("City museum"));
    }

    #[test]
    fn test_rebuild_sequential_renumbers_without_gaps() {
        let doc = format!("Plan your trip.\n\n{}", three_day_doc());
        let rebuilt = rebuild_sequential(&doc, Some(2));
        let days = extract_days(&rebuilt);
        assert_eq!(days.iter().map(|d| d.day_num).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(days[0].title, "Arrival");
        assert_eq!(days[1].title, "Departure");
        assert!(rebuilt.starts_with("Plan your trip."));
        assert!(rebuilt.ends_with('\n'));
    }

    #[test]
    fn test_append_note_collapses_newlines() {
        let doc = three_day_doc();
        let updated = append_note(&doc, 1, "Book dinner\nBring a jacket\n");
        let day1 = extract_days(&updated).remove(0);
        assert!(day1.raw.contains("### Notes\n- Book dinner / Bring a jacket"));
    }

    #[test]
    fn test_append_note_empty_is_noop() {
        let doc = three_day_doc();
        assert_eq!(append_note(&doc, 1, "   \n "), doc);
        assert_eq!(append_note(&doc, 7, "note"), doc);
    }
}
