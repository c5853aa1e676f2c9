use super::vocab::{day_header_re, match_subsection_header};

/// One day of the itinerary document: header, title and the raw markdown
/// span from the header line to the next day header (trailing whitespace
/// trimmed).
#[derive(Debug, Clone, PartialEq)]
pub struct DayBlock {
    pub day_num: u32,
    pub title: String,
    pub raw: String,
}

/// A labeled subsection within a day. `title` may be outside the fixed
/// vocabulary, in which case the block is passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Subsection {
    pub title: String,
    pub raw: String,
}

/// Byte range of a day inside the full document, for targeted replacement.
#[derive(Debug, Clone)]
pub struct DayRange {
    pub start: usize,
    pub end: usize,
    pub raw: String,
}

/// Scans the document for day headers and returns the day blocks in document
/// order. An itinerary without any recognizable day header yields an empty
/// vec; callers fall back to treating the document as unstructured prose.
pub fn extract_days(markdown: &str) -> Vec<DayBlock> {
    let mut days = Vec::new();
    let mut last: Option<(u32, String, usize)> = None;

    for caps in day_header_re().captures_iter(markdown) {
        let header = caps.get(0).expect("match");
        let day_num: u32 = match caps[1].parse() {
            Ok(n) => n,
            Err(_) => continue,
        };
        let title = caps[2].to_string();
        if let Some((num, title, start)) = last.take() {
            days.push(DayBlock {
                day_num: num,
                title,
                raw: markdown[start..header.start()].trim_end().to_string(),
            });
        }
        last = Some((day_num, title, header.start()));
    }

    if let Some((num, title, start)) = last {
        days.push(DayBlock {
            day_num: num,
            title,
            raw: markdown[start..].trim_end().to_string(),
        });
    }

    days
}

/// Splits a day's raw span into its `### ` subsections. Content before the
/// first subsection header (the preamble) is not returned here; the
/// sanitizer handles it separately.
pub fn extract_subsections(day_raw: &str) -> Vec<Subsection> {
    let lines: Vec<&str> = day_raw.split('\n').collect();
    let mut sections = Vec::new();
    let mut current: Option<(String, usize)> = None;

    for (i, line) in lines.iter().enumerate() {
        if let Some(title) = match_subsection_header(line) {
            if let Some((title, start)) = current.take() {
                sections.push(Subsection {
                    title,
                    raw: lines[start..i].join("\n").trim_end().to_string(),
                });
            }
            current = Some((title.to_string(), i));
        }
    }

    if let Some((title, start)) = current {
        sections.push(Subsection {
            title,
            raw: lines[start..].join("\n").trim_end().to_string(),
        });
    }

    sections
}

/// Locates a specific day's span by number. `None` means the day is absent
/// and the caller should treat the operation as a no-op, not a failure.
pub fn find_day_range(markdown: &str, day_num: u32) -> Option<DayRange> {
    let mut starts: Vec<(u32, usize)> = Vec::new();
    for caps in day_header_re().captures_iter(markdown) {
        if let Ok(n) = caps[1].parse::<u32>() {
            starts.push((n, caps.get(0).expect("match").start()));
        }
    }

    let idx = starts.iter().position(|(n, _)| *n == day_num)?;
    let start = starts[idx].1;
    let end = starts
        .get(idx + 1)
        .map(|(_, s)| *s)
        .unwrap_or(markdown.len());
    Some(DayRange {
        start,
        end,
        raw: markdown[start..end].trim_end().to_string(),
    })
}

/// The document as an explicit tree: any text before the first day header,
/// then the ordered day blocks. Mutation operations transform the tree and
/// serialize once; string layout rules live only in `serialize`.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    pub prefix: String,
    pub days: Vec<DayBlock>,
}

impl DocumentTree {
    pub fn parse(markdown: &str) -> DocumentTree {
        let prefix = match day_header_re().find(markdown) {
            Some(first) => markdown[..first.start()].trim_end().to_string(),
            None => markdown.trim_end().to_string(),
        };
        DocumentTree {
            prefix,
            days: extract_days(markdown),
        }
    }

    pub fn day_index(&self, day_num: u32) -> Option<usize> {
        self.days.iter().position(|d| d.day_num == day_num)
    }

    pub fn max_day_num(&self) -> u32 {
        self.days.iter().map(|d| d.day_num).max().unwrap_or(0)
    }

    /// Joins prefix and day blocks with exactly one blank line. Untouched
    /// day blocks keep their raw spans byte for byte.
    pub fn serialize(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.prefix.is_empty() {
            parts.push(&self.prefix);
        }
        for day in &self.days {
            parts.push(&day.raw);
        }
        parts.join("\n\n").trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Trip overview.\n\n## Day 1 - Arrival\n### Morning\n- **Harbor walk** easy start\n\n## Day 2 - Museums\n### Afternoon\n- **City museum** move 15 min\n";

    #[test]
    fn test_extract_days_in_document_order() {
        let days = extract_days(DOC);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day_num, 1);
        assert_eq!(days[0].title, "Arrival");
        assert!(days[0].raw.starts_with("## Day 1 - Arrival"));
        assert!(days[0].raw.ends_with("easy start"));
        assert_eq!(days[1].day_num, 2);
    }

    #[test]
    fn test_extract_days_without_headers_is_empty() {
        assert!(extract_days("Just some prose\nwith no days").is_empty());
    }

    #[test]
    fn test_extract_subsections_spans() {
        let days = extract_days(DOC);
        let sections = extract_subsections(&days[0].raw);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Morning");
        assert!(sections[0].raw.starts_with("### Morning"));
    }

    #[test]
    fn test_find_day_range_missing_day() {
        assert!(find_day_range(DOC, 5).is_none());
        let range = find_day_range(DOC, 2).expect("day 2");
        assert!(range.raw.starts_with("## Day 2 - Museums"));
        assert_eq!(range.end, DOC.len());
    }

    #[test]
    fn test_tree_keeps_prefix_and_day_spans() {
        let tree = DocumentTree::parse(DOC);
        assert_eq!(tree.prefix, "Trip overview.");
        assert_eq!(tree.days.len(), 2);
        let out = tree.serialize();
        assert!(out.starts_with("Trip overview.\n\n## Day 1"));
        assert!(!out.ends_with('\n'));
    }
}
