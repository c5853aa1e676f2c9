use std::sync::OnceLock;

use regex::Regex;

/// Day header line, e.g. `## Day 3 - Old town and night market`.
/// The separator accepts an ASCII hyphen, en dash, em dash or middle dot.
/// This pattern must stay bit-compatible with already-stored documents.
pub const DAY_HEADER_PATTERN: &str =
    r"(?m)^## Day (\d+)\s*(?:-|\u{2013}|\u{2014}|\u{00B7})\s*(.+)$";

const DAY_HEADER_PREFIX_PATTERN: &str =
    r"^## Day \d+\s*(?:-|\u{2013}|\u{2014}|\u{00B7})\s*[^\n]+\n?";

pub fn day_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DAY_HEADER_PATTERN).expect("day header pattern"))
}

/// Matches a full day-header line at the start of a block, for stripping.
pub fn day_header_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DAY_HEADER_PREFIX_PATTERN).expect("day header prefix pattern"))
}

/// Loose variant used when a generated block smuggles in a day header that
/// does not follow the strict separator format.
pub fn loose_day_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^##\s*Day\s*\d+.*?\n").expect("loose day header pattern"))
}

/// The fixed time-of-day vocabulary. Night is the optional tail section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionLabel {
    Morning,
    Lunch,
    Afternoon,
    Dinner,
    Night,
}

impl SectionLabel {
    pub const ALL: [SectionLabel; 5] = [
        SectionLabel::Morning,
        SectionLabel::Lunch,
        SectionLabel::Afternoon,
        SectionLabel::Dinner,
        SectionLabel::Night,
    ];

    /// Canonical template order for a rebuilt day. Night is omitted unless
    /// the source day already carried one.
    pub const TEMPLATE_ORDER: [SectionLabel; 4] = [
        SectionLabel::Morning,
        SectionLabel::Lunch,
        SectionLabel::Afternoon,
        SectionLabel::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionLabel::Morning => "Morning",
            SectionLabel::Lunch => "Lunch",
            SectionLabel::Afternoon => "Afternoon",
            SectionLabel::Dinner => "Dinner",
            SectionLabel::Night => "Night",
        }
    }

    /// Case-insensitive lookup of a label by its title text.
    pub fn parse(title: &str) -> Option<SectionLabel> {
        let trimmed = title.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(trimmed))
    }

    pub fn is_meal(&self) -> bool {
        matches!(self, SectionLabel::Lunch | SectionLabel::Dinner)
    }

    /// Body line used when a recognized section is missing from a day.
    pub fn placeholder_line(&self) -> &'static str {
        if self.is_meal() {
            "- Add a meal here"
        } else {
            "- Add a place here"
        }
    }

    /// Last character of the label text. Some generated output leaks this
    /// glyph as a stray one-character line at the top of the section body.
    pub fn tail_char(&self) -> char {
        self.as_str().chars().last().unwrap_or(' ')
    }
}

/// A line consisting of exactly a vocabulary label, optionally with trailing
/// `:`/dash punctuation the generator sometimes appends.
pub fn match_bare_label(line: &str) -> Option<SectionLabel> {
    let trimmed = line.trim();
    let stripped = trimmed.trim_end_matches([':', '：', '-', '\u{2013}', '\u{2014}']);
    let stripped = stripped.trim();
    if stripped.is_empty() {
        return None;
    }
    SectionLabel::parse(stripped)
}

/// Title text of a `### ` subsection header line, if the line is one.
pub fn match_subsection_header(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed.strip_prefix("### ").map(str::trim)
}

/// Bullet marker opening a list item. The generator mostly emits `- ` but
/// `*` and `\u{2022}` show up often enough to accept.
pub fn list_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-*\u{2022}]\s+").expect("list item pattern"))
}
