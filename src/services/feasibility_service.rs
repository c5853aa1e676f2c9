use serde::Serialize;

use crate::models::itinerary::structured::DayPlan;
use crate::services::markdown::places::move_annotation_re;

// Text-heuristic thresholds for a markdown day.
const PACKED_ITEM_COUNT: usize = 12;
const HEAVY_TRANSIT_MINUTES: u32 = 180;
const DENSE_SECTION_COUNT: usize = 6;
const DENSE_ITEM_COUNT: usize = 10;
const MISSING_MOVE_HINTS: usize = 3;

// Typed thresholds for the structured path.
const MAX_DAY_MINUTES: u32 = 720;
const MAX_MOVE_MINUTES: u32 = 240;
const MAX_MOVE_RATIO: f64 = 0.4;
const PACKED_ACTIVITY_COUNT: usize = 10;

/// Heuristic read of one day's markdown. Counts patterns only; it knows
/// nothing about real travel times.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAnalysis {
    pub move_minutes: u32,
    pub item_count: usize,
    pub warnings: Vec<String>,
}

pub fn analyze_day(raw: &str) -> DayAnalysis {
    let mut move_minutes: u32 = 0;
    let mut move_hints = 0usize;
    for caps in move_annotation_re().captures_iter(raw) {
        move_hints += 1;
        move_minutes += caps[1].parse::<u32>().unwrap_or(0);
    }

    let item_count = raw
        .split('\n')
        .filter(|line| line.starts_with("- "))
        .count();
    let section_count = raw
        .split('\n')
        .filter(|line| line.starts_with("### "))
        .count();
    let missing_move_hints = item_count.saturating_sub(move_hints);

    let mut warnings = Vec::new();
    if item_count >= PACKED_ITEM_COUNT {
        warnings.push("Too many stops; this day may be packed.".to_string());
    }
    if move_minutes >= HEAVY_TRANSIT_MINUTES {
        warnings.push("Total transit time is high for one day.".to_string());
    }
    if section_count >= DENSE_SECTION_COUNT && item_count >= DENSE_ITEM_COUNT {
        warnings.push("Too many sections for the day's volume.".to_string());
    }
    if missing_move_hints >= MISSING_MOVE_HINTS {
        warnings.push("Not enough move-time annotations to judge feasibility.".to_string());
    }

    DayAnalysis {
        move_minutes,
        item_count,
        warnings,
    }
}

/// Typed totals for a structured day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDayAnalysis {
    pub total_stay: u32,
    pub total_move: u32,
    pub total_minutes: u32,
    pub move_ratio: f64,
    pub warnings: Vec<String>,
}

pub fn day_time_totals(day: &DayPlan) -> (u32, u32, u32, f64) {
    let total_stay: u32 = day.activities.iter().map(|a| a.stay_minutes.round() as u32).sum();
    let total_move: u32 = day
        .activities
        .iter()
        .map(|a| a.move_minutes_to_next.round() as u32)
        .sum();
    let total_minutes = total_stay + total_move;
    let move_ratio = if total_minutes > 0 {
        f64::from(total_move) / f64::from(total_minutes)
    } else {
        0.0
    };
    (total_stay, total_move, total_minutes, move_ratio)
}

pub fn analyze_structured_day(day: &DayPlan) -> StructuredDayAnalysis {
    let (total_stay, total_move, total_minutes, move_ratio) = day_time_totals(day);

    let mut warnings = Vec::new();
    if total_minutes > MAX_DAY_MINUTES {
        warnings.push("The day exceeds 12 hours in total.".to_string());
    }
    if total_move > MAX_MOVE_MINUTES {
        warnings.push("Daily transit time is excessive.".to_string());
    }
    if total_minutes > 0 && move_ratio > MAX_MOVE_RATIO {
        warnings.push("A high share of the day is spent in transit.".to_string());
    }
    if day.activities.len() >= PACKED_ACTIVITY_COUNT {
        warnings.push("The activity count makes this day packed.".to_string());
    }

    StructuredDayAnalysis {
        total_stay,
        total_move,
        total_minutes,
        move_ratio,
        warnings,
    }
}
