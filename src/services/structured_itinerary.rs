use serde_json::Value;

use crate::models::itinerary::structured::{Activity, DayPlan, ItineraryResponse};
use crate::services::markdown::vocab::SectionLabel;

pub const MIN_STAY_MINUTES: f64 = 30.0;
pub const MAX_STAY_MINUTES: f64 = 240.0;
pub const MAX_MOVE_MINUTES: f64 = 180.0;

/// Activity types containing any of these (case-insensitive) are bucketed
/// into the meal sections.
const MEAL_KEYWORDS: [&str; 4] = ["meal", "food", "restaurant", "dining"];

pub fn is_meal_type(activity_type: &str) -> bool {
    let lowered = activity_type.to_lowercase();
    MEAL_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.round().max(min).min(max)
}

/// Rounds and clamps the time fields and drops non-finite coordinates.
pub fn sanitize_activity(activity: Activity) -> Activity {
    Activity {
        name: activity.name.trim().to_string(),
        r#type: activity.r#type.trim().to_string(),
        stay_minutes: clamp(activity.stay_minutes, MIN_STAY_MINUTES, MAX_STAY_MINUTES),
        move_minutes_to_next: clamp(activity.move_minutes_to_next, 0.0, MAX_MOVE_MINUTES),
        lat: activity.lat.filter(|v| v.is_finite()),
        lng: activity.lng.filter(|v| v.is_finite()),
    }
}

fn sanitize_day(day: DayPlan) -> DayPlan {
    let count = day.activities.len();
    let activities = day
        .activities
        .into_iter()
        .enumerate()
        .map(|(idx, activity)| {
            let mut sanitized = sanitize_activity(activity);
            if idx + 1 == count {
                // There is nowhere to move after the final stop of a day.
                sanitized.move_minutes_to_next = 0.0;
            }
            sanitized
        })
        .collect();
    DayPlan {
        day: day.day,
        theme: day.theme,
        activities,
    }
}

fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn valid_activity(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let name_ok = obj
        .get("name")
        .and_then(Value::as_str)
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false);
    let type_ok = obj
        .get("type")
        .and_then(Value::as_str)
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false);
    let stay_ok = obj.get("stayMinutes").and_then(finite_number).is_some();
    let move_ok = obj.get("moveMinutesToNext").and_then(finite_number).is_some();
    name_ok && type_ok && stay_ok && move_ok
}

fn valid_day(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let day_ok = obj.get("day").map(|v| v.is_i64() || v.is_u64()).unwrap_or(false);
    let theme_ok = obj.get("theme").map(Value::is_string).unwrap_or(false);
    let activities_ok = obj
        .get("activities")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().all(valid_activity))
        .unwrap_or(false);
    day_ok && theme_ok && activities_ok
}

/// Strict, all-or-nothing parse of the structured generation payload. Any
/// structural violation anywhere invalidates the whole response; a half
/// valid payload never yields a partial itinerary.
pub fn parse_itinerary_response(raw: &str) -> Option<ItineraryResponse> {
    let value: Value = serde_json::from_str(raw.trim()).ok()?;
    let days = value.as_object()?.get("days")?.as_array()?;
    if !days.iter().all(valid_day) {
        return None;
    }

    let parsed: ItineraryResponse = serde_json::from_value(value).ok()?;
    Some(ItineraryResponse {
        days: parsed.days.into_iter().map(sanitize_day).collect(),
    })
}

/// Strips a ```json fence if the model wrapped its output in one.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn activity_line(activity: &Activity) -> String {
    let mut line = format!(
        "- **{}** {} \u{00B7} stay {} min",
        activity.name, activity.r#type, activity.stay_minutes as i64
    );
    if activity.move_minutes_to_next > 0.0 {
        line.push_str(&format!(
            " \u{00B7} move {} min",
            activity.move_minutes_to_next as i64
        ));
    }
    line
}

/// Deterministic projection from the typed structure to the shared markdown
/// shape: meal-typed activities alternate Lunch then Dinner; everything else
/// round-robins Morning, Afternoon, Night in input order. Night is emitted
/// only when it received an activity.
pub fn build_markdown_from_itinerary(itinerary: &ItineraryResponse) -> String {
    let mut days = itinerary.days.clone();
    days.sort_by_key(|d| d.day);

    let mut blocks: Vec<String> = Vec::new();
    for day in &days {
        let title = if day.theme.trim().is_empty() {
            "Day plan"
        } else {
            day.theme.trim()
        };

        let mut meal_slots = [Vec::new(), Vec::new()]; // lunch, dinner
        let mut place_slots = [Vec::new(), Vec::new(), Vec::new()]; // morning, afternoon, night
        let mut meal_idx = 0usize;
        let mut place_idx = 0usize;
        for activity in &day.activities {
            if is_meal_type(&activity.r#type) {
                meal_slots[meal_idx % 2].push(activity_line(activity));
                meal_idx += 1;
            } else {
                place_slots[place_idx % 3].push(activity_line(activity));
                place_idx += 1;
            }
        }

        let mut lines = vec![format!("## Day {} - {}", day.day, title)];
        let sections: [(SectionLabel, &Vec<String>); 5] = [
            (SectionLabel::Morning, &place_slots[0]),
            (SectionLabel::Lunch, &meal_slots[0]),
            (SectionLabel::Afternoon, &place_slots[1]),
            (SectionLabel::Dinner, &meal_slots[1]),
            (SectionLabel::Night, &place_slots[2]),
        ];
        for (label, items) in sections {
            if items.is_empty() {
                if label == SectionLabel::Night {
                    continue;
                }
                lines.push(format!("### {}", label.as_str()));
                lines.push(label.placeholder_line().to_string());
            } else {
                lines.push(format!("### {}", label.as_str()));
                lines.extend(items.iter().cloned());
            }
        }
        blocks.push(lines.join("\n"));
    }

    let mut out = blocks.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
