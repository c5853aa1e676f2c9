use serde::{Deserialize, Serialize};

/// One stop in a structured day. Minutes arrive as raw JSON numbers and are
/// clamped by `sanitize_activity` before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub name: String,
    pub r#type: String,
    pub stay_minutes: f64,
    pub move_minutes_to_next: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: i64,
    pub theme: String,
    pub activities: Vec<Activity>,
}

/// The strict JSON shape of the structured generation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryResponse {
    pub days: Vec<DayPlan>,
}
