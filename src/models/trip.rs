use serde::{Deserialize, Serialize};

pub const MIN_NIGHTS: u32 = 1;
pub const MAX_NIGHTS: u32 = 14;

/// The style choices the trip form offers. Styles travel as free strings so
/// stored documents keep working if the list grows.
pub const TRAVEL_STYLES: [&str; 8] = [
    "culture-history",
    "food-dining",
    "nature-outdoors",
    "shopping-lifestyle",
    "relaxation",
    "beach",
    "adventure",
    "photo-spots",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetMode {
    Budget,
    #[default]
    Standard,
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CompanionType {
    Solo,
    Couple,
    #[default]
    Friends,
    Family,
    WithChildren,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaceMode {
    Relaxed,
    #[default]
    Standard,
    Packed,
}

impl PaceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaceMode::Relaxed => "relaxed",
            PaceMode::Standard => "standard",
            PaceMode::Packed => "packed",
        }
    }
}

impl BudgetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetMode::Budget => "budget",
            BudgetMode::Standard => "standard",
            BudgetMode::Premium => "premium",
        }
    }
}

impl CompanionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanionType::Solo => "solo",
            CompanionType::Couple => "couple",
            CompanionType::Friends => "friends",
            CompanionType::Family => "family",
            CompanionType::WithChildren => "with children",
        }
    }
}

fn default_day_start_hour() -> u8 {
    9
}

fn default_day_end_hour() -> u8 {
    21
}

/// Immutable per generation; persisted unchanged next to the markdown. Only
/// `nights` is ever recomputed, when a day is added or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripParameters {
    pub country: String,
    pub city: String,
    pub nights: u32,
    #[serde(default)]
    pub travel_styles: Vec<String>,
    #[serde(default)]
    pub budget_mode: BudgetMode,
    #[serde(default)]
    pub companion_type: CompanionType,
    #[serde(default)]
    pub pace: PaceMode,
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: u8,
    #[serde(default = "default_day_end_hour")]
    pub day_end_hour: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl TripParameters {
    /// Deduplicated styles in their submitted order.
    pub fn styles(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.travel_styles
            .iter()
            .map(String::as_str)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    pub fn has_style(&self, style: &str) -> bool {
        self.travel_styles.iter().any(|s| s == style)
    }

    pub fn days(&self) -> u32 {
        self.nights + 1
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.country.trim().is_empty() || self.city.trim().is_empty() {
            return Err("Please provide both a country and a city.".to_string());
        }
        if self.nights < MIN_NIGHTS || self.nights > MAX_NIGHTS {
            return Err(format!(
                "Nights must be between {} and {}.",
                MIN_NIGHTS, MAX_NIGHTS
            ));
        }
        if self.day_end_hour <= self.day_start_hour {
            return Err("The day must end after it starts.".to_string());
        }
        if self.day_start_hour > 23 || self.day_end_hour > 24 {
            return Err("Day hours must fall within a single day.".to_string());
        }
        Ok(())
    }

    /// Valid day numbers for a targeted regeneration: 1..=nights+1.
    pub fn validate_day_number(&self, day_number: u32) -> Result<(), String> {
        if day_number < 1 || day_number > self.days() {
            return Err(format!(
                "Day number must be between 1 and {}.",
                self.days()
            ));
        }
        Ok(())
    }
}
