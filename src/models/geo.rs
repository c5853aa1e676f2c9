use serde::{Deserialize, Serialize};

/// One place to geocode, with the day/section metadata needed to attach the
/// result back onto the itinerary map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_num: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub query: String,
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_num: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl LookupResult {
    pub fn not_found(query: impl Into<String>) -> LookupResult {
        LookupResult {
            query: query.into(),
            found: false,
            lat: None,
            lon: None,
            address: None,
            name: None,
            day_num: None,
            order: None,
            section: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLookupResponse {
    pub provider: String,
    pub checked: usize,
    pub not_found: usize,
    pub results: Vec<LookupResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<LookupResult>,
}
