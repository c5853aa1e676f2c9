use std::collections::HashMap;
use std::env;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::models::geo::{GeoLookupResponse, LookupItem, LookupResult};

const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = "smart-trip-planner/1.0";
const REQUEST_TIMEOUT_SECS: u64 = 10;
/// Hard cap on names geocoded per request.
pub const MAX_LOOKUP_ITEMS: usize = 20;
// Upper bound on memoized queries; old entries are evicted wholesale rather
// than leaking memory for the life of the process.
const CACHE_CAPACITY: usize = 4096;

#[derive(Debug, Deserialize)]
struct GoogleGeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleGeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeResult {
    formatted_address: Option<String>,
    geometry: Option<GoogleGeometry>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: Option<GoogleLocation>,
}

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

/// Bounded memo of resolved queries, keyed by lowercased query text.
struct QueryCache {
    entries: Mutex<HashMap<String, LookupResult>>,
}

impl QueryCache {
    fn new() -> QueryCache {
        QueryCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn get(&self, key: &str) -> Option<LookupResult> {
        self.entries.lock().expect("geocode cache lock").get(key).cloned()
    }

    fn put(&self, key: String, value: LookupResult) {
        let mut entries = self.entries.lock().expect("geocode cache lock");
        if entries.len() >= CACHE_CAPACITY {
            entries.clear();
        }
        entries.insert(key, value);
    }
}

/// Batch place-name lookup: Google Geocoding when a key is configured, with
/// Nominatim as the fallback provider, memoized per process.
pub struct GeocodingService {
    http: Client,
    api_key: Option<String>,
    cache: QueryCache,
}

impl GeocodingService {
    pub fn from_env() -> GeocodingService {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        GeocodingService {
            http,
            api_key: env::var("GOOGLE_MAPS_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            cache: QueryCache::new(),
        }
    }

    pub fn provider(&self) -> &'static str {
        if self.api_key.is_some() {
            "google"
        } else {
            "nominatim"
        }
    }

    fn build_query(name: &str, city: &str, country: &str) -> String {
        [name, city, country]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn try_google(&self, query: &str) -> Option<LookupResult> {
        let key = self.api_key.as_ref()?;
        let mut url = Url::parse(GOOGLE_GEOCODE_URL).ok()?;
        url.query_pairs_mut()
            .append_pair("address", query)
            .append_pair("key", key)
            .append_pair("language", "en");

        let response = self.http.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body: GoogleGeocodeResponse = response.json().await.ok()?;
        if body.status != "OK" && body.status != "ZERO_RESULTS" {
            return None;
        }

        let first = body.results.into_iter().next()?;
        let location = first.geometry.as_ref()?.location.as_ref()?;
        let (lat, lon) = (location.lat?, location.lng?);
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        Some(LookupResult {
            query: query.to_string(),
            found: true,
            lat: Some(lat),
            lon: Some(lon),
            address: first.formatted_address,
            name: None,
            day_num: None,
            order: None,
            section: None,
        })
    }

    async fn try_nominatim(&self, query: &str) -> Option<LookupResult> {
        let mut url = Url::parse(NOMINATIM_URL).ok()?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "jsonv2")
            .append_pair("limit", "1")
            .append_pair("addressdetails", "0");

        let response = self
            .http
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept-Language", "en")
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body: Vec<NominatimResult> = response.json().await.ok()?;
        let first = body.into_iter().next()?;
        let lat: f64 = first.lat.parse().ok()?;
        let lon: f64 = first.lon.parse().ok()?;
        Some(LookupResult {
            query: query.to_string(),
            found: true,
            lat: Some(lat),
            lon: Some(lon),
            address: Some(first.display_name),
            name: None,
            day_num: None,
            order: None,
            section: None,
        })
    }

    async fn resolve(&self, query: &str) -> Option<LookupResult> {
        if let Some(result) = self.try_google(query).await {
            return Some(result);
        }
        self.try_nominatim(query).await
    }

    /// Resolves up to `MAX_LOOKUP_ITEMS` items, preferring the full
    /// "name city country" query and falling back to the bare name. When
    /// nothing at all resolves, a single city-centroid lookup is attempted.
    pub async fn lookup(
        &self,
        items: &[LookupItem],
        city: &str,
        country: &str,
    ) -> GeoLookupResponse {
        let mut results: Vec<LookupResult> = Vec::new();

        for item in items.iter().take(MAX_LOOKUP_ITEMS) {
            let query = Self::build_query(&item.name, city, country);
            let cache_key = query.to_lowercase();

            let mut result = match self.cache.get(&cache_key) {
                Some(cached) => cached,
                None => {
                    let resolved = match self.resolve(&query).await {
                        Some(found) => found,
                        None => match self.resolve(&item.name).await {
                            Some(found) => found,
                            None => LookupResult::not_found(item.name.clone()),
                        },
                    };
                    self.cache.put(cache_key, resolved.clone());
                    resolved
                }
            };

            result.name = Some(item.name.clone());
            result.day_num = item.day_num;
            result.order = item.order;
            result.section = item.section.clone();
            results.push(result);
        }

        let not_found = results.iter().filter(|r| !r.found).count();
        let fallback = if !results.is_empty() && not_found == results.len() {
            let city_query = Self::build_query("", city, country);
            if city_query.is_empty() {
                None
            } else {
                self.resolve(&city_query).await.map(|mut found| {
                    found.query = if city.is_empty() {
                        country.to_string()
                    } else {
                        city.to_string()
                    };
                    found
                })
            }
        } else {
            None
        };

        GeoLookupResponse {
            provider: self.provider().to_string(),
            checked: results.len(),
            not_found,
            results,
            fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_skips_empty_parts() {
        assert_eq!(
            GeocodingService::build_query("Fort", "Porto", "Portugal"),
            "Fort Porto Portugal"
        );
        assert_eq!(GeocodingService::build_query("Fort", "", ""), "Fort");
    }

    #[test]
    fn test_cache_eviction_at_capacity() {
        let cache = QueryCache::new();
        for i in 0..CACHE_CAPACITY {
            cache.put(format!("q{}", i), LookupResult::not_found("x"));
        }
        assert!(cache.get("q0").is_some());
        cache.put("overflow".to_string(), LookupResult::not_found("x"));
        assert!(cache.get("overflow").is_some());
        assert!(cache.get("q0").is_none());
    }
}
