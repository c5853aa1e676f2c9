use serde::Serialize;

use crate::models::trip::{BudgetMode, CompanionType, PaceMode, TripParameters};

/// Per-person daily spend range in KRW.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct BudgetRange {
    pub min: i64,
    pub max: i64,
}

impl BudgetRange {
    const fn new(min: i64, max: i64) -> BudgetRange {
        BudgetRange { min, max }
    }

    fn scaled(&self, multiplier: f64) -> BudgetRange {
        BudgetRange {
            min: (self.min as f64 * multiplier).round() as i64,
            max: (self.max as f64 * multiplier).round() as i64,
        }
    }

    fn plus(&self, other: &BudgetRange) -> BudgetRange {
        BudgetRange {
            min: self.min + other.min,
            max: self.max + other.max,
        }
    }

    fn times(&self, factor: i64) -> BudgetRange {
        BudgetRange {
            min: self.min * factor,
            max: self.max * factor,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCategories {
    pub lodging: BudgetRange,
    pub food: BudgetRange,
    pub transport: BudgetRange,
    pub activities: BudgetRange,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBreakdown {
    pub currency: &'static str,
    pub per_day: BudgetRange,
    pub total: BudgetRange,
    pub categories: BudgetCategories,
}

struct BaseRates {
    lodging: BudgetRange,
    food: BudgetRange,
    transport: BudgetRange,
    activities: BudgetRange,
}

fn base_rates(mode: BudgetMode) -> BaseRates {
    match mode {
        BudgetMode::Budget => BaseRates {
            lodging: BudgetRange::new(40_000, 90_000),
            food: BudgetRange::new(25_000, 60_000),
            transport: BudgetRange::new(10_000, 25_000),
            activities: BudgetRange::new(10_000, 30_000),
        },
        BudgetMode::Standard => BaseRates {
            lodging: BudgetRange::new(80_000, 160_000),
            food: BudgetRange::new(40_000, 90_000),
            transport: BudgetRange::new(15_000, 40_000),
            activities: BudgetRange::new(20_000, 60_000),
        },
        BudgetMode::Premium => BaseRates {
            lodging: BudgetRange::new(180_000, 350_000),
            food: BudgetRange::new(70_000, 150_000),
            transport: BudgetRange::new(25_000, 70_000),
            activities: BudgetRange::new(40_000, 120_000),
        },
    }
}

fn companion_multiplier(companion: CompanionType) -> f64 {
    match companion {
        CompanionType::Solo => 1.0,
        CompanionType::Couple => 0.9,
        CompanionType::Friends => 0.95,
        CompanionType::Family => 1.05,
        CompanionType::WithChildren => 1.1,
    }
}

fn pace_multiplier(pace: PaceMode) -> f64 {
    match pace {
        PaceMode::Relaxed => 0.95,
        PaceMode::Standard => 1.0,
        PaceMode::Packed => 1.1,
    }
}

fn style_boost(params: &TripParameters) -> f64 {
    if params.has_style("shopping-lifestyle") || params.has_style("adventure") {
        1.1
    } else if params.has_style("relaxation") {
        0.95
    } else {
        1.0
    }
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Rough per-person spend estimate derived from the trip parameters alone.
/// Region, season and exchange rate can move the real numbers substantially.
pub fn budget_breakdown(params: &TripParameters) -> BudgetBreakdown {
    let base = base_rates(params.budget_mode);
    let comp = companion_multiplier(params.companion_type);
    let pace = pace_multiplier(params.pace);
    let boost = style_boost(params);

    let hours = f64::from(params.day_end_hour.saturating_sub(params.day_start_hour));
    let hours_mult = clamp(hours / 10.0, 0.85, 1.2);
    let food_tweak = if hours_mult >= 1.1 {
        1.05
    } else if hours_mult <= 0.9 {
        0.95
    } else {
        1.0
    };

    let lodging = base.lodging.scaled(comp);
    let food = base.food.scaled(comp * food_tweak);
    let transport = base.transport.scaled(comp * pace);
    let activities = base.activities.scaled(comp * pace * boost);

    let per_day = lodging.plus(&food).plus(&transport).plus(&activities);
    let total = per_day.times(i64::from(params.days()));

    BudgetBreakdown {
        currency: "KRW",
        per_day,
        total,
        categories: BudgetCategories {
            lodging,
            food,
            transport,
            activities,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(mode: BudgetMode, companion: CompanionType, pace: PaceMode) -> TripParameters {
        TripParameters {
            country: "Italy".to_string(),
            city: "Rome".to_string(),
            nights: 2,
            travel_styles: vec![],
            budget_mode: mode,
            companion_type: companion,
            pace,
            day_start_hour: 9,
            day_end_hour: 21,
            city_lat: None,
            city_lon: None,
            city_code: None,
            country_code: None,
        }
    }

    #[test]
    fn test_solo_standard_uses_base_table() {
        let p = params(BudgetMode::Standard, CompanionType::Solo, PaceMode::Standard);
        let b = budget_breakdown(&p);
        assert_eq!(b.categories.lodging, BudgetRange::new(80_000, 160_000));
        // 12 active hours puts the hours multiplier at its 1.2 cap, which
        // bumps the food range by 5%.
        assert_eq!(b.categories.food, BudgetRange::new(42_000, 94_500));
        assert_eq!(b.per_day.min, 80_000 + 42_000 + 15_000 + 20_000);
        assert_eq!(b.total.min, b.per_day.min * 3);
    }

    #[test]
    fn test_premium_outranks_budget() {
        let budget = budget_breakdown(&params(
            BudgetMode::Budget,
            CompanionType::Solo,
            PaceMode::Standard,
        ));
        let premium = budget_breakdown(&params(
            BudgetMode::Premium,
            CompanionType::Solo,
            PaceMode::Standard,
        ));
        assert!(premium.per_day.min > budget.per_day.max);
    }

    #[test]
    fn test_boost_styles_are_offered_by_the_form() {
        use crate::models::trip::TRAVEL_STYLES;
        for style in ["shopping-lifestyle", "adventure", "relaxation"] {
            assert!(TRAVEL_STYLES.contains(&style), "{} not offered", style);
        }
    }

    #[test]
    fn test_style_boost_applies_to_activities_only() {
        let mut p = params(BudgetMode::Standard, CompanionType::Solo, PaceMode::Standard);
        p.travel_styles = vec!["adventure".to_string()];
        let boosted = budget_breakdown(&p);
        p.travel_styles = vec![];
        let plain = budget_breakdown(&p);
        assert!(boosted.categories.activities.max > plain.categories.activities.max);
        assert_eq!(boosted.categories.lodging, plain.categories.lodging);
    }
}
