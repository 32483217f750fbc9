/// Pure derivation from simulation inputs to presentation values.
///
/// Every function here is total: unknown keys and out-of-range values
/// degrade to the lowest tier / default entry instead of failing.

use super::state::{
    character_profile, DerivedPresentation, SimulationInputs, ToneOverlay, WeatherEffects,
    WeatherMode, GROWTH_THRESHOLDS,
};

/// Profit at or above which the warm tone and sunshine kick in (exclusive).
pub const SUNNY_PROFIT: f64 = 20.0;

/// Profit magnitude at which darkening saturates.
pub const DARKEN_SATURATION: f64 = 50.0;

/// How far the background grey drops at full darkness (out of 255).
const TINT_DARKEN_RANGE: f64 = 80.0;

/// Highest tier whose threshold is <= experience. Negative experience is tier 0.
pub fn growth_tier(experience: i32) -> u8 {
    for i in (0..GROWTH_THRESHOLDS.len()).rev() {
        if experience >= GROWTH_THRESHOLDS[i] {
            return i as u8;
        }
    }
    0
}

/// Character sprite key for a selection at a given tier.
pub fn character_key(character: Option<u8>, tier: u8, special: bool) -> &'static str {
    let profile = character_profile(character);
    if special {
        return profile.special;
    }
    let idx = (tier as usize).min(profile.stages.len() - 1);
    profile.stages[idx]
}

pub fn weather_mode(profit: f64) -> WeatherMode {
    if profit < 0.0 {
        WeatherMode::Rain
    } else if profit > SUNNY_PROFIT {
        WeatherMode::Sunny
    } else {
        WeatherMode::None
    }
}

pub fn weather_effects(profit: f64) -> WeatherEffects {
    WeatherEffects {
        rain: profit < 0.0,
        sunshine: profit > SUNNY_PROFIT,
        rainbow: profit > 0.0,
    }
}

/// Darkness in [0, 1] for a loss; zero for any non-negative profit.
pub fn darkness(profit: f64) -> f64 {
    if profit < 0.0 {
        (profit.abs() / DARKEN_SATURATION).min(1.0)
    } else {
        0.0
    }
}

pub fn tone_overlay(profit: f64) -> ToneOverlay {
    if profit < 0.0 {
        ToneOverlay::Darken {
            intensity: darkness(profit),
        }
    } else if profit > SUNNY_PROFIT {
        ToneOverlay::Warm
    } else {
        ToneOverlay::Neutral
    }
}

/// Grey multiplied into the background texture.
pub fn background_tint(profit: f64) -> u32 {
    if profit >= 0.0 {
        return 0xffffff;
    }
    let v = (255.0 - darkness(profit) * TINT_DARKEN_RANGE).round() as u32;
    (v << 16) | (v << 8) | v
}

pub fn derive(inputs: &SimulationInputs) -> DerivedPresentation {
    let tier = growth_tier(inputs.experience);
    let profit = inputs.profit_percent;
    DerivedPresentation {
        growth_tier: tier,
        background_key: inputs.sector.background_key(),
        character_key: character_key(inputs.character, tier, inputs.special),
        weather_mode: weather_mode(profit),
        weather: weather_effects(profit),
        tone: tone_overlay(profit),
        background_tint: background_tint(profit),
    }
}
