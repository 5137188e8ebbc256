//! Per-tick resource drain and health model.
//!
//! Each tick:
//!
//! - Water and nutrients drain by `rate * 0.1`, floored at 0
//! - Light resets to 100 while lit, or dims by 2 per tick in the dark
//! - Gauges outside the healthy band accumulate health loss and stress
//! - Health drops by the accumulated loss, floored at 0
//! - Stress rises by the accumulated increase, or relaxes when conditions
//!   are comfortable
//!
//! Health loss is a deterministic subtraction; no roll is involved.

use marrow_types::{LiveGameState, SeedProfile, SoilProfile};

/// Drain rate used when neither the seed nor the soil supplies one.
pub const DEFAULT_DRAIN_RATE: f64 = 0.5;

/// Fraction of the per-second drain rate applied each tick.
pub const DRAIN_SCALE: f64 = 0.1;

/// Gauges below this level harm the plant.
pub const DANGER_LOW: f64 = 25.0;
/// Gauges above this level harm the plant.
pub const DANGER_HIGH: f64 = 95.0;
/// Lower bound of the band in which stress relaxes quickly.
pub const COMFORT_LOW: f64 = 30.0;
/// Upper bound of the band in which stress relaxes quickly.
pub const COMFORT_HIGH: f64 = 80.0;

/// Light lost per tick while the lights are out.
const LIGHT_DIM_PER_TICK: f64 = 2.0;
/// Light level under which darkness becomes critical.
const CRITICAL_LIGHT: f64 = 15.0;
/// Stress level above which stress itself damages health.
const HIGH_STRESS: f64 = 70.0;
/// Stress ceiling for the slow idle decay.
const IDLE_DECAY_CEILING: f64 = 50.0;

/// Health loss and stress increase for an out-of-band water or nutrient gauge.
const GAUGE_LOSS: f64 = 0.35;
const GAUGE_STRESS: f64 = 0.2;

/// What one resource tick did to the plant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResourceTick {
    /// Health removed this tick.
    pub health_loss: f64,
    /// Stress added before decay.
    pub stress_increase: f64,
    /// Stress removed by decay.
    pub stress_decay: f64,
}

/// Pick the session's drain rates from the chosen seed and soil.
///
/// The soil's water rate wins over the seed's; the nutrient rate always
/// comes from the seed. Missing, negative, or non-finite rates fall back to
/// [`DEFAULT_DRAIN_RATE`].
pub fn resolve_drain_rates(seed: &SeedProfile, soil: &SoilProfile) -> (f64, f64) {
    let usable = |rate: Option<f64>| rate.filter(|r| r.is_finite() && *r >= 0.0);
    let water = usable(soil.water_drain_rate)
        .or_else(|| usable(seed.water_drain_rate))
        .unwrap_or(DEFAULT_DRAIN_RATE);
    let nutrients = usable(seed.nutrient_drain_rate).unwrap_or(DEFAULT_DRAIN_RATE);
    (water, nutrients)
}

const fn out_of_band(value: f64) -> bool {
    value < DANGER_LOW || value > DANGER_HIGH
}

const fn in_comfort(value: f64) -> bool {
    value >= COMFORT_LOW && value <= COMFORT_HIGH
}

/// Apply one tick of drain, light, health, and stress mechanics.
///
/// The caller must not call this for a dead plant.
pub fn apply_resource_tick(state: &mut LiveGameState) -> ResourceTick {
    let res = &mut state.resources;

    // 1. Drain
    res.water = state.water_drain_rate.mul_add(-DRAIN_SCALE, res.water).max(0.0);
    res.nutrients = state
        .nutrient_drain_rate
        .mul_add(-DRAIN_SCALE, res.nutrients)
        .max(0.0);

    // 2. Light
    if state.lights_out {
        res.light = (res.light - LIGHT_DIM_PER_TICK).max(0.0);
        state.lights_off_timer = state.lights_off_timer.saturating_add(1);
    } else {
        res.light = 100.0;
        state.lights_off_timer = 0;
    }

    // 3. Accumulate loss and stress
    let mut health_loss = 0.0;
    let mut stress_increase = 0.0;
    if out_of_band(res.water) {
        health_loss += GAUGE_LOSS;
        stress_increase += GAUGE_STRESS;
    }
    if out_of_band(res.nutrients) {
        health_loss += GAUGE_LOSS;
        stress_increase += GAUGE_STRESS;
    }
    if state.lights_out {
        let darkness = (f64::from(state.lights_off_timer) * 0.01).min(0.8);
        health_loss += 0.2 + darkness;
        stress_increase += 0.3;
        if res.light < CRITICAL_LIGHT {
            health_loss += 0.35;
            stress_increase += 0.2;
        }
    }
    if res.stress > HIGH_STRESS {
        health_loss += 0.3;
    }

    // 4. Health
    state.health = (state.health - health_loss).max(0.0);
    state.health_sum += state.health;
    state.health_ticks = state.health_ticks.saturating_add(1);

    // 5. Stress
    let mut stress_decay = 0.0;
    if !state.lights_out && in_comfort(res.water) && in_comfort(res.nutrients) && res.stress > 0.0
    {
        stress_decay = 0.25;
    } else if stress_increase <= 0.0 && res.stress > 0.0 && res.stress < IDLE_DECAY_CEILING {
        stress_decay = 0.05;
    }
    res.stress = (res.stress + stress_increase - stress_decay).clamp(0.0, 100.0);

    ResourceTick {
        health_loss,
        stress_increase,
        stress_decay,
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round every displayed gauge to two decimals.
pub fn round_state(state: &mut LiveGameState) {
    state.health = round2(state.health);
    state.growth_progress = round2(state.growth_progress);
    state.resources.water = round2(state.resources.water);
    state.resources.light = round2(state.resources.light);
    state.resources.nutrients = round2(state.resources.nutrients);
    state.resources.stress = round2(state.resources.stress);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn plant() -> LiveGameState {
        LiveGameState::new("Test", 0.5, 0.5)
    }

    #[test]
    fn drain_scales_rate_by_a_tenth() {
        let mut state = plant();
        apply_resource_tick(&mut state);
        assert!(approx(state.resources.water, 79.95));
        assert!(approx(state.resources.nutrients, 79.95));
        assert!(approx(state.resources.light, 100.0));
    }

    #[test]
    fn comfortable_plant_takes_no_damage() {
        let mut state = plant();
        let tick = apply_resource_tick(&mut state);
        assert!(approx(tick.health_loss, 0.0));
        assert!(approx(state.health, 100.0));
        assert_eq!(state.health_ticks, 1);
        assert!(approx(state.health_sum, 100.0));
    }

    #[test]
    fn dry_and_starved_plant_loses_health_and_gains_stress() {
        let mut state = plant();
        state.resources.water = 10.0;
        state.resources.nutrients = 10.0;
        let tick = apply_resource_tick(&mut state);
        assert!(approx(tick.health_loss, 0.7));
        assert!(approx(tick.stress_increase, 0.4));
        assert!(approx(state.health, 99.3));
        assert!(approx(state.resources.stress, 0.4));
    }

    #[test]
    fn overwatered_plant_is_harmed() {
        let mut state = plant();
        state.resources.water = 99.0;
        let tick = apply_resource_tick(&mut state);
        assert!(approx(tick.health_loss, GAUGE_LOSS));
    }

    #[test]
    fn darkness_dims_light_and_grows_timer() {
        let mut state = plant();
        state.lights_out = true;
        let tick = apply_resource_tick(&mut state);
        assert!(approx(state.resources.light, 98.0));
        assert_eq!(state.lights_off_timer, 1);
        assert!(approx(tick.health_loss, 0.21));
        assert!(approx(tick.stress_increase, 0.3));
    }

    #[test]
    fn critical_darkness_adds_extra_loss() {
        let mut state = plant();
        state.lights_out = true;
        state.lights_off_timer = 99;
        state.resources.light = 10.0;
        let tick = apply_resource_tick(&mut state);
        // 0.2 + min(0.8, 1.0) + 0.35
        assert!(approx(tick.health_loss, 1.35));
        assert!(approx(tick.stress_increase, 0.5));
        assert!(approx(state.resources.light, 8.0));
    }

    #[test]
    fn lights_on_resets_timer() {
        let mut state = plant();
        state.lights_off_timer = 12;
        state.resources.light = 40.0;
        apply_resource_tick(&mut state);
        assert_eq!(state.lights_off_timer, 0);
        assert!(approx(state.resources.light, 100.0));
    }

    #[test]
    fn high_stress_damages_health() {
        let mut state = plant();
        state.resources.stress = 75.0;
        let tick = apply_resource_tick(&mut state);
        assert!(approx(tick.health_loss, 0.3));
        // Comfortable band still relaxes stress.
        assert!(approx(state.resources.stress, 74.75));
    }

    #[test]
    fn idle_decay_applies_outside_comfort_band() {
        let mut state = plant();
        state.resources.water = 90.0;
        state.resources.stress = 10.0;
        let tick = apply_resource_tick(&mut state);
        assert!(approx(tick.stress_decay, 0.05));
        assert!(approx(state.resources.stress, 9.95));
    }

    #[test]
    fn health_never_goes_negative() {
        let mut state = plant();
        state.health = 0.5;
        state.lights_out = true;
        state.resources.light = 0.0;
        state.resources.water = 0.0;
        state.resources.nutrients = 0.0;
        apply_resource_tick(&mut state);
        assert!(approx(state.health, 0.0));
        assert!(state.is_dead());
    }

    #[test]
    fn soil_water_rate_overrides_seed() {
        let seed = SeedProfile {
            name: "Seed".to_owned(),
            water_drain_rate: Some(0.9),
            nutrient_drain_rate: Some(0.7),
            image_ref: None,
        };
        let soil = SoilProfile {
            name: "Soil".to_owned(),
            water_drain_rate: Some(0.6),
            nutrient_drain_rate: Some(0.1),
            image_ref: None,
        };
        let (water, nutrients) = resolve_drain_rates(&seed, &soil);
        assert!(approx(water, 0.6));
        assert!(approx(nutrients, 0.7));
    }

    #[test]
    fn missing_rates_fall_back() {
        let seed = SeedProfile {
            name: "Seed".to_owned(),
            water_drain_rate: Some(-1.0),
            nutrient_drain_rate: None,
            image_ref: None,
        };
        let soil = SoilProfile {
            name: "Soil".to_owned(),
            water_drain_rate: None,
            nutrient_drain_rate: None,
            image_ref: None,
        };
        let (water, nutrients) = resolve_drain_rates(&seed, &soil);
        assert!(approx(water, DEFAULT_DRAIN_RATE));
        assert!(approx(nutrients, DEFAULT_DRAIN_RATE));
    }

    #[test]
    fn rounding_keeps_two_decimals() {
        assert!(approx(round2(79.954_999), 79.95));
        assert!(approx(round2(0.005), 0.01));
        let mut state = plant();
        state.resources.water = 12.345_678;
        round_state(&mut state);
        assert!(approx(state.resources.water, 12.35));
    }
}
