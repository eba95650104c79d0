#![deny(warnings)]

//! Demand model: per-day unit quantities for catalog variants.
//!
//! A day's quantity is the variant baseline scaled by
//! - a weekend boost (Friday to Sunday),
//! - a pattern calendar boost (`seasonal` from October),
//! - a trend ramp over a fixed horizon (`trending_up` / `trending_down`),
//! - a uniform random scale in [0.7, 1.3],
//!
//! then floored, with an occasional slow-day override. The random source is
//! always injected so runs are reproducible from a seed. Launch and cutoff
//! gating is not applied here.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;
use seed_core::{PatternTag, ProductVariant};

/// Multiplier applied on Friday, Saturday and Sunday.
pub const WEEKEND_BOOST: f64 = 1.3;
/// Multiplier applied to `seasonal` variants from October onwards.
pub const SEASONAL_BOOST: f64 = 1.5;
/// First month (1-based) of the seasonal boost.
pub const SEASONAL_FROM_MONTH: u32 = 10;
/// `trending_up` gains this much over one horizon (1.0 -> 3.0).
pub const TREND_UP_GAIN: f64 = 2.0;
/// `trending_down` loses this much over one horizon (1.0 -> ~0.33).
pub const TREND_DOWN_LOSS: f64 = 0.67;
/// Bounds of the uniform random scale.
pub const RANDOM_SCALE_MIN: f64 = 0.7;
pub const RANDOM_SCALE_MAX: f64 = 1.3;
/// Chance that a variant-day is replaced by a slow day.
pub const SLOW_DAY_PROBABILITY: f64 = 0.15;
/// Slow days sell a uniform integer in `0..=SLOW_DAY_MAX`.
pub const SLOW_DAY_MAX: u32 = 2;

/// Run-level inputs shared by every evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DemandContext {
    /// Day zero of the trend ramp.
    pub start: NaiveDate,
    /// Horizon the ramp is normalized over (> 0).
    pub horizon_days: u32,
}

/// 1.3 on the last three days of a Monday-first week, else 1.0.
pub fn weekday_multiplier(date: NaiveDate) -> f64 {
    match date.weekday() {
        Weekday::Fri | Weekday::Sat | Weekday::Sun => WEEKEND_BOOST,
        _ => 1.0,
    }
}

/// Pattern-specific calendar boost.
pub fn calendar_multiplier(pattern: PatternTag, date: NaiveDate) -> f64 {
    match pattern {
        PatternTag::Seasonal if date.month() >= SEASONAL_FROM_MONTH => SEASONAL_BOOST,
        _ => 1.0,
    }
}

/// Linear trend ramp after `elapsed_days` of a `horizon_days` window.
///
/// `trending_down` is floored at zero past the horizon.
pub fn trend_multiplier(pattern: PatternTag, elapsed_days: i64, horizon_days: u32) -> f64 {
    let progress = elapsed_days as f64 / f64::from(horizon_days.max(1));
    match pattern {
        PatternTag::TrendingUp => 1.0 + TREND_UP_GAIN * progress,
        PatternTag::TrendingDown => (1.0 - TREND_DOWN_LOSS * progress).max(0.0),
        _ => 1.0,
    }
}

/// Product of all deterministic multipliers for a variant-day.
pub fn combined_multiplier(pattern: PatternTag, date: NaiveDate, ctx: &DemandContext) -> f64 {
    let elapsed = (date - ctx.start).num_days();
    weekday_multiplier(date)
        * calendar_multiplier(pattern, date)
        * trend_multiplier(pattern, elapsed, ctx.horizon_days)
}

/// Largest quantity [`daily_quantity`] can return for a variant-day.
pub fn quantity_ceiling(variant: &ProductVariant, date: NaiveDate, ctx: &DemandContext) -> u32 {
    let top = variant.daily_avg * combined_multiplier(variant.pattern, date, ctx) * RANDOM_SCALE_MAX;
    floor_units(top).max(SLOW_DAY_MAX)
}

/// Draw the number of units a variant sells on `date`, before stock clamping.
///
/// Draw order is fixed: random scale, slow-day coin, then the slow-day value
/// only when the coin hits.
pub fn daily_quantity<R: Rng + ?Sized>(
    variant: &ProductVariant,
    date: NaiveDate,
    ctx: &DemandContext,
    rng: &mut R,
) -> u32 {
    let scale: f64 = rng.gen_range(RANDOM_SCALE_MIN..=RANDOM_SCALE_MAX);
    let mut qty =
        floor_units(variant.daily_avg * combined_multiplier(variant.pattern, date, ctx) * scale);
    if rng.gen::<f64>() < SLOW_DAY_PROBABILITY {
        qty = rng.gen_range(0..=SLOW_DAY_MAX);
    }
    qty
}

fn floor_units(x: f64) -> u32 {
    if !x.is_finite() || x <= 0.0 {
        return 0;
    }
    let f = x.floor();
    if f >= u32::MAX as f64 {
        return u32::MAX;
    }
    f as u32
}
