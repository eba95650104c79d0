#![deny(warnings)]

//! Core domain models and invariants for the sales seed generator.
//!
//! This crate defines the catalog of product variants, the replenishment
//! schedules attached to them, the records handed to output sinks, and the
//! validation helpers that guard all of it at load time.

pub mod config;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub use config::{ConfigError, Scenario};

/// Stock assumed for a variant with no starting-stock entry.
pub const DEFAULT_STARTING_STOCK: u32 = 100;

/// Largest accepted unit price or margin. Keeps per-sale and run totals
/// far inside `Decimal` range for any `u32` quantity.
pub const MAX_UNIT_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Money columns carry at most this many decimal places.
pub const MONEY_SCALE: u32 = 2;

/// Default length of the trend normalization window in days (~6 months).
pub const DEFAULT_TREND_HORIZON_DAYS: u32 = 184;

/// Identifier of a sellable product variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(pub Uuid);

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of the parent product; several variants may share one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub Uuid);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Demand shape of a variant; selects which multipliers the demand model applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternTag {
    Bestseller,
    Steady,
    TrendingUp,
    TrendingDown,
    SlowMoving,
    /// Stops selling after the run's depletion cutoff.
    Depleting,
    /// Boosted from October onwards.
    Seasonal,
    Overstocked,
    HighTurnover,
    /// Starts selling on the run's launch date.
    NewProduct,
}

impl PatternTag {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternTag::Bestseller => "bestseller",
            PatternTag::Steady => "steady",
            PatternTag::TrendingUp => "trending_up",
            PatternTag::TrendingDown => "trending_down",
            PatternTag::SlowMoving => "slow_moving",
            PatternTag::Depleting => "depleting",
            PatternTag::Seasonal => "seasonal",
            PatternTag::Overstocked => "overstocked",
            PatternTag::HighTurnover => "high_turnover",
            PatternTag::NewProduct => "new_product",
        }
    }
}

impl fmt::Display for PatternTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sellable product variant. Immutable for the duration of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant identifier (unique within a catalog).
    pub variant_id: VariantId,
    /// Parent product identifier.
    pub product_id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price (> 0).
    pub price: Decimal,
    /// Unit margin (>= 0).
    pub margin: Decimal,
    /// Demand shape.
    pub pattern: PatternTag,
    /// Average units sold per day (>= 0).
    pub daily_avg: f64,
    /// Variance bound carried with the baseline (>= 0).
    pub variance: f64,
}

/// Stock level recorded after a delivery on `date`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReplenishmentEvent {
    pub date: NaiveDate,
    /// On-hand units after the delivery. Overwrites, never adds.
    pub level: u32,
}

/// A variant together with its starting stock and replenishment schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub variant: ProductVariant,
    /// Units on hand at the start of the run; `None` falls back to
    /// [`DEFAULT_STARTING_STOCK`].
    pub starting_stock: Option<u32>,
    /// Strictly increasing in date.
    pub replenishments: Vec<ReplenishmentEvent>,
}

impl CatalogEntry {
    pub fn starting_stock_or_default(&self) -> u32 {
        self.starting_stock.unwrap_or(DEFAULT_STARTING_STOCK)
    }
}

/// Validated, ordered catalog. Iteration order is the synthesis order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog, validating every entry and the uniqueness of variant ids.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, ValidationError> {
        validate_entries(&entries)?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Run window and gating dates. All of these are configuration, never derived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// First simulated day (inclusive).
    pub start: NaiveDate,
    /// Last simulated day (inclusive).
    pub end: NaiveDate,
    /// Trend normalization window in days, independent of the run length.
    pub trend_horizon_days: u32,
    /// `new_product` variants do not sell before this date.
    pub launch_date: NaiveDate,
    /// `depleting` variants do not sell after this date.
    pub depletion_cutoff: NaiveDate,
    /// Seed for the deterministic RNG; `None` draws a fresh one.
    pub seed: Option<u64>,
}

impl RunConfig {
    /// Every simulated day, `start..=end`.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// Number of simulated days.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// A synthesized sale. Created once per qualifying variant-day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleTransaction {
    pub id: Uuid,
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub margin: Decimal,
    /// On-hand units after this sale.
    pub stock_remaining: u32,
    pub sold_at: NaiveDateTime,
}

impl SaleTransaction {
    pub fn revenue(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    pub fn margin_total(&self) -> Decimal {
        self.margin * Decimal::from(self.quantity)
    }
}

/// A replenishment that changed tracked stock, in the shape of the
/// downstream `delivery` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: Uuid,
    pub event_id: Uuid,
    pub variant_id: VariantId,
    /// Signed change in on-hand units caused by the delivery.
    pub delivered_quantity: i64,
    pub delivered_at: NaiveDateTime,
}

/// Failures raised by record sinks.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    Encode(String),
}

/// Destination for synthesized records.
///
/// Ownership of each record moves into the sink. `begin` and `finish`
/// bracket a run and default to no-ops.
pub trait RecordSink {
    fn begin(&mut self, _run: &RunConfig) -> Result<(), EmitError> {
        Ok(())
    }

    fn record_sale(&mut self, sale: SaleTransaction) -> Result<(), EmitError>;

    fn record_delivery(&mut self, _delivery: DeliveryRecord) -> Result<(), EmitError> {
        Ok(())
    }

    fn finish(&mut self, _run: &RunConfig) -> Result<(), EmitError> {
        Ok(())
    }
}

/// Validation errors for catalog and run invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Price must be strictly positive.
    #[error("variant {0}: price must be > 0")]
    NonPositivePrice(VariantId),
    /// Margin must be non-negative.
    #[error("variant {0}: margin must be >= 0")]
    NegativeMargin(VariantId),
    /// Price or margin has more decimal places than the money columns hold.
    #[error("variant {0}: price and margin take at most 2 decimal places")]
    MoneyPrecision(VariantId),
    /// Price or margin above [`MAX_UNIT_AMOUNT`].
    #[error("variant {0}: price and margin must not exceed 1000000000")]
    MoneyOutOfRange(VariantId),
    /// Daily average and variance must be finite and non-negative.
    #[error("variant {0}: demand baseline must be finite and >= 0")]
    InvalidBaseline(VariantId),
    #[error("variant {0}: name must not be empty")]
    EmptyName(VariantId),
    #[error("duplicate variant id: {0}")]
    DuplicateVariant(VariantId),
    /// Dates and levels lists of a delivery plan differ in length.
    #[error("variant {variant}: {dates} delivery dates but {levels} delivery levels")]
    ScheduleMismatch {
        variant: VariantId,
        dates: usize,
        levels: usize,
    },
    /// Replenishment dates must be strictly increasing.
    #[error("variant {variant}: replenishment on {date} is not after the previous one")]
    UnorderedSchedule { variant: VariantId, date: NaiveDate },
    #[error("run end {end} is before start {start}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },
    #[error("trend horizon must be > 0 days")]
    ZeroHorizon,
}

/// Validate a single variant's economics and demand baseline.
pub fn validate_variant(v: &ProductVariant) -> Result<(), ValidationError> {
    let id = v.variant_id;
    if v.name.trim().is_empty() {
        return Err(ValidationError::EmptyName(id));
    }
    if v.price <= Decimal::ZERO {
        return Err(ValidationError::NonPositivePrice(id));
    }
    if v.margin < Decimal::ZERO {
        return Err(ValidationError::NegativeMargin(id));
    }
    if v.price.normalize().scale() > MONEY_SCALE || v.margin.normalize().scale() > MONEY_SCALE {
        return Err(ValidationError::MoneyPrecision(id));
    }
    if v.price > MAX_UNIT_AMOUNT || v.margin > MAX_UNIT_AMOUNT {
        return Err(ValidationError::MoneyOutOfRange(id));
    }
    if !(v.daily_avg.is_finite() && v.variance.is_finite()) || v.daily_avg < 0.0 || v.variance < 0.0
    {
        return Err(ValidationError::InvalidBaseline(id));
    }
    Ok(())
}

/// Validate that a replenishment schedule is strictly increasing in date.
pub fn validate_schedule(
    variant: VariantId,
    events: &[ReplenishmentEvent],
) -> Result<(), ValidationError> {
    for pair in events.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(ValidationError::UnorderedSchedule {
                variant,
                date: pair[1].date,
            });
        }
    }
    Ok(())
}

/// Zip parallel delivery lists into events, rejecting any length mismatch.
pub fn zip_schedule(
    variant: VariantId,
    dates: &[NaiveDate],
    levels: &[u32],
) -> Result<Vec<ReplenishmentEvent>, ValidationError> {
    if dates.len() != levels.len() {
        return Err(ValidationError::ScheduleMismatch {
            variant,
            dates: dates.len(),
            levels: levels.len(),
        });
    }
    let events: Vec<ReplenishmentEvent> = dates
        .iter()
        .zip(levels)
        .map(|(&date, &level)| ReplenishmentEvent { date, level })
        .collect();
    validate_schedule(variant, &events)?;
    Ok(events)
}

/// Validate run window settings.
pub fn validate_run_config(run: &RunConfig) -> Result<(), ValidationError> {
    if run.end < run.start {
        return Err(ValidationError::InvalidPeriod {
            start: run.start,
            end: run.end,
        });
    }
    if run.trend_horizon_days == 0 {
        return Err(ValidationError::ZeroHorizon);
    }
    Ok(())
}

fn validate_entries(entries: &[CatalogEntry]) -> Result<(), ValidationError> {
    let mut seen: BTreeSet<VariantId> = BTreeSet::new();
    for e in entries {
        validate_variant(&e.variant)?;
        validate_schedule(e.variant.variant_id, &e.replenishments)?;
        if !seen.insert(e.variant.variant_id) {
            return Err(ValidationError::DuplicateVariant(e.variant.variant_id));
        }
    }
    Ok(())
}
