//! Scenario files: run window, gating dates, seed and catalog in YAML.
//!
//! The built-in reference scenario is embedded from `assets/reference.yaml`
//! and goes through the same validation as user-supplied files.

use crate::{
    validate_run_config, zip_schedule, Catalog, CatalogEntry, PatternTag, ProductId,
    ProductVariant, RunConfig, ValidationError, VariantId, DEFAULT_TREND_HORIZON_DAYS,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

const REFERENCE_YAML: &str = include_str!("../assets/reference.yaml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid scenario file: {0}")]
    Parse(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    run: RunSection,
    products: Vec<ProductRecord>,
}

#[derive(Debug, Deserialize)]
struct RunSection {
    start: NaiveDate,
    end: NaiveDate,
    #[serde(default = "default_horizon")]
    trend_horizon_days: u32,
    launch_date: NaiveDate,
    depletion_cutoff: NaiveDate,
    #[serde(default)]
    seed: Option<u64>,
}

fn default_horizon() -> u32 {
    DEFAULT_TREND_HORIZON_DAYS
}

#[derive(Debug, Deserialize)]
struct ProductRecord {
    variant_id: Uuid,
    product_id: Uuid,
    name: String,
    price: Decimal,
    margin: Decimal,
    pattern: PatternTag,
    daily_avg: f64,
    #[serde(default)]
    variance: f64,
    #[serde(default)]
    starting_stock: Option<u32>,
    #[serde(default)]
    deliveries: Option<DeliveryPlan>,
}

/// Parallel delivery lists as written in scenario files.
#[derive(Debug, Deserialize)]
struct DeliveryPlan {
    dates: Vec<NaiveDate>,
    levels: Vec<u32>,
}

impl ProductRecord {
    fn into_entry(self) -> Result<CatalogEntry, ValidationError> {
        let variant_id = VariantId(self.variant_id);
        let replenishments = match &self.deliveries {
            Some(plan) => zip_schedule(variant_id, &plan.dates, &plan.levels)?,
            None => Vec::new(),
        };
        Ok(CatalogEntry {
            variant: ProductVariant {
                variant_id,
                product_id: ProductId(self.product_id),
                name: self.name,
                price: self.price,
                margin: self.margin,
                pattern: self.pattern,
                daily_avg: self.daily_avg,
                variance: self.variance,
            },
            starting_stock: self.starting_stock,
            replenishments,
        })
    }
}

/// A validated run configuration and catalog.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub run: RunConfig,
    pub catalog: Catalog,
}

impl Scenario {
    /// Parse and validate a scenario from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ScenarioFile = serde_yaml::from_str(text)?;
        let run = RunConfig {
            start: file.run.start,
            end: file.run.end,
            trend_horizon_days: file.run.trend_horizon_days,
            launch_date: file.run.launch_date,
            depletion_cutoff: file.run.depletion_cutoff,
            seed: file.run.seed,
        };
        validate_run_config(&run)?;
        let entries = file
            .products
            .into_iter()
            .map(ProductRecord::into_entry)
            .collect::<Result<Vec<_>, _>>()?;
        let catalog = Catalog::new(entries)?;
        debug!(variants = catalog.len(), start = %run.start, end = %run.end, "scenario parsed");
        Ok(Self { run, catalog })
    }

    /// Load a scenario file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// The built-in 12-variant reference run (2024-05-18 to 2024-11-18).
    pub fn reference() -> Result<Self, ConfigError> {
        Self::from_yaml_str(REFERENCE_YAML)
    }
}
