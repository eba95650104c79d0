//! Day-by-day synthesizer driving the demand model and the inventory ledger.

use crate::ledger::{InventoryState, StockChange};
use crate::summary::RunSummary;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;
use seed_core::{
    Catalog, CatalogEntry, DeliveryRecord, EmitError, PatternTag, RecordSink, RunConfig,
    SaleTransaction,
};
use seed_demand::{daily_quantity, DemandContext};
use tracing::{debug, info};
use uuid::Uuid;

/// Sales happen between these hours, inclusive.
pub const SALES_OPEN_HOUR: i64 = 9;
pub const SALES_CLOSE_HOUR: i64 = 20;
/// Deliveries are stamped before the sales window opens.
pub const DELIVERY_HOUR: i64 = 8;

/// Whether a variant with `pattern` may sell on `date` under `run`'s gates.
pub fn is_selling(pattern: PatternTag, date: NaiveDate, run: &RunConfig) -> bool {
    match pattern {
        PatternTag::NewProduct => date >= run.launch_date,
        PatternTag::Depleting => date <= run.depletion_cutoff,
        _ => true,
    }
}

/// Walks the run window one day at a time, each catalog entry in order.
pub struct Synthesizer<'a> {
    catalog: &'a Catalog,
    run: &'a RunConfig,
}

impl<'a> Synthesizer<'a> {
    pub fn new(catalog: &'a Catalog, run: &'a RunConfig) -> Self {
        Self { catalog, run }
    }

    /// Synthesize the whole run into `sink` and return its totals.
    ///
    /// Sink failures abort the run and are returned unchanged.
    pub fn run<R, S>(&self, rng: &mut R, sink: &mut S) -> Result<RunSummary, EmitError>
    where
        R: Rng + ?Sized,
        S: RecordSink + ?Sized,
    {
        let ctx = DemandContext {
            start: self.run.start,
            horizon_days: self.run.trend_horizon_days,
        };
        let mut state = InventoryState::initialize(self.catalog);
        let mut summary = RunSummary::new(self.catalog, self.run.len_days());
        info!(
            start = %self.run.start,
            end = %self.run.end,
            variants = self.catalog.len(),
            "synthesis started"
        );

        sink.begin(self.run)?;
        for date in self.run.days() {
            for (idx, entry) in self.catalog.iter().enumerate() {
                self.step(idx, entry, date, &ctx, &mut state, &mut summary, rng, sink)?;
            }
        }
        sink.finish(self.run)?;

        for v in &mut summary.variants {
            v.final_stock = state.stock(&v.variant_id);
        }
        info!(
            transactions = summary.transactions(),
            units = summary.units_sold(),
            revenue = %summary.revenue(),
            "synthesis finished"
        );
        Ok(summary)
    }

    #[allow(clippy::too_many_arguments)]
    fn step<R, S>(
        &self,
        idx: usize,
        entry: &CatalogEntry,
        date: NaiveDate,
        ctx: &DemandContext,
        state: &mut InventoryState,
        summary: &mut RunSummary,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<(), EmitError>
    where
        R: Rng + ?Sized,
        S: RecordSink + ?Sized,
    {
        let variant = &entry.variant;
        if !is_selling(variant.pattern, date, self.run) {
            return Ok(());
        }
        let proposed = daily_quantity(variant, date, ctx, rng);
        if proposed == 0 {
            return Ok(());
        }

        if let Some(change) = state.apply_due_replenishment(entry, date) {
            if let Some(v) = summary.variants.get_mut(idx) {
                v.replenishments += 1;
            }
            debug!(
                variant = %variant.variant_id,
                scheduled = %change.event.date,
                before = change.before,
                after = change.after,
                "replenishment applied"
            );
            if change.delta() != 0 {
                sink.record_delivery(delivery_record(entry, &change, rng))?;
            }
        }

        let commit = state.clamp_and_commit(variant.variant_id, proposed);
        if commit.committed == 0 {
            return Ok(());
        }

        let hour = rng.gen_range(SALES_OPEN_HOUR..=SALES_CLOSE_HOUR);
        let minute = rng.gen_range(0..=59);
        let sale = SaleTransaction {
            id: random_uuid(rng),
            variant_id: variant.variant_id,
            product_id: variant.product_id,
            product_name: variant.name.clone(),
            price: variant.price,
            quantity: commit.committed,
            margin: variant.margin,
            stock_remaining: commit.after,
            sold_at: at(date, hour, minute),
        };
        summary.add_sale(idx, &sale);
        sink.record_sale(sale)
    }
}

fn delivery_record<R: Rng + ?Sized>(
    entry: &CatalogEntry,
    change: &StockChange,
    rng: &mut R,
) -> DeliveryRecord {
    DeliveryRecord {
        id: random_uuid(rng),
        event_id: random_uuid(rng),
        variant_id: entry.variant.variant_id,
        delivered_quantity: change.delta(),
        delivered_at: at(change.event.date, DELIVERY_HOUR, 0),
    }
}

fn at(date: NaiveDate, hour: i64, minute: i64) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(hour) + Duration::minutes(minute)
}

/// Version-4 style UUID drawn from the run's generator.
pub fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}
