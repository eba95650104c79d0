#![deny(warnings)]

//! Synthesis runtime: the inventory ledger and the day-by-day driver that
//! turns a catalog and a run window into sale records.

pub mod ledger;
pub mod summary;
pub mod synth;

use seed_core::{DeliveryRecord, EmitError, RecordSink, SaleTransaction};

pub use ledger::{Commit, InventoryState, StockChange};
pub use summary::{RunSummary, VariantSummary};
pub use synth::{is_selling, Synthesizer};

/// Sink that keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub sales: Vec<SaleTransaction>,
    pub deliveries: Vec<DeliveryRecord>,
}

impl RecordSink for MemorySink {
    fn record_sale(&mut self, sale: SaleTransaction) -> Result<(), EmitError> {
        self.sales.push(sale);
        Ok(())
    }

    fn record_delivery(&mut self, delivery: DeliveryRecord) -> Result<(), EmitError> {
        self.deliveries.push(delivery);
        Ok(())
    }
}
