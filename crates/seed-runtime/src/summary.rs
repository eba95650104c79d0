//! Per-variant and run-wide totals collected while synthesizing.

use rust_decimal::Decimal;
use seed_core::{Catalog, SaleTransaction, VariantId};

#[derive(Clone, Debug, PartialEq)]
pub struct VariantSummary {
    pub variant_id: VariantId,
    pub name: String,
    pub transactions: u64,
    pub units_sold: u64,
    pub revenue: Decimal,
    pub margin: Decimal,
    pub replenishments: u32,
    pub final_stock: u32,
}

/// Totals for a finished run. Variants appear in catalog order.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub days: i64,
    pub variants: Vec<VariantSummary>,
}

impl RunSummary {
    pub(crate) fn new(catalog: &Catalog, days: i64) -> Self {
        let variants = catalog
            .iter()
            .map(|e| VariantSummary {
                variant_id: e.variant.variant_id,
                name: e.variant.name.clone(),
                transactions: 0,
                units_sold: 0,
                revenue: Decimal::ZERO,
                margin: Decimal::ZERO,
                replenishments: 0,
                final_stock: e.starting_stock_or_default(),
            })
            .collect();
        Self { days, variants }
    }

    pub(crate) fn add_sale(&mut self, idx: usize, sale: &SaleTransaction) {
        if let Some(v) = self.variants.get_mut(idx) {
            v.transactions += 1;
            v.units_sold += u64::from(sale.quantity);
            v.revenue += sale.revenue();
            v.margin += sale.margin_total();
        }
    }

    pub fn transactions(&self) -> u64 {
        self.variants.iter().map(|v| v.transactions).sum()
    }

    pub fn units_sold(&self) -> u64 {
        self.variants.iter().map(|v| v.units_sold).sum()
    }

    pub fn revenue(&self) -> Decimal {
        self.variants.iter().map(|v| v.revenue).sum()
    }

    pub fn margin(&self) -> Decimal {
        self.variants.iter().map(|v| v.margin).sum()
    }

    pub fn replenishments(&self) -> u32 {
        self.variants.iter().map(|v| v.replenishments).sum()
    }
}
