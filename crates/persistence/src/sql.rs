//! SQL script rendering for the `SOLD` and `DELIVERY` tables.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use seed_core::{DeliveryRecord, EmitError, RecordSink, RunConfig, SaleTransaction};
use std::io::Write;
use tracing::debug;

const RULE: &str = "-- ============================================";

/// Money columns are written with exactly two decimal places.
pub fn sql_decimal(value: Decimal) -> String {
    let mut v = value.round_dp(2);
    v.rescale(2);
    v.to_string()
}

/// Single-quoted SQL string literal body with quotes doubled.
pub fn sql_text(value: &str) -> String {
    value.replace('\'', "''")
}

pub fn sql_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Render one sale as an `INSERT INTO SOLD` statement.
pub fn render_sale(sale: &SaleTransaction) -> String {
    format!(
        "INSERT INTO SOLD VALUES (\n    '{}'::uuid,\n    '{}'::uuid,\n    '{}'::uuid,\n    '{}',\n    {},\n    {},\n    {},\n    {},\n    '{}'\n);\n",
        sale.id,
        sale.variant_id,
        sale.product_id,
        sql_text(&sale.product_name),
        sql_decimal(sale.price),
        sale.quantity,
        sql_decimal(sale.margin),
        sale.stock_remaining,
        sql_timestamp(sale.sold_at),
    )
}

/// Render one delivery as an `INSERT INTO DELIVERY` statement.
pub fn render_delivery(delivery: &DeliveryRecord) -> String {
    format!(
        "INSERT INTO DELIVERY VALUES ('{}'::uuid, '{}'::uuid, '{}'::uuid, {}, '{}');\n",
        delivery.id,
        delivery.event_id,
        delivery.variant_id,
        delivery.delivered_quantity,
        sql_timestamp(delivery.delivered_at),
    )
}

/// Streams a SQL seed script into any writer.
pub struct SqlScriptWriter<W: Write> {
    out: W,
    include_deliveries: bool,
    sales: u64,
    deliveries: u64,
}

impl<W: Write> SqlScriptWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            include_deliveries: false,
            sales: 0,
            deliveries: 0,
        }
    }

    /// Also emit `DELIVERY` inserts for replenishments.
    pub fn with_deliveries(mut self, include: bool) -> Self {
        self.include_deliveries = include;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for SqlScriptWriter<W> {
    fn begin(&mut self, run: &RunConfig) -> Result<(), EmitError> {
        writeln!(self.out, "{RULE}")?;
        writeln!(self.out, "-- SALES DATA (SOLD TABLE)")?;
        writeln!(self.out, "{RULE}")?;
        writeln!(
            self.out,
            "-- Synthesized sales patterns for {} days",
            run.len_days()
        )?;
        writeln!(self.out)?;
        Ok(())
    }

    fn record_sale(&mut self, sale: SaleTransaction) -> Result<(), EmitError> {
        self.out.write_all(render_sale(&sale).as_bytes())?;
        self.sales += 1;
        Ok(())
    }

    fn record_delivery(&mut self, delivery: DeliveryRecord) -> Result<(), EmitError> {
        if !self.include_deliveries {
            return Ok(());
        }
        self.out.write_all(render_delivery(&delivery).as_bytes())?;
        self.deliveries += 1;
        Ok(())
    }

    fn finish(&mut self, run: &RunConfig) -> Result<(), EmitError> {
        writeln!(self.out)?;
        writeln!(self.out, "-- Sales data generation complete")?;
        writeln!(self.out, "-- Period: {} to {}", run.start, run.end)?;
        self.out.flush()?;
        debug!(
            sales = self.sales,
            deliveries = self.deliveries,
            "sql script written"
        );
        Ok(())
    }
}
