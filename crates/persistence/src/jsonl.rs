//! JSON lines rendering; field names follow the downstream table columns.

use crate::sql::{sql_decimal, sql_timestamp};
use seed_core::{DeliveryRecord, EmitError, RecordSink, SaleTransaction};
use serde_json::{json, Value};
use std::io::Write;

pub fn sale_json(sale: &SaleTransaction) -> Value {
    json!({
        "table": "sold",
        "id": sale.id.to_string(),
        "variant_id": sale.variant_id.to_string(),
        "product_id": sale.product_id.to_string(),
        "product_name": sale.product_name,
        "price": sql_decimal(sale.price),
        "quantity": sale.quantity,
        "margin": sql_decimal(sale.margin),
        "stock_remaining": sale.stock_remaining,
        "date": sql_timestamp(sale.sold_at),
    })
}

pub fn delivery_json(delivery: &DeliveryRecord) -> Value {
    json!({
        "table": "delivery",
        "id": delivery.id.to_string(),
        "event_id": delivery.event_id.to_string(),
        "variant_id": delivery.variant_id.to_string(),
        "delivered_quantity": delivery.delivered_quantity,
        "delivered_at": sql_timestamp(delivery.delivered_at),
    })
}

/// Writes one JSON object per record.
pub struct JsonLinesWriter<W: Write> {
    out: W,
    include_deliveries: bool,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            include_deliveries: false,
        }
    }

    pub fn with_deliveries(mut self, include: bool) -> Self {
        self.include_deliveries = include;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, value: &Value) -> Result<(), EmitError> {
        serde_json::to_writer(&mut self.out, value).map_err(|e| EmitError::Encode(e.to_string()))?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> RecordSink for JsonLinesWriter<W> {
    fn record_sale(&mut self, sale: SaleTransaction) -> Result<(), EmitError> {
        self.write_line(&sale_json(&sale))
    }

    fn record_delivery(&mut self, delivery: DeliveryRecord) -> Result<(), EmitError> {
        if self.include_deliveries {
            self.write_line(&delivery_json(&delivery))?;
        }
        Ok(())
    }

    fn finish(&mut self, _run: &seed_core::RunConfig) -> Result<(), EmitError> {
        self.out.flush()?;
        Ok(())
    }
}
