//! Inventory ledger: per-variant on-hand stock threaded through a run.

use chrono::NaiveDate;
use seed_core::{Catalog, CatalogEntry, ReplenishmentEvent, VariantId};
use std::collections::BTreeMap;

/// Result of applying a replenishment event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StockChange {
    pub event: ReplenishmentEvent,
    pub before: u32,
    pub after: u32,
}

impl StockChange {
    /// Signed change in on-hand units.
    pub fn delta(&self) -> i64 {
        i64::from(self.after) - i64::from(self.before)
    }
}

/// Result of committing a sale against stock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commit {
    pub before: u32,
    pub committed: u32,
    pub after: u32,
}

/// Mutable on-hand stock per variant.
///
/// Also remembers the date of the last replenishment applied to each variant,
/// so re-checking the same day is a no-op and an event that fell on a day
/// without a sale is still honored on the next check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InventoryState {
    stock: BTreeMap<VariantId, u32>,
    applied_through: BTreeMap<VariantId, NaiveDate>,
}

impl InventoryState {
    /// Stock for every catalog entry set to its starting level (or the default).
    pub fn initialize(catalog: &Catalog) -> Self {
        let stock = catalog
            .iter()
            .map(|e| (e.variant.variant_id, e.starting_stock_or_default()))
            .collect();
        Self {
            stock,
            applied_through: BTreeMap::new(),
        }
    }

    /// Current on-hand units; untracked variants have none.
    pub fn stock(&self, id: &VariantId) -> u32 {
        self.stock.get(id).copied().unwrap_or(0)
    }

    /// Overwrite stock with the latest not-yet-applied event dated on or
    /// before `date`. Returns `None` when nothing is due.
    ///
    /// This is catch-up, not exact-date matching: an event dated on a day
    /// the ledger was not consulted (a gated or zero-demand day) lands on
    /// the next call. When several events are pending only the latest
    /// level is applied, since each one overwrites the previous.
    pub fn apply_due_replenishment(
        &mut self,
        entry: &CatalogEntry,
        date: NaiveDate,
    ) -> Option<StockChange> {
        let id = entry.variant.variant_id;
        let schedule = &entry.replenishments;
        let due = schedule.partition_point(|e| e.date <= date);
        let event = *schedule.get(due.checked_sub(1)?)?;
        if let Some(last) = self.applied_through.get(&id) {
            if *last >= event.date {
                return None;
            }
        }
        let slot = self.stock.entry(id).or_insert(0);
        let before = *slot;
        *slot = event.level;
        self.applied_through.insert(id, event.date);
        Some(StockChange {
            event,
            before,
            after: event.level,
        })
    }

    /// Commit up to `proposed` units, never more than on hand.
    pub fn clamp_and_commit(&mut self, id: VariantId, proposed: u32) -> Commit {
        let slot = self.stock.entry(id).or_insert(0);
        let before = *slot;
        let committed = proposed.min(before);
        *slot = before - committed;
        Commit {
            before,
            committed,
            after: *slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use seed_core::{PatternTag, ProductId, ProductVariant, DEFAULT_STARTING_STOCK};
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn entry(n: u128, starting_stock: Option<u32>, events: Vec<(NaiveDate, u32)>) -> CatalogEntry {
        CatalogEntry {
            variant: ProductVariant {
                variant_id: VariantId(Uuid::from_u128(n)),
                product_id: ProductId(Uuid::from_u128(n)),
                name: format!("Item {n}"),
                price: Decimal::new(999, 2),
                margin: Decimal::new(100, 2),
                pattern: PatternTag::Steady,
                daily_avg: 4.0,
                variance: 1.0,
            },
            starting_stock,
            replenishments: events
                .into_iter()
                .map(|(date, level)| ReplenishmentEvent { date, level })
                .collect(),
        }
    }

    #[test]
    fn initialize_uses_starting_stock_or_default() {
        let cat = Catalog::new(vec![entry(1, Some(150), vec![]), entry(2, None, vec![])]).unwrap();
        let state = InventoryState::initialize(&cat);
        assert_eq!(state.stock(&VariantId(Uuid::from_u128(1))), 150);
        assert_eq!(
            state.stock(&VariantId(Uuid::from_u128(2))),
            DEFAULT_STARTING_STOCK
        );
        assert_eq!(state.stock(&VariantId(Uuid::from_u128(3))), 0);
    }

    #[test]
    fn replenishment_overwrites_instead_of_adding() {
        let e = entry(1, Some(150), vec![(d(2024, 7, 2), 140)]);
        let cat = Catalog::new(vec![e.clone()]).unwrap();
        let mut state = InventoryState::initialize(&cat);
        let id = e.variant.variant_id;
        state.clamp_and_commit(id, 100);
        assert_eq!(state.stock(&id), 50);
        let change = state.apply_due_replenishment(&e, d(2024, 7, 2)).unwrap();
        assert_eq!(change.before, 50);
        assert_eq!(change.after, 140);
        assert_eq!(change.delta(), 90);
        assert_eq!(state.stock(&id), 140);
    }

    #[test]
    fn reapplying_same_day_is_idempotent() {
        let e = entry(1, Some(10), vec![(d(2024, 7, 2), 140)]);
        let cat = Catalog::new(vec![e.clone()]).unwrap();
        let mut state = InventoryState::initialize(&cat);
        assert!(state.apply_due_replenishment(&e, d(2024, 7, 2)).is_some());
        let once = state.clone();
        assert!(state.apply_due_replenishment(&e, d(2024, 7, 2)).is_none());
        assert_eq!(state, once);
    }

    #[test]
    fn nothing_due_before_first_event() {
        let e = entry(1, Some(10), vec![(d(2024, 7, 2), 140)]);
        let cat = Catalog::new(vec![e.clone()]).unwrap();
        let mut state = InventoryState::initialize(&cat);
        assert!(state.apply_due_replenishment(&e, d(2024, 7, 1)).is_none());
        assert_eq!(state.stock(&e.variant.variant_id), 10);

        let empty = entry(2, None, vec![]);
        assert!(state.apply_due_replenishment(&empty, d(2024, 7, 1)).is_none());
    }

    #[test]
    fn missed_event_applies_latest_on_next_check() {
        let e = entry(
            1,
            Some(10),
            vec![(d(2024, 7, 2), 140), (d(2024, 7, 4), 90), (d(2024, 7, 20), 300)],
        );
        let cat = Catalog::new(vec![e.clone()]).unwrap();
        let mut state = InventoryState::initialize(&cat);
        let change = state.apply_due_replenishment(&e, d(2024, 7, 6)).unwrap();
        assert_eq!(change.event.date, d(2024, 7, 4));
        assert_eq!(state.stock(&e.variant.variant_id), 90);
        assert!(state.apply_due_replenishment(&e, d(2024, 7, 19)).is_none());
        assert_eq!(
            state.apply_due_replenishment(&e, d(2024, 7, 20)).unwrap().after,
            300
        );
    }

    #[test]
    fn commit_clamps_to_on_hand() {
        let e = entry(1, Some(3), vec![]);
        let cat = Catalog::new(vec![e.clone()]).unwrap();
        let mut state = InventoryState::initialize(&cat);
        let id = e.variant.variant_id;
        let c = state.clamp_and_commit(id, 5);
        assert_eq!(c, Commit { before: 3, committed: 3, after: 0 });
        let c = state.clamp_and_commit(id, 5);
        assert_eq!(c.committed, 0);
        assert_eq!(state.stock(&id), 0);
    }

    proptest! {
        #[test]
        fn commits_never_overdraw(start in 0u32..1_000,
                                  proposals in proptest::collection::vec(0u32..200, 0..50)) {
            let e = entry(1, Some(start), vec![]);
            let cat = Catalog::new(vec![e.clone()]).unwrap();
            let mut state = InventoryState::initialize(&cat);
            let id = e.variant.variant_id;
            for p in proposals {
                let c = state.clamp_and_commit(id, p);
                prop_assert!(c.committed <= p);
                prop_assert!(c.committed <= c.before);
                prop_assert_eq!(c.after, c.before - c.committed);
                prop_assert_eq!(state.stock(&id), c.after);
            }
        }
    }
}
