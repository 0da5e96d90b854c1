//! Lot pool: open purchase lots ordered for highest-price-first retrieval.

use crate::records::Purchase;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::binary_heap::{BinaryHeap, PeekMut};

/// An open purchase lot. `remaining` only ever decreases; once it reaches
/// exactly zero the lot is dropped from the pool and never revisited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lot {
    pub acquired: NaiveDateTime,
    pub remaining: Decimal,
    pub price: Decimal,
}

struct Entry {
    lot: Lot,
    /// Insertion index. Equal-price ties resolve to the earlier input row,
    /// so runs over the same data are reproducible.
    seq: usize,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lot
            .price
            .cmp(&other.lot.price)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Max-oriented pool of open lots keyed by unit price.
#[derive(Default)]
pub struct LotPool {
    heap: BinaryHeap<Entry>,
}

impl LotPool {
    /// Build a pool from purchase records. The caller's records are copied,
    /// never mutated. Zero-quantity purchases carry no sellable units and
    /// are not admitted.
    pub fn new(purchases: &[Purchase]) -> Self {
        let heap = purchases
            .iter()
            .enumerate()
            .filter(|(_, p)| p.quantity > Decimal::ZERO)
            .map(|(seq, p)| Entry {
                lot: Lot {
                    acquired: p.timestamp,
                    remaining: p.quantity,
                    price: p.price,
                },
                seq,
            })
            .collect();
        LotPool { heap }
    }

    /// The highest-priced open lot, or `None` when the pool is exhausted.
    pub fn peek_highest(&self) -> Option<&Lot> {
        self.heap.peek().map(|entry| &entry.lot)
    }

    /// Reduce the current highest lot by `quantity`. The caller guarantees
    /// `quantity <= lot.remaining`; a lot drained to exactly zero is closed.
    pub fn consume(&mut self, quantity: Decimal) {
        if let Some(mut top) = self.heap.peek_mut() {
            debug_assert!(quantity <= top.lot.remaining);
            top.lot.remaining -= quantity;
            log::debug!(
                "pool CONSUME: {} units from lot @ {} acquired {}. Remaining: {}",
                quantity,
                top.lot.price,
                top.lot.acquired,
                top.lot.remaining
            );
            if top.lot.remaining.is_zero() {
                let closed = PeekMut::pop(top);
                log::debug!(
                    "pool CLOSE: lot @ {} acquired {}",
                    closed.lot.price,
                    closed.lot.acquired
                );
            }
        }
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Units still available across all open lots.
    #[allow(dead_code)]
    pub fn total_remaining(&self) -> Decimal {
        self.heap.iter().map(|entry| entry.lot.remaining).sum()
    }

    /// Drain the pool into the remaining open lots, oldest acquisition first.
    pub fn into_open_lots(self) -> Vec<Lot> {
        let mut lots: Vec<Lot> = self.heap.into_iter().map(|entry| entry.lot).collect();
        lots.sort_by_key(|lot| lot.acquired);
        lots
    }
}
