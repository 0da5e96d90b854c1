//! HIFO matching: each sale consumes the highest-priced open lots first,
//! and realized gain/loss accumulates under the calendar year of the sale.

use crate::hifo::pool::{Lot, LotPool};
use crate::records::{Purchase, Sale};
use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    /// More units sold than were ever purchased. Detected before matching;
    /// no figures are produced.
    #[error("total sold stock units ({sold}) are more than the total purchased stock units ({purchased})")]
    QuantityMismatch { sold: Decimal, purchased: Decimal },
    /// A sale still needed units but every lot was spent. Unreachable when
    /// the pre-check has run; kept as a hard guard against bad callers.
    #[error("purchase lots exhausted while matching the sale on {date}: {shortfall} units unmatched")]
    LotsExhausted {
        date: NaiveDateTime,
        shortfall: Decimal,
    },
}

/// One quantity chunk drawn from a lot to satisfy part of a sale.
#[derive(Debug, Clone, Copy)]
pub struct Fill {
    pub lot_acquired: NaiveDateTime,
    pub lot_price: Decimal,
    pub quantity: Decimal,
    pub gain: Decimal,
}

/// A fully matched sale with the fills that satisfied it. A sale spanning
/// several lots carries several fills, all landing in the same year.
#[derive(Debug, Clone)]
pub struct Disposal {
    pub date: NaiveDateTime,
    pub year: i32,
    pub quantity: Decimal,
    pub price: Decimal,
    pub gain: Decimal,
    pub fills: Vec<Fill>,
}

/// Result of a complete matching run.
#[derive(Debug)]
pub struct GainsReport {
    /// Realized gain/loss keyed by calendar year of sale.
    pub years: BTreeMap<i32, Decimal>,
    pub disposals: Vec<Disposal>,
    /// Lots with units left after all sales were matched.
    pub open_lots: Vec<Lot>,
}

impl GainsReport {
    /// Total gain/loss, optionally restricted to one calendar year.
    pub fn total_gain(&self, year: Option<i32>) -> Decimal {
        self.years
            .iter()
            .filter(|(y, _)| year.is_none_or(|f| **y == f))
            .map(|(_, gain)| *gain)
            .sum()
    }

    /// Gain for a single year; zero when no sale landed in it.
    #[allow(dead_code)]
    pub fn year_gain(&self, year: i32) -> Decimal {
        self.years.get(&year).copied().unwrap_or(Decimal::ZERO)
    }

    /// Write per-year rows to CSV.
    pub fn write_csv<W: Write>(&self, writer: W, year: Option<i32>) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for (y, gain) in self
            .years
            .iter()
            .filter(|(y, _)| year.is_none_or(|f| **y == f))
        {
            wtr.serialize(YearCsvRecord {
                year: *y,
                gain: format!("{:.2}", gain),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write per-fill rows to CSV with a running gain column.
    pub fn write_detailed_csv<W: Write>(&self, writer: W, year: Option<i32>) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut running_gain = Decimal::ZERO;

        for disposal in self
            .disposals
            .iter()
            .filter(|d| year.is_none_or(|f| d.year == f))
        {
            for fill in &disposal.fills {
                running_gain += fill.gain;
                wtr.serialize(FillCsvRecord {
                    sale_date: disposal.date.format("%Y-%m-%d %H:%M").to_string(),
                    year: disposal.year,
                    sale_price: fill_price(disposal.price),
                    lot_acquired: fill.lot_acquired.format("%Y-%m-%d %H:%M").to_string(),
                    lot_price: fill_price(fill.lot_price),
                    quantity: fill.quantity.to_string(),
                    gain: format!("{:.2}", fill.gain),
                    running_gain: format!("{:.2}", running_gain),
                })?;
            }
        }
        wtr.flush()?;
        Ok(())
    }
}

/// CSV record for per-year output
#[derive(Debug, Serialize)]
struct YearCsvRecord {
    year: i32,
    gain: String,
}

/// CSV record for per-fill output
#[derive(Debug, Serialize)]
struct FillCsvRecord {
    sale_date: String,
    year: i32,
    sale_price: String,
    lot_acquired: String,
    lot_price: String,
    quantity: String,
    gain: String,
    running_gain: String,
}

fn fill_price(price: Decimal) -> String {
    price.normalize().to_string()
}

/// Pre-check: refuse to match when the sales demand more units than the
/// purchase history holds.
pub fn validate_quantities(purchases: &[Purchase], sales: &[Sale]) -> Result<(), MatchError> {
    let purchased: Decimal = purchases.iter().map(|p| p.quantity).sum();
    let sold: Decimal = sales.iter().map(|s| s.quantity).sum();
    if sold > purchased {
        return Err(MatchError::QuantityMismatch { sold, purchased });
    }
    Ok(())
}

/// Match every sale against the purchase lots, highest price first.
///
/// Purchases are copied into an internal pool; the caller's records are
/// never mutated. Sales are processed in the order given, each one to
/// completion before the next. Either a complete report is returned or an
/// error; never partial figures.
pub fn compute_hifo_gains(
    purchases: &[Purchase],
    sales: &[Sale],
) -> Result<GainsReport, MatchError> {
    let mut pool = LotPool::new(purchases);
    let mut years: BTreeMap<i32, Decimal> = BTreeMap::new();
    let mut disposals = Vec::with_capacity(sales.len());

    for sale in sales {
        let year = sale.timestamp.year();
        let mut remaining = sale.quantity;
        let mut sale_gain = Decimal::ZERO;
        let mut fills = Vec::new();

        while remaining > Decimal::ZERO {
            let lot = match pool.peek_highest() {
                Some(lot) => *lot,
                None => {
                    return Err(MatchError::LotsExhausted {
                        date: sale.timestamp,
                        shortfall: remaining,
                    })
                }
            };

            let chunk = lot.remaining.min(remaining);
            let gain = (sale.price - lot.price) * chunk;
            log::debug!(
                "fill: {} units sold @ {} against lot @ {} acquired {}. Gain: {}",
                chunk,
                sale.price,
                lot.price,
                lot.acquired,
                gain
            );

            *years.entry(year).or_insert(Decimal::ZERO) += gain;
            sale_gain += gain;
            fills.push(Fill {
                lot_acquired: lot.acquired,
                lot_price: lot.price,
                quantity: chunk,
                gain,
            });

            pool.consume(chunk);
            remaining -= chunk;
        }

        disposals.push(Disposal {
            date: sale.timestamp,
            year,
            quantity: sale.quantity,
            price: sale.price,
            gain: sale_gain,
            fills,
        });
    }

    Ok(GainsReport {
        years,
        disposals,
        open_lots: pool.into_open_lots(),
    })
}
