//! Lots command - open lots remaining after all sales are matched

use crate::cmd::{read_purchases, read_sales};
use crate::hifo::{compute_hifo_gains, validate_quantities, Lot};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct LotsCommand {
    /// CSV file containing purchase lots
    #[arg(short, long)]
    purchases: PathBuf,

    /// CSV file containing sale events
    #[arg(short, long)]
    sales: PathBuf,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

impl LotsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let purchases = read_purchases(&self.purchases)?;
        let sales = read_sales(&self.sales)?;
        validate_quantities(&purchases, &sales)?;
        let report = compute_hifo_gains(&purchases, &sales)?;

        if self.json {
            self.print_json(&report.open_lots)
        } else {
            self.print_table(&report.open_lots);
            Ok(())
        }
    }

    fn print_table(&self, lots: &[Lot]) {
        if lots.is_empty() {
            println!("No open lots remain");
            return;
        }

        let rows: Vec<LotRow> = lots
            .iter()
            .map(|lot| LotRow {
                acquired: lot.acquired.format("%Y-%m-%d %H:%M").to_string(),
                remaining: format_quantity(lot.remaining),
                price: format!("${:.2}", lot.price),
                cost: format!("${:.2}", lot.remaining * lot.price),
            })
            .collect();

        println!();
        println!("OPEN LOTS");
        println!();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);

        let total: Decimal = lots.iter().map(|lot| lot.remaining).sum();
        println!();
        println!("Total remaining units: {}", format_quantity(total));
    }

    fn print_json(&self, lots: &[Lot]) -> anyhow::Result<()> {
        let total: Decimal = lots.iter().map(|lot| lot.remaining).sum();
        let output = LotsOutput {
            lot_count: lots.len(),
            total_remaining: format_quantity(total),
            lots: lots
                .iter()
                .map(|lot| LotView {
                    acquired: lot.acquired.format("%Y-%m-%dT%H:%M:%S").to_string(),
                    remaining: format_quantity(lot.remaining),
                    price: lot.price.to_string(),
                })
                .collect(),
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

#[derive(Debug, Tabled)]
struct LotRow {
    #[tabled(rename = "Acquired")]
    acquired: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Unit Price")]
    price: String,
    #[tabled(rename = "Cost")]
    cost: String,
}

#[derive(Debug, Serialize)]
struct LotsOutput {
    lot_count: usize,
    total_remaining: String,
    lots: Vec<LotView>,
}

#[derive(Debug, Serialize)]
struct LotView {
    acquired: String,
    remaining: String,
    price: String,
}

fn format_quantity(qty: Decimal) -> String {
    let s = format!("{:.8}", qty);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}
