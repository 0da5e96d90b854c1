//! Gains command - per-year realized gain/loss report

use crate::cmd::{read_purchases, read_sales};
use crate::hifo::{compute_hifo_gains, validate_quantities, GainsReport};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct GainsCommand {
    /// CSV file containing purchase lots
    #[arg(short, long)]
    purchases: PathBuf,

    /// CSV file containing sale events
    #[arg(short, long)]
    sales: PathBuf,

    /// Calendar year to report (e.g., 2022)
    #[arg(short, long)]
    year: Option<i32>,

    /// Output as CSV instead of formatted text
    #[arg(long)]
    csv: bool,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Show the per-lot fill breakdown
    #[arg(long)]
    detail: bool,
}

impl GainsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let purchases = read_purchases(&self.purchases)?;
        let sales = read_sales(&self.sales)?;
        validate_quantities(&purchases, &sales)?;
        let report = compute_hifo_gains(&purchases, &sales)?;

        if self.csv {
            if self.detail {
                report.write_detailed_csv(io::stdout(), self.year)
            } else {
                report.write_csv(io::stdout(), self.year)
            }
        } else if self.json {
            self.print_json(&report)
        } else {
            self.print_text(&report);
            if self.detail {
                self.print_detail(&report);
            }
            Ok(())
        }
    }

    fn print_text(&self, report: &GainsReport) {
        let mut printed = false;
        for (year, gain) in report
            .years
            .iter()
            .filter(|(y, _)| self.year.is_none_or(|f| **y == f))
        {
            println!("Year: {}, Capital gains/losses: ${:.2}", year, gain);
            printed = true;
        }
        if !printed {
            match self.year {
                Some(year) => println!("No gains or losses for {}", year),
                None => println!("No gains or losses"),
            }
        }
    }

    fn print_detail(&self, report: &GainsReport) {
        let rows: Vec<FillRow> = report
            .disposals
            .iter()
            .filter(|d| self.year.is_none_or(|f| d.year == f))
            .flat_map(|d| {
                d.fills.iter().map(move |f| FillRow {
                    sale_date: d.date.format("%Y-%m-%d %H:%M").to_string(),
                    sale_price: format_usd(d.price),
                    lot_acquired: f.lot_acquired.format("%Y-%m-%d %H:%M").to_string(),
                    lot_price: format_usd(f.lot_price),
                    quantity: format_quantity(f.quantity),
                    gain: format_usd_signed(f.gain),
                })
            })
            .collect();

        if rows.is_empty() {
            return;
        }

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!();
        println!("{}", table);
    }

    fn print_json(&self, report: &GainsReport) -> anyhow::Result<()> {
        let years: Vec<YearGainView> = report
            .years
            .iter()
            .filter(|(y, _)| self.year.is_none_or(|f| **y == f))
            .map(|(year, gain)| YearGainView {
                year: *year,
                gain: format!("{:.2}", gain),
            })
            .collect();

        let output = GainsOutput {
            total: format!("{:.2}", report.total_gain(self.year)),
            years,
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

#[derive(Debug, Tabled)]
struct FillRow {
    #[tabled(rename = "Sale Date")]
    sale_date: String,
    #[tabled(rename = "Sale Price")]
    sale_price: String,
    #[tabled(rename = "Lot Acquired")]
    lot_acquired: String,
    #[tabled(rename = "Lot Price")]
    lot_price: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Gain")]
    gain: String,
}

#[derive(Debug, Serialize)]
struct GainsOutput {
    total: String,
    years: Vec<YearGainView>,
}

#[derive(Debug, Serialize)]
struct YearGainView {
    year: i32,
    gain: String,
}

fn format_usd(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

fn format_usd_signed(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

fn format_quantity(qty: Decimal) -> String {
    let s = format!("{:.8}", qty);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}
