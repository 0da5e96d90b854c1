//! Validate command - quantity pre-check without computing any gains

use crate::cmd::{read_purchases, read_sales};
use crate::hifo::validate_quantities;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// CSV file containing purchase lots
    #[arg(short, long)]
    purchases: PathBuf,

    /// CSV file containing sale events
    #[arg(short, long)]
    sales: PathBuf,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ValidationOutput {
    purchased_units: String,
    sold_units: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let purchases = read_purchases(&self.purchases)?;
        let sales = read_sales(&self.sales)?;

        let purchased: Decimal = purchases.iter().map(|p| p.quantity).sum();
        let sold: Decimal = sales.iter().map(|s| s.quantity).sum();
        let result = validate_quantities(&purchases, &sales);

        if self.json {
            let output = ValidationOutput {
                purchased_units: purchased.to_string(),
                sold_units: sold.to_string(),
                ok: result.is_ok(),
                message: result.as_ref().err().map(|e| e.to_string()),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Purchased units: {}", purchased);
            println!("Sold units:      {}", sold);
            match &result {
                Ok(()) => println!("\u{2713} Sales are covered by purchase history"),
                Err(err) => println!("\u{26A0} {}", err),
            }
        }

        // Exit with code 1 on mismatch
        if result.is_err() {
            std::process::exit(1);
        }
        Ok(())
    }
}
