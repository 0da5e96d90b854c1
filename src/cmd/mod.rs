pub mod gains;
pub mod lots;
pub mod validate;

use crate::records::{self, Purchase, Sale};
use anyhow::Context;
use std::fs::File;
use std::path::Path;

/// Open and parse a purchases file.
pub fn read_purchases(path: &Path) -> anyhow::Result<Vec<Purchase>> {
    let file =
        File::open(path).with_context(|| format!("opening purchases file {}", path.display()))?;
    let purchases = records::read_purchases(file)
        .with_context(|| format!("reading purchases from {}", path.display()))?;
    Ok(purchases)
}

/// Open and parse a sales file.
pub fn read_sales(path: &Path) -> anyhow::Result<Vec<Sale>> {
    let file = File::open(path).with_context(|| format!("opening sales file {}", path.display()))?;
    let sales =
        records::read_sales(file).with_context(|| format!("reading sales from {}", path.display()))?;
    Ok(sales)
}
