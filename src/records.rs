use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::io::Read;
use std::str::FromStr;
use thiserror::Error;

/// Timestamp pattern used by both input files, e.g. `3/1/21 9:30`.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%y %H:%M";

/// Error reading a purchase or sale file. `row` is the 1-based data row,
/// not counting the header.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("row {row}: expected 3 columns (timestamp,quantity,price), got {found}")]
    MissingColumns { row: usize, found: usize },
    #[error("row {row}: invalid timestamp {value:?} (expected M/d/yy H:mm)")]
    Timestamp {
        row: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("row {row}: invalid number {value:?}")]
    Number {
        row: usize,
        value: String,
        #[source]
        source: rust_decimal::Error,
    },
    #[error("row {row}: quantity cannot be negative")]
    NegativeQuantity { row: usize },
}

/// A purchase lot as read from input: acquisition time, units bought, and
/// unit price paid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Purchase {
    pub timestamp: NaiveDateTime,
    pub quantity: Decimal,
    pub price: Decimal,
}

/// A sale event: sale time, units sold, and unit sale price. Read-only
/// input to the matcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sale {
    pub timestamp: NaiveDateTime,
    pub quantity: Decimal,
    pub price: Decimal,
}

/// Read purchase lots from CSV.
pub fn read_purchases<R: Read>(reader: R) -> Result<Vec<Purchase>, RecordError> {
    let rows = read_rows(reader)?;
    Ok(rows
        .into_iter()
        .map(|(timestamp, quantity, price)| Purchase {
            timestamp,
            quantity,
            price,
        })
        .collect())
}

/// Read sale events from CSV.
pub fn read_sales<R: Read>(reader: R) -> Result<Vec<Sale>, RecordError> {
    let rows = read_rows(reader)?;
    Ok(rows
        .into_iter()
        .map(|(timestamp, quantity, price)| Sale {
            timestamp,
            quantity,
            price,
        })
        .collect())
}

/// Both files share the same three-column shape. The header row is skipped
/// without being inspected, matching the existing file convention.
fn read_rows<R: Read>(reader: R) -> Result<Vec<(NaiveDateTime, Decimal, Decimal)>, RecordError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let record = result?;
        if record.len() < 3 {
            return Err(RecordError::MissingColumns {
                row,
                found: record.len(),
            });
        }
        let timestamp = NaiveDateTime::parse_from_str(record[0].trim(), TIMESTAMP_FORMAT)
            .map_err(|source| RecordError::Timestamp {
                row,
                value: record[0].to_string(),
                source,
            })?;
        let quantity = parse_decimal(&record[1], row)?;
        let price = parse_decimal(&record[2], row)?;
        if quantity < Decimal::ZERO {
            return Err(RecordError::NegativeQuantity { row });
        }
        rows.push((timestamp, quantity, price));
    }
    Ok(rows)
}

fn parse_decimal(value: &str, row: usize) -> Result<Decimal, RecordError> {
    Decimal::from_str(value.trim()).map_err(|source| RecordError::Number {
        row,
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use rust_decimal_macros::dec;

    #[test]
    fn parse_purchases_csv() {
        let csv_data = "\
timestamp,quantity,price
3/1/21 9:30,10,100
6/15/21 14:00,5,200.50";

        let purchases = read_purchases(csv_data.as_bytes()).unwrap();
        assert_eq!(purchases.len(), 2);

        assert_eq!(purchases[0].timestamp.year(), 2021);
        assert_eq!(purchases[0].timestamp.month(), 3);
        assert_eq!(purchases[0].timestamp.hour(), 9);
        assert_eq!(purchases[0].quantity, dec!(10));
        assert_eq!(purchases[0].price, dec!(100));

        assert_eq!(purchases[1].quantity, dec!(5));
        assert_eq!(purchases[1].price, dec!(200.50));
    }

    #[test]
    fn parse_sales_csv() {
        let csv_data = "\
timestamp,quantity,price
2/1/22 10:00,12,150";

        let sales = read_sales(csv_data.as_bytes()).unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].timestamp.year(), 2022);
        assert_eq!(sales[0].quantity, dec!(12));
        assert_eq!(sales[0].price, dec!(150));
    }

    #[test]
    fn header_skipped_regardless_of_content() {
        // The first line is dropped unread, whatever it says.
        let csv_data = "\
Date,Units,Cost
3/1/21 9:30,10,100";

        let purchases = read_purchases(csv_data.as_bytes()).unwrap();
        assert_eq!(purchases.len(), 1);
    }

    #[test]
    fn single_digit_date_fields() {
        let csv_data = "\
timestamp,quantity,price
1/2/21 7:05,1,50";

        let purchases = read_purchases(csv_data.as_bytes()).unwrap();
        assert_eq!(purchases[0].timestamp.month(), 1);
        assert_eq!(purchases[0].timestamp.day(), 2);
        assert_eq!(purchases[0].timestamp.hour(), 7);
        assert_eq!(purchases[0].timestamp.minute(), 5);
    }

    #[test]
    fn invalid_timestamp_reports_row() {
        let csv_data = "\
timestamp,quantity,price
3/1/21 9:30,10,100
not-a-date,5,200";

        let err = read_purchases(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, RecordError::Timestamp { row: 2, .. }));
    }

    #[test]
    fn invalid_number_reports_row() {
        let csv_data = "\
timestamp,quantity,price
3/1/21 9:30,ten,100";

        let err = read_purchases(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, RecordError::Number { row: 1, .. }));
    }

    #[test]
    fn negative_quantity_rejected() {
        let csv_data = "\
timestamp,quantity,price
3/1/21 9:30,-10,100";

        let err = read_purchases(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, RecordError::NegativeQuantity { row: 1 }));
    }

    #[test]
    fn missing_column_rejected() {
        let csv_data = "\
timestamp,quantity,price
3/1/21 9:30,10";

        let err = read_purchases(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, RecordError::MissingColumns { row: 1, found: 2 }));
    }
}
