//! Tabular import parsing
//!
//! Expects a CSV file with `Title`, `Description` and `Amount` columns
//! (header match is case-insensitive). Each row is validated on its own:
//! a missing title or a non-numeric/non-positive amount skips that row
//! and increments the skip count without touching the others.

use crate::error::CatalogError;
use grantflow_core::Amount;
use grantflow_ledger::NewSpendingItem;
use rust_decimal::Decimal;
use std::io::Read;
use std::str::FromStr;
use tracing::debug;

pub(crate) struct ParsedRows {
    pub items: Vec<NewSpendingItem>,
    pub skipped: usize,
}

pub(crate) fn parse_rows(data: impl Read) -> Result<ParsedRows, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let title_col = find_column(&headers, "title")?;
    let description_col = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("description"));
    let amount_col = find_column(&headers, "amount")?;

    let mut items = Vec::new();
    let mut skipped = 0usize;

    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(_) => {
                debug!(line, "skipping unreadable row");
                skipped += 1;
                continue;
            }
        };

        let title = record.get(title_col).unwrap_or("").trim();
        let raw_amount = record.get(amount_col).unwrap_or("").trim();
        let description = description_col
            .and_then(|col| record.get(col))
            .unwrap_or("")
            .trim();

        let amount = Decimal::from_str(raw_amount)
            .ok()
            .and_then(|value| Amount::new(value).ok())
            .filter(|amount| !amount.is_zero());

        match (title.is_empty(), amount) {
            (false, Some(amount)) => items.push(NewSpendingItem {
                title: title.to_string(),
                description: description.to_string(),
                amount,
            }),
            _ => {
                debug!(line, "skipping invalid row");
                skipped += 1;
            }
        }
    }

    Ok(ParsedRows { items, skipped })
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize, CatalogError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| CatalogError::Validation(format!("missing required column: {}", name)))
}
