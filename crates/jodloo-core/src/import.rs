//! CSV transaction import
//!
//! Expected header: `Date,Type,Account,Category,Amount,Note`. The note column
//! may be missing entirely.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{NewTransaction, TransactionType};

/// Parse a CSV export into transactions, each tagged with an import hash
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<NewTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::Import(format!("Missing column: {}", name)))
    };
    let date_col = column("Date")?;
    let type_col = column("Type")?;
    let account_col = column("Account")?;
    let category_col = column("Category")?;
    let amount_col = column("Amount")?;
    let note_col = column("Note").ok();

    // Identical rows in one file are distinct transactions
    let mut seen: HashMap<String, u32> = HashMap::new();
    let mut transactions = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let row = line + 2;

        let date = parse_date(field(&record, date_col, "date", row)?)?;
        let kind: TransactionType = field(&record, type_col, "type", row)?
            .parse()
            .map_err(|e| Error::Import(format!("Row {}: {}", row, e)))?;
        let account = field(&record, account_col, "account", row)?.to_string();
        let category = field(&record, category_col, "category", row)?.to_string();
        if category.is_empty() {
            return Err(Error::Import(format!("Row {}: empty category", row)));
        }
        let amount = parse_amount(field(&record, amount_col, "amount", row)?)?.abs();
        let note = note_col
            .and_then(|col| record.get(col))
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty());

        let key = row_key(&date, kind, &category, amount, note.as_deref());
        let occurrence = seen.entry(key).or_insert(0);
        let import_hash = generate_hash(&date, kind, &category, amount, note.as_deref(), *occurrence);
        *occurrence += 1;

        transactions.push(NewTransaction {
            date,
            kind,
            account,
            category,
            amount,
            note,
            import_hash: Some(import_hash),
        });
    }

    debug!("Parsed {} CSV transactions", transactions.len());
    Ok(transactions)
}

fn field<'a>(record: &'a StringRecord, col: usize, name: &str, row: usize) -> Result<&'a str> {
    record
        .get(col)
        .ok_or_else(|| Error::Import(format!("Row {}: missing {}", row, name)))
}

fn row_key(
    date: &NaiveDate,
    kind: TransactionType,
    category: &str,
    amount: f64,
    note: Option<&str>,
) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        date,
        kind,
        category,
        amount.to_bits(),
        note.unwrap_or_default()
    )
}

/// Generate a unique hash for deduplication
fn generate_hash(
    date: &NaiveDate,
    kind: TransactionType,
    category: &str,
    amount: f64,
    note: Option<&str>,
    occurrence: u32,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(kind.as_str().as_bytes());
    hasher.update(category.as_bytes());
    hasher.update(amount.to_be_bytes());
    if let Some(note) = note {
        hasher.update(note.as_bytes());
    }
    hasher.update(occurrence.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Parse a date string in various formats
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%d-%m-%Y", // 15-01-2024
        "%m/%d/%Y", // 01/15/2024
        "%d/%m/%Y", // 15/01/2024
        "%m/%d/%y", // 01/15/24
        "%d %b %Y", // 15 Jan 2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', '₹', ',', ' '], "")
        .replace("Rs.", "")
        .replace('(', "-")
        .replace(')', "");

    let amount = cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))?;
    if !amount.is_finite() {
        return Err(Error::Import(format!("Unable to parse amount: {}", s)));
    }
    Ok(amount)
}
