//! Formatting Helpers
//!
//! Pure text rendering for amounts, dates and timestamps. Kept separate
//! from any widget code so view-models can be unit-tested headless.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Transaction, TransactionKind};

/// Format an amount in tenge with thousands separators, e.g. `250,000 ₸`.
///
/// Whole amounts render without a fractional part; anything else keeps
/// two decimal places.
pub fn format_tenge(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as i64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let grouped = group_thousands(whole);
    let body = if fraction == 0 {
        format!("{grouped} ₸")
    } else {
        format!("{grouped}.{fraction:02} ₸")
    };

    if negative {
        format!("-{body}")
    } else {
        body
    }
}

/// Format a transaction amount with an explicit sign, e.g. `+420,000 ₸`.
pub fn format_signed_amount(tx: &Transaction) -> String {
    let body = format_tenge(tx.amount.abs());
    match tx.kind {
        TransactionKind::Credit => format!("+{body}"),
        TransactionKind::Debit => format!("-{body}"),
    }
}

/// Format a date as `dd.mm.yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Format a timestamp as `dd.mm.yyyy hh:mm` (UTC).
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%d.%m.%Y %H:%M").to_string()
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let bytes = digits.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*b as char);
    }
    out
}
