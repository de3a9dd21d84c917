use chrono::{DateTime, NaiveDate, NaiveDateTime};
use fastnum::D128;
use serde::{Deserialize, Deserializer};

use crate::domain::{CsvRow, Transaction, TransactionKind};

const DATE_FORMAT: &str = "%d/%m/%Y, %H:%M";

const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Reads a numeric column, falling back to zero for empty or malformed values.
pub(super) fn lenient_decimal<'de, D>(deserializer: D) -> Result<D128, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_decimal(&raw))
}

pub(crate) fn parse_decimal(raw: &str) -> D128 {
    let raw = raw.trim();
    if raw.is_empty() {
        return D128::ZERO;
    }

    match raw.parse::<D128>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            tracing::debug!(value = raw, "Unreadable number, using zero");
            D128::ZERO
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.naive_utc());
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

impl CsvRow {
    pub fn is_fee(&self) -> bool {
        self.description.to_lowercase().contains("fee")
    }

    pub fn matches_currency(&self, currency: &str) -> bool {
        self.currency.trim().eq_ignore_ascii_case(currency.trim())
    }

    /// The timestamp as `DD/MM/YYYY, HH:MM`, or an empty string if it can't be read.
    pub fn formatted_date(&self) -> String {
        let raw = self.timestamp.trim();
        if raw.is_empty() {
            return String::new();
        }

        match parse_timestamp(raw) {
            Some(timestamp) => timestamp.format(DATE_FORMAT).to_string(),
            None => {
                tracing::warn!(timestamp = raw, "Unreadable timestamp, leaving date empty");
                String::new()
            }
        }
    }

    pub fn reference(&self) -> Option<&str> {
        let reference = self.reference.trim();
        (!reference.is_empty()).then_some(reference)
    }

    fn display_description(&self) -> String {
        if self.description.trim().is_empty() {
            "Transaction".to_owned()
        } else {
            self.description.clone()
        }
    }
}

impl TransactionKind {
    /// Classifies a principal trade by the sign of its balance delta.
    pub fn from_delta(delta: D128) -> Self {
        if delta > D128::ZERO {
            TransactionKind::Buy
        } else if delta < D128::ZERO {
            TransactionKind::Sell
        } else {
            TransactionKind::Other
        }
    }
}

impl Transaction {
    /// Folds the fee rows of a reference group into its principal trade.
    pub fn merged(principal: &CsvRow, fees: &[&CsvRow]) -> Self {
        let (fee_amount, fee_myr) = fees
            .iter()
            .fold((D128::ZERO, D128::ZERO), |(amount, myr), fee| {
                (amount + fee.balance_delta, myr + fee.value_amount)
            });

        let kind = TransactionKind::from_delta(principal.balance_delta);
        let myr = match kind {
            TransactionKind::Sell => -principal.value_amount - fee_myr,
            _ => principal.value_amount + fee_myr,
        };

        Transaction {
            date: principal.formatted_date(),
            description: principal.display_description(),
            amount: principal.balance_delta + fee_amount,
            myr,
            kind,
            reference: principal.reference().map(str::to_owned),
        }
    }

    /// A row that belongs to no trade, taken as-is.
    pub fn standalone_fee(row: &CsvRow) -> Self {
        Transaction {
            date: row.formatted_date(),
            description: row.display_description(),
            amount: row.balance_delta,
            myr: row.value_amount,
            kind: TransactionKind::Fee,
            reference: row.reference().map(str::to_owned),
        }
    }

    /// The year component of the formatted date, if there is one.
    pub fn year(&self) -> Option<&str> {
        let day = self.date.split(", ").next()?;
        day.split('/').nth(2).filter(|year| !year.is_empty())
    }
}
