mod impls;

use std::fmt;

use fastnum::D128;
use serde::Deserialize;

/// One row of an exchange transaction export.
///
/// Every column is optional. Missing text fields are empty and missing or
/// malformed numbers are zero.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct CsvRow {
    #[serde(rename = "Timestamp (UTC)")]
    pub timestamp: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Balance delta", deserialize_with = "impls::lenient_decimal")]
    pub balance_delta: D128,
    #[serde(rename = "Value amount", deserialize_with = "impls::lenient_decimal")]
    pub value_amount: D128,
    #[serde(rename = "Reference")]
    pub reference: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Buy,
    Sell,
    Fee,
    Other,
}

/// A trade with its fees folded in, or a stand-alone row.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    /// `DD/MM/YYYY, HH:MM` in UTC, or empty when the timestamp was unreadable.
    pub date: String,
    pub description: String,
    /// Signed quantity of the selected currency.
    pub amount: D128,
    /// Signed fiat value. Positive for money spent, negative for proceeds.
    pub myr: D128,
    pub kind: TransactionKind,
    pub reference: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    pub currency: String,
    pub total_amount: D128,
    pub total_myr: D128,
    pub average_price: D128,
    pub current_value: D128,
    pub profit: D128,
    pub roi_percentage: D128,
}

/// Subtotals of all transactions dated in one calendar year.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct YearData {
    pub transactions: Vec<Transaction>,
    pub total_amount: D128,
    pub total_myr: D128,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            TransactionKind::Buy => "buy",
            TransactionKind::Sell => "sell",
            TransactionKind::Fee => "fee",
            TransactionKind::Other => "other",
        })
    }
}
