use std::collections::BTreeMap;

use fastnum::{D128, dec128};

use crate::domain::{Metrics, Transaction, YearData};

/// Per-year subtotals, keyed by year in ascending order.
pub type YearlyBreakdown = BTreeMap<String, YearData>;

/// Values derived from a quantity and cost subtotal at a given price.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Valuation {
    pub average_price: D128,
    pub current_value: D128,
    pub profit: D128,
    pub roi_percentage: D128,
}

impl Valuation {
    /// Divisions by a zero quantity or a zero cost yield zero.
    pub fn new(total_amount: D128, total_myr: D128, current_price: D128) -> Self {
        let average_price = if total_amount.is_zero() {
            D128::ZERO
        } else {
            total_myr / total_amount
        };
        let current_value = total_amount * current_price;
        let profit = current_value - total_myr;
        let roi_percentage = if total_myr.is_zero() {
            D128::ZERO
        } else {
            profit / total_myr * dec128!(100)
        };

        Valuation {
            average_price,
            current_value,
            profit,
            roi_percentage,
        }
    }
}

pub fn calculate_metrics(
    transactions: &[Transaction],
    currency: &str,
    current_price: D128,
) -> Metrics {
    let (total_amount, total_myr) = totals(transactions);
    let valuation = Valuation::new(total_amount, total_myr, current_price);

    Metrics {
        currency: currency.to_owned(),
        total_amount,
        total_myr,
        average_price: valuation.average_price,
        current_value: valuation.current_value,
        profit: valuation.profit,
        roi_percentage: valuation.roi_percentage,
    }
}

/// Groups transactions by the year of their date. Undated transactions are left out.
pub fn transactions_by_year(transactions: &[Transaction]) -> YearlyBreakdown {
    let mut by_year = YearlyBreakdown::new();

    for tx in transactions {
        let Some(year) = tx.year() else {
            continue;
        };

        let data = by_year.entry(year.to_owned()).or_default();
        data.total_amount += tx.amount;
        data.total_myr += tx.myr;
        data.transactions.push(tx.clone());
    }

    by_year
}

impl YearData {
    /// Valuation of this year's subtotals alone.
    pub fn valuation(&self, current_price: D128) -> Valuation {
        Valuation::new(self.total_amount, self.total_myr, current_price)
    }
}

fn totals(transactions: &[Transaction]) -> (D128, D128) {
    transactions
        .iter()
        .fold((D128::ZERO, D128::ZERO), |(amount, myr), tx| {
            (amount + tx.amount, myr + tx.myr)
        })
}
