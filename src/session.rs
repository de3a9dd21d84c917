use fastnum::{D128, dec128};

use crate::{
    domain::{Metrics, Transaction},
    engine,
    metrics::{self, YearlyBreakdown},
};

pub const DEFAULT_CURRENCY: &str = "ETH";
pub const DEFAULT_PRICE: D128 = dec128!(10000);

/// Everything the calculator knows at one point in time.
///
/// Changes only go through [`Session::update`]. Metrics are derived on
/// demand and never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub currency: String,
    pub current_price: D128,
    pub show_all_transactions: bool,
    pub transactions: Vec<Transaction>,
    pub error: Option<String>,
}

#[derive(Clone, Debug)]
pub enum Event {
    CurrencyChanged(String),
    PriceChanged(D128),
    ShowAllToggled,
    /// Raw contents of a selected CSV file.
    FileLoaded(Vec<u8>),
}

impl Default for Session {
    fn default() -> Self {
        Session {
            currency: DEFAULT_CURRENCY.to_owned(),
            current_price: DEFAULT_PRICE,
            show_all_transactions: false,
            transactions: Vec::new(),
            error: None,
        }
    }
}

impl Session {
    pub fn update(self, event: Event) -> Session {
        match event {
            Event::CurrencyChanged(currency) => Session {
                currency: currency.trim().to_uppercase(),
                ..self
            },
            Event::PriceChanged(current_price) => Session {
                current_price,
                ..self
            },
            Event::ShowAllToggled => Session {
                show_all_transactions: !self.show_all_transactions,
                ..self
            },
            Event::FileLoaded(contents) => self.load(&contents),
        }
    }

    /// Either replaces all transactions or keeps the previous ones and records the error.
    fn load(self, contents: &[u8]) -> Session {
        match engine::load_transactions(contents, &self.currency) {
            Ok(transactions) => Session {
                transactions,
                error: None,
                ..self
            },
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load transactions");
                Session {
                    error: Some(err.to_string()),
                    ..self
                }
            }
        }
    }

    pub fn metrics(&self) -> Metrics {
        metrics::calculate_metrics(&self.transactions, &self.currency, self.current_price)
    }

    pub fn transactions_by_year(&self) -> YearlyBreakdown {
        metrics::transactions_by_year(&self.transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SAMPLE_CSV;

    fn loaded() -> Session {
        Session::default().update(Event::FileLoaded(SAMPLE_CSV.as_bytes().to_vec()))
    }

    #[test]
    fn test_defaults() {
        let session = Session::default();
        assert_eq!(session.currency, "ETH");
        assert_eq!(session.current_price, dec128!(10000));
        assert!(session.transactions.is_empty());
        assert_eq!(session.error, None);
    }

    #[test]
    fn test_currency_is_upper_cased() {
        let session = Session::default().update(Event::CurrencyChanged("xbt".to_owned()));
        assert_eq!(session.currency, "XBT");
    }

    #[test]
    fn test_load_sample() {
        let session = loaded();
        assert_eq!(session.transactions.len(), 7);
        assert_eq!(session.error, None);
    }

    #[test]
    fn test_failed_load_keeps_previous_transactions() {
        let session = loaded();
        let previous = session.transactions.clone();

        let session = session
            .update(Event::CurrencyChanged("BTC".to_owned()))
            .update(Event::FileLoaded(SAMPLE_CSV.as_bytes().to_vec()));
        assert_eq!(
            session.error.as_deref(),
            Some("No BTC transactions found in the CSV file")
        );
        assert_eq!(session.transactions, previous);
    }

    #[test]
    fn test_malformed_file_reports_parser_error() {
        let session = Session::default()
            .update(Event::FileLoaded(b"Currency,Balance delta\nETH,1,2\n".to_vec()));
        let error = session.error.expect("load must fail");
        assert!(error.starts_with("Error parsing CSV: "), "{error}");
        assert!(session.transactions.is_empty());
    }

    #[test]
    fn test_successful_load_clears_error() {
        let session = Session::default()
            .update(Event::FileLoaded(b"Currency\nBTC\n".to_vec()))
            .update(Event::FileLoaded(SAMPLE_CSV.as_bytes().to_vec()));
        assert_eq!(session.error, None);
        assert_eq!(session.transactions.len(), 7);
    }

    #[test]
    fn test_price_change_recomputes_metrics() {
        let session = loaded();
        let before = session.metrics();

        let session = session.update(Event::PriceChanged(dec128!(20000)));
        let after = session.metrics();

        assert_eq!(after.total_amount, before.total_amount);
        assert_eq!(after.total_myr, before.total_myr);
        assert_eq!(after.current_value, before.current_value * dec128!(2));
        assert_eq!(after.current_value, dec128!(1706.935));
    }

    #[test]
    fn test_show_all_toggles() {
        let session = Session::default().update(Event::ShowAllToggled);
        assert!(session.show_all_transactions);
        assert!(!session.update(Event::ShowAllToggled).show_all_transactions);
    }
}
