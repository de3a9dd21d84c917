use std::io::{self, Write};

use fastnum::D128;

use crate::{
    domain::{Metrics, Transaction, TransactionKind},
    metrics::YearlyBreakdown,
    session::Session,
};

pub const SAMPLE_FILE_NAME: &str = "sample_luno_transactions.csv";

/// Four purchases and the trading fees charged on the first three.
pub const SAMPLE_CSV: &str = "\
Wallet ID,Row,Timestamp (UTC),Description,Currency,Balance delta,Available balance delta,Balance,Available balance,Cryptocurrency transaction ID,Cryptocurrency address,Value currency,Value amount,Reference
9061778909545963731,1,2021-11-18T16:46:00Z,\"Bought 0.0119 ETH/MYR @ 17,140\",ETH,0.0119,0.0119,0.0119,0.0119,,,MYR,203.96,
9061778909545963731,2,2021-11-18T16:46:00Z,Trading fee,ETH,-0.00002975,-0.00002975,0.01187025,0.01187025,,,MYR,0.51,
9061778909545963731,3,2021-11-18T16:46:00Z,\"Bought 0.0172 ETH/MYR @ 17,140\",ETH,0.0172,0.0172,0.02907025,0.02907025,,,MYR,294.80,
9061778909545963731,4,2021-11-18T16:46:00Z,Trading fee,ETH,-0.000043,-0.000043,0.02902725,0.02902725,,,MYR,0.74,
9061778909545963731,5,2021-12-29T23:21:00Z,\"Bought 0.0322 ETH/MYR @ 15,480\",ETH,0.0322,0.0322,0.06122725,0.06122725,,,MYR,498.45,
9061778909545963731,6,2021-12-29T23:21:00Z,Trading fee,ETH,-0.0000805,-0.0000805,0.06114675,0.06114675,,,MYR,1.25,
9061778909545963731,7,2022-01-25T16:17:00Z,\"Bought 0.0242 ETH/MYR @ 10,299\",ETH,0.0242,0.0242,0.08534675,0.08534675,,,MYR,249.23,";

const REQUIRED_COLUMNS: &str =
    "Timestamp (UTC), Description, Currency, Balance delta, Value amount";

/// Formats a number with comma thousands separators and a fixed number of decimals.
pub fn format_number(value: D128, decimals: usize) -> String {
    let value: f64 = value.to_string().parse().unwrap_or(0.0);
    let fixed = format!("{:.*}", decimals, value.abs());

    let (integer, fraction) = match fixed.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + integer.len() / 3 + 1);
    if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        grouped.push('-');
    }
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    grouped
}

/// Shows XBT under its common ticker.
pub fn display_currency(currency: &str) -> &str {
    if currency.eq_ignore_ascii_case("XBT") {
        "BTC"
    } else {
        currency
    }
}

/// Renders every section the session currently has data for.
pub fn render(session: &Session, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Cryptocurrency Investment Calculator")?;
    writeln!(out, "Currency: {}", session.currency)?;
    writeln!(out)?;

    render_upload_status(session, out)?;

    if session.transactions.is_empty() {
        return Ok(());
    }

    let metrics = session.metrics();
    writeln!(out)?;
    render_summary(&metrics, out)?;
    writeln!(out)?;
    render_roi(&metrics, session.current_price, out)?;

    let by_year = session.transactions_by_year();
    if !by_year.is_empty() {
        writeln!(out)?;
        render_yearly_breakdown(&by_year, session.current_price, &session.currency, out)?;
    }

    writeln!(out)?;
    render_transaction_history(
        &session.transactions,
        session.show_all_transactions,
        &session.currency,
        out,
    )
}

fn render_upload_status(session: &Session, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Upload Your Data")?;
    if let Some(error) = &session.error {
        writeln!(out, "  Error: {error}")?;
    }
    if session.transactions.is_empty() {
        writeln!(out, "  No data loaded yet. Please upload a CSV file.")?;
    } else {
        writeln!(out, "  {} transactions loaded", session.transactions.len())?;
    }
    writeln!(out, "  CSV should include columns: {REQUIRED_COLUMNS}")
}

fn render_summary(metrics: &Metrics, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Investment Summary")?;
    writeln!(
        out,
        "  Total {currency}:              {} {currency}",
        format_number(metrics.total_amount, 8),
        currency = metrics.currency,
    )?;
    writeln!(
        out,
        "  Total Investment:       MYR {}",
        format_number(metrics.total_myr, 2)
    )?;
    writeln!(
        out,
        "  Average Purchase Price: MYR {}/{}",
        format_number(metrics.average_price, 2),
        metrics.currency
    )
}

fn render_roi(metrics: &Metrics, current_price: D128, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Return on Investment")?;
    writeln!(
        out,
        "  Current {} Price (MYR): {}",
        metrics.currency,
        format_number(current_price, 2)
    )?;
    writeln!(
        out,
        "  Current Value:          MYR {}",
        format_number(metrics.current_value, 2)
    )?;
    writeln!(
        out,
        "  Profit/Loss:            MYR {}",
        format_number(metrics.profit, 2)
    )?;
    writeln!(
        out,
        "  ROI:                    {}%",
        format_number(metrics.roi_percentage, 2)
    )
}

fn render_yearly_breakdown(
    by_year: &YearlyBreakdown,
    current_price: D128,
    currency: &str,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "Yearly Breakdown")?;
    writeln!(
        out,
        "  {:<6} {:>6} {:>18} {:>16} {:>16} {:>16} {:>10}",
        "Year",
        "Trades",
        format!("{} Purchased", display_currency(currency)),
        "MYR Spent",
        "Avg. Price",
        "Current Value",
        "ROI"
    )?;

    for (year, data) in by_year {
        let valuation = data.valuation(current_price);
        writeln!(
            out,
            "  {:<6} {:>6} {:>18} {:>16} {:>16} {:>16} {:>10}",
            year,
            data.transactions.len(),
            format_number(data.total_amount, 8),
            format!("MYR {}", format_number(data.total_myr, 2)),
            format!("MYR {}", format_number(valuation.average_price, 2)),
            format!("MYR {}", format_number(valuation.current_value, 2)),
            format!("{}%", format_number(valuation.roi_percentage, 2)),
        )?;
    }

    Ok(())
}

fn render_transaction_history(
    transactions: &[Transaction],
    show_all: bool,
    currency: &str,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "Transaction History")?;
    if !show_all {
        return writeln!(
            out,
            "  {} transactions hidden, show all to list them",
            transactions.len()
        );
    }

    writeln!(
        out,
        "  {:<18} {:<34} {:<6} {:>16} {:>26}  {}",
        "Date",
        "Description",
        "Type",
        format!("{currency} Amount"),
        "MYR Value",
        "Reference"
    )?;
    for tx in transactions {
        writeln!(
            out,
            "  {:<18} {:<34} {:<6} {:>16} {:>26}  {}",
            tx.date,
            tx.description,
            tx.kind,
            format_number(tx.amount, 8),
            myr_value(tx),
            tx.reference.as_deref().unwrap_or("-")
        )?;
    }

    Ok(())
}

fn myr_value(tx: &Transaction) -> String {
    let value = format!("MYR {}", format_number(tx.myr.abs(), 2));
    match tx.kind {
        TransactionKind::Buy => format!("{value} (cost)"),
        TransactionKind::Sell if tx.myr < D128::ZERO => format!("{value} (proceeds)"),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use fastnum::dec128;

    use super::*;
    use crate::session::Event;

    fn rendered(session: &Session) -> String {
        let mut out = Vec::new();
        render(session, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(dec128!(0), 2), "0.00");
        assert_eq!(format_number(dec128!(1234567.891), 2), "1,234,567.89");
        assert_eq!(format_number(dec128!(999.999), 2), "1,000.00");
        assert_eq!(format_number(dec128!(-7.23), 2), "-7.23");
        assert_eq!(format_number(dec128!(-0.001), 2), "0.00");
        assert_eq!(format_number(dec128!(0.08534675), 8), "0.08534675");
        assert_eq!(format_number(dec128!(123456), 0), "123,456");
    }

    #[test]
    fn test_display_currency() {
        assert_eq!(display_currency("XBT"), "BTC");
        assert_eq!(display_currency("xbt"), "BTC");
        assert_eq!(display_currency("ETH"), "ETH");
    }

    #[test]
    fn test_myr_value() {
        let mut tx = Transaction {
            date: String::new(),
            description: "Sold".to_owned(),
            amount: dec128!(-0.0501),
            myr: dec128!(-502),
            kind: TransactionKind::Sell,
            reference: None,
        };
        assert_eq!(myr_value(&tx), "MYR 502.00 (proceeds)");

        tx.kind = TransactionKind::Buy;
        tx.myr = dec128!(1203.5);
        assert_eq!(myr_value(&tx), "MYR 1,203.50 (cost)");

        tx.kind = TransactionKind::Fee;
        tx.myr = dec128!(0.51);
        assert_eq!(myr_value(&tx), "MYR 0.51");
    }

    #[test]
    fn test_render_empty_session() {
        let output = rendered(&Session::default());
        assert!(output.contains("No data loaded yet. Please upload a CSV file."));
        assert!(!output.contains("Investment Summary"));
    }

    #[test]
    fn test_render_sample() {
        let session = Session::default().update(Event::FileLoaded(SAMPLE_CSV.as_bytes().to_vec()));
        let output = rendered(&session);

        assert!(output.contains("7 transactions loaded"));
        assert!(output.contains("Total Investment:       MYR 1,248.94"));
        assert!(output.contains("0.08534675 ETH"));
        assert!(output.contains("Yearly Breakdown"));
        assert!(output.contains("2021"));
        assert!(output.contains("2022"));
        assert!(output.contains("7 transactions hidden"));
        assert!(!output.contains("(cost)"));
    }

    #[test]
    fn test_render_all_transactions() {
        let session = Session::default()
            .update(Event::FileLoaded(SAMPLE_CSV.as_bytes().to_vec()))
            .update(Event::ShowAllToggled);
        let output = rendered(&session);

        assert!(output.contains("MYR 203.96 (cost)"));
        assert!(output.contains("18/11/2021, 16:46"));
        assert!(output.contains("Trading fee"));
    }

    #[test]
    fn test_render_error() {
        let session = Session::default()
            .update(Event::CurrencyChanged("btc".to_owned()))
            .update(Event::FileLoaded(SAMPLE_CSV.as_bytes().to_vec()));
        let output = rendered(&session);

        assert!(output.contains("Error: No BTC transactions found in the CSV file"));
        assert!(output.contains("Currency: BTC"));
    }
}
