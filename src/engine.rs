use std::collections::HashMap;

use color_eyre::eyre::{self, ensure, eyre};

use crate::domain::{CsvRow, Transaction};

/// Reads an exchange export and normalizes the rows of one currency.
///
/// The whole file is rejected on the first structural CSV error, and when no
/// row is in `currency`.
pub fn load_transactions(
    input: impl std::io::Read,
    currency: &str,
) -> eyre::Result<Vec<Transaction>> {
    let rows = read_rows(input)?;
    tracing::info!(rows = rows.len(), "Parsed CSV");
    normalize(&rows, currency)
}

pub fn read_rows(input: impl std::io::Read) -> eyre::Result<Vec<CsvRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    reader
        .deserialize::<CsvRow>()
        .map(|result| result.map_err(|err| eyre!("Error parsing CSV: {err}")))
        .collect()
}

/// Keeps the rows in `currency` and merges every reference group into one
/// transaction.
///
/// Rows without a reference stand alone. Groups come out in the order they
/// first appear.
pub fn normalize(rows: &[CsvRow], currency: &str) -> eyre::Result<Vec<Transaction>> {
    let rows: Vec<&CsvRow> = rows
        .iter()
        .filter(|row| row.matches_currency(currency))
        .collect();

    ensure!(
        !rows.is_empty(),
        "No {} transactions found in the CSV file",
        currency.to_uppercase()
    );

    let mut groups: Vec<Vec<&CsvRow>> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        match row.reference() {
            Some(reference) => match group_index.get(reference) {
                Some(&index) => groups[index].push(row),
                None => {
                    group_index.insert(reference, groups.len());
                    groups.push(vec![row]);
                }
            },
            None => groups.push(vec![row]),
        }
    }

    let mut transactions = Vec::with_capacity(groups.len());
    for group in &groups {
        merge_group(group, &mut transactions);
    }

    tracing::info!(
        currency,
        groups = groups.len(),
        transactions = transactions.len(),
        "Normalized transactions"
    );
    Ok(transactions)
}

fn merge_group(group: &[&CsvRow], out: &mut Vec<Transaction>) {
    let Some(principal_index) = group.iter().position(|row| !row.is_fee()) else {
        tracing::debug!(rows = group.len(), "Group has no principal trade");
        out.extend(group.iter().map(|row| Transaction::standalone_fee(row)));
        return;
    };

    let fees: Vec<&CsvRow> = group
        .iter()
        .enumerate()
        .filter(|&(index, _)| index != principal_index)
        .map(|(_, &row)| row)
        .collect();

    out.push(Transaction::merged(group[principal_index], &fees));
}
