// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::classify;
use crate::engine::categorize::RuleBook;
use crate::models::{Transaction, TransactionCategory};
use crate::store;
use crate::utils::{get_base_currency, parse_bool, parse_date, parse_decimal};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &mut Connection, rules: &RuleBook, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let n = import_transactions(conn, rules, path)?;
            println!("Imported {} transactions from {}", n, path);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Columns: `date,merchant,amount,description,is_income[,category]`. A
/// non-empty category is stored as a user override. All rows or none.
pub fn import_transactions(conn: &mut Connection, rules: &RuleBook, path: &str) -> Result<usize> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;
    let currency = get_base_currency(conn)?;

    let tx = conn.transaction()?;
    let mut count = 0;
    for (idx, result) in rdr.records().enumerate() {
        let line = idx + 2;
        let rec = result?;
        let date_raw = rec.get(0).context("date missing")?.trim();
        let merchant = rec.get(1).context("merchant missing")?.trim();
        let amount_raw = rec.get(2).context("amount missing")?.trim();
        let description = rec.get(3).unwrap_or("").trim();
        let is_income = parse_bool(rec.get(4).unwrap_or(""))
            .with_context(|| format!("Invalid is_income on line {}", line))?;
        let pinned = rec
            .get(5)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<TransactionCategory>())
            .transpose()
            .with_context(|| format!("Invalid category on line {}", line))?;

        let date = parse_date(date_raw)
            .with_context(|| format!("Invalid transaction date '{}' on line {}", date_raw, line))?;
        let amount = parse_decimal(amount_raw)
            .with_context(|| format!("Invalid amount '{}' for {}", amount_raw, merchant))?;

        let mut record = Transaction::new(date, amount, merchant, description, is_income)
            .with_context(|| format!("Line {}", line))?
            .with_currency(currency.clone())?;
        classify(rules, &mut record, pinned);
        store::insert_transaction(&tx, &record)?;
        count += 1;
    }
    tx.commit()?;
    info!(path, count, "transactions imported");
    Ok(count)
}
