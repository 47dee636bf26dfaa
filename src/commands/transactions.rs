// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::categorize::{RuleBook, override_category, override_deductible};
use crate::models::{Transaction, TransactionCategory};
use crate::store;
use crate::utils::{
    get_base_currency, maybe_print_json, parse_bool, parse_date, parse_decimal, pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;
use tracing::{debug, info};

pub fn handle(conn: &Connection, rules: &RuleBook, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, rules, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("suggest", sub)) => suggest(rules, sub)?,
        Some(("categorize", _)) => recategorize(conn, rules)?,
        Some(("set-category", sub)) => set_category(conn, sub)?,
        Some(("set-deductible", sub)) => set_deductible(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Categorize a new transaction: a pinned category counts as a user override,
/// otherwise the rule book decides.
pub fn classify(rules: &RuleBook, tx: &mut Transaction, pinned: Option<TransactionCategory>) {
    match pinned {
        Some(category) => {
            override_category(tx, category);
            tx.confidence = rules.confidence_for(&tx.merchant, category);
        }
        None => {
            rules.apply(tx);
        }
    }
}

fn add(conn: &Connection, rules: &RuleBook, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let merchant = sub.get_one::<String>("merchant").unwrap().trim();
    let description = sub.get_one::<String>("description").unwrap().trim();
    let is_income = sub.get_flag("income");
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => c.trim().to_uppercase(),
        None => get_base_currency(conn)?,
    };
    let pinned = sub
        .get_one::<String>("category")
        .map(|c| c.parse::<TransactionCategory>())
        .transpose()?;

    let mut tx = Transaction::new(date, amount, merchant, description, is_income)?
        .with_currency(currency)?;
    classify(rules, &mut tx, pinned);
    let id = store::insert_transaction(conn, &tx)?;
    info!(id, category = %tx.category, "transaction recorded");
    println!(
        "Recorded #{} {:.2} {} on {} at '{}' -> {} ({:.2})",
        id, tx.amount, tx.currency, tx.date, tx.merchant, tx.category, tx.confidence
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.map(|i| i.to_string()).unwrap_or_default(),
                    t.date.to_string(),
                    t.merchant.clone(),
                    if t.is_income { "in" } else { "out" }.to_string(),
                    format!("{:.2}", t.amount),
                    t.currency.clone(),
                    t.category.display_name().to_string(),
                    format!("{:.2}", t.confidence),
                    if t.is_tax_deductible { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "ID",
                    "Date",
                    "Merchant",
                    "Dir",
                    "Amount",
                    "CCY",
                    "Category",
                    "Conf",
                    "Deductible"
                ],
                rows,
            )
        );
    }
    Ok(())
}

/// Newest first, filtered by the `list` flags.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let from = sub
        .get_one::<String>("from")
        .map(|s| parse_date(s))
        .transpose()?;
    let to = sub
        .get_one::<String>("to")
        .map(|s| parse_date(s))
        .transpose()?;
    let category = sub
        .get_one::<String>("category")
        .map(|c| c.parse::<TransactionCategory>())
        .transpose()?;
    let limit = sub.get_one::<usize>("limit").copied();

    let rows = store::recent_transactions(conn, None)?
        .into_iter()
        .filter(|t| from.is_none_or(|d| t.date >= d))
        .filter(|t| to.is_none_or(|d| t.date <= d))
        .filter(|t| category.is_none_or(|c| t.category == c))
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    Ok(rows)
}

fn suggest(rules: &RuleBook, sub: &clap::ArgMatches) -> Result<()> {
    let merchant = sub.get_one::<String>("merchant").unwrap();
    let description = sub.get_one::<String>("description").unwrap();
    let result = rules.categorize(merchant, description);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &result)? {
        println!(
            "{} ({}) confidence {:.2}, deductible: {}",
            result.category,
            result.category.display_name(),
            result.confidence,
            if result.tax_deductible { "yes" } else { "no" }
        );
    }
    Ok(())
}

/// Returns how many stored transactions were re-derived.
pub fn recategorize_all(conn: &Connection, rules: &RuleBook) -> Result<usize> {
    let mut touched = 0;
    for mut tx in store::recent_transactions(conn, None)? {
        if rules.apply(&mut tx) {
            store::update_categorization(conn, &tx)?;
            touched += 1;
        } else {
            debug!(id = ?tx.id, "user override kept");
        }
    }
    Ok(touched)
}

fn recategorize(conn: &Connection, rules: &RuleBook) -> Result<()> {
    let n = recategorize_all(conn, rules)?;
    info!(updated = n, "recategorized transactions");
    println!("Re-categorized {} transactions", n);
    Ok(())
}

fn set_category(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let category = sub
        .get_one::<String>("category")
        .unwrap()
        .parse::<TransactionCategory>()?;
    let mut tx = store::get_transaction(conn, id)?;
    override_category(&mut tx, category);
    store::update_categorization(conn, &tx)?;
    println!(
        "Transaction #{} -> {} (deductible: {})",
        id,
        category,
        if tx.is_tax_deductible { "yes" } else { "no" }
    );
    Ok(())
}

fn set_deductible(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let value = parse_bool(sub.get_one::<String>("value").unwrap())?;
    let mut tx = store::get_transaction(conn, id)?;
    override_deductible(&mut tx, value);
    store::update_categorization(conn, &tx)?;
    println!("Transaction #{} deductible: {}", id, value);
    Ok(())
}
