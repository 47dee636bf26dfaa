// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use crate::commands::cashflow::trailing_totals;
use crate::engine::ledger::Period;
use crate::engine::round_money;
use crate::engine::tax::{CORPORATE_TAX_RATE, savings_for_status};
use crate::models::{Transaction, TransactionCategory};
use crate::store;
use crate::utils::{as_of, fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

const RECENT_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub business: String,
    pub currency: String,
    pub period: Period,
    pub total_balance: Decimal,
    /// Tax reserved against deductible spending.
    pub pending_balance: Decimal,
    pub available_balance: Decimal,
    /// Exemption savings on the window's income under the recorded status.
    pub estimated_tax_savings: Decimal,
    pub active_employees: usize,
    pub open_alerts: i64,
    pub pending_recommendations: i64,
    pub recent_transactions: Vec<Transaction>,
    pub spending_by_category: BTreeMap<TransactionCategory, Decimal>,
}

pub fn summary(conn: &Connection, today: NaiveDate) -> Result<Dashboard> {
    let profile = store::load_profile(conn)?;
    let period = Period::trailing_window(today);
    let totals = trailing_totals(conn, period)?;
    let total_balance = totals.net_cash_flow();
    let pending_balance = round_money(totals.tax_deductible * CORPORATE_TAX_RATE);
    let (open_alerts, pending_recommendations) = store::count_open_advice(conn)?;

    Ok(Dashboard {
        business: profile.name.clone(),
        currency: profile.currency.clone(),
        period,
        total_balance,
        pending_balance,
        available_balance: round_money(total_balance - pending_balance),
        estimated_tax_savings: savings_for_status(totals.total_income, profile.tax_status),
        active_employees: store::list_employees(conn, true)?.len(),
        open_alerts,
        pending_recommendations,
        recent_transactions: store::recent_transactions(conn, Some(RECENT_LIMIT))?,
        spending_by_category: totals.expenses_by_category,
    })
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let d = summary(conn, as_of(sub)?)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &d)? {
        return Ok(());
    }
    let ccy = d.currency.as_str();
    println!("{}: last 30 days ({})", d.business, d.period);
    let rows = vec![
        vec!["Total balance".into(), fmt_money(&d.total_balance, ccy)],
        vec!["Pending (tax reserve)".into(), fmt_money(&d.pending_balance, ccy)],
        vec!["Available".into(), fmt_money(&d.available_balance, ccy)],
        vec![
            "Estimated tax savings".into(),
            fmt_money(&d.estimated_tax_savings, ccy),
        ],
        vec!["Active employees".into(), d.active_employees.to_string()],
        vec!["Open alerts".into(), d.open_alerts.to_string()],
        vec![
            "Pending recommendations".into(),
            d.pending_recommendations.to_string(),
        ],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));

    if !d.spending_by_category.is_empty() {
        let rows = d
            .spending_by_category
            .iter()
            .map(|(c, v)| vec![c.display_name().to_string(), format!("{:.2}", v)])
            .collect();
        println!("{}", pretty_table(&["Category", "Spent"], rows));
    }
    if !d.recent_transactions.is_empty() {
        let rows = d
            .recent_transactions
            .iter()
            .map(|t| {
                vec![
                    t.date.to_string(),
                    t.merchant.clone(),
                    format!("{}{:.2}", if t.is_income { "+" } else { "-" }, t.amount),
                    t.category.display_name().to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Merchant", "Amount", "Category"], rows)
        );
    }
    Ok(())
}
