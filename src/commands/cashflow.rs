// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::advisor::LOW_BALANCE_THRESHOLD;
use crate::engine::forecast::{Forecast, daily_average, forecast, window_net};
use crate::engine::ledger::{Period, PeriodTotals};
use crate::store;
use crate::utils::{
    as_of, get_base_currency, get_forecast_horizon, maybe_print_json, parse_decimal, pretty_table,
};
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::{info, warn};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("analysis", sub)) => analysis(conn, sub)?,
        Some(("forecast", sub)) => run_forecast(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn trailing_totals(conn: &Connection, period: Period) -> Result<PeriodTotals> {
    let txs = store::transactions_between(conn, period)?;
    Ok(PeriodTotals::from_transactions(&txs, period))
}

/// Forecast starting tomorrow from the trailing 30-day averages as of `today`.
/// Without an explicit balance the window's net flow is used.
pub fn project(
    conn: &Connection,
    today: NaiveDate,
    horizon_days: i64,
    starting_balance: Option<Decimal>,
) -> Result<Forecast> {
    let totals = trailing_totals(conn, Period::trailing_window(today))?;
    let avg_income = daily_average(totals.total_income);
    let avg_expenses = daily_average(totals.total_expenses);
    let balance = starting_balance.unwrap_or_else(|| window_net(avg_income, avg_expenses));
    let first_day = today
        .checked_add_days(Days::new(1))
        .with_context(|| format!("No day after {}", today))?;
    Ok(forecast(
        avg_income,
        avg_expenses,
        balance,
        horizon_days,
        first_day,
    )?)
}

fn analysis(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let days = *sub.get_one::<u32>("days").unwrap();
    let period = Period::trailing(as_of(sub)?, days);
    let totals = trailing_totals(conn, period)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        return Ok(());
    }
    let ccy = get_base_currency(conn)?;
    println!("Cash flow {} ({} transactions)", period, totals.transaction_count);
    let rows = vec![
        vec!["Income".into(), format!("{:.2}", totals.total_income)],
        vec!["Expenses".into(), format!("{:.2}", totals.total_expenses)],
        vec!["Net".into(), format!("{:.2}", totals.net_cash_flow())],
        vec!["Deductible".into(), format!("{:.2}", totals.tax_deductible)],
    ];
    println!("{}", pretty_table(&["Item", ccy.as_str()], rows));

    let mut by_cat: Vec<Vec<String>> = totals
        .income_by_category
        .iter()
        .map(|(c, v)| vec![c.display_name().to_string(), "in".into(), format!("{:.2}", v)])
        .collect();
    by_cat.extend(
        totals
            .expenses_by_category
            .iter()
            .map(|(c, v)| vec![c.display_name().to_string(), "out".into(), format!("{:.2}", v)]),
    );
    if !by_cat.is_empty() {
        println!("{}", pretty_table(&["Category", "Dir", "Amount"], by_cat));
    }
    Ok(())
}

fn run_forecast(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = as_of(sub)?;
    let horizon = match sub.get_one::<i64>("days") {
        Some(d) => *d,
        None => i64::from(get_forecast_horizon(conn)?),
    };
    let balance = sub
        .get_one::<String>("balance")
        .map(|b| parse_decimal(b))
        .transpose()?;

    let fc = project(conn, today, horizon, balance)?;
    let points = fc.points();
    store::replace_forecast(conn, &points)?;
    info!(days = fc.horizon_days(), "forecast stored");
    if let Some(low) = fc.first_below(LOW_BALANCE_THRESHOLD) {
        warn!(date = %low.date, balance = %low.predicted_balance, "forecast drops below low-balance threshold");
    }

    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &points)? {
        let rows = points
            .iter()
            .map(|p| {
                vec![
                    p.date.to_string(),
                    format!("{:.2}", p.predicted_income),
                    format!("{:.2}", p.predicted_expenses),
                    format!("{:.2}", p.predicted_balance),
                    format!("{:.2}", p.confidence),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Income", "Expenses", "Balance", "Confidence"], rows)
        );
    }
    Ok(())
}
