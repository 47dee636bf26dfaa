// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::payroll::compute_month;
use crate::engine::ledger::Period;
use crate::engine::payroll::sum_lines;
use crate::models::{PayrollLine, PayrollSummary};
use crate::report::renderer_for;
use crate::store;
use crate::utils::{get_base_currency, parse_month, period_arg};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        Some(("payroll", sub)) => export_payroll(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let period = period_arg(sub, Period::all())?;
    let rows = store::transactions_between(conn, period)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date",
                "merchant",
                "amount",
                "description",
                "is_income",
                "category",
                "currency",
                "is_tax_deductible",
                "confidence",
                "category_source",
            ])?;
            for t in &rows {
                wtr.write_record([
                    t.date.to_string(),
                    t.merchant.clone(),
                    format!("{:.2}", t.amount),
                    t.description.clone(),
                    t.is_income.to_string(),
                    t.category.to_string(),
                    t.currency.clone(),
                    t.is_tax_deductible.to_string(),
                    format!("{:.2}", t.confidence),
                    t.category_source.as_str().to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        _ => return Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
    info!(out = %out, count = rows.len(), "transactions exported");
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}

/// Processed rows for `month` when there are any, otherwise a fresh
/// computation over the active employees.
pub fn payroll_for_export(conn: &Connection, month: &str) -> Result<PayrollSummary> {
    let stored = store::payroll_history(conn, Some(month))?;
    if stored.is_empty() {
        return compute_month(conn, month);
    }
    let lines: Vec<PayrollLine> = stored
        .into_iter()
        .map(|r| PayrollLine {
            employee_id: Some(r.employee_id),
            employee_name: r.employee_name,
            result: r.result,
        })
        .collect();
    Ok(PayrollSummary {
        month: month.to_string(),
        currency: get_base_currency(conn)?,
        totals: sum_lines(&lines),
        lines,
    })
}

fn export_payroll(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let renderer = renderer_for(sub.get_one::<String>("format").unwrap())?;
    let out = sub.get_one::<String>("out").unwrap();
    let summary = payroll_for_export(conn, &month)?;
    let bytes = renderer.render(&summary)?;
    std::fs::write(out, bytes)?;
    info!(out = %out, month = %month, "payroll exported");
    println!("Exported payroll {} to {}", month, out);
    Ok(())
}
