// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::payroll::{compute_payroll, summarize_payroll};
use crate::models::{PayrollResult, PayrollSummary};
use crate::store;
use crate::utils::{
    as_of, current_month, get_base_currency, maybe_print_json, parse_date, parse_decimal,
    parse_month, pretty_table,
};
use anyhow::Result;
use chrono::Local;
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("calc", sub)) => calc(sub)?,
        Some(("preview", sub)) => preview(conn, sub)?,
        Some(("process", sub)) => process(conn, sub)?,
        Some(("pay", sub)) => pay(conn, sub)?,
        Some(("history", sub)) => history(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn month_of(sub: &clap::ArgMatches) -> Result<String> {
    match sub.get_one::<String>("month") {
        Some(m) => parse_month(m),
        None => Ok(current_month(as_of(sub)?)),
    }
}

/// Payroll for the currently active employees. Nothing is stored.
pub fn compute_month(conn: &Connection, month: &str) -> Result<PayrollSummary> {
    let employees = store::list_employees(conn, true)?;
    let currency = get_base_currency(conn)?;
    Ok(summarize_payroll(&employees, month, &currency)?)
}

fn result_cells(r: &PayrollResult) -> [String; 6] {
    [
        format!("{:.2}", r.gross),
        format!("{:.2}", r.employee_contribution),
        format!("{:.2}", r.income_tax),
        format!("{:.2}", r.net_salary),
        format!("{:.2}", r.employer_contribution),
        format!("{:.2}", r.total_employer_cost),
    ]
}

const RESULT_HEADERS: [&str; 6] = [
    "Gross",
    "Employee SSF",
    "Income Tax",
    "Net",
    "Employer SSF",
    "Employer Cost",
];

fn print_summary(summary: &PayrollSummary) {
    let mut rows: Vec<Vec<String>> = summary
        .lines
        .iter()
        .map(|l| {
            let mut row = vec![l.employee_name.clone()];
            row.extend(result_cells(&l.result));
            row
        })
        .collect();
    let mut total = vec!["TOTAL".to_string()];
    total.extend(result_cells(&summary.totals));
    rows.push(total);

    let mut headers = vec!["Employee"];
    headers.extend(RESULT_HEADERS);
    println!("Payroll {} ({})", summary.month, summary.currency);
    println!("{}", pretty_table(&headers, rows));
}

fn calc(sub: &clap::ArgMatches) -> Result<()> {
    let gross = parse_decimal(sub.get_one::<String>("gross").unwrap())?;
    let result = compute_payroll(gross)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &result)? {
        println!(
            "{}",
            pretty_table(&RESULT_HEADERS, vec![result_cells(&result).to_vec()])
        );
    }
    Ok(())
}

fn preview(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let summary = compute_month(conn, &month_of(sub)?)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
        print_summary(&summary);
    }
    Ok(())
}

fn process(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_of(sub)?;
    let summary = compute_month(conn, &month)?;
    let written = store::save_payroll(conn, &summary)?;
    info!(month = %month, lines = summary.lines.len(), written, "payroll processed");
    print_summary(&summary);
    if written < summary.lines.len() {
        println!(
            "{} line(s) already paid for {} were left unchanged",
            summary.lines.len() - written,
            month
        );
    }
    Ok(())
}

fn pay(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let paid_on = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };
    let n = store::mark_payroll_paid(conn, &month, paid_on)?;
    if n == 0 {
        println!("No unpaid payroll rows for {}", month);
    } else {
        info!(month = %month, rows = n, "payroll marked paid");
        println!("Marked {} payroll row(s) for {} as paid on {}", n, month, paid_on);
    }
    Ok(())
}

fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = sub
        .get_one::<String>("month")
        .map(|m| parse_month(m))
        .transpose()?;
    let data = store::payroll_history(conn, month.as_deref())?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                let mut row = vec![r.month.clone(), r.employee_name.clone()];
                row.extend(result_cells(&r.result));
                row.push(match (&r.paid_date, r.is_paid) {
                    (Some(d), true) => d.clone(),
                    (None, true) => "paid".to_string(),
                    _ => "unpaid".to_string(),
                });
                row
            })
            .collect();
        let mut headers = vec!["Month", "Employee"];
        headers.extend(RESULT_HEADERS);
        headers.push("Paid");
        println!("{}", pretty_table(&headers, rows));
    }
    Ok(())
}
