// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::ledger::{Period, PeriodTotals};
use crate::engine::tax::{is_eligible_for_preferential_status, savings_for_status, summarize};
use crate::models::{TaxStatus, TaxSummary, tax_status_traits};
use crate::store;
use crate::utils::{as_of, maybe_print_json, parse_date, parse_decimal, period_arg, pretty_table};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("eligibility", sub)) => eligibility(sub)?,
        Some(("savings", sub)) => savings(sub)?,
        Some(("deadline", sub)) => deadline(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Tax estimate over the stored transactions of `period`, using the profile's
/// recorded exemption rate.
pub fn period_summary(conn: &Connection, period: Period) -> Result<TaxSummary> {
    let profile = store::load_profile(conn)?;
    let txs = store::transactions_between(conn, period)?;
    let totals = PeriodTotals::from_transactions(&txs, period);
    Ok(summarize(
        totals.total_income,
        totals.total_expenses,
        totals.tax_deductible,
        profile.exemption_rate,
    )?)
}

fn year_to_date(today: NaiveDate) -> Result<Period> {
    let start = NaiveDate::from_ymd_opt(today.year(), 1, 1)
        .with_context(|| format!("No January 1st for {}", today))?;
    Ok(Period::new(start, today))
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let period = period_arg(sub, year_to_date(as_of(sub)?)?)?;
    let s = period_summary(conn, period)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Total income".into(), format!("{:.2}", s.total_income)],
        vec!["Total expenses".into(), format!("{:.2}", s.total_expenses)],
        vec!["Deductions".into(), format!("{:.2}", s.total_deductions)],
        vec!["Taxable income".into(), format!("{:.2}", s.taxable_income)],
        vec!["Exemption rate".into(), s.exemption_rate.to_string()],
        vec![
            "Taxable after exemption".into(),
            format!("{:.2}", s.taxable_after_exemption),
        ],
        vec![
            "Estimated liability".into(),
            format!("{:.2}", s.estimated_liability),
        ],
        vec!["Tax due".into(), format!("{:.2}", s.tax_due())],
        vec![
            "Savings from exemption".into(),
            format!("{:.2}", s.estimated_savings),
        ],
    ];
    println!("Tax summary {}", period);
    println!("{}", pretty_table(&["Item", "Amount"], rows));
    Ok(())
}

fn eligibility(sub: &clap::ArgMatches) -> Result<()> {
    let employees = *sub.get_one::<u32>("employees").unwrap();
    let income = parse_decimal(sub.get_one::<String>("income").unwrap())?;
    let eligible = is_eligible_for_preferential_status(employees, income);
    let v = serde_json::json!({
        "employee_count": employees,
        "annual_income": income,
        "eligible": eligible,
    });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)? {
        println!(
            "{} employees, income {}: {}",
            employees,
            income,
            if eligible { "eligible" } else { "not eligible" }
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct StatusSavings {
    pub status: TaxStatus,
    pub display_name: &'static str,
    pub exemption_rate: Decimal,
    pub savings: Decimal,
}

pub fn savings_table(income: Decimal) -> Vec<StatusSavings> {
    [
        TaxStatus::MicroEntrepreneur,
        TaxStatus::Small,
        TaxStatus::Medium,
        TaxStatus::Startup,
        TaxStatus::Standard,
    ]
    .into_iter()
    .map(|status| StatusSavings {
        status,
        display_name: tax_status_traits(status).display_name,
        exemption_rate: status.default_exemption_rate(),
        savings: savings_for_status(income, status),
    })
    .collect()
}

fn savings(sub: &clap::ArgMatches) -> Result<()> {
    let income = parse_decimal(sub.get_one::<String>("income").unwrap())?;
    let data = savings_table(income);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|s| {
                vec![
                    s.display_name.to_string(),
                    s.exemption_rate.to_string(),
                    format!("{:.2}", s.savings),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Status", "Exemption", "Savings"], rows)
        );
    }
    Ok(())
}

fn deadline(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let title = sub.get_one::<String>("title").unwrap();
            let due = parse_date(sub.get_one::<String>("date").unwrap())?;
            let id = store::insert_deadline(conn, title, due)?;
            println!("Added deadline #{} '{}' due {}", id, title.trim(), due);
        }
        Some(("list", sub)) => {
            let data = store::list_deadlines(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|d| {
                        vec![
                            d.id.map(|i| i.to_string()).unwrap_or_default(),
                            d.title.clone(),
                            d.due.to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Title", "Due"], rows));
            }
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store::remove_deadline(conn, id)?;
            println!("Removed deadline #{}", id);
        }
        _ => {}
    }
    Ok(())
}
