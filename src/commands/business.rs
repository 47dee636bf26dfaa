// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::tax::is_eligible_for_preferential_status;
use crate::models::{BusinessProfile, TaxStatus, tax_status_traits};
use crate::store;
use crate::utils::{fmt_money, get_base_currency, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("eligibility", sub)) => eligibility(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    let employees = *sub.get_one::<u32>("employees").unwrap();
    let income = parse_decimal(sub.get_one::<String>("income").unwrap())?;
    let status = sub.get_one::<String>("status").unwrap().parse::<TaxStatus>()?;
    let exemption = sub
        .get_one::<String>("exemption")
        .map(|s| parse_decimal(s))
        .transpose()?;

    let mut profile = BusinessProfile::new(name, employees, income, status, exemption)?;
    profile.currency = match sub.get_one::<String>("currency") {
        Some(c) => c.trim().to_uppercase(),
        None => get_base_currency(conn)?,
    };
    store::save_profile(conn, &profile)?;
    info!(name = %profile.name, status = profile.tax_status.as_str(), "business profile saved");
    println!(
        "Saved profile '{}' ({}, exemption {})",
        profile.name,
        tax_status_traits(profile.tax_status).display_name,
        profile.exemption_rate
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = store::load_profile(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &profile)? {
        return Ok(());
    }
    let traits = tax_status_traits(profile.tax_status);
    let rows = vec![
        vec!["Name".into(), profile.name.clone()],
        vec!["Employees".into(), profile.employee_count.to_string()],
        vec![
            "Annual income".into(),
            fmt_money(&profile.annual_income, &profile.currency),
        ],
        vec![
            "Tax status".into(),
            format!("{} ({})", traits.display_name, traits.description),
        ],
        vec!["Exemption rate".into(), profile.exemption_rate.to_string()],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct EligibilityReport {
    pub employee_count: u32,
    pub annual_income: rust_decimal::Decimal,
    pub eligible: bool,
    pub tax_status: TaxStatus,
    pub exemption_rate: rust_decimal::Decimal,
}

/// Eligibility of the stored profile. The recorded status is reported next to
/// it but never changed.
pub fn eligibility_report(profile: &BusinessProfile) -> EligibilityReport {
    EligibilityReport {
        employee_count: profile.employee_count,
        annual_income: profile.annual_income,
        eligible: is_eligible_for_preferential_status(
            profile.employee_count,
            profile.annual_income,
        ),
        tax_status: profile.tax_status,
        exemption_rate: profile.exemption_rate,
    }
}

fn eligibility(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = store::load_profile(conn)?;
    let report = eligibility_report(&profile);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        println!(
            "{}: {} employees, income {} -> {}",
            profile.name,
            report.employee_count,
            fmt_money(&report.annual_income, &profile.currency),
            if report.eligible {
                "eligible for preferential status"
            } else {
                "not eligible for preferential status"
            }
        );
    }
    Ok(())
}
