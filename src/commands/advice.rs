// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::cashflow::{project, trailing_totals};
use crate::engine::advisor::{Advice, derive_advice};
use crate::engine::ledger::Period;
use crate::models::AlertKind;
use crate::store;
use crate::utils::{as_of, get_forecast_horizon, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("generate", sub)) => {
            let advice = generate(conn, as_of(sub)?)?;
            println!(
                "Generated {} recommendation(s) and {} alert(s)",
                advice.recommendations.len(),
                advice.alerts.len()
            );
        }
        Some(("recommendations", sub)) => {
            let data = store::active_recommendations(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|s| {
                        let r = &s.recommendation;
                        vec![
                            s.id.to_string(),
                            r.priority.as_str().to_string(),
                            r.title.clone(),
                            format!("{:.2}", r.potential_savings),
                            r.description.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Priority", "Title", "Savings", "Details"], rows)
                );
            }
        }
        Some(("alerts", sub)) => {
            let kind = sub
                .get_one::<String>("kind")
                .map(|k| k.parse::<AlertKind>())
                .transpose()?;
            let data = store::active_alerts(conn, kind)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|s| {
                        let a = &s.alert;
                        vec![
                            s.id.to_string(),
                            a.severity.as_str().to_string(),
                            a.kind.as_str().to_string(),
                            a.title.clone(),
                            a.message.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Severity", "Kind", "Title", "Message"], rows)
                );
            }
        }
        Some(("dismiss", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store::dismiss_alert(conn, id)?;
            println!("Dismissed alert #{}", id);
        }
        Some(("act", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store::act_on_recommendation(conn, id)?;
            println!("Marked recommendation #{} as acted upon", id);
        }
        _ => {}
    }
    Ok(())
}

/// Evaluate every rule as of `today` against a fresh forecast over the
/// configured horizon and replace the open advice set.
pub fn generate(conn: &mut Connection, today: NaiveDate) -> Result<Advice> {
    let profile = store::load_profile(conn)?;
    let totals = trailing_totals(conn, Period::trailing_window(today))?;
    let horizon = get_forecast_horizon(conn)?;
    let fc = project(conn, today, i64::from(horizon), None)?;
    let deadlines = store::list_deadlines(conn)?;

    let advice = derive_advice(&profile, totals.total_expenses, &fc, &deadlines, today);
    store::replace_advice(conn, &advice)?;
    info!(
        recommendations = advice.recommendations.len(),
        alerts = advice.alerts.len(),
        "advice generated"
    );
    Ok(advice)
}
