// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{
    get_base_currency, get_forecast_horizon, maybe_print_json, pretty_table, set_base_currency,
    set_forecast_horizon,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct Settings {
    pub base_currency: String,
    pub forecast_horizon_days: u32,
}

pub fn settings(conn: &Connection) -> Result<Settings> {
    Ok(Settings {
        base_currency: get_base_currency(conn)?,
        forecast_horizon_days: get_forecast_horizon(conn)?,
    })
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let s = settings(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
                let rows = vec![
                    vec!["base_currency".to_string(), s.base_currency],
                    vec![
                        "forecast_horizon_days".to_string(),
                        s.forecast_horizon_days.to_string(),
                    ],
                ];
                println!("{}", pretty_table(&["Key", "Value"], rows));
            }
        }
        Some(("set-currency", sub)) => {
            let ccy = sub.get_one::<String>("code").unwrap();
            set_base_currency(conn, ccy)?;
            let stored = get_base_currency(conn)?;
            info!(currency = %stored, "base currency updated");
            println!("Base currency set to {}", stored);
        }
        Some(("set-horizon", sub)) => {
            let days = *sub.get_one::<u32>("days").unwrap();
            set_forecast_horizon(conn, days)?;
            println!("Forecast horizon set to {} days", days);
        }
        _ => {}
    }
    Ok(())
}
