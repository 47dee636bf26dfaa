// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::engine::forecast::{DEFAULT_HORIZON_DAYS, MAX_HORIZON_DAYS};
use crate::error::FinError;
use crate::engine::ledger::Period;
use crate::models::{DEFAULT_CURRENCY, validate_currency};

pub const BASE_CURRENCY_KEY: &str = "base_currency";
pub const FORECAST_HORIZON_KEY: &str = "forecast_horizon_days";

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.trim().to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Accepts true/false, yes/no and 1/0, case-insensitively.
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" | "" => Ok(false),
        other => Err(anyhow::anyhow!("Invalid boolean '{}'", other)),
    }
}

/// The `--as-of` date of a subcommand, or the local calendar date.
pub fn as_of(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("as_of") {
        Some(s) => parse_date(s),
        None => Ok(Local::now().date_naive()),
    }
}

/// `--from`/`--to` of a subcommand; missing ends come from `default`.
pub fn period_arg(sub: &clap::ArgMatches, default: Period) -> Result<Period> {
    let start = match sub.get_one::<String>("from") {
        Some(s) => parse_date(s)?,
        None => default.start,
    };
    let end = match sub.get_one::<String>("to") {
        Some(s) => parse_date(s)?,
        None => default.end,
    };
    if start > end {
        return Err(anyhow::anyhow!("Period start {} is after end {}", start, end));
    }
    Ok(Period::new(start, end))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{:.2} {}", d, ccy)
}

pub fn current_month(today: NaiveDate) -> String {
    format!("{:04}-{:02}", today.year(), today.month())
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

// Base currency settings
pub fn get_base_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, BASE_CURRENCY_KEY)?.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

pub fn set_base_currency(conn: &Connection, ccy: &str) -> Result<()> {
    let ccy = ccy.trim().to_uppercase();
    validate_currency(&ccy)?;
    set_setting(conn, BASE_CURRENCY_KEY, &ccy)
}

pub fn get_forecast_horizon(conn: &Connection) -> Result<u32> {
    match get_setting(conn, FORECAST_HORIZON_KEY)? {
        Some(v) => v
            .parse::<u32>()
            .with_context(|| format!("Invalid {} setting '{}'", FORECAST_HORIZON_KEY, v)),
        None => Ok(DEFAULT_HORIZON_DAYS),
    }
}

pub fn set_forecast_horizon(conn: &Connection, days: u32) -> Result<()> {
    if days > MAX_HORIZON_DAYS {
        return Err(FinError::validation(format!(
            "Forecast horizon must be at most {} days (got {})",
            MAX_HORIZON_DAYS, days
        ))
        .into());
    }
    set_setting(conn, FORECAST_HORIZON_KEY, &days.to_string())
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
