// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use easyfin::engine::payroll::summarize_payroll;
use easyfin::models::{Employee, Transaction};
use easyfin::report::{CsvRenderer, JsonRenderer, ReportRenderer, renderer_for};
use easyfin::{cli, commands::exporter, commands::payroll, db, store};
use rusqlite::Connection;
use tempfile::tempdir;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    for (name, salary) in [("Anar", "1000"), ("Aysel", "1111.50")] {
        let e = Employee::new(name, "", salary.parse().unwrap()).unwrap();
        store::insert_employee(&conn, &e).unwrap();
    }
    conn
}

fn export(conn: &Connection, args: &[&str]) {
    let mut argv = vec!["easyfin", "export"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn csv_renderer_appends_total_row() {
    let staff = vec![Employee::new("Anar", "", "1000".parse().unwrap()).unwrap()];
    let summary = summarize_payroll(&staff, "2025-03", "AZN").unwrap();
    let bytes = CsvRenderer.render(&summary).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "month,employee,gross,employee_ssf,employer_ssf,income_tax,net_salary,employer_cost,currency"
    );
    assert_eq!(lines[1], "2025-03,Anar,1000.00,30.00,220.00,135.80,834.20,1220.00,AZN");
    assert!(lines[2].starts_with("2025-03,TOTAL,1000.00"));
}

#[test]
fn json_renderer_round_trips_amounts_as_strings() {
    let staff = vec![Employee::new("Anar", "", "1000".parse().unwrap()).unwrap()];
    let summary = summarize_payroll(&staff, "2025-03", "AZN").unwrap();
    let bytes = JsonRenderer.render(&summary).unwrap();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["lines"][0]["net_salary"], "834.20");
    assert_eq!(v["totals"]["total_employer_cost"], "1220.00");
}

#[test]
fn unknown_format_is_rejected() {
    let err = renderer_for("pdf").err().unwrap();
    assert_eq!(err.to_string(), "Unknown format: pdf (use csv|json)");
}

#[test]
fn payroll_export_prefers_processed_rows() {
    let mut conn = setup();
    let processed = payroll::compute_month(&conn, "2025-03").unwrap();
    store::save_payroll(&mut conn, &processed).unwrap();
    // later raise does not leak into the processed month
    store::set_employee_salary(&conn, 1, "5000".parse().unwrap()).unwrap();

    let summary = exporter::payroll_for_export(&conn, "2025-03").unwrap();
    assert_eq!(summary.totals.gross.to_string(), "2111.50");
    let fresh = exporter::payroll_for_export(&conn, "2025-04").unwrap();
    assert_eq!(fresh.totals.gross.to_string(), "6111.50");

    let dir = tempdir().unwrap();
    let out = dir.path().join("payroll.csv");
    export(
        &conn,
        &[
            "payroll",
            "--month",
            "2025-03",
            "--format",
            "csv",
            "--out",
            out.to_str().unwrap(),
        ],
    );
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("Aysel,1111.50,33.35,244.53,150.94,927.21,1356.03,AZN"));
    assert!(text.contains("TOTAL,2111.50"));
}

#[test]
fn transaction_export_json_and_csv() {
    let conn = setup();
    for dd in [1, 2] {
        let t = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 3, dd).unwrap(),
            "12.5".parse().unwrap(),
            "Bolt",
            "ride",
            false,
        )
        .unwrap();
        store::insert_transaction(&conn, &t).unwrap();
    }
    let dir = tempdir().unwrap();

    let json_out = dir.path().join("tx.json");
    export(
        &conn,
        &[
            "transactions",
            "--format",
            "json",
            "--out",
            json_out.to_str().unwrap(),
            "--from",
            "2025-03-02",
        ],
    );
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_out).unwrap()).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 1);
    assert_eq!(v[0]["date"], "2025-03-02");

    let csv_out = dir.path().join("tx.csv");
    export(
        &conn,
        &["transactions", "--out", csv_out.to_str().unwrap()],
    );
    let mut rdr = csv::Reader::from_path(&csv_out).unwrap();
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][2], "12.50");
    assert_eq!(&records[0][5], "UNCATEGORIZED");
}
