// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use easyfin::engine::categorize::{RuleBook, override_category};
use easyfin::models::{BusinessProfile, Employee, TaxStatus, Transaction, TransactionCategory};
use easyfin::{commands::business, commands::dashboard, commands::doctor, commands::tax, db, store};
use rusqlite::Connection;

fn day(m: u32, dd: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, dd).unwrap()
}

fn setup(status: TaxStatus, employees: u32) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let p = BusinessProfile::new("Dolma House", employees, "100000".parse().unwrap(), status, None)
        .unwrap();
    store::save_profile(&conn, &p).unwrap();
    conn
}

fn record(conn: &Connection, date: NaiveDate, amount: &str, merchant: &str, income: bool) {
    let mut t = Transaction::new(date, amount.parse().unwrap(), merchant, "", income).unwrap();
    if income {
        override_category(&mut t, TransactionCategory::Revenue);
    } else {
        RuleBook::standard().apply(&mut t);
    }
    store::insert_transaction(conn, &t).unwrap();
}

#[test]
fn dashboard_reserves_tax_on_deductible_spend() {
    let conn = setup(TaxStatus::MicroEntrepreneur, 4);
    record(&conn, day(3, 10), "5000", "Banquet", true);
    record(&conn, day(3, 11), "1000", "Office rent", false);
    store::insert_employee(&conn, &Employee::new("Anar", "", "800".parse().unwrap()).unwrap())
        .unwrap();

    let d = dashboard::summary(&conn, day(3, 31)).unwrap();
    assert_eq!(d.total_balance.to_string(), "4000.00");
    assert_eq!(d.pending_balance.to_string(), "200.00");
    assert_eq!(d.available_balance.to_string(), "3800.00");
    // 5000 * 0.75 * 0.20, from the window rather than the annual figure
    assert_eq!(d.estimated_tax_savings.to_string(), "750.00");
    assert_eq!(d.active_employees, 1);
    assert_eq!(d.recent_transactions.len(), 2);
    assert_eq!(d.spending_by_category.len(), 1);
}

#[test]
fn tax_summary_uses_profile_exemption() {
    let conn = setup(TaxStatus::MicroEntrepreneur, 4);
    record(&conn, day(3, 10), "48000", "Banquet", true);
    record(&conn, day(3, 11), "28400", "Office rent", false);
    record(&conn, day(3, 12), "4050", "Unknown Shop", false);

    let s = tax::period_summary(&conn, easyfin::engine::ledger::Period::new(day(1, 1), day(3, 31)))
        .unwrap();
    assert_eq!(s.total_expenses.to_string(), "32450.00");
    assert_eq!(s.estimated_liability.to_string(), "980.00");
    assert_eq!(s.estimated_savings.to_string(), "2940.00");
}

#[test]
fn eligibility_is_reported_not_applied() {
    let conn = setup(TaxStatus::Standard, 5);
    let profile = store::load_profile(&conn).unwrap();
    let report = business::eligibility_report(&profile);
    assert!(report.eligible);
    assert_eq!(report.tax_status, TaxStatus::Standard);
    assert_eq!(store::load_profile(&conn).unwrap().exemption_rate, rust_decimal::Decimal::ZERO);
}

#[test]
fn doctor_lists_issues_without_fixing() {
    let conn = setup(TaxStatus::Standard, 5);
    record(&conn, day(3, 12), "40", "Unknown Shop", false);
    record(&conn, day(3, 13), "40", "Azercell", false);

    let issues = doctor::diagnose(&conn).unwrap();
    let kinds: Vec<&str> = issues.iter().map(|i| i.kind).collect();
    assert!(kinds.contains(&"uncategorized"));
    assert!(kinds.contains(&"eligibility_mismatch"));
    assert!(!kinds.contains(&"low_confidence"));

    let unchanged = store::get_transaction(&conn, 1).unwrap();
    assert_eq!(unchanged.category, TransactionCategory::Uncategorized);
}

#[test]
fn doctor_reports_missing_profile() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let issues = doctor::diagnose(&conn).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, "no_business_profile");
}
