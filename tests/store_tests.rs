// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use easyfin::db;
use easyfin::engine::advisor::Advice;
use easyfin::engine::categorize::{KeywordRule, RuleBook, override_category};
use easyfin::engine::ledger::Period;
use easyfin::engine::payroll::summarize_payroll;
use easyfin::error::FinError;
use easyfin::models::{
    Alert, AlertKind, BusinessProfile, CategorySource, Employee, ForecastPoint, Recommendation,
    RecommendationKind, Severity, TaxStatus, Transaction, TransactionCategory,
};
use easyfin::store;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn day(m: u32, dd: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, dd).unwrap()
}

#[test]
fn missing_profile_is_typed() {
    let conn = setup();
    let err = store::load_profile(&conn).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinError>(),
        Some(FinError::MissingProfile)
    ));
}

#[test]
fn profile_round_trip_and_replace() {
    let conn = setup();
    let p = BusinessProfile::new(
        "Dolma House",
        7,
        "185000".parse().unwrap(),
        TaxStatus::MicroEntrepreneur,
        None,
    )
    .unwrap();
    store::save_profile(&conn, &p).unwrap();
    assert_eq!(store::load_profile(&conn).unwrap(), p);

    let mut q = p.clone();
    q.employee_count = 12;
    q.exemption_rate = Decimal::ZERO;
    store::save_profile(&conn, &q).unwrap();
    let loaded = store::load_profile(&conn).unwrap();
    assert_eq!(loaded.employee_count, 12);
    assert_eq!(loaded.exemption_rate, Decimal::ZERO);
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM business", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn transactions_persist_categorization() {
    let conn = setup();
    let book = RuleBook::standard();
    let mut t = Transaction::new(day(3, 4), "45.50".parse().unwrap(), "Taze Bazar", "", false)
        .unwrap();
    book.apply(&mut t);
    let id = store::insert_transaction(&conn, &t).unwrap();

    let mut loaded = store::get_transaction(&conn, id).unwrap();
    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.category, TransactionCategory::FoodSupplies);
    assert_eq!(loaded.amount.to_string(), "45.50");
    assert_eq!(loaded.confidence, 0.85);

    override_category(&mut loaded, TransactionCategory::EmployeeBenefits);
    store::update_categorization(&conn, &loaded).unwrap();
    let again = store::get_transaction(&conn, id).unwrap();
    assert_eq!(again.category_source, CategorySource::User);
    assert_eq!(again.category, TransactionCategory::EmployeeBenefits);

    let err = store::get_transaction(&conn, 999).unwrap_err();
    assert_eq!(err.to_string(), "Transaction not found: 999");
}

#[test]
fn transactions_between_is_inclusive_and_ordered() {
    let conn = setup();
    for (m, dd) in [(3, 31), (3, 1), (2, 28), (3, 15)] {
        let t = Transaction::new(day(m, dd), Decimal::ONE, "X", "", false).unwrap();
        store::insert_transaction(&conn, &t).unwrap();
    }
    let got = store::transactions_between(&conn, Period::new(day(3, 1), day(3, 31))).unwrap();
    let dates: Vec<_> = got.iter().map(|t| t.date).collect();
    assert_eq!(dates, vec![day(3, 1), day(3, 15), day(3, 31)]);
    assert_eq!(store::transactions_between(&conn, Period::all()).unwrap().len(), 4);

    let recent = store::recent_transactions(&conn, Some(2)).unwrap();
    assert_eq!(recent[0].date, day(3, 31));
    assert_eq!(recent.len(), 2);
}

#[test]
fn payroll_reprocess_keeps_paid_rows() {
    let mut conn = setup();
    let e = Employee::new("Anar", "Chef", "1000".parse().unwrap()).unwrap();
    let id = store::insert_employee(&conn, &e).unwrap();
    let staff = store::list_employees(&conn, true).unwrap();
    assert_eq!(staff[0].id, Some(id));

    let summary = summarize_payroll(&staff, "2025-03", "AZN").unwrap();
    assert_eq!(store::save_payroll(&mut conn, &summary).unwrap(), 1);
    assert_eq!(store::mark_payroll_paid(&conn, "2025-03", day(3, 31)).unwrap(), 1);

    store::set_employee_salary(&conn, id, "2000".parse().unwrap()).unwrap();
    let staff = store::list_employees(&conn, true).unwrap();
    let summary = summarize_payroll(&staff, "2025-03", "AZN").unwrap();
    assert_eq!(store::save_payroll(&mut conn, &summary).unwrap(), 0);

    let hist = store::payroll_history(&conn, Some("2025-03")).unwrap();
    assert_eq!(hist.len(), 1);
    assert!(hist[0].is_paid);
    assert_eq!(hist[0].paid_date.as_deref(), Some("2025-03-31"));
    assert_eq!(hist[0].result.net_salary.to_string(), "834.20");
}

#[test]
fn payroll_reprocess_drops_unpaid_rows_of_departed_staff() {
    let mut conn = setup();
    store::insert_employee(&conn, &Employee::new("Anar", "", Decimal::from(2000)).unwrap()).unwrap();
    let leyla =
        store::insert_employee(&conn, &Employee::new("Leyla", "", Decimal::from(1000)).unwrap())
            .unwrap();
    let staff = store::list_employees(&conn, true).unwrap();
    let summary = summarize_payroll(&staff, "2025-03", "AZN").unwrap();
    assert_eq!(store::save_payroll(&mut conn, &summary).unwrap(), 2);

    store::set_employee_active(&conn, leyla, false).unwrap();
    let staff = store::list_employees(&conn, true).unwrap();
    let summary = summarize_payroll(&staff, "2025-03", "AZN").unwrap();
    assert_eq!(store::save_payroll(&mut conn, &summary).unwrap(), 1);

    let hist = store::payroll_history(&conn, Some("2025-03")).unwrap();
    assert_eq!(hist.len(), 1);
    assert_eq!(hist[0].employee_name, "Anar");
    assert_eq!(hist[0].result.gross.to_string(), "2000.00");
}

#[test]
fn deactivated_employees_drop_out_of_active_list() {
    let conn = setup();
    let a = store::insert_employee(&conn, &Employee::new("A", "", Decimal::TEN).unwrap()).unwrap();
    store::insert_employee(&conn, &Employee::new("B", "", Decimal::TEN).unwrap()).unwrap();
    store::set_employee_active(&conn, a, false).unwrap();
    assert_eq!(store::list_employees(&conn, true).unwrap().len(), 1);
    assert_eq!(store::list_employees(&conn, false).unwrap().len(), 2);
    assert!(store::set_employee_active(&conn, 42, false).is_err());
}

#[test]
fn forecast_is_replaced_wholesale() {
    let mut conn = setup();
    let pt = |dd, bal: i64| ForecastPoint {
        date: day(4, dd),
        predicted_income: Decimal::ZERO,
        predicted_expenses: Decimal::ZERO,
        predicted_balance: Decimal::from(bal),
        confidence: 0.75,
    };
    store::replace_forecast(&mut conn, &[pt(1, 10), pt(2, 20), pt(3, 30)]).unwrap();
    store::replace_forecast(&mut conn, &[pt(2, 5)]).unwrap();
    let stored = store::stored_forecast(&conn, day(1, 1)).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].predicted_balance, Decimal::from(5));
}

fn sample_advice() -> Advice {
    Advice {
        recommendations: vec![Recommendation {
            kind: RecommendationKind::CostReduction,
            title: "High monthly expenses detected".into(),
            description: "...".into(),
            potential_savings: "1600.00".parse().unwrap(),
            priority: Severity::Medium,
        }],
        alerts: vec![
            Alert {
                kind: AlertKind::LowBalance,
                title: "Low Balance Warning".into(),
                message: "...".into(),
                severity: Severity::High,
                deadline: Some(day(4, 3)),
                days_remaining: None,
            },
            Alert {
                kind: AlertKind::TaxDeadline,
                title: "Tax Deadline Approaching".into(),
                message: "...".into(),
                severity: Severity::Critical,
                deadline: Some(day(4, 2)),
                days_remaining: Some(1),
            },
        ],
    }
}

#[test]
fn advice_flags_survive_regeneration() {
    let mut conn = setup();
    store::replace_advice(&mut conn, &sample_advice()).unwrap();
    let alerts = store::active_alerts(&conn, None).unwrap();
    assert_eq!(alerts.len(), 2);
    let deadline_only = store::active_alerts(&conn, Some(AlertKind::TaxDeadline)).unwrap();
    assert_eq!(deadline_only.len(), 1);
    assert_eq!(deadline_only[0].alert.days_remaining, Some(1));

    store::dismiss_alert(&conn, deadline_only[0].id).unwrap();
    let rec = &store::active_recommendations(&conn).unwrap()[0];
    store::act_on_recommendation(&conn, rec.id).unwrap();
    assert_eq!(store::count_open_advice(&conn).unwrap(), (1, 0));

    store::replace_advice(&mut conn, &sample_advice()).unwrap();
    assert_eq!(store::count_open_advice(&conn).unwrap(), (2, 1));
    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM alerts", [], |r| r.get(0))
        .unwrap();
    assert_eq!(total, 3);
    assert!(store::dismiss_alert(&conn, 999).is_err());
}

#[test]
fn custom_rules_load_in_creation_order() {
    let conn = setup();
    store::insert_rule(
        &conn,
        &KeywordRule::new("Dolma", TransactionCategory::Sales).unwrap(),
    )
    .unwrap();
    let second = store::insert_rule(
        &conn,
        &KeywordRule::new("bazar", TransactionCategory::Marketing).unwrap(),
    )
    .unwrap();
    // keywords are unique
    assert!(
        store::insert_rule(
            &conn,
            &KeywordRule::new("BAZAR", TransactionCategory::Rent).unwrap()
        )
        .is_err()
    );

    let book = store::load_rule_book(&conn).unwrap();
    assert_eq!(book.rules()[0].keyword(), "dolma");
    assert_eq!(
        book.categorize("Taze Bazar", "").category,
        TransactionCategory::Marketing
    );

    store::remove_rule(&conn, second).unwrap();
    let book = store::load_rule_book(&conn).unwrap();
    assert_eq!(
        book.categorize("Taze Bazar", "").category,
        TransactionCategory::FoodSupplies
    );
}

#[test]
fn deadlines_sorted_by_due_date() {
    let conn = setup();
    store::insert_deadline(&conn, "Annual return", day(3, 31)).unwrap();
    store::insert_deadline(&conn, "VAT", day(1, 20)).unwrap();
    assert!(store::insert_deadline(&conn, "  ", day(1, 20)).is_err());
    let list = store::list_deadlines(&conn).unwrap();
    assert_eq!(list[0].title, "VAT");
    store::remove_deadline(&conn, list[0].id.unwrap()).unwrap();
    assert_eq!(store::list_deadlines(&conn).unwrap().len(), 1);
}
