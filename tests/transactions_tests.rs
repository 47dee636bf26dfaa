// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use easyfin::engine::categorize::RuleBook;
use easyfin::models::{CategorySource, TransactionCategory};
use easyfin::{cli, commands::transactions, db, store};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run(conn: &Connection, rules: &RuleBook, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["easyfin", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(conn, rules, tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn add_categorizes_with_rule_book() {
    let conn = setup();
    let rules = RuleBook::standard();
    run(
        &conn,
        &rules,
        &[
            "add", "--date", "2025-03-01", "--amount", "45.50", "--merchant", "Taze Bazar",
        ],
    )
    .unwrap();
    let t = &store::recent_transactions(&conn, None).unwrap()[0];
    assert_eq!(t.category, TransactionCategory::FoodSupplies);
    assert_eq!(t.confidence, 0.85);
    assert!(t.is_tax_deductible);
    assert_eq!(t.currency, "AZN");
    assert!(!t.is_income);
}

#[test]
fn add_with_pinned_category_is_a_user_override() {
    let conn = setup();
    let rules = RuleBook::standard();
    run(
        &conn,
        &rules,
        &[
            "add",
            "--date",
            "2025-03-02",
            "--amount",
            "900",
            "--merchant",
            "Wedding party",
            "--income",
            "--category",
            "sales",
        ],
    )
    .unwrap();
    let t = &store::recent_transactions(&conn, None).unwrap()[0];
    assert_eq!(t.category, TransactionCategory::Sales);
    assert_eq!(t.category_source, CategorySource::User);
    assert_eq!(t.confidence, 0.50);
    assert!(t.is_income);
    assert!(!t.is_tax_deductible);
}

#[test]
fn negative_amount_rejected() {
    let conn = setup();
    let rules = RuleBook::standard();
    let err = run(
        &conn,
        &rules,
        &["add", "--date", "2025-03-01", "--amount=-5", "--merchant", "X"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("must not be negative"));
}

#[test]
fn list_limit_and_category_filter() {
    let conn = setup();
    let rules = RuleBook::standard();
    for (date, merchant) in [
        ("2025-01-01", "Azercell"),
        ("2025-01-02", "Bolt"),
        ("2025-01-03", "Bakcell"),
    ] {
        run(
            &conn,
            &rules,
            &["add", "--date", date, "--amount", "10", "--merchant", merchant],
        )
        .unwrap();
    }
    let matches = cli::build_cli().get_matches_from(["easyfin", "tx", "list", "--limit", "2"]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    let rows = transactions::query_rows(&conn, list_m).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date.to_string(), "2025-01-03");

    let matches = cli::build_cli().get_matches_from([
        "easyfin",
        "tx",
        "list",
        "--category",
        "telecommunications",
        "--to",
        "2025-01-02",
    ]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    let rows = transactions::query_rows(&conn, list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].merchant, "Azercell");
}

#[test]
fn overrides_survive_recategorization() {
    let conn = setup();
    let standard = RuleBook::standard();
    run(
        &conn,
        &standard,
        &["add", "--date", "2025-03-01", "--amount", "20", "--merchant", "Dolma Market"],
    )
    .unwrap();
    run(
        &conn,
        &standard,
        &["add", "--date", "2025-03-02", "--amount", "30", "--merchant", "Taze Bazar"],
    )
    .unwrap();
    run(&conn, &standard, &["set-category", "--id", "2", "--category", "marketing"]).unwrap();
    run(&conn, &standard, &["set-deductible", "--id", "2", "--value", "no"]).unwrap();

    let custom = RuleBook::with_custom(vec![
        easyfin::engine::categorize::KeywordRule::new("dolma", TransactionCategory::Sales)
            .unwrap(),
    ]);
    assert_eq!(transactions::recategorize_all(&conn, &custom).unwrap(), 1);

    let first = store::get_transaction(&conn, 1).unwrap();
    assert_eq!(first.category, TransactionCategory::Sales);
    let second = store::get_transaction(&conn, 2).unwrap();
    assert_eq!(second.category, TransactionCategory::Marketing);
    assert!(!second.is_tax_deductible);
}

#[test]
fn set_category_on_missing_transaction_fails() {
    let conn = setup();
    let rules = RuleBook::standard();
    let err = run(&conn, &rules, &["set-category", "--id", "7", "--category", "rent"]).unwrap_err();
    assert_eq!(err.to_string(), "Transaction not found: 7");
}
