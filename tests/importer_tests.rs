// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use easyfin::engine::categorize::RuleBook;
use easyfin::models::{CategorySource, TransactionCategory};
use easyfin::{cli, commands::importer, db, store};
use rusqlite::Connection;
use std::io::Write;
use tempfile::NamedTempFile;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn csv_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", body).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn importer_trims_cli_path_argument() {
    let mut conn = base_conn();
    let file = csv_file(
        "date,merchant,amount,description,is_income\n\
         2025-02-03,Taze Bazar,45.50,vegetables,false\n\
         2025-02-04,Catering,1200,,true\n",
    );

    let path = file.path().to_str().unwrap().to_string();
    let padded = format!("  {}  ", path);
    let matches =
        cli::build_cli().get_matches_from(["easyfin", "import", "transactions", "--path", &padded]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(&mut conn, &RuleBook::standard(), import_m).unwrap();
    } else {
        panic!("no import subcommand");
    }

    let rows = store::recent_transactions(&conn, None).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].is_income);
    assert_eq!(rows[1].category, TransactionCategory::FoodSupplies);
}

#[test]
fn category_column_pins_category() {
    let mut conn = base_conn();
    let file = csv_file(
        "date,merchant,amount,description,is_income,category\n\
         2025-02-03,Azercell,15,,no,OTHER_EXPENSE\n\
         2025-02-04,Azercell,15,,no,\n",
    );
    let n = importer::import_transactions(
        &mut conn,
        &RuleBook::standard(),
        file.path().to_str().unwrap(),
    )
    .unwrap();
    assert_eq!(n, 2);

    let pinned = store::get_transaction(&conn, 1).unwrap();
    assert_eq!(pinned.category, TransactionCategory::OtherExpense);
    assert_eq!(pinned.category_source, CategorySource::User);
    let auto = store::get_transaction(&conn, 2).unwrap();
    assert_eq!(auto.category, TransactionCategory::Telecommunications);
    assert_eq!(auto.category_source, CategorySource::Auto);
}

#[test]
fn bad_row_rolls_back_whole_file() {
    let mut conn = base_conn();
    let file = csv_file(
        "date,merchant,amount,description,is_income\n\
         2025-02-03,Bolt,12,,false\n\
         2025-02-30,Bolt,12,,false\n",
    );
    let err = importer::import_transactions(
        &mut conn,
        &RuleBook::standard(),
        file.path().to_str().unwrap(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid transaction date"));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
