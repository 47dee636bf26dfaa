// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use easyfin::{cli, commands, db, store};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;
    let rules = store::load_rule_book(&conn)?;
    tracing::debug!(rules = rules.rules().len(), "rule book loaded");

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("config", sub)) => commands::config::handle(&conn, sub)?,
        Some(("business", sub)) => commands::business::handle(&conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&conn, &rules, sub)?,
        Some(("employee", sub)) => commands::employees::handle(&conn, sub)?,
        Some(("payroll", sub)) => commands::payroll::handle(&mut conn, sub)?,
        Some(("tax", sub)) => commands::tax::handle(&conn, sub)?,
        Some(("cashflow", sub)) => commands::cashflow::handle(&mut conn, sub)?,
        Some(("advice", sub)) => commands::advice::handle(&mut conn, sub)?,
        Some(("rules", sub)) => commands::rules::handle(&conn, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut conn, &rules, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
