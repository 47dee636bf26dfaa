// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::categorize::{KeywordRule, RuleBook};
use crate::models::TransactionCategory;
use crate::store;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct RuleRow {
    pub id: Option<i64>,
    pub keyword: String,
    pub category: TransactionCategory,
    pub builtin: bool,
}

/// Rules in evaluation order. Built-in rows carry no id.
pub fn rule_rows(conn: &Connection, include_builtin: bool) -> Result<Vec<RuleRow>> {
    let custom = store::list_rules(conn)?;
    let mut rows: Vec<RuleRow> = custom
        .into_iter()
        .map(|(id, r)| RuleRow {
            id: Some(id),
            keyword: r.keyword().to_string(),
            category: r.category(),
            builtin: false,
        })
        .collect();
    if include_builtin {
        let book = RuleBook::standard();
        rows.extend(book.rules().iter().map(|r| RuleRow {
            id: None,
            keyword: r.keyword().to_string(),
            category: r.category(),
            builtin: true,
        }));
    }
    Ok(rows)
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let keyword = sub.get_one::<String>("keyword").unwrap();
            let category = sub
                .get_one::<String>("category")
                .unwrap()
                .parse::<TransactionCategory>()?;
            let rule = KeywordRule::new(keyword, category)?;
            let id = store::insert_rule(conn, &rule)?;
            info!(id, keyword = rule.keyword(), "keyword rule added");
            println!("Added rule #{}: '{}' -> {}", id, rule.keyword(), category);
        }
        Some(("list", sub)) => {
            let data = rule_rows(conn, sub.get_flag("builtin"))?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .enumerate()
                    .map(|(pos, r)| {
                        vec![
                            (pos + 1).to_string(),
                            r.id.map(|i| i.to_string())
                                .unwrap_or_else(|| "built-in".to_string()),
                            r.keyword.clone(),
                            r.category.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Order", "ID", "Keyword", "Category"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store::remove_rule(conn, id)?;
            println!("Removed rule {}", id);
        }
        _ => {}
    }
    Ok(())
}
