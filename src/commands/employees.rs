// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Employee;
use crate::store;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let position = sub.get_one::<String>("position").unwrap().trim();
            let salary = parse_decimal(sub.get_one::<String>("salary").unwrap())?;
            let employee = Employee::new(name, position, salary)?;
            let id = store::insert_employee(conn, &employee)?;
            info!(id, "employee added");
            println!("Added employee #{} {} ({:.2})", id, employee.name, salary);
        }
        Some(("list", sub)) => {
            let data = store::list_employees(conn, !sub.get_flag("all"))?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|e| {
                        vec![
                            e.id.map(|i| i.to_string()).unwrap_or_default(),
                            e.name.clone(),
                            e.position.clone(),
                            format!("{:.2}", e.monthly_salary),
                            if e.active { "yes" } else { "no" }.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Position", "Salary", "Active"], rows)
                );
            }
        }
        Some(("deactivate", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store::set_employee_active(conn, id, false)?;
            println!("Deactivated employee #{}", id);
        }
        Some(("set-salary", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let salary = parse_decimal(sub.get_one::<String>("salary").unwrap())?;
            store::set_employee_salary(conn, id, salary)?;
            println!("Employee #{} salary set to {:.2}", id, salary);
        }
        _ => {}
    }
    Ok(())
}
