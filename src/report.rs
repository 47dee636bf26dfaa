// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Rendering of computed payroll summaries into export bytes.

use anyhow::{Result, anyhow};

use crate::models::{PayrollResult, PayrollSummary};

pub trait ReportRenderer {
    fn render(&self, summary: &PayrollSummary) -> Result<Vec<u8>>;
}

pub struct CsvRenderer;

pub struct JsonRenderer;

const CSV_HEADER: [&str; 9] = [
    "month",
    "employee",
    "gross",
    "employee_ssf",
    "employer_ssf",
    "income_tax",
    "net_salary",
    "employer_cost",
    "currency",
];

fn money_cells(r: &PayrollResult) -> [String; 6] {
    [
        format!("{:.2}", r.gross),
        format!("{:.2}", r.employee_contribution),
        format!("{:.2}", r.employer_contribution),
        format!("{:.2}", r.income_tax),
        format!("{:.2}", r.net_salary),
        format!("{:.2}", r.total_employer_cost),
    ]
}

impl ReportRenderer for CsvRenderer {
    fn render(&self, summary: &PayrollSummary) -> Result<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(CSV_HEADER)?;
        let rows = summary
            .lines
            .iter()
            .map(|l| (l.employee_name.as_str(), &l.result))
            .chain(std::iter::once(("TOTAL", &summary.totals)));
        for (name, result) in rows {
            let mut record = vec![summary.month.clone(), name.to_string()];
            record.extend(money_cells(result));
            record.push(summary.currency.clone());
            wtr.write_record(&record)?;
        }
        wtr.into_inner()
            .map_err(|e| anyhow!("Flush CSV payroll report: {}", e))
    }
}

impl ReportRenderer for JsonRenderer {
    fn render(&self, summary: &PayrollSummary) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(summary)?)
    }
}

/// Renderer for a `--format` flag value.
pub fn renderer_for(format: &str) -> Result<Box<dyn ReportRenderer>> {
    match format.trim().to_lowercase().as_str() {
        "csv" => Ok(Box::new(CsvRenderer)),
        "json" => Ok(Box::new(JsonRenderer)),
        other => Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
}
