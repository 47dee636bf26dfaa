// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::categorize::{MATCH_CONFIDENCE, default_deductible};
use crate::engine::tax::is_eligible_for_preferential_status;
use crate::error::FinError;
use crate::models::TransactionCategory;
use crate::store;
use crate::utils::{get_base_currency, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

impl Issue {
    fn new(kind: &'static str, detail: String) -> Self {
        Self { kind, detail }
    }
}

/// Findings only; nothing is modified.
pub fn diagnose(conn: &Connection) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();
    let base = get_base_currency(conn)?;

    for t in store::recent_transactions(conn, None)? {
        let label = format!(
            "#{} {} {}",
            t.id.unwrap_or_default(),
            t.date,
            t.merchant
        );
        if t.category == TransactionCategory::Uncategorized {
            issues.push(Issue::new("uncategorized", label.clone()));
        } else if t.confidence < MATCH_CONFIDENCE {
            issues.push(Issue::new(
                "low_confidence",
                format!("{} ({} at {:.2})", label, t.category, t.confidence),
            ));
        }
        if t.is_tax_deductible != default_deductible(t.category) {
            issues.push(Issue::new(
                "deductible_override",
                format!("{} ({} marked deductible={})", label, t.category, t.is_tax_deductible),
            ));
        }
        if t.currency != base {
            issues.push(Issue::new(
                "foreign_currency",
                format!("{} in {} (base {})", label, t.currency, base),
            ));
        }
    }

    match store::load_profile(conn) {
        Ok(profile) => {
            let eligible =
                is_eligible_for_preferential_status(profile.employee_count, profile.annual_income);
            let has_exemption = profile.exemption_rate > Decimal::ZERO;
            if eligible && !has_exemption {
                issues.push(Issue::new(
                    "eligibility_mismatch",
                    "eligible for preferential status but exemption rate is 0".to_string(),
                ));
            } else if !eligible && has_exemption {
                issues.push(Issue::new(
                    "eligibility_mismatch",
                    format!(
                        "not eligible for preferential status but exemption rate is {}",
                        profile.exemption_rate
                    ),
                ));
            }
        }
        Err(e) if matches!(e.downcast_ref::<FinError>(), Some(FinError::MissingProfile)) => {
            issues.push(Issue::new("no_business_profile", e.to_string()));
        }
        Err(e) => return Err(e),
    }
    Ok(issues)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = diagnose(conn)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
