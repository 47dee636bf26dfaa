// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Gross-to-net salary breakdown with social fund (SSF) contributions.
//!
//! Each derived line is rounded on its own, and summaries add up the rounded
//! lines. Totals can therefore differ by a cent from a computation done on
//! unrounded intermediates.

use rust_decimal::Decimal;

use super::{rate, round_money};
use crate::error::{FinError, FinResult};
use crate::models::{Employee, PayrollLine, PayrollResult, PayrollSummary};

pub const EMPLOYEE_SSF_RATE: Decimal = rate(3, 2);
pub const EMPLOYER_SSF_RATE: Decimal = rate(22, 2);
pub const INCOME_TAX_RATE: Decimal = rate(14, 2);

pub fn compute_payroll(gross: Decimal) -> FinResult<PayrollResult> {
    if gross < Decimal::ZERO {
        return Err(FinError::validation(format!(
            "Gross salary must not be negative (got {})",
            gross
        )));
    }
    let employee_contribution = round_money(gross * EMPLOYEE_SSF_RATE);
    let employer_contribution = round_money(gross * EMPLOYER_SSF_RATE);
    // Income tax is levied on gross less the (already rounded) employee share.
    let income_tax = round_money((gross - employee_contribution) * INCOME_TAX_RATE);
    let net_salary = round_money(gross - employee_contribution - income_tax);
    let total_employer_cost = round_money(gross + employer_contribution);

    Ok(PayrollResult {
        gross: round_money(gross),
        employee_contribution,
        employer_contribution,
        income_tax,
        net_salary,
        total_employer_cost,
    })
}

/// Payroll for every active employee in `employees`, in input order.
pub fn summarize_payroll(
    employees: &[Employee],
    month: &str,
    currency: &str,
) -> FinResult<PayrollSummary> {
    let mut lines = Vec::new();
    for employee in employees.iter().filter(|e| e.active) {
        let result = compute_payroll(employee.monthly_salary)?;
        lines.push(PayrollLine {
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            result,
        });
    }
    Ok(PayrollSummary {
        month: month.to_string(),
        currency: currency.to_string(),
        totals: sum_lines(&lines),
        lines,
    })
}

/// Column-wise sum of already rounded lines.
pub fn sum_lines(lines: &[PayrollLine]) -> PayrollResult {
    let mut totals = PayrollResult::default();
    for line in lines {
        accumulate(&mut totals, &line.result);
    }
    round_totals(totals)
}

fn accumulate(totals: &mut PayrollResult, line: &PayrollResult) {
    totals.gross += line.gross;
    totals.employee_contribution += line.employee_contribution;
    totals.employer_contribution += line.employer_contribution;
    totals.income_tax += line.income_tax;
    totals.net_salary += line.net_salary;
    totals.total_employer_cost += line.total_employer_cost;
}

fn round_totals(t: PayrollResult) -> PayrollResult {
    PayrollResult {
        gross: round_money(t.gross),
        employee_contribution: round_money(t.employee_contribution),
        employer_contribution: round_money(t.employer_contribution),
        income_tax: round_money(t.income_tax),
        net_salary: round_money(t.net_salary),
        total_employer_cost: round_money(t.total_employer_cost),
    }
}
