// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use easyfin::engine::payroll::{compute_payroll, summarize_payroll};
use easyfin::models::Employee;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn thousand_gross_breakdown() {
    let r = compute_payroll(d("1000.00")).unwrap();
    assert_eq!(r.employee_contribution.to_string(), "30.00");
    assert_eq!(r.income_tax.to_string(), "135.80");
    assert_eq!(r.net_salary.to_string(), "834.20");
    assert_eq!(r.employer_contribution.to_string(), "220.00");
    assert_eq!(r.total_employer_cost.to_string(), "1220.00");
}

#[test]
fn each_line_rounds_half_up() {
    let r = compute_payroll(d("1111.50")).unwrap();
    // 33.345 rounds up, and the tax base uses the rounded share
    assert_eq!(r.employee_contribution.to_string(), "33.35");
    assert_eq!(r.income_tax.to_string(), "150.94");
    assert_eq!(r.net_salary.to_string(), "927.21");
    assert_eq!(r.employer_contribution.to_string(), "244.53");
    assert_eq!(r.total_employer_cost.to_string(), "1356.03");
    assert_eq!(
        r.net_salary,
        r.gross - r.employee_contribution - r.income_tax
    );
}

#[test]
fn zero_and_negative_gross() {
    let r = compute_payroll(Decimal::ZERO).unwrap();
    assert_eq!(r.net_salary.to_string(), "0.00");
    assert!(compute_payroll(d("-0.01")).unwrap_err().is_validation());
}

#[test]
fn summary_sums_rounded_lines_of_active_employees() {
    let mut gone = Employee::new("Leyla", "Cook", d("900")).unwrap();
    gone.active = false;
    let staff = vec![
        Employee::new("Anar", "Chef", d("1000")).unwrap(),
        Employee::new("Aysel", "Waiter", d("1111.50")).unwrap(),
        gone,
    ];
    let s = summarize_payroll(&staff, "2025-03", "AZN").unwrap();
    assert_eq!(s.lines.len(), 2);
    assert_eq!(s.lines[0].employee_name, "Anar");
    assert_eq!(s.totals.gross.to_string(), "2111.50");
    assert_eq!(s.totals.employee_contribution.to_string(), "63.35");
    assert_eq!(s.totals.net_salary.to_string(), "1761.41");
    assert_eq!(s.totals.total_employer_cost.to_string(), "2576.03");
}

#[test]
fn employee_validation() {
    assert!(Employee::new("  ", "", d("100")).is_err());
    assert!(Employee::new("Rauf", "", d("-5")).is_err());
}
