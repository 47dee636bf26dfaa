// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Corporate tax estimate and preferential-status eligibility.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{rate, round_money};
use crate::error::{FinError, FinResult};
use crate::models::{TaxStatus, TaxSummary, validate_rate};

pub const CORPORATE_TAX_RATE: Decimal = rate(20, 2);

pub const MIN_ELIGIBLE_EMPLOYEES: u32 = 1;
pub const MAX_ELIGIBLE_EMPLOYEES: u32 = 10;
/// Exclusive upper bound on annual income for preferential status.
pub const ELIGIBLE_INCOME_CEILING: Decimal = Decimal::from_parts(200_000, 0, 0, false, 0);

/// `1 <= employees <= 10` and `annual_income < 200 000`.
///
/// Only answers the question; nothing here changes a profile's status or
/// exemption rate.
pub fn is_eligible_for_preferential_status(employee_count: u32, annual_income: Decimal) -> bool {
    (MIN_ELIGIBLE_EMPLOYEES..=MAX_ELIGIBLE_EMPLOYEES).contains(&employee_count)
        && annual_income < ELIGIBLE_INCOME_CEILING
}

pub fn summarize(
    total_income: Decimal,
    total_expenses: Decimal,
    tax_deductible: Decimal,
    exemption_rate: Decimal,
) -> FinResult<TaxSummary> {
    for (label, amount) in [
        ("Total income", total_income),
        ("Total expenses", total_expenses),
        ("Deductible amount", tax_deductible),
    ] {
        if amount < Decimal::ZERO {
            return Err(FinError::validation(format!(
                "{} must not be negative (got {})",
                label, amount
            )));
        }
    }
    validate_rate("Exemption rate", exemption_rate)?;

    let taxable_income = total_income - tax_deductible;
    if taxable_income < Decimal::ZERO {
        warn!(%taxable_income, "deductions exceed income; liability will be negative");
    }
    let taxable_after_exemption = taxable_income * (Decimal::ONE - exemption_rate);
    let liability = taxable_after_exemption * CORPORATE_TAX_RATE;
    let savings = taxable_income * exemption_rate * CORPORATE_TAX_RATE;
    debug!(%taxable_income, %liability, %savings, "tax summary computed");

    Ok(TaxSummary {
        total_income: round_money(total_income),
        total_expenses: round_money(total_expenses),
        total_deductions: round_money(tax_deductible),
        exemption_rate,
        taxable_income: round_money(taxable_income),
        taxable_after_exemption: round_money(taxable_after_exemption),
        estimated_liability: round_money(liability),
        estimated_savings: round_money(savings),
    })
}

/// Tax avoided on `income` under the default exemption of `status`.
pub fn savings_for_status(income: Decimal, status: TaxStatus) -> Decimal {
    round_money(income * status.default_exemption_rate() * CORPORATE_TAX_RATE)
}
