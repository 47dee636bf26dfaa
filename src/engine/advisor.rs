// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Threshold rules that turn computed figures into recommendations and alerts.
//!
//! Every rule is independent and stateless; dismissal lives in the store.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{rate, round_money};
use crate::models::{
    Alert, AlertKind, BusinessProfile, ForecastPoint, Recommendation, RecommendationKind,
    Severity, TaxDeadline,
};

pub const TAX_SAVINGS_FACTOR: Decimal = rate(15, 2);
pub const COST_REDUCTION_FACTOR: Decimal = rate(10, 2);
pub const HIGH_EXPENSE_THRESHOLD: Decimal = Decimal::from_parts(15_000, 0, 0, false, 0);
pub const LOW_BALANCE_THRESHOLD: Decimal = Decimal::from_parts(2_000, 0, 0, false, 0);
pub const DEADLINE_HIGH_DAYS: i64 = 7;
pub const DEADLINE_CRITICAL_DAYS: i64 = 3;

pub fn tax_savings_recommendation(profile: &BusinessProfile) -> Option<Recommendation> {
    if profile.exemption_rate <= Decimal::ZERO {
        return None;
    }
    let savings = round_money(profile.annual_income * TAX_SAVINGS_FACTOR);
    let percent = (profile.exemption_rate * Decimal::ONE_HUNDRED).normalize();
    Some(Recommendation {
        kind: RecommendationKind::TaxSavings,
        title: format!("You qualify for {}% tax exemption", percent),
        description: format!(
            "With {} employees and an exemption rate of {}%, your estimated annual savings are {:.2} {}",
            profile.employee_count, percent, savings, profile.currency
        ),
        potential_savings: savings,
        priority: Severity::High,
    })
}

/// `trailing_expenses` is the expense total of the trailing 30-day window.
pub fn cost_reduction_recommendation(
    trailing_expenses: Decimal,
    currency: &str,
) -> Option<Recommendation> {
    if trailing_expenses <= HIGH_EXPENSE_THRESHOLD {
        return None;
    }
    Some(Recommendation {
        kind: RecommendationKind::CostReduction,
        title: "High monthly expenses detected".to_string(),
        description: format!(
            "Your expenses in the last 30 days: {:.2} {}. Review your spending to identify potential cost reduction opportunities.",
            trailing_expenses, currency
        ),
        potential_savings: round_money(trailing_expenses * COST_REDUCTION_FACTOR),
        priority: Severity::Medium,
    })
}

pub fn low_balance_alert<I>(points: I, currency: &str) -> Option<Alert>
where
    I: IntoIterator<Item = ForecastPoint>,
{
    let point = points
        .into_iter()
        .find(|p| p.predicted_balance < LOW_BALANCE_THRESHOLD)?;
    Some(Alert {
        kind: AlertKind::LowBalance,
        title: "Low Balance Warning".to_string(),
        message: format!(
            "Projected balance drops to {:.2} {} on {}, below {} {}",
            point.predicted_balance, currency, point.date, LOW_BALANCE_THRESHOLD, currency
        ),
        severity: Severity::High,
        deadline: Some(point.date),
        days_remaining: None,
    })
}

pub fn deadline_severity(days_remaining: i64) -> Severity {
    if days_remaining < DEADLINE_CRITICAL_DAYS {
        Severity::Critical
    } else if days_remaining < DEADLINE_HIGH_DAYS {
        Severity::High
    } else {
        Severity::Medium
    }
}

pub fn tax_deadline_alert(deadline: &TaxDeadline, today: NaiveDate) -> Alert {
    let days_remaining = (deadline.due - today).num_days();
    let message = if days_remaining < 0 {
        format!("{} was due {} days ago", deadline.title, -days_remaining)
    } else {
        format!("{} in {} days", deadline.title, days_remaining)
    };
    Alert {
        kind: AlertKind::TaxDeadline,
        title: "Tax Deadline Approaching".to_string(),
        message,
        severity: deadline_severity(days_remaining),
        deadline: Some(deadline.due),
        days_remaining: Some(days_remaining),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Advice {
    pub recommendations: Vec<Recommendation>,
    pub alerts: Vec<Alert>,
}

/// Evaluate every rule once.
pub fn derive_advice<I>(
    profile: &BusinessProfile,
    trailing_expenses: Decimal,
    forecast_points: I,
    deadlines: &[TaxDeadline],
    today: NaiveDate,
) -> Advice
where
    I: IntoIterator<Item = ForecastPoint>,
{
    let recommendations = [
        tax_savings_recommendation(profile),
        cost_reduction_recommendation(trailing_expenses, &profile.currency),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut alerts: Vec<Alert> = low_balance_alert(forecast_points, &profile.currency)
        .into_iter()
        .collect();
    alerts.extend(deadlines.iter().map(|d| tax_deadline_alert(d, today)));

    Advice {
        recommendations,
        alerts,
    }
}
