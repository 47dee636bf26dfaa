// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cash-flow projection from trailing daily averages.
//!
//! The model is a straight line: every future day adds the same average
//! income and subtracts the same average expense. Confidence is a constant
//! annotation, not a derived statistic.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use super::round_money;
use crate::error::{FinError, FinResult};
use crate::models::ForecastPoint;

/// Length of the history window, and the divisor for daily averages even
/// when the business is younger than the window.
pub const TRAILING_WINDOW_DAYS: u32 = 30;
pub const FORECAST_CONFIDENCE: f64 = 0.75;
pub const DEFAULT_HORIZON_DAYS: u32 = 30;
/// Upper bound used to reject horizons no caller could mean (ten years).
pub const MAX_HORIZON_DAYS: u32 = 3_650;

/// Daily average of a trailing-window total, rounded to cents.
pub fn daily_average(window_total: Decimal) -> Decimal {
    round_money(window_total / Decimal::from(TRAILING_WINDOW_DAYS))
}

/// Starting balance used when the caller has no ledger balance:
/// the net of one full window at the given averages.
pub fn window_net(avg_income: Decimal, avg_expenses: Decimal) -> Decimal {
    round_money((avg_income - avg_expenses) * Decimal::from(TRAILING_WINDOW_DAYS))
}

/// A finite, restartable forecast. Iterating does not consume or mutate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forecast {
    avg_income: Decimal,
    avg_expenses: Decimal,
    starting_balance: Decimal,
    horizon_days: u32,
    first_day: NaiveDate,
}

/// Build a forecast of `horizon_days` points, the first dated `first_day`.
pub fn forecast(
    avg_income: Decimal,
    avg_expenses: Decimal,
    starting_balance: Decimal,
    horizon_days: i64,
    first_day: NaiveDate,
) -> FinResult<Forecast> {
    if horizon_days < 0 {
        return Err(FinError::validation(format!(
            "Forecast horizon must not be negative (got {} days)",
            horizon_days
        )));
    }
    let horizon_days = u32::try_from(horizon_days)
        .ok()
        .filter(|d| *d <= MAX_HORIZON_DAYS)
        .ok_or_else(|| {
            FinError::validation(format!(
                "Forecast horizon must be at most {} days (got {})",
                MAX_HORIZON_DAYS, horizon_days
            ))
        })?;
    if first_day
        .checked_add_days(Days::new(u64::from(horizon_days)))
        .is_none()
    {
        return Err(FinError::validation(format!(
            "A {}-day forecast from {} runs past the last representable date",
            horizon_days, first_day
        )));
    }
    if avg_income < Decimal::ZERO || avg_expenses < Decimal::ZERO {
        return Err(FinError::validation(
            "Historical daily averages must not be negative",
        ));
    }
    Ok(Forecast {
        avg_income,
        avg_expenses,
        starting_balance,
        horizon_days,
        first_day,
    })
}

impl Forecast {
    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn daily_net(&self) -> Decimal {
        self.avg_income - self.avg_expenses
    }

    pub fn iter(&self) -> ForecastIter {
        ForecastIter {
            forecast: *self,
            day: 0,
            balance: self.starting_balance,
        }
    }

    pub fn points(&self) -> Vec<ForecastPoint> {
        self.iter().collect()
    }

    /// First point whose predicted balance is strictly below `threshold`.
    pub fn first_below(&self, threshold: Decimal) -> Option<ForecastPoint> {
        self.iter().find(|p| p.predicted_balance < threshold)
    }
}

impl<'a> IntoIterator for &'a Forecast {
    type Item = ForecastPoint;
    type IntoIter = ForecastIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct ForecastIter {
    forecast: Forecast,
    day: u32,
    balance: Decimal,
}

impl Iterator for ForecastIter {
    type Item = ForecastPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.day >= self.forecast.horizon_days {
            return None;
        }
        let date = self
            .forecast
            .first_day
            .checked_add_days(Days::new(u64::from(self.day)))?;
        self.day += 1;
        self.balance += self.forecast.daily_net();
        Some(ForecastPoint {
            date,
            predicted_income: round_money(self.forecast.avg_income),
            predicted_expenses: round_money(self.forecast.avg_expenses),
            predicted_balance: round_money(self.balance),
            confidence: FORECAST_CONFIDENCE,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.forecast.horizon_days.saturating_sub(self.day) as usize;
        (0, Some(left))
    }
}
