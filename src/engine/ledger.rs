// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Period aggregation over a transaction snapshot.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::forecast::TRAILING_WINDOW_DAYS;
use super::round_money;
use crate::models::{Transaction, TransactionCategory};

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `days` days back from `today`, both ends included.
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// Every four-digit-year date; the stored ISO strings compare correctly
    /// against these bounds.
    pub fn all() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn trailing_window(today: NaiveDate) -> Self {
        Self::trailing(today, TRAILING_WINDOW_DAYS)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub period: Period,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// Every row flagged deductible, whatever its direction. The stored flag is
    /// authoritative, including on income rows.
    pub tax_deductible: Decimal,
    pub income_by_category: BTreeMap<TransactionCategory, Decimal>,
    pub expenses_by_category: BTreeMap<TransactionCategory, Decimal>,
    pub transaction_count: usize,
}

impl PeriodTotals {
    pub fn from_transactions(transactions: &[Transaction], period: Period) -> Self {
        let mut totals = Self {
            period,
            total_income: Decimal::ZERO,
            total_expenses: Decimal::ZERO,
            tax_deductible: Decimal::ZERO,
            income_by_category: BTreeMap::new(),
            expenses_by_category: BTreeMap::new(),
            transaction_count: 0,
        };
        for tx in transactions.iter().filter(|t| period.contains(t.date)) {
            totals.transaction_count += 1;
            if tx.is_tax_deductible {
                totals.tax_deductible += tx.amount;
            }
            if tx.is_income {
                totals.total_income += tx.amount;
                *totals
                    .income_by_category
                    .entry(tx.category)
                    .or_insert(Decimal::ZERO) += tx.amount;
            } else {
                totals.total_expenses += tx.amount;
                *totals
                    .expenses_by_category
                    .entry(tx.category)
                    .or_insert(Decimal::ZERO) += tx.amount;
            }
        }
        totals
    }

    /// Income less expenses; negative when spending outran revenue.
    pub fn net_cash_flow(&self) -> Decimal {
        round_money(self.total_income - self.total_expenses)
    }
}
