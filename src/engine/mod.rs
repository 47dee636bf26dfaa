// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Financial computation core.
//!
//! Everything under `engine` is a pure function of its arguments: no storage,
//! no clock, no shared mutable state. The command layer reads records from the
//! store, hands them to these calculators and persists whatever comes back.

pub mod advisor;
pub mod categorize;
pub mod forecast;
pub mod ledger;
pub mod payroll;
pub mod tax;

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a monetary amount to 2 decimal places, half-up (away from zero).
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// `value` as a rate with `scale` decimal places, e.g. `rate(22, 2)` is 0.22.
pub(crate) const fn rate(value: u32, scale: u32) -> Decimal {
    Decimal::from_parts(value, 0, 0, false, scale)
}
