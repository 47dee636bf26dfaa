// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed errors raised by the computation engine and the store.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinError {
    /// Input rejected before any computation ran
    #[error("Validation error: {0}")]
    Validation(String),

    /// No business profile has been recorded yet
    #[error("No business profile found; run `easyfin business set` first")]
    MissingProfile,

    #[error("{entity} not found: {identifier}")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },
}

impl FinError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity,
            identifier: identifier.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type FinResult<T> = Result<T, FinError>;
