// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Keyword-based spending categorization.
//!
//! A [`RuleBook`] is an ordered list of keyword rules. The first rule whose
//! keyword occurs in the lowercased `merchant + " " + description` decides the
//! category, so rule order is the tie-break.

use serde::Serialize;
use tracing::debug;

use crate::error::{FinError, FinResult};
use crate::models::{CategorySource, Transaction, TransactionCategory, category_traits};

pub const MATCH_CONFIDENCE: f64 = 0.85;
pub const FALLBACK_CONFIDENCE: f64 = 0.50;

use crate::models::TransactionCategory as C;

const STANDARD_RULES: &[(&str, TransactionCategory)] = &[
    ("bazar", C::FoodSupplies),
    ("market", C::FoodSupplies),
    ("food", C::FoodSupplies),
    ("meat", C::FoodSupplies),
    ("vegetable", C::FoodSupplies),
    ("supplier", C::FoodSupplies),
    ("azercell", C::Telecommunications),
    ("bakcell", C::Telecommunications),
    ("nar", C::Telecommunications),
    ("azersu", C::Utilities),
    ("azerishiq", C::Utilities),
    ("azergas", C::Utilities),
    ("water", C::Utilities),
    ("electricity", C::Utilities),
    ("gas", C::Utilities),
    ("bolt", C::Travel),
    ("uber", C::Travel),
    ("taxi", C::Travel),
    ("fuel", C::Travel),
    ("petrol", C::Travel),
    ("aws", C::Software),
    ("microsoft", C::Software),
    ("software", C::Software),
    ("hosting", C::Software),
    ("domain", C::Software),
    ("repair", C::Maintenance),
    ("maintenance", C::Maintenance),
    ("equipment", C::Equipment),
    ("kitchen", C::Equipment),
    ("facebook", C::Marketing),
    ("google ads", C::Marketing),
    ("instagram", C::Marketing),
    ("advertising", C::Marketing),
    ("rent", C::Rent),
    ("lease", C::Rent),
    ("office", C::OfficeSupplies),
    ("stationery", C::OfficeSupplies),
    ("paper", C::OfficeSupplies),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordRule {
    keyword: String,
    category: TransactionCategory,
}

impl KeywordRule {
    /// Keywords are matched lowercase; blank keywords would match everything.
    pub fn new(keyword: &str, category: TransactionCategory) -> FinResult<Self> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Err(FinError::validation("Keyword must not be empty"));
        }
        Ok(Self { keyword, category })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn category(&self) -> TransactionCategory {
        self.category
    }

    fn matches(&self, haystack: &str) -> bool {
        haystack.contains(self.keyword.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Categorization {
    pub category: TransactionCategory,
    pub confidence: f64,
    pub tax_deductible: bool,
}

impl Categorization {
    fn new(category: TransactionCategory, confidence: f64) -> Self {
        Self {
            category,
            confidence,
            tax_deductible: default_deductible(category),
        }
    }
}

/// Deductibility implied by a category. Income is never deductible.
pub fn default_deductible(category: TransactionCategory) -> bool {
    let traits = category_traits(category);
    !traits.is_income && traits.tax_deductible
}

/// Immutable ordered keyword table, built once and shared by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBook {
    rules: Vec<KeywordRule>,
}

impl RuleBook {
    pub fn standard() -> Self {
        Self::with_custom(Vec::new())
    }

    /// `custom` rules are consulted before the standard table, in the order given.
    pub fn with_custom(custom: Vec<KeywordRule>) -> Self {
        let mut rules = custom;
        rules.extend(STANDARD_RULES.iter().map(|(keyword, category)| KeywordRule {
            keyword: (*keyword).to_string(),
            category: *category,
        }));
        Self { rules }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn categorize(&self, merchant: &str, description: &str) -> Categorization {
        let haystack = format!("{} {}", merchant, description).to_lowercase();
        match self.rules.iter().find(|r| r.matches(&haystack)) {
            Some(rule) => {
                debug!(keyword = %rule.keyword, category = %rule.category, "keyword matched");
                Categorization::new(rule.category, MATCH_CONFIDENCE)
            }
            None => {
                debug!(merchant, "no keyword matched, falling back to uncategorized");
                Categorization::new(TransactionCategory::Uncategorized, FALLBACK_CONFIDENCE)
            }
        }
    }

    /// Confidence that `category` is right for `merchant` alone.
    pub fn confidence_for(&self, merchant: &str, category: TransactionCategory) -> f64 {
        let haystack = merchant.to_lowercase();
        if self
            .rules
            .iter()
            .any(|r| r.category == category && r.matches(&haystack))
        {
            MATCH_CONFIDENCE
        } else {
            FALLBACK_CONFIDENCE
        }
    }

    /// Re-derive category fields unless a user override is in place.
    /// Returns whether the transaction was touched.
    pub fn apply(&self, tx: &mut Transaction) -> bool {
        if tx.is_user_categorized() {
            return false;
        }
        let result = self.categorize(&tx.merchant, &tx.description);
        tx.category = result.category;
        tx.confidence = result.confidence;
        tx.is_tax_deductible = result.tax_deductible;
        tx.category_source = CategorySource::Auto;
        true
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::standard()
    }
}

/// User action: pin a category. Deductibility resets to the category default.
pub fn override_category(tx: &mut Transaction, category: TransactionCategory) {
    tx.category = category;
    tx.is_tax_deductible = default_deductible(category);
    tx.category_source = CategorySource::User;
}

/// User action: record deductibility verbatim, even when it contradicts the category.
pub fn override_deductible(tx: &mut Transaction, deductible: bool) {
    tx.is_tax_deductible = deductible;
}
