// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FinError, FinResult};

pub const DEFAULT_CURRENCY: &str = "AZN";

/// Upper bound used to reject obviously corrupt employee counts.
pub const MAX_EMPLOYEE_COUNT: u32 = 100_000;

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("static regex"));

pub fn validate_currency(code: &str) -> FinResult<()> {
    if CURRENCY_RE.is_match(code) {
        Ok(())
    } else {
        Err(FinError::validation(format!(
            "Invalid currency code '{}', expected three uppercase letters",
            code
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionCategory {
    Revenue,
    Sales,
    FoodSupplies,
    Rent,
    Utilities,
    Salaries,
    OfficeSupplies,
    Marketing,
    Software,
    Travel,
    Equipment,
    Maintenance,
    Insurance,
    LegalProfessional,
    Telecommunications,
    Payroll,
    SsfContributions,
    EmployeeBenefits,
    OtherExpense,
    Uncategorized,
}

/// Fixed attributes of a category. Looked up through [`category_traits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTraits {
    pub code: &'static str,
    pub display_name: &'static str,
    pub is_income: bool,
    pub tax_deductible: bool,
}

const fn traits(
    code: &'static str,
    display_name: &'static str,
    is_income: bool,
    tax_deductible: bool,
) -> CategoryTraits {
    CategoryTraits {
        code,
        display_name,
        is_income,
        tax_deductible,
    }
}

pub fn category_traits(category: TransactionCategory) -> CategoryTraits {
    use TransactionCategory::*;
    match category {
        Revenue => traits("REVENUE", "Revenue", true, false),
        Sales => traits("SALES", "Sales", true, false),
        FoodSupplies => traits("FOOD_SUPPLIES", "Food Supplies", false, true),
        Rent => traits("RENT", "Rent", false, true),
        Utilities => traits("UTILITIES", "Utilities", false, true),
        Salaries => traits("SALARIES", "Salaries", false, true),
        OfficeSupplies => traits("OFFICE_SUPPLIES", "Office Supplies", false, true),
        Marketing => traits("MARKETING", "Marketing", false, true),
        Software => traits("SOFTWARE", "Software & Technology", false, true),
        Travel => traits("TRAVEL", "Travel", false, true),
        Equipment => traits("EQUIPMENT", "Equipment", false, true),
        Maintenance => traits("MAINTENANCE", "Maintenance & Repairs", false, true),
        Insurance => traits("INSURANCE", "Insurance", false, true),
        LegalProfessional => traits(
            "LEGAL_PROFESSIONAL",
            "Legal & Professional Services",
            false,
            true,
        ),
        Telecommunications => traits("TELECOMMUNICATIONS", "Telecommunications", false, true),
        Payroll => traits("PAYROLL", "Payroll", false, true),
        SsfContributions => traits("SSF_CONTRIBUTIONS", "SSF Contributions", false, true),
        EmployeeBenefits => traits("EMPLOYEE_BENEFITS", "Employee Benefits", false, true),
        OtherExpense => traits("OTHER_EXPENSE", "Other Expense", false, false),
        Uncategorized => traits("UNCATEGORIZED", "Uncategorized", false, false),
    }
}

impl TransactionCategory {
    pub const ALL: [TransactionCategory; 20] = [
        Self::Revenue,
        Self::Sales,
        Self::FoodSupplies,
        Self::Rent,
        Self::Utilities,
        Self::Salaries,
        Self::OfficeSupplies,
        Self::Marketing,
        Self::Software,
        Self::Travel,
        Self::Equipment,
        Self::Maintenance,
        Self::Insurance,
        Self::LegalProfessional,
        Self::Telecommunications,
        Self::Payroll,
        Self::SsfContributions,
        Self::EmployeeBenefits,
        Self::OtherExpense,
        Self::Uncategorized,
    ];

    pub fn code(self) -> &'static str {
        category_traits(self).code
    }

    pub fn display_name(self) -> &'static str {
        category_traits(self).display_name
    }
}

impl fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TransactionCategory {
    type Err = FinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', ' '], "_").to_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == wanted)
            .ok_or_else(|| FinError::validation(format!("Unknown category '{}'", s.trim())))
    }
}

/// Whether the current category was derived or set by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySource {
    Auto,
    User,
}

impl CategorySource {
    pub fn as_str(self) -> &'static str {
        match self {
            CategorySource::Auto => "auto",
            CategorySource::User => "user",
        }
    }
}

impl FromStr for CategorySource {
    type Err = FinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(CategorySource::Auto),
            "user" => Ok(CategorySource::User),
            other => Err(FinError::validation(format!(
                "Unknown category source '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub currency: String,
    pub merchant: String,
    pub description: String,
    pub category: TransactionCategory,
    pub is_income: bool,
    pub is_tax_deductible: bool,
    pub confidence: f64,
    pub category_source: CategorySource,
}

impl Transaction {
    /// A fresh, not yet categorized record. Amounts are unsigned; direction
    /// is carried by `is_income`.
    pub fn new(
        date: NaiveDate,
        amount: Decimal,
        merchant: impl Into<String>,
        description: impl Into<String>,
        is_income: bool,
    ) -> FinResult<Self> {
        if amount < Decimal::ZERO {
            return Err(FinError::validation(format!(
                "Transaction amount must not be negative (got {})",
                amount
            )));
        }
        Ok(Self {
            id: None,
            date,
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            merchant: merchant.into(),
            description: description.into(),
            category: TransactionCategory::Uncategorized,
            is_income,
            is_tax_deductible: false,
            confidence: 0.0,
            category_source: CategorySource::Auto,
        })
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> FinResult<Self> {
        let currency = currency.into();
        validate_currency(&currency)?;
        self.currency = currency;
        Ok(self)
    }

    pub fn is_user_categorized(&self) -> bool {
        self.category_source == CategorySource::User
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Option<i64>,
    pub name: String,
    pub position: String,
    pub monthly_salary: Decimal,
    pub active: bool,
}

impl Employee {
    pub fn new(
        name: impl Into<String>,
        position: impl Into<String>,
        monthly_salary: Decimal,
    ) -> FinResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FinError::validation("Employee name must not be empty"));
        }
        if monthly_salary < Decimal::ZERO {
            return Err(FinError::validation(format!(
                "Monthly salary must not be negative (got {})",
                monthly_salary
            )));
        }
        Ok(Self {
            id: None,
            name,
            position: position.into(),
            monthly_salary,
            active: true,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxStatus {
    MicroEntrepreneur,
    Small,
    Medium,
    Startup,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxStatusTraits {
    pub display_name: &'static str,
    /// Basis points of taxable income exempted by default.
    pub default_exemption_bp: i64,
    pub description: &'static str,
}

pub fn tax_status_traits(status: TaxStatus) -> TaxStatusTraits {
    match status {
        TaxStatus::MicroEntrepreneur => TaxStatusTraits {
            display_name: "Micro-Entrepreneur",
            default_exemption_bp: 7_500,
            description: "1-10 employees, <200K AZN income",
        },
        TaxStatus::Small => TaxStatusTraits {
            display_name: "Small Enterprise",
            default_exemption_bp: 0,
            description: "11-50 employees, 200K-3M AZN income",
        },
        TaxStatus::Medium => TaxStatusTraits {
            display_name: "Medium Enterprise",
            default_exemption_bp: 0,
            description: "51-250 employees, 3M-30M AZN income",
        },
        TaxStatus::Startup => TaxStatusTraits {
            display_name: "Startup (with certificate)",
            default_exemption_bp: 10_000,
            description: "3-year tax exemption",
        },
        TaxStatus::Standard => TaxStatusTraits {
            display_name: "Standard Tax Payer",
            default_exemption_bp: 0,
            description: "Standard corporate tax rates",
        },
    }
}

impl TaxStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaxStatus::MicroEntrepreneur => "micro-entrepreneur",
            TaxStatus::Small => "small",
            TaxStatus::Medium => "medium",
            TaxStatus::Startup => "startup",
            TaxStatus::Standard => "standard",
        }
    }

    pub fn default_exemption_rate(self) -> Decimal {
        Decimal::new(tax_status_traits(self).default_exemption_bp, 4)
    }
}

impl FromStr for TaxStatus {
    type Err = FinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "micro-entrepreneur" | "micro" => Ok(TaxStatus::MicroEntrepreneur),
            "small" => Ok(TaxStatus::Small),
            "medium" => Ok(TaxStatus::Medium),
            "startup" => Ok(TaxStatus::Startup),
            "standard" => Ok(TaxStatus::Standard),
            other => Err(FinError::validation(format!(
                "Unknown tax status '{}' (use micro-entrepreneur|small|medium|startup|standard)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub name: String,
    pub employee_count: u32,
    pub annual_income: Decimal,
    pub tax_status: TaxStatus,
    pub exemption_rate: Decimal,
    pub currency: String,
}

impl BusinessProfile {
    /// `exemption_rate` falls back to the status default when absent. It is
    /// never derived from eligibility.
    pub fn new(
        name: impl Into<String>,
        employee_count: u32,
        annual_income: Decimal,
        tax_status: TaxStatus,
        exemption_rate: Option<Decimal>,
    ) -> FinResult<Self> {
        let profile = Self {
            name: name.into(),
            employee_count,
            annual_income,
            tax_status,
            exemption_rate: exemption_rate.unwrap_or_else(|| tax_status.default_exemption_rate()),
            currency: DEFAULT_CURRENCY.to_string(),
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> FinResult<()> {
        if self.employee_count > MAX_EMPLOYEE_COUNT {
            return Err(FinError::validation(format!(
                "Employee count {} is outside the plausible range 0..={}",
                self.employee_count, MAX_EMPLOYEE_COUNT
            )));
        }
        if self.annual_income < Decimal::ZERO {
            return Err(FinError::validation("Annual income must not be negative"));
        }
        validate_rate("Exemption rate", self.exemption_rate)?;
        validate_currency(&self.currency)
    }
}

pub(crate) fn validate_rate(label: &str, rate: Decimal) -> FinResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(FinError::validation(format!(
            "{} must be between 0 and 1 (got {})",
            label, rate
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollResult {
    pub gross: Decimal,
    pub employee_contribution: Decimal,
    pub employer_contribution: Decimal,
    pub income_tax: Decimal,
    pub net_salary: Decimal,
    pub total_employer_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollLine {
    pub employee_id: Option<i64>,
    pub employee_name: String,
    #[serde(flatten)]
    pub result: PayrollResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollSummary {
    pub month: String,
    pub currency: String,
    pub lines: Vec<PayrollLine>,
    pub totals: PayrollResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_income: Decimal,
    pub predicted_expenses: Decimal,
    pub predicted_balance: Decimal,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub total_deductions: Decimal,
    pub exemption_rate: Decimal,
    /// Income less deductions, before the exemption is applied.
    pub taxable_income: Decimal,
    pub taxable_after_exemption: Decimal,
    /// Negative when deductions exceed income.
    pub estimated_liability: Decimal,
    pub estimated_savings: Decimal,
}

impl TaxSummary {
    /// A negative liability means nothing is owed; it is not a refund.
    pub fn tax_due(&self) -> Decimal {
        self.estimated_liability.max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = FinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(FinError::validation(format!("Unknown severity '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    TaxSavings,
    CostReduction,
}

impl RecommendationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecommendationKind::TaxSavings => "tax-savings",
            RecommendationKind::CostReduction => "cost-reduction",
        }
    }
}

impl FromStr for RecommendationKind {
    type Err = FinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tax-savings" => Ok(RecommendationKind::TaxSavings),
            "cost-reduction" => Ok(RecommendationKind::CostReduction),
            other => Err(FinError::validation(format!(
                "Unknown recommendation kind '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub potential_savings: Decimal,
    /// Only low/medium/high are used for recommendations.
    pub priority: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    LowBalance,
    TaxDeadline,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::LowBalance => "LOW_BALANCE",
            AlertKind::TaxDeadline => "TAX_DEADLINE",
        }
    }
}

impl FromStr for AlertKind {
    type Err = FinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "LOW_BALANCE" => Ok(AlertKind::LowBalance),
            "TAX_DEADLINE" => Ok(AlertKind::TaxDeadline),
            other => Err(FinError::validation(format!("Unknown alert kind '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub deadline: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
}

/// A registered filing or payment deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxDeadline {
    pub id: Option<i64>,
    pub title: String,
    pub due: NaiveDate,
}
