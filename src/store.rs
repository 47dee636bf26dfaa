// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite read and write paths feeding the computation engine.
//!
//! Identifiers and timestamps are assigned here, never by the engine.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::engine::advisor::Advice;
use crate::engine::categorize::{KeywordRule, RuleBook};
use crate::engine::ledger::Period;
use crate::error::FinError;
use crate::models::{
    Alert, AlertKind, BusinessProfile, CategorySource, Employee, ForecastPoint, PayrollResult,
    PayrollSummary, Recommendation, RecommendationKind, Severity, TaxDeadline, TaxStatus,
    Transaction, TransactionCategory,
};
use crate::utils::parse_date;

fn dec(raw: &str, what: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Invalid {} '{}' in database", what, raw))
}

// ---------------------------------------------------------------- business

pub fn load_profile(conn: &Connection) -> Result<BusinessProfile> {
    let row = conn
        .query_row(
            "SELECT name, employee_count, annual_income, tax_status, exemption_rate, currency
             FROM business WHERE id=1",
            [],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, i64>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, String>(4)?,
                    r.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;
    let (name, employees, income, status, rate, currency) = row.ok_or(FinError::MissingProfile)?;
    let employee_count = u32::try_from(employees)
        .with_context(|| format!("Invalid employee count {} in database", employees))?;
    Ok(BusinessProfile {
        name,
        employee_count,
        annual_income: dec(&income, "annual income")?,
        tax_status: status.parse::<TaxStatus>()?,
        exemption_rate: dec(&rate, "exemption rate")?,
        currency,
    })
}

pub fn save_profile(conn: &Connection, profile: &BusinessProfile) -> Result<()> {
    profile.validate()?;
    conn.execute(
        "INSERT INTO business(id, name, employee_count, annual_income, tax_status, exemption_rate, currency)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            name=excluded.name,
            employee_count=excluded.employee_count,
            annual_income=excluded.annual_income,
            tax_status=excluded.tax_status,
            exemption_rate=excluded.exemption_rate,
            currency=excluded.currency,
            updated_at=datetime('now')",
        params![
            profile.name,
            profile.employee_count,
            profile.annual_income.to_string(),
            profile.tax_status.as_str(),
            profile.exemption_rate.to_string(),
            profile.currency,
        ],
    )?;
    Ok(())
}

// ------------------------------------------------------------ transactions

const TX_COLUMNS: &str = "id, date, amount, currency, merchant, description, category, \
                          is_income, is_tax_deductible, confidence, category_source";

fn tx_from_row(r: &Row<'_>) -> Result<Transaction> {
    let date: String = r.get(1)?;
    let amount: String = r.get(2)?;
    let category: String = r.get(6)?;
    let source: String = r.get(10)?;
    Ok(Transaction {
        id: Some(r.get(0)?),
        date: parse_date(&date)?,
        amount: dec(&amount, "amount")?,
        currency: r.get(3)?,
        merchant: r.get(4)?,
        description: r.get(5)?,
        category: category.parse::<TransactionCategory>()?,
        is_income: r.get(7)?,
        is_tax_deductible: r.get(8)?,
        confidence: r.get(9)?,
        category_source: source.parse::<CategorySource>()?,
    })
}

pub fn insert_transaction(conn: &Connection, tx: &Transaction) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions(date, amount, currency, merchant, description, category,
                                  is_income, is_tax_deductible, confidence, category_source)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            tx.date.to_string(),
            tx.amount.to_string(),
            tx.currency,
            tx.merchant,
            tx.description,
            tx.category.code(),
            tx.is_income,
            tx.is_tax_deductible,
            tx.confidence,
            tx.category_source.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let sql = format!("SELECT {} FROM transactions WHERE id=?1", TX_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => tx_from_row(r),
        None => Err(FinError::not_found("Transaction", id).into()),
    }
}

/// Persist category, confidence, deductibility and source of a stored transaction.
pub fn update_categorization(conn: &Connection, tx: &Transaction) -> Result<()> {
    let id = tx
        .id
        .ok_or_else(|| FinError::validation("Transaction has not been stored yet"))?;
    let changed = conn.execute(
        "UPDATE transactions SET category=?1, confidence=?2, is_tax_deductible=?3, category_source=?4
         WHERE id=?5",
        params![
            tx.category.code(),
            tx.confidence,
            tx.is_tax_deductible,
            tx.category_source.as_str(),
            id
        ],
    )?;
    if changed == 0 {
        return Err(FinError::not_found("Transaction", id).into());
    }
    Ok(())
}

pub fn transactions_between(conn: &Connection, period: Period) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE date>=?1 AND date<=?2 ORDER BY date, id",
        TX_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![period.start.to_string(), period.end.to_string()])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(tx_from_row(r)?);
    }
    Ok(out)
}

/// Newest first. `limit` of `None` returns everything.
pub fn recent_transactions(conn: &Connection, limit: Option<usize>) -> Result<Vec<Transaction>> {
    let mut sql = format!(
        "SELECT {} FROM transactions ORDER BY date DESC, id DESC",
        TX_COLUMNS
    );
    if let Some(n) = limit {
        sql.push_str(&format!(" LIMIT {}", n));
    }
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(tx_from_row(r)?);
    }
    Ok(out)
}

// --------------------------------------------------------------- employees

fn employee_from_row(r: &Row<'_>) -> Result<Employee> {
    let salary: String = r.get(3)?;
    Ok(Employee {
        id: Some(r.get(0)?),
        name: r.get(1)?,
        position: r.get(2)?,
        monthly_salary: dec(&salary, "monthly salary")?,
        active: r.get(4)?,
    })
}

pub fn insert_employee(conn: &Connection, employee: &Employee) -> Result<i64> {
    conn.execute(
        "INSERT INTO employees(name, position, monthly_salary, active) VALUES (?1, ?2, ?3, ?4)",
        params![
            employee.name,
            employee.position,
            employee.monthly_salary.to_string(),
            employee.active
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_employees(conn: &Connection, active_only: bool) -> Result<Vec<Employee>> {
    let sql = if active_only {
        "SELECT id, name, position, monthly_salary, active FROM employees WHERE active=1 ORDER BY id"
    } else {
        "SELECT id, name, position, monthly_salary, active FROM employees ORDER BY id"
    };
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(employee_from_row(r)?);
    }
    Ok(out)
}

pub fn set_employee_active(conn: &Connection, id: i64, active: bool) -> Result<()> {
    let changed = conn.execute(
        "UPDATE employees SET active=?1 WHERE id=?2",
        params![active, id],
    )?;
    if changed == 0 {
        return Err(FinError::not_found("Employee", id).into());
    }
    Ok(())
}

pub fn set_employee_salary(conn: &Connection, id: i64, salary: Decimal) -> Result<()> {
    if salary < Decimal::ZERO {
        return Err(FinError::validation("Monthly salary must not be negative").into());
    }
    let changed = conn.execute(
        "UPDATE employees SET monthly_salary=?1 WHERE id=?2",
        params![salary.to_string(), id],
    )?;
    if changed == 0 {
        return Err(FinError::not_found("Employee", id).into());
    }
    Ok(())
}

// ----------------------------------------------------------------- payroll

#[derive(Debug, Clone, Serialize)]
pub struct PayrollRecord {
    pub month: String,
    pub employee_id: i64,
    pub employee_name: String,
    #[serde(flatten)]
    pub result: PayrollResult,
    pub is_paid: bool,
    pub paid_date: Option<String>,
}

/// Replace the unpaid rows of `summary.month` with the lines of `summary`.
/// Rows already marked paid are left alone.
pub fn save_payroll(conn: &mut Connection, summary: &PayrollSummary) -> Result<usize> {
    let tx = conn.transaction()?;
    let dropped = tx.execute(
        "DELETE FROM payrolls WHERE month=?1 AND is_paid=0",
        params![summary.month],
    )?;
    debug!(month = %summary.month, dropped, "cleared unpaid payroll rows");
    let mut written = 0;
    for line in &summary.lines {
        let employee_id = line.employee_id.ok_or_else(|| {
            FinError::validation(format!(
                "Payroll line for '{}' has no employee id",
                line.employee_name
            ))
        })?;
        let r = &line.result;
        written += tx.execute(
            "INSERT INTO payrolls(month, employee_id, employee_name, gross, employee_ssf,
                                  employer_ssf, income_tax, net_salary, employer_cost)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(month, employee_id) DO UPDATE SET
                employee_name=excluded.employee_name,
                gross=excluded.gross,
                employee_ssf=excluded.employee_ssf,
                employer_ssf=excluded.employer_ssf,
                income_tax=excluded.income_tax,
                net_salary=excluded.net_salary,
                employer_cost=excluded.employer_cost
             WHERE payrolls.is_paid=0",
            params![
                summary.month,
                employee_id,
                line.employee_name,
                r.gross.to_string(),
                r.employee_contribution.to_string(),
                r.employer_contribution.to_string(),
                r.income_tax.to_string(),
                r.net_salary.to_string(),
                r.total_employer_cost.to_string(),
            ],
        )?;
    }
    tx.commit()?;
    Ok(written)
}

pub fn mark_payroll_paid(conn: &Connection, month: &str, paid_on: NaiveDate) -> Result<usize> {
    let n = conn.execute(
        "UPDATE payrolls SET is_paid=1, paid_date=?1 WHERE month=?2 AND is_paid=0",
        params![paid_on.to_string(), month],
    )?;
    Ok(n)
}

pub fn payroll_history(conn: &Connection, month: Option<&str>) -> Result<Vec<PayrollRecord>> {
    let base = "SELECT month, employee_id, employee_name, gross, employee_ssf, employer_ssf,
                       income_tax, net_salary, employer_cost, is_paid, paid_date
                FROM payrolls";
    let mut stmt;
    let mut rows = if let Some(m) = month {
        stmt = conn.prepare(&format!("{} WHERE month=?1 ORDER BY employee_id", base))?;
        stmt.query(params![m])?
    } else {
        stmt = conn.prepare(&format!("{} ORDER BY month DESC, employee_id", base))?;
        stmt.query([])?
    };
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let cells: Vec<String> = (3..9)
            .map(|i| r.get::<_, String>(i))
            .collect::<rusqlite::Result<_>>()?;
        out.push(PayrollRecord {
            month: r.get(0)?,
            employee_id: r.get(1)?,
            employee_name: r.get(2)?,
            result: PayrollResult {
                gross: dec(&cells[0], "gross")?,
                employee_contribution: dec(&cells[1], "employee SSF")?,
                employer_contribution: dec(&cells[2], "employer SSF")?,
                income_tax: dec(&cells[3], "income tax")?,
                net_salary: dec(&cells[4], "net salary")?,
                total_employer_cost: dec(&cells[5], "employer cost")?,
            },
            is_paid: r.get(9)?,
            paid_date: r.get(10)?,
        });
    }
    Ok(out)
}

// ---------------------------------------------------------------- forecast

/// The stored forecast is always the latest generated sequence.
pub fn replace_forecast(conn: &mut Connection, points: &[ForecastPoint]) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM forecasts", [])?;
    for p in points {
        tx.execute(
            "INSERT INTO forecasts(date, predicted_income, predicted_expenses, predicted_balance, confidence)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                p.date.to_string(),
                p.predicted_income.to_string(),
                p.predicted_expenses.to_string(),
                p.predicted_balance.to_string(),
                p.confidence
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn stored_forecast(conn: &Connection, from: NaiveDate) -> Result<Vec<ForecastPoint>> {
    let mut stmt = conn.prepare(
        "SELECT date, predicted_income, predicted_expenses, predicted_balance, confidence
         FROM forecasts WHERE date>=?1 ORDER BY date",
    )?;
    let mut rows = stmt.query(params![from.to_string()])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let date: String = r.get(0)?;
        let income: String = r.get(1)?;
        let expenses: String = r.get(2)?;
        let balance: String = r.get(3)?;
        out.push(ForecastPoint {
            date: parse_date(&date)?,
            predicted_income: dec(&income, "predicted income")?,
            predicted_expenses: dec(&expenses, "predicted expenses")?,
            predicted_balance: dec(&balance, "predicted balance")?,
            confidence: r.get(4)?,
        });
    }
    Ok(out)
}

// ------------------------------------------------------------------ advice

#[derive(Debug, Clone, Serialize)]
pub struct StoredRecommendation {
    pub id: i64,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredAlert {
    pub id: i64,
    #[serde(flatten)]
    pub alert: Alert,
    pub created_at: String,
}

/// Swap the open generated set for `advice`. Dismissed alerts and acted-upon
/// recommendations are kept as history.
pub fn replace_advice(conn: &mut Connection, advice: &Advice) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM recommendations WHERE acted_upon=0", [])?;
    tx.execute("DELETE FROM alerts WHERE dismissed=0", [])?;
    for rec in &advice.recommendations {
        tx.execute(
            "INSERT INTO recommendations(kind, title, description, potential_savings, priority)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                rec.kind.as_str(),
                rec.title,
                rec.description,
                rec.potential_savings.to_string(),
                rec.priority.as_str()
            ],
        )?;
    }
    for alert in &advice.alerts {
        tx.execute(
            "INSERT INTO alerts(kind, title, message, severity, deadline, days_remaining)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                alert.kind.as_str(),
                alert.title,
                alert.message,
                alert.severity.as_str(),
                alert.deadline.map(|d| d.to_string()),
                alert.days_remaining
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn active_recommendations(conn: &Connection) -> Result<Vec<StoredRecommendation>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, title, description, potential_savings, priority
         FROM recommendations WHERE acted_upon=0 ORDER BY id",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let kind: String = r.get(1)?;
        let savings: String = r.get(4)?;
        let priority: String = r.get(5)?;
        out.push(StoredRecommendation {
            id: r.get(0)?,
            recommendation: Recommendation {
                kind: kind.parse::<RecommendationKind>()?,
                title: r.get(2)?,
                description: r.get(3)?,
                potential_savings: dec(&savings, "potential savings")?,
                priority: priority.parse::<Severity>()?,
            },
        });
    }
    Ok(out)
}

pub fn active_alerts(conn: &Connection, kind: Option<AlertKind>) -> Result<Vec<StoredAlert>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, title, message, severity, deadline, days_remaining, created_at
         FROM alerts WHERE dismissed=0 ORDER BY created_at DESC, id DESC",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let raw_kind: String = r.get(1)?;
        let alert_kind = raw_kind.parse::<AlertKind>()?;
        if kind.is_some_and(|k| k != alert_kind) {
            continue;
        }
        let severity: String = r.get(4)?;
        let deadline: Option<String> = r.get(5)?;
        out.push(StoredAlert {
            id: r.get(0)?,
            alert: Alert {
                kind: alert_kind,
                title: r.get(2)?,
                message: r.get(3)?,
                severity: severity.parse::<Severity>()?,
                deadline: deadline.as_deref().map(parse_date).transpose()?,
                days_remaining: r.get(6)?,
            },
            created_at: r.get(7)?,
        });
    }
    Ok(out)
}

pub fn dismiss_alert(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE alerts SET dismissed=1, dismissed_at=datetime('now') WHERE id=?1",
        params![id],
    )?;
    if changed == 0 {
        return Err(FinError::not_found("Alert", id).into());
    }
    Ok(())
}

pub fn act_on_recommendation(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE recommendations SET acted_upon=1 WHERE id=?1",
        params![id],
    )?;
    if changed == 0 {
        return Err(FinError::not_found("Recommendation", id).into());
    }
    Ok(())
}

pub fn count_open_advice(conn: &Connection) -> Result<(i64, i64)> {
    let alerts: i64 =
        conn.query_row("SELECT COUNT(*) FROM alerts WHERE dismissed=0", [], |r| r.get(0))?;
    let recs: i64 = conn.query_row(
        "SELECT COUNT(*) FROM recommendations WHERE acted_upon=0",
        [],
        |r| r.get(0),
    )?;
    Ok((alerts, recs))
}

// --------------------------------------------------------------- deadlines

pub fn insert_deadline(conn: &Connection, title: &str, due: NaiveDate) -> Result<i64> {
    let title = title.trim();
    if title.is_empty() {
        return Err(FinError::validation("Deadline title must not be empty").into());
    }
    conn.execute(
        "INSERT INTO tax_deadlines(title, due) VALUES (?1, ?2)",
        params![title, due.to_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_deadlines(conn: &Connection) -> Result<Vec<TaxDeadline>> {
    let mut stmt = conn.prepare("SELECT id, title, due FROM tax_deadlines ORDER BY due, id")?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let due: String = r.get(2)?;
        out.push(TaxDeadline {
            id: Some(r.get(0)?),
            title: r.get(1)?,
            due: parse_date(&due)?,
        });
    }
    Ok(out)
}

pub fn remove_deadline(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM tax_deadlines WHERE id=?1", params![id])?;
    if changed == 0 {
        return Err(FinError::not_found("Tax deadline", id).into());
    }
    Ok(())
}

// ------------------------------------------------------------------- rules

pub fn insert_rule(conn: &Connection, rule: &KeywordRule) -> Result<i64> {
    conn.execute(
        "INSERT INTO rules(keyword, category) VALUES (?1, ?2)",
        params![rule.keyword(), rule.category().code()],
    )
    .with_context(|| format!("Add keyword rule '{}'", rule.keyword()))?;
    Ok(conn.last_insert_rowid())
}

pub fn list_rules(conn: &Connection) -> Result<Vec<(i64, KeywordRule)>> {
    let mut stmt = conn.prepare("SELECT id, keyword, category FROM rules ORDER BY id")?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let keyword: String = r.get(1)?;
        let category: String = r.get(2)?;
        let category = category.parse::<TransactionCategory>()?;
        out.push((r.get(0)?, KeywordRule::new(&keyword, category)?));
    }
    Ok(out)
}

pub fn remove_rule(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM rules WHERE id=?1", params![id])?;
    if changed == 0 {
        return Err(FinError::not_found("Rule", id).into());
    }
    Ok(())
}

/// User rules first, then the built-in table.
pub fn load_rule_book(conn: &Connection) -> Result<RuleBook> {
    let custom = list_rules(conn)?.into_iter().map(|(_, r)| r).collect();
    Ok(RuleBook::with_custom(custom))
}
