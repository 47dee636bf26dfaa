// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use easyfin::engine::advisor::{
    cost_reduction_recommendation, deadline_severity, derive_advice, low_balance_alert,
    tax_deadline_alert, tax_savings_recommendation,
};
use easyfin::engine::forecast::forecast;
use easyfin::models::{
    AlertKind, BusinessProfile, ForecastPoint, RecommendationKind, Severity, TaxDeadline,
    TaxStatus,
};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day(m: u32, dd: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, dd).unwrap()
}

fn point(date: NaiveDate, balance: &str) -> ForecastPoint {
    ForecastPoint {
        date,
        predicted_income: Decimal::ZERO,
        predicted_expenses: Decimal::ZERO,
        predicted_balance: d(balance),
        confidence: 0.75,
    }
}

#[test]
fn tax_savings_requires_positive_exemption() {
    let micro =
        BusinessProfile::new("Cafe", 6, d("150000"), TaxStatus::MicroEntrepreneur, None).unwrap();
    let rec = tax_savings_recommendation(&micro).unwrap();
    assert_eq!(rec.kind, RecommendationKind::TaxSavings);
    assert_eq!(rec.potential_savings.to_string(), "22500.00");
    assert_eq!(rec.priority, Severity::High);
    assert!(rec.title.contains("75%"));

    let standard = BusinessProfile::new("Cafe", 6, d("150000"), TaxStatus::Standard, None).unwrap();
    assert!(tax_savings_recommendation(&standard).is_none());
}

#[test]
fn cost_reduction_threshold_is_strict() {
    assert!(cost_reduction_recommendation(d("15000"), "AZN").is_none());
    let rec = cost_reduction_recommendation(d("15000.01"), "AZN").unwrap();
    assert_eq!(rec.potential_savings.to_string(), "1500.00");
    assert_eq!(rec.priority, Severity::Medium);
}

#[test]
fn low_balance_fires_strictly_below_threshold() {
    let pts = vec![point(day(4, 1), "2500"), point(day(4, 2), "2000")];
    assert!(low_balance_alert(pts.clone(), "AZN").is_none());

    let mut pts = pts;
    pts.push(point(day(4, 3), "1999.99"));
    let alert = low_balance_alert(pts, "AZN").unwrap();
    assert_eq!(alert.kind, AlertKind::LowBalance);
    assert_eq!(alert.severity, Severity::High);
    assert_eq!(alert.deadline, Some(day(4, 3)));
}

#[test]
fn deadline_severity_escalates() {
    assert_eq!(deadline_severity(30), Severity::Medium);
    assert_eq!(deadline_severity(7), Severity::Medium);
    assert_eq!(deadline_severity(6), Severity::High);
    assert_eq!(deadline_severity(3), Severity::High);
    assert_eq!(deadline_severity(2), Severity::Critical);
    assert_eq!(deadline_severity(-1), Severity::Critical);
}

#[test]
fn deadline_alert_counts_days_from_today() {
    let dl = TaxDeadline {
        id: Some(1),
        title: "Quarterly VAT".into(),
        due: day(4, 20),
    };
    let a = tax_deadline_alert(&dl, day(4, 15));
    assert_eq!(a.days_remaining, Some(5));
    assert_eq!(a.severity, Severity::High);
    assert_eq!(a.kind, AlertKind::TaxDeadline);
    assert!(a.message.contains("Quarterly VAT"));
}

#[test]
fn derive_advice_evaluates_each_rule_independently() {
    let profile =
        BusinessProfile::new("Cafe", 4, d("90000"), TaxStatus::MicroEntrepreneur, None).unwrap();
    let fc = forecast(Decimal::ZERO, d("100"), d("2150"), 5, day(4, 2)).unwrap();
    let deadlines = vec![TaxDeadline {
        id: None,
        title: "Annual return".into(),
        due: day(4, 3),
    }];
    let advice = derive_advice(&profile, d("16000"), &fc, &deadlines, day(4, 1));
    assert_eq!(advice.recommendations.len(), 2);
    assert_eq!(advice.alerts.len(), 2);
    assert_eq!(advice.alerts[0].kind, AlertKind::LowBalance);
    assert_eq!(advice.alerts[0].deadline, Some(day(4, 3)));
    assert_eq!(advice.alerts[1].severity, Severity::Critical);

    let quiet = derive_advice(&profile, d("100"), Vec::<ForecastPoint>::new(), &[], day(4, 1));
    assert_eq!(quiet.recommendations.len(), 1);
    assert!(quiet.alerts.is_empty());
}
