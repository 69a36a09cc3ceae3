#![allow(clippy::unwrap_used)]

use chrono::Utc;
use rust_decimal_macros::dec;

use super::*;

// ── Interval ──────────────────────────────────────────────────

#[test]
fn test_interval_parse() {
    assert_eq!(Interval::parse("weekly").unwrap(), Interval::Weekly);
    assert_eq!(Interval::parse("WEEKLY").unwrap(), Interval::Weekly);
    assert_eq!(Interval::parse("biweekly").unwrap(), Interval::Biweekly);
    assert_eq!(Interval::parse("bi-weekly").unwrap(), Interval::Biweekly);
    assert_eq!(Interval::parse("monthly").unwrap(), Interval::Monthly);
    assert_eq!(Interval::parse("yearly").unwrap(), Interval::Yearly);
    assert_eq!(Interval::parse("annually").unwrap(), Interval::Yearly);
}

#[test]
fn test_interval_parse_invalid() {
    assert!(Interval::parse("daily").is_err());
    assert!(Interval::parse("").is_err());
    assert!(Interval::parse("every other tuesday").is_err());
}

#[test]
fn test_interval_as_str() {
    assert_eq!(Interval::Weekly.as_str(), "weekly");
    assert_eq!(Interval::Biweekly.as_str(), "biweekly");
    assert_eq!(Interval::Monthly.as_str(), "monthly");
    assert_eq!(Interval::Yearly.as_str(), "yearly");
}

#[test]
fn test_interval_display() {
    assert_eq!(format!("{}", Interval::Monthly), "monthly");
}

#[test]
fn test_interval_roundtrip() {
    // Every interval should roundtrip through as_str -> parse
    for i in Interval::all() {
        let s = i.as_str();
        let back = Interval::parse(s).unwrap();
        assert_eq!(*i, back, "Roundtrip failed for {s}");
    }
}

#[test]
fn test_interval_all() {
    assert_eq!(Interval::all().len(), 4);
}

// ── Budget ────────────────────────────────────────────────────

#[test]
fn test_budget_new_defaults() {
    let budget = Budget::new("alice".into(), 1, dec!(500), 1, 2024);
    assert!(budget.id.is_none());
    assert_eq!(budget.user_id, "alice");
    assert_eq!(budget.category_id, 1);
    assert_eq!(budget.amount_limit, dec!(500));
    assert_eq!(budget.warning_threshold, DEFAULT_WARNING_THRESHOLD);
    assert_eq!(budget.month, 1);
    assert_eq!(budget.year, 2024);
}

#[test]
fn test_threshold_parse_valid() {
    assert_eq!(Budget::threshold_or_default("80"), 0.8);
    assert_eq!(Budget::threshold_or_default("10"), 0.1);
    assert_eq!(Budget::threshold_or_default("100"), 1.0);
    assert_eq!(Budget::threshold_or_default(" 75 "), 0.75);
}

#[test]
fn test_threshold_out_of_range_falls_back() {
    // Out-of-range input is coerced to the default, not rejected
    assert_eq!(Budget::threshold_or_default("150"), DEFAULT_WARNING_THRESHOLD);
    assert_eq!(Budget::threshold_or_default("5"), DEFAULT_WARNING_THRESHOLD);
    assert_eq!(Budget::threshold_or_default("0"), DEFAULT_WARNING_THRESHOLD);
    assert_eq!(Budget::threshold_or_default("-20"), DEFAULT_WARNING_THRESHOLD);
}

#[test]
fn test_threshold_unparseable_falls_back() {
    assert_eq!(Budget::threshold_or_default("abc"), DEFAULT_WARNING_THRESHOLD);
    assert_eq!(Budget::threshold_or_default(""), DEFAULT_WARNING_THRESHOLD);
}

// ── Category ──────────────────────────────────────────────────

#[test]
fn test_category_new() {
    let cat = Category::new("Groceries".into());
    assert!(cat.id.is_none());
    assert_eq!(cat.name, "Groceries");
    assert!(cat.icon.is_empty());
    assert!(cat.is_active);
}

#[test]
fn test_category_display() {
    let cat = Category::new("Groceries".into());
    assert_eq!(format!("{cat}"), "Groceries");
}

#[test]
fn test_category_find_by_name() {
    let cats = vec![
        Category {
            id: Some(1),
            name: "Food & Dining".into(),
            icon: String::new(),
            is_active: true,
        },
        Category {
            id: Some(2),
            name: "Transport".into(),
            icon: String::new(),
            is_active: true,
        },
    ];
    assert_eq!(
        Category::find_by_name(&cats, "transport").and_then(|c| c.id),
        Some(2)
    );
    assert!(Category::find_by_name(&cats, "nope").is_none());
}

#[test]
fn test_category_find_by_id() {
    let cats = vec![Category {
        id: Some(7),
        name: "Housing".into(),
        icon: String::new(),
        is_active: true,
    }];
    assert_eq!(
        Category::find_by_id(&cats, 7).map(|c| c.name.as_str()),
        Some("Housing")
    );
    assert!(Category::find_by_id(&cats, 8).is_none());
}

// ── Expense / RecurringExpense ────────────────────────────────

#[test]
fn test_expense_manual() {
    let now = Utc::now();
    let e = Expense::manual("alice".into(), 3, "Lunch".into(), dec!(12.50), None, now);
    assert!(e.id.is_none());
    assert!(e.recurring_id.is_none());
    assert_eq!(e.amount, dec!(12.50));
    assert_eq!(e.date, now);
}

#[test]
fn test_recurring_expense_new() {
    let now = Utc::now();
    let next = now + chrono::Duration::days(7);
    let rec = RecurringExpense::new(
        "alice".into(),
        2,
        "Gym".into(),
        dec!(30),
        Some("monthly pass".into()),
        Interval::Monthly,
        now,
        next,
    );
    assert!(rec.id.is_none());
    assert_eq!(rec.interval, Interval::Monthly);
    assert_eq!(rec.start, now);
    assert!(rec.next_run > rec.start);
}
