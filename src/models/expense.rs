use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A concrete spending record. Either entered by hand or materialized from
/// a recurring expense, in which case `recurring_id` points back at the
/// template that produced it.
#[derive(Debug, Clone)]
pub struct Expense {
    pub id: Option<i64>,
    pub user_id: String,
    pub category_id: i64,
    pub title: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub date: DateTime<Utc>,
    pub recurring_id: Option<i64>,
}

impl Expense {
    pub fn manual(
        user_id: String,
        category_id: i64,
        title: String,
        amount: Decimal,
        note: Option<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            category_id,
            title,
            amount,
            note,
            date,
            recurring_id: None,
        }
    }
}
