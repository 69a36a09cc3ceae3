use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// How often a recurring expense fires. A closed set: the CLI only ever
/// offers these values, so an unrecognized string in the database is a data
/// error and parsing fails loudly rather than falling back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" | "bi-weekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" | "annually" => Ok(Self::Yearly),
            other => bail!("Invalid interval: {other} (expected weekly, biweekly, monthly or yearly)"),
        }
    }

    pub fn all() -> &'static [Interval] {
        &[Self::Weekly, Self::Biweekly, Self::Monthly, Self::Yearly]
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A template that periodically materializes into concrete [`Expense`]
/// records. `next_run` only ever moves forward.
///
/// [`Expense`]: crate::models::Expense
#[derive(Debug, Clone)]
pub struct RecurringExpense {
    pub id: Option<i64>,
    pub user_id: String,
    pub category_id: i64,
    pub title: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub interval: Interval,
    pub start: DateTime<Utc>,
    pub next_run: DateTime<Utc>,
}

impl RecurringExpense {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        category_id: i64,
        title: String,
        amount: Decimal,
        note: Option<String>,
        interval: Interval,
        start: DateTime<Utc>,
        next_run: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            category_id,
            title,
            amount,
            note,
            interval,
            start,
            next_run,
        }
    }
}
