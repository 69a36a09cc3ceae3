use rust_decimal::Decimal;

/// Warning threshold used when the user does not provide one (or provides
/// one we can't use).
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.8;

/// A spending limit for one category in one (month, year) period.
/// At most one budget exists per (user, category, month, year).
#[derive(Debug, Clone)]
pub struct Budget {
    pub id: Option<i64>,
    pub user_id: String,
    pub category_id: i64,
    pub amount_limit: Decimal,
    /// Fraction of the limit that triggers a near-limit warning, in [0.1, 1.0].
    pub warning_threshold: f64,
    /// 1-12
    pub month: u32,
    pub year: i32,
}

impl Budget {
    pub fn new(
        user_id: String,
        category_id: i64,
        amount_limit: Decimal,
        month: u32,
        year: i32,
    ) -> Self {
        Self {
            id: None,
            user_id,
            category_id,
            amount_limit,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            month,
            year,
        }
    }

    /// Parse a warning threshold entered as a percentage ("80" → 0.8).
    /// Unparseable input or a value outside [10, 100] percent falls back to
    /// the default instead of failing; budget creation should not be blocked
    /// by a bad threshold.
    pub fn threshold_or_default(raw: &str) -> f64 {
        match raw.trim().parse::<f64>() {
            Ok(pct) => {
                let threshold = pct / 100.0;
                if (0.1..=1.0).contains(&threshold) {
                    threshold
                } else {
                    DEFAULT_WARNING_THRESHOLD
                }
            }
            Err(_) => DEFAULT_WARNING_THRESHOLD,
        }
    }
}
