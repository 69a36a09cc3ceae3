use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::Budget;

/// Snapshot of how a budget is doing against actual spend.
///
/// Derived data: rebuilt from the budget and the current spend sum on every
/// evaluation, never stored or mutated in place. `remaining` goes negative
/// once the budget is blown; `percentage` never does.
#[derive(Debug, Clone)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// Unrounded; display rounds to one decimal.
    pub percentage: f64,
}

impl BudgetStatus {
    pub fn is_over_budget(&self) -> bool {
        self.percentage >= 100.0
    }

    pub fn is_near_limit(&self) -> bool {
        !self.is_over_budget() && self.percentage >= self.budget.warning_threshold * 100.0
    }

    pub fn badge(&self) -> &'static str {
        if self.is_over_budget() {
            "OVER"
        } else if self.is_near_limit() {
            "NEAR"
        } else {
            "OK"
        }
    }
}

/// Compute the status of a budget given the total spend for its category
/// and period. A non-positive limit reports 0% rather than dividing by
/// zero; callers are expected to keep limits positive.
pub fn evaluate(budget: Budget, spent: Decimal) -> BudgetStatus {
    let remaining = budget.amount_limit - spent;
    let percentage = if budget.amount_limit > Decimal::ZERO {
        (spent / budget.amount_limit * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0)
    } else {
        0.0
    };
    BudgetStatus {
        budget,
        spent,
        remaining,
        percentage,
    }
}

fn severity(status: &BudgetStatus) -> u8 {
    if status.is_over_budget() {
        0
    } else if status.is_near_limit() {
        1
    } else {
        2
    }
}

/// Order for display and alerting: over-budget first, then near-limit,
/// then normal; highest usage first within each class. The sort is stable,
/// so equal entries keep their insertion order.
pub fn sort_statuses(statuses: &mut [BudgetStatus]) {
    statuses.sort_by(|a, b| {
        severity(a).cmp(&severity(b)).then(
            b.percentage
                .partial_cmp(&a.percentage)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });
}
