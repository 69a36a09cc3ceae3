use anyhow::Result;

use crate::db::Database;
use crate::status::{self, BudgetStatus};

/// Receives user-visible budget alerts. How they get delivered is the
/// caller's business; the CLI wires in [`ConsoleAlerts`], tests record.
pub(crate) trait AlertSink {
    fn near_limit(&mut self, category: &str, status: &BudgetStatus);
    fn over_budget(&mut self, category: &str, status: &BudgetStatus);
}

/// Re-evaluate every budget for the user and period from fresh spend data
/// and raise one alert per near-limit or over-budget status. Runs after
/// every budget reload. Returns the number of alerts raised.
pub(crate) fn check_all_budgets<S: AlertSink>(
    db: &Database,
    sink: &mut S,
    user: &str,
    month: u32,
    year: i32,
) -> Result<usize> {
    let budgets = db.get_user_budgets(user, month, year)?;

    let mut alerts = 0;
    for budget in budgets {
        let category_id = budget.category_id;
        let spent = db.get_category_spent(user, category_id, month, year)?;
        let status = status::evaluate(budget, spent);

        let name = db
            .get_category_by_id(category_id)?
            .map(|c| c.name)
            .unwrap_or_else(|| "Unknown".into());

        if status.is_over_budget() {
            sink.over_budget(&name, &status);
            alerts += 1;
        } else if status.is_near_limit() {
            sink.near_limit(&name, &status);
            alerts += 1;
        }
    }
    Ok(alerts)
}

/// Prints alerts to stderr so they stand out from tabular stdout output.
pub(crate) struct ConsoleAlerts;

impl AlertSink for ConsoleAlerts {
    fn near_limit(&mut self, category: &str, status: &BudgetStatus) {
        eprintln!(
            "Warning: {category} at {:.1}% of budget (${:.2} remaining)",
            status.percentage, status.remaining
        );
    }

    fn over_budget(&mut self, category: &str, status: &BudgetStatus) {
        eprintln!(
            "Alert: {category} over budget at {:.1}% (${:.2} over)",
            status.percentage,
            status.remaining.abs()
        );
    }
}
