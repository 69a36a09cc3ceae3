use anyhow::Result;
use chrono::{DateTime, Duration, Months, Utc};

use crate::models::{Interval, RecurringExpense};

/// One scheduling step: the occurrence after `from` for the given interval.
/// Monthly and yearly steps preserve the day-of-month, clamped to shorter
/// months (Jan 31 → Feb 28/29, Feb 29 → Feb 28 in non-leap years).
pub fn next_run_date(interval: Interval, from: DateTime<Utc>) -> DateTime<Utc> {
    match interval {
        Interval::Weekly => from + Duration::days(7),
        Interval::Biweekly => from + Duration::days(14),
        Interval::Monthly => from.checked_add_months(Months::new(1)).unwrap_or(from),
        Interval::Yearly => from.checked_add_months(Months::new(12)).unwrap_or(from),
    }
}

/// Persistence capability the catch-up batch needs. `Database` implements
/// this; tests substitute an in-memory recorder.
pub trait OccurrenceSink {
    /// Materialize one occurrence of `rec` dated at `occurred_at`. Returns
    /// false when an expense for this (recurring id, timestamp) already
    /// exists, which counts as success — the batch must be idempotent.
    fn materialize(&mut self, rec: &RecurringExpense, occurred_at: DateTime<Utc>) -> Result<bool>;

    /// Persist the advanced next-run timestamp for the recurring expense.
    fn advance_next_run(&mut self, id: i64, next_run: DateTime<Utc>) -> Result<()>;
}

/// What a catch-up pass did.
#[derive(Debug, Default)]
pub struct CatchupReport {
    pub materialized: usize,
    /// Occurrences that already existed (a previous pass got there first).
    pub skipped: usize,
    pub failed: Vec<(i64, String)>,
}

/// Materialize every occurrence that came due while the app was not
/// running: for each recurring expense with `next_run <= now`, create an
/// expense dated at `next_run` and step forward until the next run is in
/// the future.
///
/// A failed materialization stops that one item before its next-run
/// advances, so the next invocation retries the same occurrence; the
/// remaining items still run.
pub fn generate_missed_occurrences<S: OccurrenceSink>(
    sink: &mut S,
    items: &[RecurringExpense],
    now: DateTime<Utc>,
) -> CatchupReport {
    let mut report = CatchupReport::default();

    for rec in items {
        let Some(id) = rec.id else { continue };

        let mut due = rec.next_run;
        while due <= now {
            match sink.materialize(rec, due) {
                Ok(true) => report.materialized += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    report.failed.push((id, e.to_string()));
                    break;
                }
            }

            let next = next_run_date(rec.interval, due);
            if next <= due {
                // Date arithmetic refused to move forward; bail out of the
                // loop rather than spin.
                report.failed.push((id, format!("next run did not advance past {due}")));
                break;
            }
            due = next;

            if let Err(e) = sink.advance_next_run(id, due) {
                report.failed.push((id, e.to_string()));
                break;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests;
