#![allow(clippy::unwrap_used)]

use anyhow::bail;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;

use super::*;
use crate::models::{Interval, RecurringExpense};

fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn make_recurring(id: i64, interval: Interval, next_run: DateTime<Utc>) -> RecurringExpense {
    let mut rec = RecurringExpense::new(
        "alice".into(),
        1,
        format!("rec-{id}"),
        dec!(10),
        None,
        interval,
        next_run,
        next_run,
    );
    rec.id = Some(id);
    rec
}

// ── next_run_date ─────────────────────────────────────────────

#[test]
fn test_weekly_adds_seven_days() {
    let from = ts(2024, 3, 1);
    assert_eq!(next_run_date(Interval::Weekly, from), ts(2024, 3, 8));
}

#[test]
fn test_biweekly_adds_fourteen_days() {
    let from = ts(2024, 3, 1);
    assert_eq!(next_run_date(Interval::Biweekly, from), ts(2024, 3, 15));
}

#[test]
fn test_weekly_crosses_month_boundary() {
    let from = ts(2024, 1, 29);
    assert_eq!(next_run_date(Interval::Weekly, from), ts(2024, 2, 5));
}

#[test]
fn test_monthly_preserves_day() {
    let from = ts(2024, 3, 15);
    assert_eq!(next_run_date(Interval::Monthly, from), ts(2024, 4, 15));
}

#[test]
fn test_monthly_clamps_to_shorter_month() {
    // Jan 31 -> Feb 29 in a leap year
    assert_eq!(next_run_date(Interval::Monthly, ts(2024, 1, 31)), ts(2024, 2, 29));
    // Jan 31 -> Feb 28 otherwise
    assert_eq!(next_run_date(Interval::Monthly, ts(2023, 1, 31)), ts(2023, 2, 28));
    // May 31 -> Jun 30
    assert_eq!(next_run_date(Interval::Monthly, ts(2024, 5, 31)), ts(2024, 6, 30));
}

#[test]
fn test_monthly_crosses_year_boundary() {
    assert_eq!(next_run_date(Interval::Monthly, ts(2024, 12, 10)), ts(2025, 1, 10));
}

#[test]
fn test_yearly_adds_one_year() {
    assert_eq!(next_run_date(Interval::Yearly, ts(2024, 6, 1)), ts(2025, 6, 1));
}

#[test]
fn test_yearly_clamps_leap_day() {
    assert_eq!(next_run_date(Interval::Yearly, ts(2024, 2, 29)), ts(2025, 2, 28));
}

#[test]
fn test_next_run_is_strictly_after() {
    let from = ts(2024, 1, 31);
    for interval in Interval::all() {
        assert!(next_run_date(*interval, from) > from, "{interval} did not advance");
    }
}

// ── generate_missed_occurrences ───────────────────────────────

/// In-memory stand-in for the persistence collaborator.
#[derive(Default)]
struct RecordingSink {
    occurrences: Vec<(i64, DateTime<Utc>)>,
    next_runs: Vec<(i64, DateTime<Utc>)>,
    /// Recurring ids whose materialization should fail.
    fail_ids: Vec<i64>,
}

impl OccurrenceSink for RecordingSink {
    fn materialize(&mut self, rec: &RecurringExpense, occurred_at: DateTime<Utc>) -> anyhow::Result<bool> {
        let id = rec.id.unwrap();
        if self.fail_ids.contains(&id) {
            bail!("simulated persistence failure");
        }
        if self.occurrences.contains(&(id, occurred_at)) {
            return Ok(false);
        }
        self.occurrences.push((id, occurred_at));
        Ok(true)
    }

    fn advance_next_run(&mut self, id: i64, next_run: DateTime<Utc>) -> anyhow::Result<()> {
        self.next_runs.retain(|(i, _)| *i != id);
        self.next_runs.push((id, next_run));
        Ok(())
    }
}

impl RecordingSink {
    fn next_run_of(&self, id: i64) -> Option<DateTime<Utc>> {
        self.next_runs.iter().find(|(i, _)| *i == id).map(|(_, t)| *t)
    }
}

#[test]
fn test_nothing_due_materializes_nothing() {
    let now = ts(2024, 6, 1);
    let items = vec![make_recurring(1, Interval::Weekly, ts(2024, 6, 2))];
    let mut sink = RecordingSink::default();

    let report = generate_missed_occurrences(&mut sink, &items, now);
    assert_eq!(report.materialized, 0);
    assert!(sink.occurrences.is_empty());
    assert!(sink.next_runs.is_empty());
}

#[test]
fn test_three_missed_months() {
    // next_run three months in the past: exactly 3 occurrences, and the
    // stored next_run ends up in the future, at most one interval away.
    let now = ts(2024, 6, 10);
    let items = vec![make_recurring(1, Interval::Monthly, ts(2024, 3, 15))];
    let mut sink = RecordingSink::default();

    let report = generate_missed_occurrences(&mut sink, &items, now);
    assert_eq!(report.materialized, 3);
    assert_eq!(
        sink.occurrences,
        vec![(1, ts(2024, 3, 15)), (1, ts(2024, 4, 15)), (1, ts(2024, 5, 15))]
    );

    let next = sink.next_run_of(1).unwrap();
    assert!(next > now);
    assert!(next <= next_run_date(Interval::Monthly, now));
}

#[test]
fn test_due_exactly_now_fires() {
    let now = ts(2024, 6, 1);
    let items = vec![make_recurring(1, Interval::Weekly, now)];
    let mut sink = RecordingSink::default();

    let report = generate_missed_occurrences(&mut sink, &items, now);
    assert_eq!(report.materialized, 1);
    assert_eq!(sink.next_run_of(1).unwrap(), ts(2024, 6, 8));
}

#[test]
fn test_second_pass_is_idempotent() {
    let now = ts(2024, 6, 10);
    let items = vec![make_recurring(1, Interval::Monthly, ts(2024, 4, 1))];
    let mut sink = RecordingSink::default();

    let first = generate_missed_occurrences(&mut sink, &items, now);
    assert_eq!(first.materialized, 3);

    // Re-read the items as a caller would: next_run has advanced.
    let mut advanced = items.clone();
    advanced[0].next_run = sink.next_run_of(1).unwrap();

    let second = generate_missed_occurrences(&mut sink, &advanced, now);
    assert_eq!(second.materialized, 0);
    assert_eq!(second.skipped, 0);
    assert_eq!(sink.occurrences.len(), 3);
}

#[test]
fn test_duplicate_occurrence_counts_as_skipped() {
    // If next_run was not advanced (e.g. a crash between insert and
    // update), the occurrence is already present and gets skipped.
    let now = ts(2024, 6, 10);
    let items = vec![make_recurring(1, Interval::Monthly, ts(2024, 5, 1))];
    let mut sink = RecordingSink::default();
    sink.occurrences.push((1, ts(2024, 5, 1)));

    let report = generate_missed_occurrences(&mut sink, &items, now);
    assert_eq!(report.materialized, 1); // only 2024-06-01
    assert_eq!(report.skipped, 1);
}

#[test]
fn test_failure_stops_item_without_advancing() {
    let now = ts(2024, 6, 10);
    let items = vec![make_recurring(1, Interval::Weekly, ts(2024, 6, 1))];
    let mut sink = RecordingSink {
        fail_ids: vec![1],
        ..Default::default()
    };

    let report = generate_missed_occurrences(&mut sink, &items, now);
    assert_eq!(report.materialized, 0);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, 1);
    // next_run untouched: the next invocation retries the same occurrence
    assert!(sink.next_run_of(1).is_none());
}

#[test]
fn test_failure_is_isolated_per_item() {
    let now = ts(2024, 6, 10);
    let items = vec![
        make_recurring(1, Interval::Weekly, ts(2024, 6, 1)),
        make_recurring(2, Interval::Weekly, ts(2024, 6, 1)),
    ];
    let mut sink = RecordingSink {
        fail_ids: vec![1],
        ..Default::default()
    };

    let report = generate_missed_occurrences(&mut sink, &items, now);
    // Item 1 failed, item 2 caught up both its due occurrences
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.materialized, 2);
    assert!(sink.occurrences.iter().all(|(id, _)| *id == 2));
    assert!(sink.next_run_of(2).unwrap() > now);
}

#[test]
fn test_unsaved_items_are_ignored() {
    let now = ts(2024, 6, 10);
    let mut rec = make_recurring(1, Interval::Weekly, ts(2024, 6, 1));
    rec.id = None;
    let mut sink = RecordingSink::default();

    let report = generate_missed_occurrences(&mut sink, &[rec], now);
    assert_eq!(report.materialized, 0);
    assert!(report.failed.is_empty());
}
