mod schema;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;
use crate::schedule::OccurrenceSink;

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_default_categories()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        // Check if schema_version table exists
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        // Existing database - check version and apply migrations
        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let defaults = [
            ("Bills & Subscriptions", "🧾"),
            ("Education", "📚"),
            ("Entertainment", "🎬"),
            ("Food & Dining", "🍜"),
            ("Groceries", "🛒"),
            ("Health", "💊"),
            ("Housing", "🏠"),
            ("Personal Care", "🧴"),
            ("Shopping", "🛍"),
            ("Transport", "🚌"),
            ("Travel", "✈️"),
            ("Utilities", "💡"),
            ("Other", "📦"),
        ];

        let tx = self.conn.transaction()?;
        for (name, icon) in &defaults {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name, icon, is_active) VALUES (?1, ?2, 1)",
                params![name, icon],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, icon, is_active FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                icon: row.get(2)?,
                is_active: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_active_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, icon, is_active FROM categories WHERE is_active = 1 ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                icon: row.get(2)?,
                is_active: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let result = self.conn.query_row(
            "SELECT id, name, icon, is_active FROM categories WHERE id = ?1",
            params![id],
            |row| {
                Ok(Category {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    icon: row.get(2)?,
                    is_active: row.get(3)?,
                })
            },
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO categories (name, icon, is_active) VALUES (?1, ?2, ?3)",
            params![cat.name, cat.icon, cat.is_active],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ── Budgets ───────────────────────────────────────────────

    pub(crate) fn create_budget(&self, budget: &Budget) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO budgets (user_id, category_id, amount_limit, warning_threshold, month, year)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                budget.user_id,
                budget.category_id,
                budget.amount_limit.to_string(),
                budget.warning_threshold,
                budget.month,
                budget.year,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn update_budget(&self, budget: &Budget) -> Result<()> {
        let Some(id) = budget.id else {
            bail!("Cannot update a budget that was never saved");
        };
        self.conn.execute(
            "UPDATE budgets SET amount_limit = ?1, warning_threshold = ?2 WHERE id = ?3",
            params![budget.amount_limit.to_string(), budget.warning_threshold, id],
        )?;
        Ok(())
    }

    pub(crate) fn get_user_budgets(&self, user: &str, month: u32, year: i32) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, category_id, amount_limit, warning_threshold, month, year
             FROM budgets WHERE user_id = ?1 AND month = ?2 AND year = ?3 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user, month, year], |row| {
            let amt_str: String = row.get(3)?;
            Ok(Budget {
                id: Some(row.get(0)?),
                user_id: row.get(1)?,
                category_id: row.get(2)?,
                amount_limit: Decimal::from_str(&amt_str).unwrap_or_default(),
                warning_threshold: row.get(4)?,
                month: row.get(5)?,
                year: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_category_budget(
        &self,
        user: &str,
        category_id: i64,
        month: u32,
        year: i32,
    ) -> Result<Option<Budget>> {
        let result = self.conn.query_row(
            "SELECT id, user_id, category_id, amount_limit, warning_threshold, month, year
             FROM budgets WHERE user_id = ?1 AND category_id = ?2 AND month = ?3 AND year = ?4",
            params![user, category_id, month, year],
            |row| {
                let amt_str: String = row.get(3)?;
                Ok(Budget {
                    id: Some(row.get(0)?),
                    user_id: row.get(1)?,
                    category_id: row.get(2)?,
                    amount_limit: Decimal::from_str(&amt_str).unwrap_or_default(),
                    warning_threshold: row.get(4)?,
                    month: row.get(5)?,
                    year: row.get(6)?,
                })
            },
        );
        match result {
            Ok(b) => Ok(Some(b)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn delete_budget(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM budgets WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn insert_expense(&self, expense: &Expense) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO expenses (user_id, category_id, title, amount, note, date, recurring_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                expense.user_id,
                expense.category_id,
                expense.title,
                expense.amount.to_string(),
                expense.note,
                expense.date.to_rfc3339(),
                expense.recurring_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Total spend for one category in one (month, year) period.
    pub(crate) fn get_category_spent(
        &self,
        user: &str,
        category_id: i64,
        month: u32,
        year: i32,
    ) -> Result<Decimal> {
        let total: String = self.conn.query_row(
            "SELECT CAST(COALESCE(SUM(amount), 0) AS TEXT) FROM expenses
             WHERE user_id = ?1 AND category_id = ?2 AND date LIKE ?3",
            params![user, category_id, period_pattern(month, year)],
            |row| row.get(0),
        )?;
        Ok(Decimal::from_str(&total).unwrap_or_default())
    }

    // ── Recurring expenses ────────────────────────────────────

    pub(crate) fn insert_recurring_expense(&self, rec: &RecurringExpense) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO recurring_expenses (user_id, category_id, title, amount, note, interval, start_date, next_run)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                rec.user_id,
                rec.category_id,
                rec.title,
                rec.amount.to_string(),
                rec.note,
                rec.interval.as_str(),
                rec.start.to_rfc3339(),
                rec.next_run.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_recurring_expenses(&self, user: &str) -> Result<Vec<RecurringExpense>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, category_id, title, amount, note, interval, start_date, next_run
             FROM recurring_expenses WHERE user_id = ?1 ORDER BY next_run, id",
        )?;
        let rows = stmt.query_map(params![user], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, user_id, category_id, title, amount, note, interval, start, next_run) = row?;
            out.push(RecurringExpense {
                id: Some(id),
                user_id,
                category_id,
                title,
                amount: Decimal::from_str(&amount).unwrap_or_default(),
                note,
                // A value outside the closed interval set is corrupt data
                interval: Interval::parse(&interval)?,
                start: parse_ts(&start),
                next_run: parse_ts(&next_run),
            });
        }
        Ok(out)
    }

    pub(crate) fn update_next_run(&self, id: i64, next_run: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE recurring_expenses SET next_run = ?1 WHERE id = ?2",
            params![next_run.to_rfc3339(), id],
        )?;
        Ok(())
    }
}

impl OccurrenceSink for Database {
    fn materialize(&mut self, rec: &RecurringExpense, occurred_at: DateTime<Utc>) -> Result<bool> {
        let Some(rec_id) = rec.id else {
            bail!("Cannot materialize a recurring expense that was never saved");
        };
        let date = occurred_at.to_rfc3339();

        // The unique index on (recurring_id, date) is the backstop; checking
        // first keeps duplicate invocations error-free.
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM expenses WHERE recurring_id = ?1 AND date = ?2)",
            params![rec_id, date],
            |row| row.get(0),
        )?;
        if exists {
            return Ok(false);
        }

        self.conn.execute(
            "INSERT INTO expenses (user_id, category_id, title, amount, note, date, recurring_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                rec.user_id,
                rec.category_id,
                rec.title,
                rec.amount.to_string(),
                rec.note,
                date,
                rec_id,
            ],
        )?;
        Ok(true)
    }

    fn advance_next_run(&mut self, id: i64, next_run: DateTime<Utc>) -> Result<()> {
        self.update_next_run(id, next_run)
    }
}

fn period_pattern(month: u32, year: i32) -> String {
    format!("{year:04}-{month:02}%")
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
