pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL UNIQUE,
    icon      TEXT NOT NULL DEFAULT '',
    is_active BOOLEAN NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS budgets (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id           TEXT NOT NULL,
    category_id       INTEGER NOT NULL REFERENCES categories(id),
    amount_limit      TEXT NOT NULL,
    warning_threshold REAL NOT NULL DEFAULT 0.8,
    month             INTEGER NOT NULL,
    year              INTEGER NOT NULL,
    UNIQUE(user_id, category_id, month, year)
);

CREATE TABLE IF NOT EXISTS recurring_expenses (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     TEXT NOT NULL,
    category_id INTEGER NOT NULL REFERENCES categories(id),
    title       TEXT NOT NULL,
    amount      TEXT NOT NULL,
    note        TEXT,
    interval    TEXT NOT NULL,
    start_date  TEXT NOT NULL,
    next_run    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS expenses (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id      TEXT NOT NULL,
    category_id  INTEGER NOT NULL REFERENCES categories(id),
    title        TEXT NOT NULL,
    amount       TEXT NOT NULL,
    note         TEXT,
    date         TEXT NOT NULL,
    recurring_id INTEGER REFERENCES recurring_expenses(id)
);

CREATE INDEX IF NOT EXISTS idx_expenses_user_category_date ON expenses(user_id, category_id, date);
CREATE INDEX IF NOT EXISTS idx_recurring_next_run ON recurring_expenses(next_run);
CREATE UNIQUE INDEX IF NOT EXISTS idx_expenses_occurrence ON expenses(recurring_id, date) WHERE recurring_id IS NOT NULL;
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[
    // Future migrations go here:
    // (1, "ALTER TABLE recurring_expenses ADD COLUMN paused BOOLEAN NOT NULL DEFAULT 0;"),
];
