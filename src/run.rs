use anyhow::{bail, Result};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::db::Database;
use crate::models::{Budget, Category, Expense, Interval, RecurringExpense, DEFAULT_WARNING_THRESHOLD};
use crate::notify::{self, ConsoleAlerts};
use crate::schedule;
use crate::status;

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    match args[1].as_str() {
        "budget" | "b" => cli_budget(&args[2..], db),
        "spend" => cli_spend(&args[2..], db),
        "recurring" | "r" => cli_recurring(&args[2..], db),
        "catchup" => cli_catchup(&args[2..], db),
        "categories" => cli_categories(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("budgetwise {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn print_usage() {
    println!("BudgetWise — local-only budget & recurring expense tracker");
    println!();
    println!("Usage: budgetwise <command>");
    println!();
    println!("Commands:");
    println!("  budget set <category> <amount>  Set (or update) a category budget");
    println!("    --threshold <percent>         Warning threshold, 10-100 (default: 80)");
    println!("  budget list                     Show budgets with status, worst first");
    println!("  budget delete <category>        Remove a category budget");
    println!("  spend <category> <amount>       Record a one-off expense");
    println!("    --title <text>                Description (default: category name)");
    println!("    --note <text>                 Optional note");
    println!("  recurring add <title> <amount> <interval>");
    println!("                                  Add a recurring expense");
    println!("    --category <name>             Category (required)");
    println!("    --note <text>                 Optional note");
    println!("  recurring list                  List recurring expenses");
    println!("  catchup                         Materialize overdue recurring expenses");
    println!("  categories                      List categories");
    println!();
    println!("Common flags:");
    println!("  --user <id>                     Acting user (default: \"default\")");
    println!("  --month <1-12>, --year <YYYY>   Budget period (default: current)");
    println!("  --help, -h                      Show this help");
    println!("  --version, -V                   Show version");
    println!();
    let intervals: Vec<&str> = Interval::all().iter().map(|i| i.as_str()).collect();
    println!("Intervals: {}", intervals.join(", "));
}

// ── Budgets ───────────────────────────────────────────────────

fn cli_budget(args: &[String], db: &mut Database) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("set") => cli_budget_set(&args[1..], db),
        Some("list") => cli_budget_list(&args[1..], db),
        Some("delete") => cli_budget_delete(&args[1..], db),
        _ => bail!("Usage: budgetwise budget <set|list|delete> ..."),
    }
}

fn cli_budget_set(args: &[String], db: &mut Database) -> Result<()> {
    let [category_name, amount_str, ..] = args else {
        bail!("Usage: budgetwise budget set <category> <amount> [--threshold <percent>]");
    };

    let user = user_arg(args);
    let (month, year) = period_args(args)?;
    let category = resolve_category(db, category_name)?;
    let category_id = require_id(&category)?;
    let amount = parse_amount(amount_str)?;

    // An unusable threshold falls back to the default rather than blocking
    // the budget.
    let threshold = flag_value(args, "--threshold")
        .map(Budget::threshold_or_default)
        .unwrap_or(DEFAULT_WARNING_THRESHOLD);

    if let Some(mut existing) = db.get_category_budget(user, category_id, month, year)? {
        existing.amount_limit = amount;
        existing.warning_threshold = threshold;
        db.update_budget(&existing)?;
        println!("Updated budget for {category}: ${amount:.2} ({month}/{year})");
    } else {
        let mut budget = Budget::new(user.into(), category_id, amount, month, year);
        budget.warning_threshold = threshold;
        db.create_budget(&budget)?;
        println!("Budget set for {category}: ${amount:.2} ({month}/{year})");
    }
    Ok(())
}

fn cli_budget_list(args: &[String], db: &mut Database) -> Result<()> {
    let user = user_arg(args);
    let (month, year) = period_args(args)?;

    let budgets = db.get_user_budgets(user, month, year)?;
    if budgets.is_empty() {
        println!("No budgets for {month}/{year}");
        return Ok(());
    }

    let categories = db.get_categories()?;
    let mut statuses = Vec::with_capacity(budgets.len());
    for budget in budgets {
        let spent = db.get_category_spent(user, budget.category_id, month, year)?;
        statuses.push(status::evaluate(budget, spent));
    }
    status::sort_statuses(&mut statuses);

    println!("Budgets — {month}/{year}");
    println!(
        "{:<6} {:<20} {:>12} {:>12} {:>12} {:>8}",
        "Status", "Category", "Limit", "Spent", "Remaining", "Used"
    );
    println!("{}", "─".repeat(76));
    for s in &statuses {
        let name = Category::find_by_id(&categories, s.budget.category_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Unknown".into());
        println!(
            "{:<6} {:<20} {:>12} {:>12} {:>12} {:>7.1}%",
            s.badge(),
            name,
            format!("${:.2}", s.budget.amount_limit),
            format!("${:.2}", s.spent),
            format!("${:.2}", s.remaining),
            s.percentage,
        );
    }

    // Alert pass runs after every reload
    notify::check_all_budgets(db, &mut ConsoleAlerts, user, month, year)?;
    Ok(())
}

fn cli_budget_delete(args: &[String], db: &mut Database) -> Result<()> {
    let Some(category_name) = args.first() else {
        bail!("Usage: budgetwise budget delete <category>");
    };

    let user = user_arg(args);
    let (month, year) = period_args(args)?;
    let category = resolve_category(db, category_name)?;
    let category_id = require_id(&category)?;

    let Some(budget) = db.get_category_budget(user, category_id, month, year)? else {
        bail!("No budget for {category} in {month}/{year}");
    };
    let Some(id) = budget.id else {
        bail!("Budget has no ID");
    };
    db.delete_budget(id)?;
    println!("Deleted budget for {category} ({month}/{year})");
    Ok(())
}

// ── Expenses ──────────────────────────────────────────────────

fn cli_spend(args: &[String], db: &mut Database) -> Result<()> {
    let [category_name, amount_str, ..] = args else {
        bail!("Usage: budgetwise spend <category> <amount> [--title <text>] [--note <text>]");
    };

    let user = user_arg(args);
    let category = resolve_category(db, category_name)?;
    let category_id = require_id(&category)?;
    let amount = parse_amount(amount_str)?;
    let title = flag_value(args, "--title")
        .unwrap_or(&category.name)
        .to_string();
    let note = flag_value(args, "--note").map(str::to_string);

    let expense = Expense::manual(user.into(), category_id, title, amount, note, Utc::now());
    db.insert_expense(&expense)?;
    println!("Recorded ${amount:.2} against {category}");
    Ok(())
}

// ── Recurring expenses ────────────────────────────────────────

fn cli_recurring(args: &[String], db: &mut Database) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("add") => cli_recurring_add(&args[1..], db),
        Some("list") => cli_recurring_list(&args[1..], db),
        _ => bail!("Usage: budgetwise recurring <add|list> ..."),
    }
}

fn cli_recurring_add(args: &[String], db: &mut Database) -> Result<()> {
    let [title, amount_str, interval_str, ..] = args else {
        bail!("Usage: budgetwise recurring add <title> <amount> <interval> --category <name>");
    };

    let user = user_arg(args);
    let amount = parse_amount(amount_str)?;
    let interval = Interval::parse(interval_str)?;
    let Some(category_name) = flag_value(args, "--category") else {
        bail!("Missing --category <name>");
    };
    let category = resolve_category(db, category_name)?;
    let category_id = require_id(&category)?;
    let note = flag_value(args, "--note").map(str::to_string);

    let start = Utc::now();
    let next_run = schedule::next_run_date(interval, start);
    let rec = RecurringExpense::new(
        user.into(),
        category_id,
        title.clone(),
        amount,
        note,
        interval,
        start,
        next_run,
    );
    db.insert_recurring_expense(&rec)?;
    println!(
        "Added recurring expense \"{title}\" (${amount:.2} {interval}, next on {})",
        next_run.format("%Y-%m-%d")
    );

    // Pick up anything already overdue, as the add flow always does
    run_catchup(db, user)
}

fn cli_recurring_list(args: &[String], db: &mut Database) -> Result<()> {
    let user = user_arg(args);
    let items = db.get_recurring_expenses(user)?;
    if items.is_empty() {
        println!("No recurring expenses");
        return Ok(());
    }

    let categories = db.get_categories()?;
    println!(
        "{:<4} {:<24} {:<16} {:>10} {:<10} Next run",
        "ID", "Title", "Category", "Amount", "Interval"
    );
    println!("{}", "─".repeat(78));
    for rec in &items {
        let name = Category::find_by_id(&categories, rec.category_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Unknown".into());
        println!(
            "{:<4} {:<24} {:<16} {:>10} {:<10} {}",
            rec.id.unwrap_or(0),
            rec.title,
            name,
            format!("${:.2}", rec.amount),
            rec.interval.as_str(),
            rec.next_run.format("%Y-%m-%d"),
        );
    }
    Ok(())
}

fn cli_catchup(args: &[String], db: &mut Database) -> Result<()> {
    let user = user_arg(args);
    run_catchup(db, user)
}

fn run_catchup(db: &mut Database, user: &str) -> Result<()> {
    let items = db.get_recurring_expenses(user)?;
    let report = schedule::generate_missed_occurrences(db, &items, Utc::now());

    for (id, err) in &report.failed {
        eprintln!("Warning: recurring expense {id}: {err}");
    }
    if report.materialized > 0 || report.skipped > 0 {
        println!(
            "Materialized {} overdue occurrence(s) ({} already present)",
            report.materialized, report.skipped
        );
    }
    Ok(())
}

// ── Categories ────────────────────────────────────────────────

fn cli_categories(args: &[String], db: &mut Database) -> Result<()> {
    if args.first().map(String::as_str) == Some("add") {
        let Some(name) = args.get(1) else {
            bail!("Usage: budgetwise categories add <name> [--icon <icon>]");
        };
        let mut cat = Category::new(name.clone());
        if let Some(icon) = flag_value(args, "--icon") {
            cat.icon = icon.to_string();
        }
        db.insert_category(&cat)?;
        println!("Added category {name}");
        return Ok(());
    }

    let categories = db.get_active_categories()?;
    for cat in &categories {
        println!("{:<3} {}", cat.icon, cat.name);
    }
    Ok(())
}

// ── Argument helpers ──────────────────────────────────────────

fn resolve_category(db: &Database, name: &str) -> Result<Category> {
    let categories = db.get_active_categories()?;
    match Category::find_by_name(&categories, name) {
        Some(c) => Ok(c.clone()),
        None => bail!("Unknown category: {name} (see `budgetwise categories`)"),
    }
}

fn require_id(category: &Category) -> Result<i64> {
    category
        .id
        .ok_or_else(|| anyhow::anyhow!("Category has no ID"))
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn user_arg(args: &[String]) -> &str {
    flag_value(args, "--user").unwrap_or("default")
}

fn period_args(args: &[String]) -> Result<(u32, i32)> {
    let now = chrono::Local::now();
    let month = match flag_value(args, "--month") {
        Some(m) => m.parse::<u32>().ok().filter(|m| (1..=12).contains(m)),
        None => Some(now.month()),
    };
    let Some(month) = month else {
        bail!("Invalid month: expected 1-12");
    };
    let year = match flag_value(args, "--year") {
        Some(y) => match y.parse::<i32>() {
            Ok(y) => y,
            Err(_) => bail!("Invalid year: {y}"),
        },
        None => now.year(),
    };
    Ok((month, year))
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned = raw.replace(',', "");
    let Ok(amount) = Decimal::from_str(&cleaned) else {
        bail!("Invalid amount: {raw}");
    };
    if amount <= Decimal::ZERO {
        bail!("Invalid amount: must be greater than zero");
    }
    Ok(amount)
}
