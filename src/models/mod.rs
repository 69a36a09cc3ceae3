mod budget;
mod category;
mod expense;
mod recurring;

pub use budget::{Budget, DEFAULT_WARNING_THRESHOLD};
pub use category::Category;
pub use expense::Expense;
pub use recurring::{Interval, RecurringExpense};

#[cfg(test)]
mod tests;
