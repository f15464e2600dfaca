//! Turns a snapshot of expense records into the totals shown on the charts and home pages.
//!
//! Everything here is a pure function of its inputs: the same records, filter
//! and period always give the same output, and nothing is read from or written
//! to the store.

mod filter;
mod period;
mod views;

pub use filter::RecordFilter;
pub use period::{PeriodSelection, Quarter};
pub use views::{
    Aggregates, CategoryTotals, MonthlyRow, MonthlySeries, MonthlySummary, aggregate,
    month_category_totals, monthly_summary,
};
