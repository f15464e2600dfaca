use std::collections::{BTreeMap, BTreeSet};

use time::{Date, Month};

use crate::{
    aggregation::{PeriodSelection, RecordFilter},
    expense::{ExpenseRecord, RecordKind},
};

/// Expense totals keyed by category name, in ascending name order.
pub type CategoryTotals = BTreeMap<String, f64>;

/// Income and spending for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRow {
    pub year: i32,
    pub month: Month,
    /// e.g. "Mar 2024"
    pub label: String,
    pub income: f64,
    /// One entry for every category in [MonthlySeries::categories], zero when
    /// nothing was spent in that category this month.
    pub expenses: CategoryTotals,
}

/// Income against per-category spending, one row per month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    /// Every expense category seen in the records, in ascending order.
    pub categories: Vec<String>,
    /// Oldest month first.
    pub rows: Vec<MonthlyRow>,
}

/// The headline numbers for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthlySummary {
    pub income: f64,
    pub expense: f64,
    /// Income minus expense.
    pub balance: f64,
}

/// Every view the pages need, computed from one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    /// Expense totals for the month containing `today`.
    pub this_month: CategoryTotals,
    /// Expense totals for the selected period.
    pub period: CategoryTotals,
    pub monthly: MonthlySeries,
    pub summary: MonthlySummary,
    /// Years present in the unfiltered records, newest first.
    pub years: Vec<i32>,
}

fn dated_expenses<'a>(
    records: impl IntoIterator<Item = &'a ExpenseRecord>,
) -> impl Iterator<Item = (Date, &'a ExpenseRecord)> {
    records.into_iter().filter_map(|record| {
        let date = record.date()?;
        (record.kind() == RecordKind::Expense).then_some((date, record))
    })
}

fn sum_by_category<'a>(records: impl Iterator<Item = &'a ExpenseRecord>) -> CategoryTotals {
    records.fold(CategoryTotals::new(), |mut totals, record| {
        *totals.entry(record.category.clone()).or_default() += record.amount;
        totals
    })
}

/// Expense totals per category for the calendar month containing `today`.
pub fn month_category_totals<'a>(
    records: impl IntoIterator<Item = &'a ExpenseRecord>,
    today: Date,
) -> CategoryTotals {
    sum_by_category(
        dated_expenses(records)
            .filter(|(date, _)| date.year() == today.year() && date.month() == today.month())
            .map(|(_, record)| record),
    )
}

/// Expense totals per category for every record inside `period`.
pub fn category_totals<'a>(
    records: impl IntoIterator<Item = &'a ExpenseRecord>,
    period: &PeriodSelection,
) -> CategoryTotals {
    sum_by_category(
        dated_expenses(records)
            .filter(|(date, _)| period.contains(*date))
            .map(|(_, record)| record),
    )
}

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_label(year: i32, month: Month) -> String {
    let abbreviation = MONTH_ABBREVIATIONS[usize::from(u8::from(month)) - 1];

    format!("{abbreviation} {year}")
}

/// Income and per-category expenses for every month that has records.
pub fn monthly_series<'a>(records: impl IntoIterator<Item = &'a ExpenseRecord>) -> MonthlySeries {
    let mut months: BTreeMap<(i32, u8), (f64, CategoryTotals)> = BTreeMap::new();
    let mut categories = BTreeSet::new();

    for record in records {
        let Some(date) = record.date() else {
            continue;
        };

        let (income, expenses) = months
            .entry((date.year(), u8::from(date.month())))
            .or_default();

        match record.kind() {
            RecordKind::Income => *income += record.amount,
            RecordKind::Expense => {
                *expenses.entry(record.category.clone()).or_default() += record.amount;
                categories.insert(record.category.clone());
            }
        }
    }

    let rows = months
        .into_iter()
        .filter_map(|((year, month), (income, mut expenses))| {
            let month = Month::try_from(month).ok()?;

            for category in &categories {
                expenses.entry(category.clone()).or_insert(0.0);
            }

            Some(MonthlyRow {
                year,
                month,
                label: month_label(year, month),
                income,
                expenses,
            })
        })
        .collect();

    MonthlySeries {
        categories: categories.into_iter().collect(),
        rows,
    }
}

/// Income, expense and balance for the month containing `day`.
pub fn monthly_summary<'a>(
    records: impl IntoIterator<Item = &'a ExpenseRecord>,
    day: Date,
) -> MonthlySummary {
    let (income, expense) = records
        .into_iter()
        .filter(|record| {
            record
                .date()
                .is_some_and(|date| date.year() == day.year() && date.month() == day.month())
        })
        .fold((0.0, 0.0), |(income, expense), record| match record.kind() {
            RecordKind::Income => (income + record.amount, expense),
            RecordKind::Expense => (income, expense + record.amount),
        });

    MonthlySummary {
        income,
        expense,
        balance: income - expense,
    }
}

/// The distinct years with dated records, newest first.
pub fn available_years<'a>(records: impl IntoIterator<Item = &'a ExpenseRecord>) -> Vec<i32> {
    records
        .into_iter()
        .filter_map(|record| record.date().map(|date| date.year()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect()
}

/// Filter `records` and compute every view from what is left.
///
/// The year list is taken from all of `records` so that filtering cannot hide
/// a year from the picker.
pub fn aggregate(
    records: &[ExpenseRecord],
    filter: &RecordFilter,
    period: &PeriodSelection,
    today: Date,
) -> Aggregates {
    let filtered = filter.apply(records);

    Aggregates {
        this_month: month_category_totals(filtered.iter().copied(), today),
        period: category_totals(filtered.iter().copied(), period),
        monthly: monthly_series(filtered.iter().copied()),
        summary: monthly_summary(filtered.iter().copied(), today),
        years: available_years(records),
    }
}
