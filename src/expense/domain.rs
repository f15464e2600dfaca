//! The normalized expense record shared by the store, the pages and the aggregator.

use time::{Date, OffsetDateTime};

use crate::{
    Error,
    bank::BankId,
    category::{CategoryId, is_income},
};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// Shown wherever a category or bank is missing.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Whether money came in or went out, decided by the category name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Income,
    Expense,
}

impl RecordKind {
    /// The kind of an entry in the category called `category`.
    pub fn of(category: &str) -> Self {
        if is_income(category) {
            RecordKind::Income
        } else {
            RecordKind::Expense
        }
    }
}

/// One income or expense entry as read from the store.
///
/// Missing categories read as [UNKNOWN_LABEL]. `created_at` is `None` when
/// the stored timestamp is absent or cannot be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub amount: f64,
    pub category: String,
    pub category_id: Option<CategoryId>,
    pub bank: Option<String>,
    pub bank_id: Option<BankId>,
    pub note: String,
    pub created_at: Option<OffsetDateTime>,
}

impl ExpenseRecord {
    pub fn kind(&self) -> RecordKind {
        RecordKind::of(&self.category)
    }

    /// The calendar date of the entry in the offset it was recorded with.
    pub fn date(&self) -> Option<Date> {
        self.created_at.map(|created_at| created_at.date())
    }

    pub fn bank_label(&self) -> &str {
        self.bank.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}

/// A validated expense ready to be written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// Non-negative amount in rupees.
    pub amount: f64,
    /// Decides whether the entry is income or an expense.
    pub category_id: CategoryId,
    /// Only set when the user tracks banks.
    pub bank_id: Option<BankId>,
    /// Free text shown alongside the entry.
    pub note: String,
    /// When the entry happened, in the user's local offset. Never in the future.
    pub created_at: OffsetDateTime,
}

impl NewExpense {
    /// Check the amount and date of an expense.
    ///
    /// # Errors
    ///
    /// - [Error::NegativeAmount] if `amount` is below zero or not a finite number.
    /// - [Error::FutureDate] if `created_at` falls after `today`.
    pub fn new(
        amount: f64,
        category_id: CategoryId,
        bank_id: Option<BankId>,
        note: &str,
        created_at: OffsetDateTime,
        today: Date,
    ) -> Result<Self, Error> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::NegativeAmount(amount));
        }

        if created_at.date() > today {
            return Err(Error::FutureDate(created_at.date()));
        }

        Ok(Self {
            amount,
            category_id,
            bank_id,
            note: note.trim().to_owned(),
            created_at,
        })
    }
}

#[cfg(test)]
mod new_expense_tests {
    use time::macros::{date, datetime};

    use crate::Error;

    use super::{NewExpense, RecordKind};

    #[test]
    fn new_trims_note() {
        let got = NewExpense::new(
            12.5,
            1,
            None,
            "  lunch ",
            datetime!(2024-03-05 12:00 UTC),
            date!(2024 - 03 - 05),
        )
        .unwrap();

        assert_eq!(got.note, "lunch");
    }

    #[test]
    fn zero_amount_is_allowed() {
        let got = NewExpense::new(
            0.0,
            1,
            None,
            "",
            datetime!(2024-03-05 12:00 UTC),
            date!(2024 - 03 - 05),
        );

        assert!(got.is_ok());
    }

    #[test]
    fn negative_amount_is_rejected() {
        let got = NewExpense::new(
            -1.0,
            1,
            None,
            "",
            datetime!(2024-03-05 12:00 UTC),
            date!(2024 - 03 - 05),
        );

        assert_eq!(got, Err(Error::NegativeAmount(-1.0)));
    }

    #[test]
    fn future_date_is_rejected() {
        let got = NewExpense::new(
            1.0,
            1,
            None,
            "",
            datetime!(2024-03-06 00:00 UTC),
            date!(2024 - 03 - 05),
        );

        assert_eq!(got, Err(Error::FutureDate(date!(2024 - 03 - 06))));
    }

    #[test]
    fn kind_comes_from_category_name() {
        assert_eq!(RecordKind::of("income"), RecordKind::Income);
        assert_eq!(RecordKind::of("Food"), RecordKind::Expense);
        assert_eq!(RecordKind::of("Unknown"), RecordKind::Expense);
    }
}
