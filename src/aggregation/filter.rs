use time::Date;

use crate::{bank::BankId, expense::ExpenseRecord};

/// Narrows a set of records before they are aggregated.
///
/// Every field is optional and unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    /// Category name, compared ignoring case.
    pub category: Option<String>,
    /// Records without a bank never match a bank filter.
    pub bank_id: Option<BankId>,
    /// Inclusive lower bound on the record's date.
    pub date_from: Option<Date>,
    /// Inclusive upper bound on the record's date.
    pub date_to: Option<Date>,
    /// Case-insensitive substring of the category name or note.
    pub search_text: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        if let Some(category) = non_blank(&self.category)
            && !record.category.trim().eq_ignore_ascii_case(category)
        {
            return false;
        }

        if let Some(bank_id) = self.bank_id
            && record.bank_id != Some(bank_id)
        {
            return false;
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(date) = record.date() else {
                return false;
            };

            if self.date_from.is_some_and(|from| date < from)
                || self.date_to.is_some_and(|to| date > to)
            {
                return false;
            }
        }

        if let Some(search_text) = non_blank(&self.search_text) {
            let needle = search_text.to_lowercase();

            if !record.category.to_lowercase().contains(&needle)
                && !record.note.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        true
    }

    /// The records that pass the filter, in their original order.
    pub fn apply<'a>(&self, records: &'a [ExpenseRecord]) -> Vec<&'a ExpenseRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod record_filter_tests {
    use time::macros::{date, datetime};

    use crate::expense::ExpenseRecord;

    use super::RecordFilter;

    fn record(category: &str, note: &str, bank_id: Option<i64>) -> ExpenseRecord {
        ExpenseRecord {
            id: 1,
            amount: 10.0,
            category: category.to_owned(),
            category_id: Some(1),
            bank: None,
            bank_id,
            note: note.to_owned(),
            created_at: Some(datetime!(2024-03-05 12:00 UTC)),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = RecordFilter::default();

        assert!(filter.matches(&record("Food", "", None)));
    }

    #[test]
    fn category_is_compared_ignoring_case() {
        let filter = RecordFilter {
            category: Some("food".to_owned()),
            ..Default::default()
        };

        assert!(filter.matches(&record("Food", "", None)));
        assert!(!filter.matches(&record("Transport", "", None)));
    }

    #[test]
    fn blank_category_matches_everything() {
        let filter = RecordFilter {
            category: Some("  ".to_owned()),
            ..Default::default()
        };

        assert!(filter.matches(&record("Transport", "", None)));
    }

    #[test]
    fn bank_filter_skips_records_without_bank() {
        let filter = RecordFilter {
            bank_id: Some(2),
            ..Default::default()
        };

        assert!(filter.matches(&record("Food", "", Some(2))));
        assert!(!filter.matches(&record("Food", "", Some(3))));
        assert!(!filter.matches(&record("Food", "", None)));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let on_the_day = RecordFilter {
            date_from: Some(date!(2024 - 03 - 05)),
            date_to: Some(date!(2024 - 03 - 05)),
            ..Default::default()
        };
        let after = RecordFilter {
            date_from: Some(date!(2024 - 03 - 06)),
            ..Default::default()
        };

        assert!(on_the_day.matches(&record("Food", "", None)));
        assert!(!after.matches(&record("Food", "", None)));
    }

    #[test]
    fn date_bounds_skip_undated_records() {
        let filter = RecordFilter {
            date_to: Some(date!(2030 - 01 - 01)),
            ..Default::default()
        };
        let mut undated = record("Food", "", None);
        undated.created_at = None;

        assert!(!filter.matches(&undated));
    }

    #[test]
    fn search_text_looks_in_category_and_note() {
        let filter = RecordFilter {
            search_text: Some("LUNCH".to_owned()),
            ..Default::default()
        };

        assert!(filter.matches(&record("Food", "Lunch with Asha", None)));
        assert!(filter.matches(&record("Lunches", "", None)));
        assert!(!filter.matches(&record("Food", "dinner", None)));
    }

    #[test]
    fn apply_keeps_order() {
        let filter = RecordFilter {
            category: Some("Food".to_owned()),
            ..Default::default()
        };
        let mut first = record("Food", "a", None);
        first.id = 1;
        let mut second = record("Food", "b", None);
        second.id = 2;
        let records = vec![first, record("Bills", "", None), second];

        let ids = filter
            .apply(&records)
            .into_iter()
            .map(|record| record.id)
            .collect::<Vec<_>>();

        assert_eq!(ids, [1, 2]);
    }
}
