use std::fmt::Display;

use serde::Deserialize;
use time::Date;

/// A three month block of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// The zero-based index of the first month in the quarter: 0, 3, 6 or 9.
    pub fn start_month_index(self) -> u8 {
        match self {
            Quarter::Q1 => 0,
            Quarter::Q2 => 3,
            Quarter::Q3 => 6,
            Quarter::Q4 => 9,
        }
    }

    /// Whether the zero-based `month_index` falls inside the quarter.
    pub fn contains_month_index(self, month_index: u8) -> bool {
        let start = self.start_month_index();

        (start..start + 3).contains(&month_index)
    }

    pub fn label(self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1 (Jan-Mar)",
            Quarter::Q2 => "Q2 (Apr-Jun)",
            Quarter::Q3 => "Q3 (Jul-Sep)",
            Quarter::Q4 => "Q4 (Oct-Dec)",
        }
    }
}

impl Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        };

        f.write_str(name)
    }
}

/// The year and, optionally, quarter that the period totals are restricted to.
///
/// No year means all time. A quarter is only applied together with a year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodSelection {
    pub year: Option<i32>,
    pub quarter: Option<Quarter>,
}

impl PeriodSelection {
    pub fn all_time() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: Date) -> bool {
        let Some(year) = self.year else {
            return true;
        };

        if date.year() != year {
            return false;
        }

        match self.quarter {
            Some(quarter) => quarter.contains_month_index(u8::from(date.month()) - 1),
            None => true,
        }
    }

    /// A short description such as "2024 Q2" or "All time".
    pub fn label(&self) -> String {
        match (self.year, self.quarter) {
            (None, _) => "All time".to_owned(),
            (Some(year), None) => year.to_string(),
            (Some(year), Some(quarter)) => format!("{year} {quarter}"),
        }
    }
}
