//! The filter controls shared by the expenses and charts pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    Error,
    aggregation::{PeriodSelection, Quarter, RecordFilter},
    bank::{Bank, BankId},
    category::Category,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE},
};

/// Parse a date from an `<input type="date">`, e.g. "2024-03-05".
pub fn parse_date_input(raw: &str) -> Result<Date, Error> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), raw.to_owned()))
}

/// Query parameters for filtering records.
///
/// Decoded with `axum_extra`'s `Query`, so empty fields arrive as `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    /// Matched case-insensitively against the category name.
    pub category: Option<String>,
    pub bank_id: Option<BankId>,
    /// Inclusive, as "YYYY-MM-DD".
    pub date_from: Option<String>,
    /// Inclusive, as "YYYY-MM-DD".
    pub date_to: Option<String>,
    /// Substring of the category name or note.
    pub search: Option<String>,
    pub year: Option<i32>,
    /// Ignored unless `year` is set.
    pub quarter: Option<Quarter>,
}

fn parse_optional_date(raw: Option<&str>, field: &str) -> Option<Date> {
    let raw = raw?;

    parse_date_input(raw)
        .inspect_err(|error| tracing::warn!("Ignoring {field} filter: {error}"))
        .ok()
}

impl FilterQuery {
    /// The record filter described by the query. Dates that cannot be parsed are ignored.
    pub fn record_filter(&self) -> RecordFilter {
        RecordFilter {
            category: self.category.clone(),
            bank_id: self.bank_id,
            date_from: parse_optional_date(self.date_from.as_deref(), "date_from"),
            date_to: parse_optional_date(self.date_to.as_deref(), "date_to"),
            search_text: self.search.clone(),
        }
    }

    /// The year and quarter to aggregate over.
    pub fn period(&self) -> PeriodSelection {
        match self.year {
            Some(year) => PeriodSelection {
                year: Some(year),
                quarter: self.quarter,
            },
            None => PeriodSelection::all_time(),
        }
    }
}

/// The choices offered by the filter form.
pub struct FilterOptions<'a> {
    /// Where the form submits to with GET.
    pub action: &'a str,
    pub categories: &'a [Category],
    /// `None` when bank tracking is off.
    pub banks: Option<&'a [Bank]>,
    /// Shows the year and quarter pickers when set.
    pub years: Option<&'a [i32]>,
}

/// A GET form that reloads `options.action` with the chosen filters.
pub fn filter_form(query: &FilterQuery, options: &FilterOptions<'_>) -> Markup {
    let selected_category = query.category.as_deref().unwrap_or_default();

    html! {
        form
            method="get"
            action=(options.action)
            id="filter-form"
            class="grid w-full grid-cols-2 gap-3 md:grid-cols-4 lg:grid-cols-6 items-end"
        {
            div
            {
                label for="filter-category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="filter-category" name="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[selected_category.is_empty()] { "All" }

                    @for category in options.categories {
                        option
                            value=(category.name)
                            selected[category.name.as_ref().eq_ignore_ascii_case(selected_category)]
                        {
                            (category.name)
                        }
                    }
                }
            }

            @if let Some(banks) = options.banks {
                div
                {
                    label for="filter-bank" class=(FORM_LABEL_STYLE) { "Bank" }

                    select id="filter-bank" name="bank_id" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" selected[query.bank_id.is_none()] { "All" }

                        @for bank in banks {
                            option value=(bank.id) selected[query.bank_id == Some(bank.id)]
                            {
                                (bank.name)
                            }
                        }
                    }
                }
            }

            div
            {
                label for="filter-date-from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    id="filter-date-from"
                    type="date"
                    name="date_from"
                    value=[query.date_from.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="filter-date-to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    id="filter-date-to"
                    type="date"
                    name="date_to"
                    value=[query.date_to.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="filter-search" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    id="filter-search"
                    type="search"
                    name="search"
                    placeholder="Category or note"
                    value=[query.search.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(years) = options.years {
                div
                {
                    label for="filter-year" class=(FORM_LABEL_STYLE) { "Year" }

                    select id="filter-year" name="year" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" selected[query.year.is_none()] { "All time" }

                        @for year in years {
                            option value=(year) selected[query.year == Some(*year)] { (year) }
                        }
                    }
                }

                div
                {
                    label for="filter-quarter" class=(FORM_LABEL_STYLE) { "Quarter" }

                    select id="filter-quarter" name="quarter" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" selected[query.quarter.is_none()] { "Whole year" }

                        @for quarter in Quarter::ALL {
                            option value=(quarter) selected[query.quarter == Some(quarter)]
                            {
                                (quarter.label())
                            }
                        }
                    }
                }
            }

            div class="flex items-center gap-4 col-span-2 md:col-span-1"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
                a href=(options.action) class=(LINK_STYLE) { "Clear" }
            }
        }
    }
}
