//! The fields shared by the new and edit expense forms, and turning a
//! submitted form into a validated [NewExpense].

use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::{UserID, get_user_by_id},
    bank::{Bank, BankId, get_bank},
    category::{Category, CategoryName, get_or_create_category_by_name},
    expense::{NewExpense, filter::parse_date_input},
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The form data for creating or updating an expense.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseForm {
    /// The amount in rupees, never negative.
    pub amount: f64,
    /// A category name. Unknown names create a new category.
    pub category: String,
    #[serde(default)]
    pub note: String,
    /// The date as sent by a date input, e.g. "2024-03-05".
    pub date: String,
    #[serde(default)]
    pub bank_id: Option<BankId>,
}

/// Validate `form` and resolve its category and bank for `user_id`.
///
/// The time of day and offset of `timestamp` are kept and combined with the
/// submitted date. A category that does not exist yet is created, so callers
/// should run this inside a transaction they only commit once the expense is saved.
///
/// # Errors
///
/// - [Error::InvalidDateFormat] if the date cannot be parsed.
/// - [Error::EmptyCategoryName] if the category is blank.
/// - [Error::InvalidBank] if the bank is not one of the user's banks, or the
///   user has bank tracking turned off.
/// - [Error::NegativeAmount] or [Error::FutureDate] from [NewExpense::new].
pub fn resolve_expense(
    user_id: UserID,
    form: &ExpenseForm,
    timestamp: OffsetDateTime,
    today: Date,
    connection: &Connection,
) -> Result<NewExpense, Error> {
    let date = parse_date_input(&form.date)?;
    let created_at = date
        .with_time(timestamp.time())
        .assume_offset(timestamp.offset());
    let category_name = CategoryName::new(&form.category)?;

    if let Some(bank_id) = form.bank_id {
        let user = get_user_by_id(user_id, connection)?;

        if !user.track_banks {
            return Err(Error::InvalidBank(Some(bank_id)));
        }

        match get_bank(user_id, bank_id, connection) {
            Ok(_) => {}
            Err(Error::NotFound) => return Err(Error::InvalidBank(Some(bank_id))),
            Err(error) => return Err(error),
        }
    }

    let category = get_or_create_category_by_name(user_id, category_name, connection)?;

    NewExpense::new(
        form.amount,
        category.id,
        form.bank_id,
        &form.note,
        created_at,
        today,
    )
}

pub struct ExpenseFormDefaults<'a> {
    pub amount: Option<f64>,
    pub category: Option<&'a str>,
    pub note: Option<&'a str>,
    pub date: Date,
    pub max_date: Date,
    pub bank_id: Option<BankId>,
}

/// The input fields for an expense form.
///
/// `banks` is `None` when the user has bank tracking turned off.
pub fn expense_form_fields(
    defaults: &ExpenseFormDefaults<'_>,
    categories: &[Category],
    banks: Option<&[Bank]>,
) -> Markup {
    let amount_str = defaults.amount.map(|amount| format!("{amount:.2}"));

    html! {
        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    required
                    autofocus
                    value=[amount_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            input
                name="category"
                id="category"
                type="text"
                list="category-options"
                placeholder="e.g. Food"
                required
                autocomplete="off"
                value=[defaults.category]
                class=(FORM_TEXT_INPUT_STYLE);

            datalist id="category-options"
            {
                @for category in categories {
                    option value=(category.name) {}
                }
            }
        }

        div
        {
            label for="note" class=(FORM_LABEL_STYLE) { "Note" }

            input
                name="note"
                id="note"
                type="text"
                placeholder="Optional"
                value=[defaults.note]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                max=(defaults.max_date)
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        @if let Some(banks) = banks {
            div
            {
                label for="bank_id" class=(FORM_LABEL_STYLE) { "Bank" }

                select name="bank_id" id="bank_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[defaults.bank_id.is_none()] { "No bank" }

                    @for bank in banks {
                        option value=(bank.id) selected[defaults.bank_id == Some(bank.id)]
                        {
                            (bank.name)
                        }
                    }
                }
            }
        }
    }
}


#[cfg(test)]
mod expense_form_fields_tests {
    use maud::html;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        bank::{Bank, BankName},
        category::{Category, CategoryName},
        test_utils::{
            assert_form_input, assert_form_input_with_value, assert_form_select, assert_valid_html,
            must_get_form,
        },
    };

    use super::{ExpenseFormDefaults, expense_form_fields};

    fn render(defaults: &ExpenseFormDefaults<'_>, banks: Option<&[Bank]>) -> Html {
        let categories = [Category {
            id: 1,
            name: CategoryName::new_unchecked("Food"),
        }];
        let fields = expense_form_fields(defaults, &categories, banks);

        Html::parse_fragment(&html! { form { (fields) } }.into_string())
    }

    fn defaults() -> ExpenseFormDefaults<'static> {
        ExpenseFormDefaults {
            amount: None,
            category: None,
            note: None,
            date: date!(2024 - 03 - 05),
            max_date: date!(2024 - 03 - 05),
            bank_id: None,
        }
    }

    #[test]
    fn renders_required_fields_with_today_as_default() {
        let html = render(&defaults(), None);
        assert_valid_html(&html);
        let form = must_get_form(&html);

        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "category", "text");
        assert_form_input_with_value(&form, "date", "date", "2024-03-05");
        assert_form_input_with_value(&form, "note", "text", "");
        let options = form
            .select(&Selector::parse("datalist option").unwrap())
            .map(|option| option.value().attr("value").unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(options, ["Food"]);
        assert!(
            form.select(&Selector::parse("select").unwrap())
                .next()
                .is_none(),
            "bank select should be hidden when tracking is off"
        );
    }

    #[test]
    fn renders_bank_select_and_prefilled_values() {
        let banks = [Bank {
            id: 7,
            name: BankName::new_unchecked("HDFC"),
        }];
        let defaults = ExpenseFormDefaults {
            amount: Some(12.5),
            category: Some("Food"),
            note: Some("lunch"),
            bank_id: Some(7),
            ..defaults()
        };

        let html = render(&defaults, Some(&banks));
        let form = must_get_form(&html);

        assert_form_input_with_value(&form, "amount", "number", "12.50");
        assert_form_input_with_value(&form, "category", "text", "Food");
        assert_form_input_with_value(&form, "note", "text", "lunch");
        assert_form_select(&form, "bank_id", &["No bank", "HDFC"]);
        let selected = form
            .select(&Selector::parse("option[selected]").unwrap())
            .next()
            .unwrap();
        assert_eq!(selected.value().attr("value"), Some("7"));
    }
}
