//! Income and expense entries: storage, pages and the endpoints that change them.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod filter;
mod form;
mod list;
mod state;

pub use create::{create_expense_endpoint, get_new_expense_page};
pub use db::{
    create_expense, create_expense_table, delete_expense, get_expense, get_expense_records,
    update_expense,
};
pub use delete::delete_expense_endpoint;
pub use domain::{ExpenseId, ExpenseRecord, NewExpense, RecordKind, UNKNOWN_LABEL};
pub use edit::{get_edit_expense_page, update_expense_endpoint};
pub use filter::{FilterOptions, FilterQuery, filter_form};
pub use list::{expense_table, get_expenses_page};
