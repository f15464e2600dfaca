//! Banks that expenses can optionally be assigned to when bank tracking is on.

mod db;
mod domain;
mod handlers;

pub use db::{create_bank, create_bank_table, delete_bank, get_bank, get_banks};
pub use domain::{Bank, BankFormData, BankId, BankName};
pub use handlers::{create_bank_endpoint, delete_bank_endpoint, new_bank_form};
