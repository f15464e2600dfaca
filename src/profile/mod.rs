//! The profile page and the account settings it changes.

mod page;
mod settings;

pub use page::get_profile_page;
pub use settings::{delete_profile_endpoint, set_bank_tracking_endpoint};
