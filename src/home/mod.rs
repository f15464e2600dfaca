//! The landing page: this month's balance and entries.

mod cards;
mod page;

pub use page::get_home_page;
