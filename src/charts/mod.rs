//! Category and monthly charts for the user's expenses, kept live over server-sent events.

mod builders;
mod page;
mod stream;

pub use page::get_charts_page;
pub use stream::charts_stream;
