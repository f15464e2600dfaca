//! Snapshots of a user's expenses and the live feed that pushes them to subscribers.

mod feed;
mod source;

pub use feed::ExpenseFeed;
pub use source::RecordSource;
