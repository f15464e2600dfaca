use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::{Error, auth::UserID, expense::ExpenseRecord, store::RecordSource};

/// A user's complete list of expense records at one point in time.
pub type Snapshot = Arc<Vec<ExpenseRecord>>;

/// Pushes fresh snapshots of a user's records to everyone watching them.
///
/// Each user gets one watch channel. Subscribers only ever see the latest
/// snapshot, so a slow reader skips intermediate states instead of queueing them.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFeed {
    senders: Arc<Mutex<HashMap<UserID, watch::Sender<Snapshot>>>>,
}

impl ExpenseFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `user_id`'s records, beginning with the current snapshot from `source`.
    ///
    /// Dropping the returned [Subscription] unsubscribes.
    ///
    /// # Errors
    /// Returns an error if `source` could not be read or the feed's lock is poisoned.
    pub fn subscribe(
        &self,
        user_id: UserID,
        source: &impl RecordSource,
    ) -> Result<Subscription, Error> {
        let snapshot: Snapshot = Arc::new(source.snapshot(user_id)?);

        let mut senders = self
            .senders
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire feed lock: {error}"))
            .map_err(|_| Error::FeedLockError)?;

        let receiver = match senders.get(&user_id) {
            Some(sender) => {
                sender.send_replace(snapshot);
                sender.subscribe()
            }
            None => {
                let (sender, receiver) = watch::channel(snapshot);
                senders.insert(user_id, sender);
                receiver
            }
        };

        tracing::debug!("New subscriber for user {user_id}");

        Ok(Subscription { receiver })
    }

    /// Re-read `user_id`'s records from `source` and send them to their subscribers.
    ///
    /// Does nothing when nobody is watching. Failures are logged rather than
    /// returned since the write that triggered the publish has already succeeded.
    pub fn publish(&self, user_id: UserID, source: &impl RecordSource) {
        let mut senders = match self.senders.lock() {
            Ok(senders) => senders,
            Err(error) => {
                tracing::error!("could not acquire feed lock: {error}");
                return;
            }
        };

        senders.retain(|_, sender| sender.receiver_count() > 0);

        let Some(sender) = senders.get(&user_id) else {
            return;
        };

        match source.snapshot(user_id) {
            Ok(records) => {
                sender.send_replace(Arc::new(records));
            }
            Err(error) => {
                tracing::error!("Could not read records for user {user_id}: {error}");
            }
        }
    }

    #[cfg(test)]
    fn tracked_users(&self) -> usize {
        self.senders.lock().map(|senders| senders.len()).unwrap_or(0)
    }
}

/// A live view of one user's records.
#[derive(Debug)]
pub struct Subscription {
    receiver: watch::Receiver<Snapshot>,
}

impl Subscription {
    #[cfg(test)]
    pub fn latest(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Returns `None` once the feed has stopped tracking the user.
    #[cfg(test)]
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;

        Some(self.receiver.borrow_and_update().clone())
    }

    /// A stream that yields the current snapshot and then every new one.
    pub fn into_stream(self) -> WatchStream<Snapshot> {
        WatchStream::new(self.receiver)
    }
}
