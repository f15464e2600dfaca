use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::sse::{Event, KeepAlive, Sse},
};
use axum_extra::extract::Query;
use rusqlite::Connection;
use time::OffsetDateTime;
use tokio_stream::{Stream, StreamExt};

use crate::{
    AppState, Error,
    aggregation::{PeriodSelection, RecordFilter, aggregate},
    auth::UserID,
    charts::builders::{ChartsUpdate, chart_views},
    expense::{ExpenseRecord, FilterQuery},
    store::ExpenseFeed,
    timezone::local_now,
};

/// The state needed for the live chart updates.
#[derive(Debug, Clone)]
pub struct ChartsStreamState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
    pub expense_feed: ExpenseFeed,
}

impl FromRef<AppState> for ChartsStreamState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            expense_feed: state.expense_feed.clone(),
        }
    }
}

fn charts_event(
    records: &[ExpenseRecord],
    filter: &RecordFilter,
    period: &PeriodSelection,
    local_timezone: &str,
) -> Event {
    let today = match local_now(local_timezone) {
        Ok(now) => now.date(),
        Err(error) => {
            tracing::warn!("{error}, using UTC for the current month");
            OffsetDateTime::now_utc().date()
        }
    };

    let aggregates = aggregate(records, filter, period, today);
    let update = ChartsUpdate {
        charts: chart_views(&aggregates, period),
    };

    Event::default()
        .event("charts")
        .json_data(update)
        .unwrap_or_else(|error| {
            tracing::error!("Could not serialize chart update: {error}");
            Event::default().comment("chart update failed")
        })
}

/// Server-sent events carrying fresh chart options whenever the user's expenses change.
///
/// The first event is sent straight away with the current records. Each event
/// applies the same filters as the charts page that opened the stream.
pub async fn charts_stream(
    State(state): State<ChartsStreamState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<FilterQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Error> {
    let subscription = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        state.expense_feed.subscribe(user_id, &*connection)?
    };

    let filter = query.record_filter();
    let period = query.period();
    let local_timezone = state.local_timezone;

    let stream = subscription.into_stream().map(move |snapshot| {
        Ok::<_, Infallible>(charts_event(&snapshot, &filter, &period, &local_timezone))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
