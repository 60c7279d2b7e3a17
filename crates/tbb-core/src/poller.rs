//! Long-poll loop over an [`UpdateSource`].
//!
//! Three failure strata, each with its own boundary:
//! - per update: contained by [`Dispatcher::dispatch`], the batch continues;
//! - per fetch: logged, `fetch_error_backoff`, same offset retried;
//! - catastrophic (session preparation failure, panic escaping an iteration):
//!   logged, `restart_backoff`, session restarted with the cursor kept. After
//!   `max_restarts` consecutive failures [`UpdatePoller::run`] gives up.

use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    config::PollSettings, dispatch::Dispatcher, domain::UpdateId, errors::Error,
    messaging::types::IncomingUpdate, ports::UpdateSource, Result,
};

/// Highest update id already handed to dispatch. Never decreases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    last: UpdateId,
}

impl Cursor {
    pub fn last(&self) -> UpdateId {
        self.last
    }

    /// Offset for the next fetch, acknowledging everything up to the cursor.
    pub fn offset(&self) -> UpdateId {
        UpdateId(self.last.0 + 1)
    }

    /// Move the cursor to `id`. Returns `false` (and stays put) if `id` was
    /// already handed out.
    pub fn advance(&mut self, id: UpdateId) -> bool {
        if id <= self.last {
            return false;
        }
        self.last = id;
        true
    }
}

/// Consecutive catastrophic failures allowed before the poller gives up.
#[derive(Clone, Copy, Debug)]
struct RestartBudget {
    max: u32,
    consecutive: u32,
}

impl RestartBudget {
    fn new(max: u32) -> Self {
        Self {
            max,
            consecutive: 0,
        }
    }

    /// Count a failure; `false` once the budget is exhausted.
    fn record_failure(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.consecutive <= self.max
    }

    fn reset(&mut self) {
        self.consecutive = 0;
    }
}

pub struct UpdatePoller {
    source: Arc<dyn UpdateSource>,
    dispatcher: Dispatcher,
    settings: PollSettings,
}

impl UpdatePoller {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        dispatcher: Dispatcher,
        settings: PollSettings,
    ) -> Self {
        Self {
            source,
            dispatcher,
            settings,
        }
    }

    /// Poll until `stop` is cancelled.
    ///
    /// Returns the final cursor on graceful shutdown, or the last catastrophic
    /// error once the restart budget is spent.
    pub async fn run(&self, stop: &CancellationToken) -> Result<Cursor> {
        let mut cursor = Cursor::default();
        let mut budget = RestartBudget::new(self.settings.max_restarts);

        loop {
            if stop.is_cancelled() {
                break;
            }

            let session = AssertUnwindSafe(self.run_session(&mut cursor, &mut budget, stop))
                .catch_unwind()
                .await;
            let err = match session {
                Ok(Ok(())) => break,
                Ok(Err(e)) => e,
                Err(panic) => Error::from_panic(panic),
            };

            if !budget.record_failure() {
                error!(
                    restarts = budget.max,
                    cursor = cursor.last().0,
                    error = %err,
                    "poller failed repeatedly, giving up"
                );
                return Err(err);
            }

            error!(
                attempt = budget.consecutive,
                max = budget.max,
                cursor = cursor.last().0,
                error = %err,
                "poller crashed, restarting"
            );
            if !pause(self.settings.restart_backoff, stop).await {
                break;
            }
        }

        info!(cursor = cursor.last().0, "poller stopped");
        Ok(cursor)
    }

    /// One session: prepare the source, then fetch and dispatch until stopped.
    ///
    /// Fetch errors are handled here; anything returned is catastrophic.
    async fn run_session(
        &self,
        cursor: &mut Cursor,
        budget: &mut RestartBudget,
        stop: &CancellationToken,
    ) -> Result<()> {
        tokio::select! {
            _ = stop.cancelled() => return Ok(()),
            prepared = self.source.prepare() => prepared?,
        }
        info!(offset = cursor.offset().0, "polling session started");

        loop {
            if stop.is_cancelled() {
                return Ok(());
            }

            let offset = cursor.offset();
            let fetched = tokio::select! {
                _ = stop.cancelled() => return Ok(()),
                fetched = self.source.fetch(offset, self.settings.long_poll_timeout) => fetched,
            };

            let delay = match fetched {
                Ok(batch) => {
                    budget.reset();
                    self.dispatch_batch(cursor, batch).await;
                    self.settings.idle_delay
                }
                Err(e) => {
                    warn!(offset = offset.0, error = %e, "polling error");
                    self.settings.fetch_error_backoff
                }
            };

            if !pause(delay, stop).await {
                return Ok(());
            }
        }
    }

    /// Hand each update to the dispatcher in ascending id order, advancing the
    /// cursor first so a failing update is never redelivered.
    async fn dispatch_batch(&self, cursor: &mut Cursor, mut batch: Vec<IncomingUpdate>) {
        if batch.is_empty() {
            return;
        }
        batch.sort_by_key(|u| u.id);
        debug!(count = batch.len(), "dispatching batch");

        for update in &batch {
            if !cursor.advance(update.id) {
                debug!(
                    update_id = update.id.0,
                    cursor = cursor.last().0,
                    "skipping already dispatched update"
                );
                continue;
            }
            self.dispatcher.dispatch(update).await;
        }
    }
}

/// Sleep for `d` unless `stop` fires first. Returns `false` when stopped.
async fn pause(d: Duration, stop: &CancellationToken) -> bool {
    tokio::select! {
        _ = stop.cancelled() => false,
        _ = tokio::time::sleep(d) => true,
    }
}
