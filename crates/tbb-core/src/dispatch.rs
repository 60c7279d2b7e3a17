use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::{
    books::{BookSearchClient, SearchOutcome},
    commands::{route, Command},
    domain::ChatId,
    errors::Error,
    formatting::{
        format_search_results, no_results_text, EMPTY_QUERY_TEXT, FALLBACK_TEXT, HELP_TEXT,
        SEARCH_FAILED_TEXT, START_TEXT, UPDATE_FAILED_TEXT,
    },
    messaging::{port::MessagingPort, types::IncomingUpdate},
    Result,
};

/// Executes one update: route the text, run the action, reply.
#[derive(Clone)]
pub struct Dispatcher {
    messenger: Arc<dyn MessagingPort>,
    books: BookSearchClient,
}

impl Dispatcher {
    pub fn new(messenger: Arc<dyn MessagingPort>, books: BookSearchClient) -> Self {
        Self { messenger, books }
    }

    /// Handle an update with failure containment.
    ///
    /// Errors and panics from [`Dispatcher::handle_update`] are logged and turned
    /// into a short apology to the originating chat. Never fails.
    pub async fn dispatch(&self, update: &IncomingUpdate) {
        let outcome = AssertUnwindSafe(self.handle_update(update))
            .catch_unwind()
            .await;
        let err = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e,
            Err(panic) => Error::from_panic(panic),
        };

        let Some(chat_id) = update.chat_id() else {
            error!(update_id = update.id.0, error = %err, "update handling failed");
            return;
        };
        error!(
            update_id = update.id.0,
            chat_id = chat_id.0,
            error = %err,
            "update handling failed"
        );

        if let Err(e) = self.messenger.send_plain(chat_id, UPDATE_FAILED_TEXT).await {
            warn!(chat_id = chat_id.0, error = %e, "failed to notify chat about error");
        }
    }

    /// Handle an update, propagating any failure to the caller.
    ///
    /// Updates without a message or without text are ignored.
    pub async fn handle_update(&self, update: &IncomingUpdate) -> Result<()> {
        let Some(message) = &update.message else {
            debug!(update_id = update.id.0, "ignoring non-message update");
            return Ok(());
        };
        let Some(text) = message.text.as_deref() else {
            debug!(
                update_id = update.id.0,
                chat_id = message.chat_id.0,
                "ignoring message without text"
            );
            return Ok(());
        };

        let chat_id = message.chat_id;
        info!(chat_id = chat_id.0, text, "received message");

        match route(text) {
            Command::Search(query) => self.handle_search(chat_id, &query).await,
            Command::Start => self.reply(chat_id, START_TEXT).await,
            Command::Help => self.reply(chat_id, HELP_TEXT).await,
            Command::Fallback(_) => self.reply(chat_id, FALLBACK_TEXT).await,
        }
    }

    async fn handle_search(&self, chat_id: ChatId, query: &str) -> Result<()> {
        if query.is_empty() {
            return self.reply(chat_id, EMPTY_QUERY_TEXT).await;
        }

        info!(chat_id = chat_id.0, query, "book search requested");

        match self.books.search(query).await {
            Ok(SearchOutcome::Found(books)) => {
                self.messenger
                    .send_html(chat_id, &format_search_results(&books))
                    .await?;
                debug!(query, count = books.len(), "book search results sent");
                Ok(())
            }
            Ok(SearchOutcome::NoResults) => self.reply(chat_id, &no_results_text(query)).await,
            Err(e) => {
                error!(chat_id = chat_id.0, query, error = %e, "book search failed");
                self.reply(chat_id, SEARCH_FAILED_TEXT).await
            }
        }
    }

    async fn reply(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.messenger.send_plain(chat_id, text).await?;
        Ok(())
    }
}
