use std::time::Duration;

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{Update, UpdateKind},
};
use tracing::{info, warn};

use tbb_core::{
    domain::{ChatId, UpdateId},
    errors::Error,
    messaging::types::{IncomingMessage, IncomingUpdate},
    ports::UpdateSource,
    Result,
};

use crate::map_err;

/// `getUpdates` long polling.
#[derive(Clone)]
pub struct TelegramUpdateSource {
    bot: Bot,
}

impl TelegramUpdateSource {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl UpdateSource for TelegramUpdateSource {
    async fn prepare(&self) -> Result<()> {
        let me = self.bot.get_me().await.map_err(map_err)?;
        info!(
            bot = me.user.username.as_deref().unwrap_or("unknown"),
            "telegram bot authenticated"
        );

        // A registered webhook makes getUpdates fail with 409 Conflict.
        self.bot.delete_webhook().await.map_err(map_err)?;
        Ok(())
    }

    async fn fetch(&self, offset: UpdateId, timeout: Duration) -> Result<Vec<IncomingUpdate>> {
        let offset = i32::try_from(offset.0).map_err(|_| {
            Error::InvalidInput(format!("update offset out of range: {}", offset.0))
        })?;
        let timeout_secs = u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX);

        let updates = self
            .bot
            .get_updates()
            .offset(offset)
            .timeout(timeout_secs)
            .await
            .map_err(map_err)?;

        Ok(updates.into_iter().map(to_incoming).collect())
    }
}

fn to_incoming(update: Update) -> IncomingUpdate {
    let id = UpdateId(i64::from(update.id));
    let message = match update.kind {
        UpdateKind::Message(msg) => Some(IncomingMessage {
            chat_id: ChatId(msg.chat.id.0),
            text: msg.text().map(str::to_string),
        }),
        UpdateKind::Error(raw) => {
            warn!(update_id = id.0, payload = %raw, "unparsable telegram update");
            None
        }
        _ => None,
    };
    IncomingUpdate { id, message }
}
