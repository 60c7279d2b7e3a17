//! Telegram adapter (teloxide).
//!
//! This crate implements the `tbb-core` MessagingPort and UpdateSource over the
//! Telegram Bot API.

use std::time::Duration;

use async_trait::async_trait;

use teloxide::{prelude::*, types::ParseMode};

pub mod updates;

pub use updates::TelegramUpdateSource;

use tbb_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{port::MessagingPort, types::TextFormat},
    Result,
};

/// Headroom on top of the long-poll timeout before the HTTP client gives up.
const HTTP_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

/// Build a bot whose HTTP client outlives a `long_poll_timeout` long poll.
///
/// `api_url` overrides the Bot API host (local Bot API server, tests).
pub fn build_bot(
    token: &str,
    api_url: Option<&str>,
    long_poll_timeout: Duration,
) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(long_poll_timeout.saturating_add(HTTP_TIMEOUT_SLACK))
        .build()
        .map_err(|e| Error::Config(format!("telegram client build failed: {e}")))?;

    let mut bot = Bot::with_client(token, client);
    if let Some(url) = api_url {
        let url = reqwest::Url::parse(url)
            .map_err(|e| Error::Config(format!("invalid telegram api url {url:?}: {e}")))?;
        bot = bot.set_api_url(url);
    }
    Ok(bot)
}

pub(crate) fn map_err(e: teloxide::RequestError) -> Error {
    Error::External(format!("telegram error: {e}"))
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
    ) -> Result<MessageRef> {
        let mut req = self.bot.send_message(Self::tg_chat(chat_id), text.to_string());
        if format == TextFormat::Html {
            req = req.parse_mode(ParseMode::Html);
        }
        let msg = req.await.map_err(map_err)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }
}
