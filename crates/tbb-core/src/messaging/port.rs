use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::TextFormat,
    Result,
};

/// Outbound chat port.
///
/// One call is one request to the messenger. Implementations do not retry;
/// callers decide whether a failure is logged or escalated.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
    ) -> Result<MessageRef>;

    async fn send_plain(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        self.send_message(chat_id, text, TextFormat::Plain).await
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.send_message(chat_id, html, TextFormat::Html).await
    }
}
