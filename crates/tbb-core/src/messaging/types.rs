use crate::domain::{ChatId, UpdateId};

/// Messenger-agnostic inbound update.
///
/// Telegram-specific fields stay in the Telegram adapter. Updates that are not
/// plain messages (edits, callbacks, ...) arrive with `message = None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingUpdate {
    pub id: UpdateId,
    pub message: Option<IncomingMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    /// `None` for stickers, photos and other non-text content.
    pub text: Option<String>,
}

impl IncomingUpdate {
    pub fn text(id: i64, chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            id: UpdateId(id),
            message: Some(IncomingMessage {
                chat_id: ChatId(chat_id),
                text: Some(text.into()),
            }),
        }
    }

    pub fn chat_id(&self) -> Option<ChatId> {
        self.message.as_ref().map(|m| m.chat_id)
    }
}

/// How the transport should interpret outgoing text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextFormat {
    #[default]
    Plain,
    /// Telegram HTML subset (`<b>`, `<i>`, `<code>`, `<pre>`, `<a>`).
    Html,
}
