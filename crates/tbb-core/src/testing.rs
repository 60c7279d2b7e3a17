//! In-memory fakes for the ports, shared by unit tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ChatId, MessageId, MessageRef, UpdateId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{IncomingUpdate, TextFormat},
    },
    ports::{BookCatalog, CatalogQuery, CatalogVolume, UpdateSource},
    Result,
};

// ============== Catalog ==============

/// Catalog stub that records queries and replays a canned answer.
pub(crate) struct StubCatalog {
    pub(crate) queries: Mutex<Vec<CatalogQuery>>,
    answer: std::result::Result<Vec<CatalogVolume>, String>,
}

impl StubCatalog {
    pub(crate) fn answering(volumes: Vec<CatalogVolume>) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            answer: Ok(volumes),
        }
    }

    pub(crate) fn failing(msg: &str) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            answer: Err(msg.to_string()),
        }
    }

    pub(crate) fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl BookCatalog for StubCatalog {
    async fn list_volumes(&self, query: &CatalogQuery) -> Result<Vec<CatalogVolume>> {
        self.queries.lock().unwrap().push(query.clone());
        self.answer
            .clone()
            .map_err(|msg| Error::External(format!("catalog error: {msg}")))
    }
}

/// Catalog that blows up on every call.
pub(crate) struct PanickingCatalog;

#[async_trait]
impl BookCatalog for PanickingCatalog {
    async fn list_volumes(&self, query: &CatalogQuery) -> Result<Vec<CatalogVolume>> {
        panic!("catalog exploded on {:?}", query.query);
    }
}

pub(crate) fn volume(title: Option<&str>, authors: Option<&[&str]>) -> CatalogVolume {
    CatalogVolume {
        title: title.map(str::to_string),
        authors: authors.map(|a| a.iter().map(|s| s.to_string()).collect()),
    }
}

// ============== Messenger ==============

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SentMessage {
    pub(crate) chat_id: ChatId,
    pub(crate) text: String,
    pub(crate) format: TextFormat,
}

/// Messenger that records successful sends and can reject sends by chat or count.
#[derive(Default)]
pub(crate) struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
    reject_chats: Vec<i64>,
    reject_first: AtomicUsize,
}

impl RecordingMessenger {
    /// Fail the first `n` sends regardless of chat.
    pub(crate) fn failing_first(n: usize) -> Self {
        Self {
            reject_first: AtomicUsize::new(n),
            ..Self::default()
        }
    }

    /// Fail every send to the given chats.
    pub(crate) fn rejecting(chats: &[i64]) -> Self {
        Self {
            reject_chats: chats.to_vec(),
            ..Self::default()
        }
    }

    pub(crate) fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
    ) -> Result<MessageRef> {
        let consumed = self
            .reject_first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumed || self.reject_chats.contains(&chat_id.0) {
            return Err(Error::External(format!(
                "telegram error: chat {} unreachable",
                chat_id.0
            )));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(SentMessage {
            chat_id,
            text: text.to_string(),
            format,
        });
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(sent.len() as i32),
        })
    }
}

// ============== Update source ==============

/// One scripted answer to `fetch`.
pub(crate) enum Step {
    Batch(Vec<IncomingUpdate>),
    Fail(&'static str),
    Panic,
    /// Never answers; only the stop signal ends the call.
    Hang,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FetchCall {
    pub(crate) offset: UpdateId,
    pub(crate) timeout: Duration,
    pub(crate) at: Instant,
}

/// Update source that replays a script and requests shutdown once it runs dry.
pub(crate) struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    prepare_failures: AtomicUsize,
    prepare_hangs: AtomicBool,
    prepares: Mutex<Vec<Instant>>,
    calls: Mutex<Vec<FetchCall>>,
    stop: CancellationToken,
}

impl ScriptedSource {
    pub(crate) fn new(steps: Vec<Step>, stop: CancellationToken) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            prepare_failures: AtomicUsize::new(0),
            prepare_hangs: AtomicBool::new(false),
            prepares: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            stop,
        }
    }

    /// Make the first `n` calls to `prepare` fail.
    pub(crate) fn with_prepare_failures(self, n: usize) -> Self {
        self.prepare_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Make every call to `prepare` hang.
    pub(crate) fn with_hanging_prepare(self) -> Self {
        self.prepare_hangs.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn offsets(&self) -> Vec<i64> {
        self.calls().into_iter().map(|c| c.offset.0).collect()
    }

    pub(crate) fn prepares(&self) -> Vec<Instant> {
        self.prepares.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateSource for ScriptedSource {
    async fn prepare(&self) -> Result<()> {
        self.prepares.lock().unwrap().push(Instant::now());
        if self.prepare_hangs.load(Ordering::SeqCst) {
            return std::future::pending().await;
        }
        let failed = self
            .prepare_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(Error::External("telegram error: getMe failed".to_string()));
        }
        Ok(())
    }

    async fn fetch(&self, offset: UpdateId, timeout: Duration) -> Result<Vec<IncomingUpdate>> {
        self.calls.lock().unwrap().push(FetchCall {
            offset,
            timeout,
            at: Instant::now(),
        });

        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Batch(updates)) => Ok(updates),
            Some(Step::Fail(msg)) => Err(Error::External(msg.to_string())),
            Some(Step::Panic) => panic!("update source exploded"),
            Some(Step::Hang) => std::future::pending().await,
            None => {
                self.stop.cancel();
                Ok(Vec::new())
            }
        }
    }
}
