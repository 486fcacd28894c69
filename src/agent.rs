use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::memory::{ConversationLog, Message, MessageId, Sender};
use crate::responses::ResponseTable;
use crate::scheduler::DelayScheduler;

/// Outcome of a submission. Only `Accepted` changes the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Accepted(MessageId),
    /// Text was empty after trimming
    Blank,
    /// A reply is still pending; the text was dropped
    Busy,
}

/// Per-session settings
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub reply_delay: Duration,
    pub greeting: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(1500),
            greeting: None,
        }
    }
}

struct SessionState {
    log: ConversationLog,
    composing: bool,
}

/// State shared with the deferred reply task
struct Shared {
    state: Mutex<SessionState>,
    composing_tx: watch::Sender<bool>,
    responses: Arc<ResponseTable>,
}

impl Shared {
    fn deliver_reply(&self, user_text: &str) {
        let reply = self.responses.match_reply(user_text);
        let mut state = self.state.lock();
        let id = state.log.append(Sender::Bot, reply);
        state.composing = false;
        // Published under the lock so watchers never see a stale flag
        self.composing_tx.send_replace(false);
        debug!("Appended bot reply {}", id);
    }
}

/// One conversation: accepts user text, answers it after a simulated
/// typing delay, and keeps the ordered history.
///
/// At most one reply is outstanding at a time. Submissions made while
/// composing are dropped, not queued.
pub struct ChatSession {
    id: Uuid,
    shared: Arc<Shared>,
    scheduler: Arc<dyn DelayScheduler>,
    reply_delay: Duration,
}

impl ChatSession {
    pub fn new(
        responses: Arc<ResponseTable>,
        scheduler: Arc<dyn DelayScheduler>,
        options: SessionOptions,
    ) -> Self {
        let mut log = ConversationLog::new();
        if let Some(greeting) = options.greeting.filter(|g| !g.trim().is_empty()) {
            log.append(Sender::Bot, greeting);
        }

        let (composing_tx, _) = watch::channel(false);
        let id = Uuid::new_v4();
        debug!("Started chat session {}", id);

        Self {
            id,
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState {
                    log,
                    composing: false,
                }),
                composing_tx,
                responses,
            }),
            scheduler,
            reply_delay: options.reply_delay,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Accept a user message and schedule the bot's reply
    pub fn submit(&self, text: &str) -> Submission {
        if text.trim().is_empty() {
            return Submission::Blank;
        }

        let id = {
            let mut state = self.shared.state.lock();
            if state.composing {
                debug!("Session {}: dropped submission while composing", self.id);
                return Submission::Busy;
            }
            let id = state.log.append(Sender::User, text);
            state.composing = true;
            self.shared.composing_tx.send_replace(true);
            id
        };
        debug!("Session {}: accepted user message {}", self.id, id);

        // Lock is released here: a synchronous scheduler runs the task inline
        let shared = Arc::clone(&self.shared);
        let text = text.to_string();
        self.scheduler.schedule(
            self.reply_delay,
            Box::new(move || shared.deliver_reply(&text)),
        );

        Submission::Accepted(id)
    }

    /// Snapshot of the history in insertion order
    #[allow(dead_code)]
    pub fn log(&self) -> Vec<Message> {
        self.shared.state.lock().log.all().to_vec()
    }

    /// Messages after the given one, or the whole history for `None`
    pub fn messages_since(&self, after: Option<MessageId>) -> Vec<Message> {
        let state = self.shared.state.lock();
        state
            .log
            .all()
            .iter()
            .filter(|m| after.map_or(true, |a| m.id() > a))
            .cloned()
            .collect()
    }

    pub fn is_composing(&self) -> bool {
        self.shared.state.lock().composing
    }

    /// Resolves once no reply is pending
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.composing_tx.subscribe();
        // The sender lives in `shared`, which outlives this borrow
        let _ = rx.wait_for(|composing| !*composing).await;
    }
}
