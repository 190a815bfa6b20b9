//! Canned-response assistant.
//!
//! Prompts are matched against a keyword table; the reply lands after an
//! artificial delay. Every pending reply is a cancellable task, and closing
//! the panel cancels them all so nothing is appended afterwards.

use crate::config::{assistant_base_delay_ms, assistant_jitter_ms};
use crate::core::errors::StoreError;
use crate::core::helpers::{new_id, now_iso};
use crate::models::models::{ChatMessage, ChatRole};
use crate::panels::PanelState;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

struct Rule {
    keywords: &'static [&'static str],
    response: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        keywords: &["hello", "hi", "hey"],
        response: "Hi there! I can help you find people, groups and events, or draft a post.",
    },
    Rule {
        keywords: &["post", "write", "caption"],
        response: "Try opening with a question to your followers. Short posts with a photo get the most engagement.",
    },
    Rule {
        keywords: &["group", "community"],
        response: "Head to Groups to browse communities by category, or create your own from the Groups page.",
    },
    Rule {
        keywords: &["event", "meetup", "weekend"],
        response: "There are a few events coming up near you. Open Events to see dates and RSVP.",
    },
    Rule {
        keywords: &["friend", "follow", "people"],
        response: "Search for people by name or username, then tap Follow to see their posts in your feed.",
    },
    Rule {
        keywords: &["privacy", "settings", "password"],
        response: "You can update your profile and privacy options from Settings.",
    },
];

const FALLBACK: &str = "I'm not sure about that yet. Ask me about posts, groups, events or finding friends.";

/// First matching rule wins. Keywords match whole words; longer ones also
/// match as a word prefix ("events" hits "event").
pub fn pick_response(prompt: &str) -> &'static str {
    let lowered = prompt.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    RULES
        .iter()
        .find(|rule| {
            rule.keywords.iter().any(|kw| {
                words.iter().any(|w| *w == *kw || (kw.len() > 3 && w.starts_with(*kw)))
            })
        })
        .map(|rule| rule.response)
        .unwrap_or(FALLBACK)
}

fn message(role: ChatRole, text: &str) -> ChatMessage {
    ChatMessage {
        id: new_id(),
        role,
        text: text.to_string(),
        created_at: now_iso(),
    }
}

fn lock(log: &Mutex<Vec<ChatMessage>>) -> MutexGuard<'_, Vec<ChatMessage>> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct ReplyHandle {
    token: CancellationToken,
    join: JoinHandle<Option<ChatMessage>>,
}

impl ReplyHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Resolves to the appended reply, or `Cancelled` if it never landed.
    pub async fn wait(self) -> Result<ChatMessage, StoreError> {
        match self.join.await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Err(StoreError::Cancelled),
            Err(e) if e.is_cancelled() => Err(StoreError::Cancelled),
            Err(e) => Err(StoreError::Storage(format!("reply task failed: {}", e))),
        }
    }
}

pub struct Assistant {
    log: Arc<Mutex<Vec<ChatMessage>>>,
    pending: Arc<AtomicUsize>,
    session: CancellationToken,
    panel: PanelState,
    base_delay: Duration,
    jitter: Duration,
}

impl Default for Assistant {
    fn default() -> Self {
        Self::with_delay(
            Duration::from_millis(assistant_base_delay_ms()),
            Duration::from_millis(assistant_jitter_ms()),
        )
    }
}

impl Assistant {
    pub fn with_delay(base_delay: Duration, jitter: Duration) -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            pending: Arc::new(AtomicUsize::new(0)),
            session: CancellationToken::new(),
            panel: PanelState::Closed,
            base_delay,
            jitter,
        }
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    pub fn open(&mut self) {
        self.panel = PanelState::Open;
    }

    pub fn minimize(&mut self) {
        self.panel = PanelState::Minimized;
    }

    /// Same cycle as the other overlay panels; toggling to closed goes
    /// through `close` so pending replies are dropped.
    pub fn toggle(&mut self) -> PanelState {
        match self.panel.toggled() {
            PanelState::Closed => self.close(),
            next => self.panel = next,
        }
        self.panel
    }

    /// Closes the panel and cancels every reply still in flight.
    pub fn close(&mut self) {
        self.panel = PanelState::Closed;
        let _guard = lock(&self.log);
        self.session.cancel();
        self.session = CancellationToken::new();
        debug!("assistant closed, pending replies cancelled");
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.log).clone()
    }

    pub fn is_typing(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    pub fn clear(&mut self) {
        self.close();
        lock(&self.log).clear();
    }

    fn reply_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        self.base_delay + Duration::from_millis(extra)
    }

    /// Records the prompt and schedules the canned reply. Must be called
    /// inside a tokio runtime.
    pub fn ask(&mut self, prompt: &str) -> Result<ReplyHandle, StoreError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(StoreError::Validation("Message cannot be empty".to_string()));
        }
        if self.panel == PanelState::Closed {
            self.open();
        }

        lock(&self.log).push(message(ChatRole::User, prompt));

        let response = pick_response(prompt);
        let delay = self.reply_delay();
        let token = self.session.child_token();
        let log = Arc::clone(&self.log);
        let pending = Arc::clone(&self.pending);
        pending.fetch_add(1, Ordering::SeqCst);

        let task_token = token.clone();
        let join = tokio::spawn(async move {
            let reply = tokio::select! {
                biased;
                _ = task_token.cancelled() => None,
                _ = tokio::time::sleep(delay) => {
                    let mut log = lock(&log);
                    // Checked under the log lock so close() cannot interleave
                    if task_token.is_cancelled() {
                        None
                    } else {
                        let reply = message(ChatRole::Assistant, response);
                        log.push(reply.clone());
                        Some(reply)
                    }
                }
            };
            pending.fetch_sub(1, Ordering::SeqCst);
            if reply.is_none() {
                debug!("assistant reply cancelled");
            }
            reply
        });

        info!(delay_ms = delay.as_millis() as u64, "assistant reply scheduled");
        Ok(ReplyHandle { token, join })
    }
}
