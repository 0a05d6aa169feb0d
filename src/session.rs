//! Chat messages and the per-sequence chat session.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::catalog::Sequence;

pub const INTRO_MESSAGE: &str = "I can help you analyze and understand driving sequences. \
Select a sequence from the gallery to begin.";

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
            ChatRole::System => write!(f, "system"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub in_progress: bool,
}

/// Ordered, append-only conversation bound to at most one sequence.
///
/// Content is only ever mutated on the current streaming target; every
/// other message is immutable once appended. At most one message carries
/// `in_progress`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    id: String,
    messages: Vec<ChatMessage>,
    sequence: Option<Sequence>,
    next_seq: u64,
    streaming_id: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::initial()
    }
}

impl ChatSession {
    fn empty(sequence: Option<Sequence>) -> Self {
        Self {
            id: format!("session-{}", uuid::Uuid::new_v4()),
            messages: Vec::new(),
            sequence,
            next_seq: 0,
            streaming_id: None,
        }
    }

    /// Unbound session shown before any sequence is selected.
    pub fn initial() -> Self {
        let mut s = Self::empty(None);
        s.push(ChatRole::System, INTRO_MESSAGE);
        s
    }

    /// Fresh session bound to `sequence`, opened with a welcome message.
    pub fn for_sequence(sequence: Sequence) -> Self {
        let welcome = format!(
            "I'm ready to help you analyze driving sequence \"{}\". This sequence contains \
             detailed frame-by-frame data and motion analysis. What would you like to know \
             about this driving scene?",
            sequence.name
        );
        let mut s = Self::empty(Some(sequence));
        s.push(ChatRole::Assistant, welcome);
        s
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }

    pub fn get(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn in_progress(&self) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.in_progress)
    }

    pub fn streaming_id(&self) -> Option<&str> {
        self.streaming_id.as_deref()
    }

    fn next_id(&mut self, role: ChatRole) -> String {
        self.next_seq += 1;
        format!("{role}-{}", self.next_seq)
    }

    /// Append a finished message and return its id.
    pub fn push(&mut self, role: ChatRole, content: impl Into<String>) -> String {
        let id = self.next_id(role);
        self.messages.push(ChatMessage {
            id: id.clone(),
            role,
            content: content.into(),
            timestamp: now_ms(),
            in_progress: false,
        });
        id
    }

    /// Append an empty in-progress assistant message. A stale placeholder
    /// is dropped first so at most one exists.
    pub fn push_placeholder(&mut self) -> String {
        self.remove_in_progress();
        let id = self.next_id(ChatRole::Assistant);
        self.messages.push(ChatMessage {
            id: id.clone(),
            role: ChatRole::Assistant,
            content: String::new(),
            timestamp: now_ms(),
            in_progress: true,
        });
        id
    }

    /// Drop every in-progress message; returns the removed ids.
    pub fn remove_in_progress(&mut self) -> Vec<String> {
        let removed: Vec<String> =
            self.messages.iter().filter(|m| m.in_progress).map(|m| m.id.clone()).collect();
        self.messages.retain(|m| !m.in_progress);
        removed
    }

    /// Replace the placeholder with an empty assistant message that receives
    /// streamed tokens. Returns the new message id.
    pub fn begin_streaming(&mut self) -> String {
        self.remove_in_progress();
        let id = self.push(ChatRole::Assistant, String::new());
        self.streaming_id = Some(id.clone());
        id
    }

    /// Append one token to the streaming target. Returns false when no
    /// stream is open.
    pub fn append_token(&mut self, token: &str) -> bool {
        let Some(target) = self.streaming_id.as_deref() else {
            return false;
        };
        match self.messages.iter_mut().rev().find(|m| m.id == target) {
            Some(msg) => {
                msg.content.push_str(token);
                true
            }
            None => false,
        }
    }

    /// Freeze the streaming target.
    pub fn end_streaming(&mut self) -> Option<String> {
        self.streaming_id.take()
    }
}
