//! Application state and the operations the presentation layer calls.
//!
//! [`AppStore`] is owned by the composition root and mutated through
//! `&mut self`; there is exactly one writer, so nothing here is locked.
//! Presentation code observes changes through [`AppStore::subscribe`].

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, error, info};

use crate::catalog::{AuxiliaryKind, Catalog, Sequence};
use crate::completion::{CompletionClient, CompletionPhase};
use crate::config::Config;
use crate::error::{DriveChatError, Result};
use crate::fetch::Fetcher;
use crate::notify::{Notification, Notifier};
use crate::prompt::{user_content, SYSTEM_PROMPT};
use crate::session::{ChatRole, ChatSession};
use crate::sse::SseEvent;
use crate::stats::{FrameSummary, SequenceStats, SequenceSummary};

pub const FAILURE_MESSAGE: &str =
    "I'm having trouble analyzing this scene right now. Please try again later.";

/// The single active video, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoState {
    pub url: String,
    pub title: String,
}

/// Change notifications for a presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    SelectionChanged { sequence_id: String },
    SessionReplaced { session_id: String },
    MessageAppended { id: String, role: ChatRole },
    TokenAppended { id: String, token: String },
    MessageRemoved { id: String },
    ProcessingChanged(bool),
    PhaseChanged(CompletionPhase),
    VideoChanged(Option<VideoState>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyInput,
    NoSequence,
    Busy,
}

#[derive(Debug)]
pub enum SendOutcome {
    /// Preconditions not met; the session was not touched.
    Ignored(IgnoreReason),
    /// The stream ran to completion.
    Completed { message_id: String, content: String },
    /// The request failed; the failure message was appended.
    Failed(DriveChatError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoOutcome {
    Opened,
    NoVideo,
}

pub struct AppStore {
    catalog: Catalog,
    selected: Option<Sequence>,
    session: ChatSession,
    stats: Option<SequenceStats>,
    processing: bool,
    phase: CompletionPhase,
    video: Option<VideoState>,
    auxiliary: HashMap<(String, AuxiliaryKind), Option<String>>,
    fetcher: Fetcher,
    completion: CompletionClient,
    notifier: Arc<dyn Notifier>,
    subscribers: Vec<mpsc::UnboundedSender<StoreEvent>>,
}

impl AppStore {
    /// Store over the published catalog, sharing one HTTP client between the
    /// fetcher and the completion client.
    pub fn new(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| DriveChatError::Config(format!("http client: {e}")))?;
        let catalog = Catalog::new(&config.asset_base_url);
        let fetcher = Fetcher::new(client.clone(), Arc::clone(&notifier));
        let completion = CompletionClient::new(client, config);
        Ok(Self::with_parts(catalog, fetcher, completion, notifier))
    }

    pub fn with_parts(
        catalog: Catalog,
        fetcher: Fetcher,
        completion: CompletionClient,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            catalog,
            selected: None,
            session: ChatSession::initial(),
            stats: None,
            processing: false,
            phase: CompletionPhase::Idle,
            video: None,
            auxiliary: HashMap::new(),
            fetcher,
            completion,
            notifier,
            subscribers: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn sequences(&self) -> &[Sequence] {
        self.catalog.sequences()
    }

    pub fn selected_sequence(&self) -> Option<&Sequence> {
        self.selected.as_ref()
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn stats(&self) -> Option<&SequenceStats> {
        self.stats.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn phase(&self) -> CompletionPhase {
        self.phase
    }

    pub fn video(&self) -> Option<&VideoState> {
        self.video.as_ref()
    }

    pub fn is_video_playing(&self) -> bool {
        self.video.is_some()
    }

    pub fn current_video_url(&self) -> Option<&str> {
        self.video.as_ref().map(|v| v.url.as_str())
    }

    pub fn current_video_title(&self) -> Option<&str> {
        self.video.as_ref().map(|v| v.title.as_str())
    }

    /// Receive every subsequent [`StoreEvent`]. Dropped receivers are pruned
    /// on the next emit.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    // -----------------------------------------------------------------------
    // Sequence selection
    // -----------------------------------------------------------------------

    /// Load both stat documents for `sequence` and bind a fresh session to
    /// it. On failure the previous selection, session and stats stay as
    /// they were.
    pub async fn select_sequence(&mut self, sequence: Sequence) -> Result<()> {
        info!(id = %sequence.id, "loading sequence");
        debug!(frames = %sequence.frame_summaries_url, summary = %sequence.sequence_summary_url);

        let stats = match self.load_stats(&sequence).await {
            Ok(stats) => stats,
            Err(e) => {
                error!(id = %sequence.id, error = %e, "sequence load failed");
                self.notifier.notify(Notification::error("Failed to load sequence data"));
                return Err(e);
            }
        };

        info!(id = %sequence.id, frames = stats.frames.len(), "sequence loaded");
        let id = sequence.id.clone();
        self.selected = Some(sequence.clone());
        self.stats = Some(stats);
        self.session = ChatSession::for_sequence(sequence);
        self.emit(StoreEvent::SelectionChanged { sequence_id: id.clone() });
        self.emit(StoreEvent::SessionReplaced { session_id: self.session.id().to_string() });
        self.notifier.notify(Notification::success(format!("Loaded sequence #{id} successfully")));
        Ok(())
    }

    async fn load_stats(&self, sequence: &Sequence) -> Result<SequenceStats> {
        let frames: Vec<FrameSummary> = self.fetcher.get_json(&sequence.frame_summaries_url).await?;
        let summary: SequenceSummary = self.fetcher.get_json(&sequence.sequence_summary_url).await?;
        Ok(SequenceStats { frames, summary })
    }

    /// Best-effort fetch of a side file, cached per sequence and kind.
    /// Failures are cached too so a missing file is requested once.
    pub async fn fetch_auxiliary(
        &mut self,
        sequence: &Sequence,
        kind: AuxiliaryKind,
    ) -> Option<String> {
        let key = (sequence.id.clone(), kind);
        if let Some(cached) = self.auxiliary.get(&key) {
            return cached.clone();
        }
        let text = self.fetcher.get_text_optional(&sequence.auxiliary_url(kind)).await;
        self.auxiliary.insert(key, text.clone());
        text
    }

    // -----------------------------------------------------------------------
    // Chat
    // -----------------------------------------------------------------------

    /// Ask a question about the selected sequence and stream the answer into
    /// the session.
    pub async fn send_message(&mut self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Ignored(IgnoreReason::EmptyInput);
        }
        if self.processing {
            return SendOutcome::Ignored(IgnoreReason::Busy);
        }
        let user = match (&self.selected, &self.stats) {
            (Some(_), Some(stats)) => user_content(stats, text),
            _ => return SendOutcome::Ignored(IgnoreReason::NoSequence),
        };

        let id = self.session.push(ChatRole::User, text);
        self.emit(StoreEvent::MessageAppended { id, role: ChatRole::User });
        let id = self.session.push_placeholder();
        self.emit(StoreEvent::MessageAppended { id, role: ChatRole::Assistant });
        self.set_processing(true);
        self.set_phase(CompletionPhase::Requesting);

        let mut stream = match self.completion.start(SYSTEM_PROMPT, &user).await {
            Ok(stream) => stream,
            Err(e) => return self.fail(e),
        };

        for removed in self.session.remove_in_progress() {
            self.emit(StoreEvent::MessageRemoved { id: removed });
        }
        let message_id = self.session.begin_streaming();
        self.emit(StoreEvent::MessageAppended { id: message_id.clone(), role: ChatRole::Assistant });
        self.set_phase(CompletionPhase::Streaming);

        let mut content = String::new();
        while let Some(event) = stream.next().await {
            match event {
                Ok(SseEvent::Token(token)) => {
                    content.push_str(&token);
                    self.session.append_token(&token);
                    self.emit(StoreEvent::TokenAppended { id: message_id.clone(), token });
                }
                Ok(SseEvent::Done) => break,
                Err(e) => {
                    self.session.end_streaming();
                    return self.fail(e);
                }
            }
        }

        self.session.end_streaming();
        debug!(id = %message_id, chars = content.len(), "stream complete");
        self.set_processing(false);
        self.set_phase(CompletionPhase::Done);
        SendOutcome::Completed { message_id, content }
    }

    fn fail(&mut self, err: DriveChatError) -> SendOutcome {
        error!(error = %err, "completion failed");
        for removed in self.session.remove_in_progress() {
            self.emit(StoreEvent::MessageRemoved { id: removed });
        }
        let id = self.session.push(ChatRole::Assistant, FAILURE_MESSAGE);
        self.emit(StoreEvent::MessageAppended { id, role: ChatRole::Assistant });
        self.notifier.notify(Notification::error("Failed to get a response for this scene"));
        self.set_processing(false);
        self.set_phase(CompletionPhase::Failed);
        SendOutcome::Failed(err)
    }

    fn set_processing(&mut self, processing: bool) {
        if self.processing != processing {
            self.processing = processing;
            self.emit(StoreEvent::ProcessingChanged(processing));
        }
    }

    fn set_phase(&mut self, phase: CompletionPhase) {
        debug!(from = %self.phase, to = %phase, "completion phase");
        self.phase = phase;
        self.emit(StoreEvent::PhaseChanged(phase));
    }

    // -----------------------------------------------------------------------
    // Video
    // -----------------------------------------------------------------------

    /// Make `sequence`'s video the active one, replacing any other.
    pub fn open_video_viewer(&mut self, sequence: &Sequence) -> VideoOutcome {
        let Some(url) = sequence.video_url.clone() else {
            error!(id = %sequence.id, "no video path for sequence");
            self.notifier.notify(Notification::error("No video available for this sequence"));
            return VideoOutcome::NoVideo;
        };
        debug!(url = %url, "opening video");
        let state = VideoState { url, title: format!("Driving Sequence {}", sequence.id) };
        self.video = Some(state.clone());
        self.emit(StoreEvent::VideoChanged(Some(state)));
        VideoOutcome::Opened
    }

    pub fn close_video_player(&mut self) {
        self.video = None;
        self.emit(StoreEvent::VideoChanged(None));
    }
}
