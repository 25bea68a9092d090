//! Client-side orchestration: select a format, fetch and adapt it,
//! synthesize it, and hand the audio to the player.

use super::http::SpeechService;
use crate::format::FormatKey;
use crate::ingest::Ingestor;
use crate::playback::{AudioSource, Controls, MediaDecoder, PlaybackState, Player};
use crate::synthesis::AudioEncoding;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Progress of the current format request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Parsing,
    Synthesizing,
    Ready,
    Failed(String),
}

impl Status {
    pub fn is_pending(&self) -> bool {
        matches!(self, Status::Parsing | Status::Synthesizing)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => f.write_str("idle"),
            Status::Parsing => f.write_str("parsing…"),
            Status::Synthesizing => f.write_str("synthesizing…"),
            Status::Ready => f.write_str("ready"),
            Status::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug)]
enum Update {
    Parsed,
    Audio(Bytes),
    Failed(String),
}

#[derive(Debug)]
struct Tagged {
    request: u64,
    update: Update,
}

/// Drives one [`Player`] from format selections and user commands.
///
/// All state changes happen on the caller's task, one event at a time:
/// request progress arrives over a channel from the spawned request task,
/// decoder signals arrive over the player's channel. Selecting a new format
/// cancels the outstanding request and any late result is discarded.
pub struct Controller<D: MediaDecoder> {
    ingestor: Arc<Ingestor>,
    speech: Arc<dyn SpeechService>,
    player: Player<D>,
    encoding: AudioEncoding,
    selected: Option<FormatKey>,
    status: Status,
    request: u64,
    cancel: Option<CancellationToken>,
    updates_tx: mpsc::UnboundedSender<Tagged>,
    updates_rx: mpsc::UnboundedReceiver<Tagged>,
}

impl<D: MediaDecoder> Controller<D> {
    pub fn new(ingestor: Arc<Ingestor>, speech: Arc<dyn SpeechService>, player: Player<D>) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            ingestor,
            speech,
            player,
            encoding: AudioEncoding::default(),
            selected: None,
            status: Status::Idle,
            request: 0,
            cancel: None,
            updates_tx,
            updates_rx,
        }
    }

    pub fn with_encoding(mut self, encoding: AudioEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn selected_format(&self) -> Option<FormatKey> {
        self.selected
    }

    pub fn state(&self) -> PlaybackState {
        self.player.state()
    }

    pub fn progress(&self) -> f64 {
        self.player.progress()
    }

    pub fn controls(&self) -> Controls {
        self.player.controls()
    }

    /// Identifier of the loaded audio, e.g. `text.mp3`.
    pub fn source_id(&self) -> Option<&str> {
        self.player.source_id()
    }

    pub fn player(&self) -> &Player<D> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player<D> {
        &mut self.player
    }

    pub fn play(&mut self) {
        self.player.play();
    }

    pub fn pause(&mut self) {
        self.player.pause();
    }

    pub fn stop(&mut self) {
        self.player.stop();
    }

    /// Start fetching, adapting and synthesizing `format`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn select_format(&mut self, format: FormatKey) {
        self.cancel_pending();
        self.request += 1;
        self.selected = Some(format);
        self.status = Status::Parsing;
        self.player.eject();

        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        let request = self.request;
        let ingestor = self.ingestor.clone();
        let speech = self.speech.clone();
        let tx = self.updates_tx.clone();
        debug!(format = %format, request, "format selected");

        tokio::spawn(async move {
            let send = |update| {
                let _ = tx.send(Tagged { request, update });
            };
            let ingested = match ingestor.ingest_cancellable(format, &token).await {
                Ok(ingested) => ingested,
                Err(e) if e.is_cancelled() => return,
                Err(e) => return send(Update::Failed(e.to_string())),
            };
            send(Update::Parsed);
            let audio = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                audio = speech.speak(&ingested) => audio,
            };
            match audio {
                Ok(bytes) => send(Update::Audio(bytes)),
                Err(e) => send(Update::Failed(e.to_string())),
            }
        });
    }

    /// Process the next request update or decoder signal.
    pub async fn next(&mut self) -> bool {
        tokio::select! {
            Some(tagged) = self.updates_rx.recv() => {
                self.apply(tagged);
                true
            }
            Some(event) = self.player.next_decoder_event() => {
                self.player.handle_decoder_event(event);
                true
            }
            else => false,
        }
    }

    /// Process events until the current request has finished or failed.
    pub async fn settle(&mut self) -> &Status {
        while self.status.is_pending() {
            if !self.next().await {
                break;
            }
        }
        &self.status
    }

    /// Process decoder signals already queued.
    pub fn drain_decoder_events(&mut self) -> usize {
        self.player.drain_events()
    }

    /// Cancel any request in flight and release the player.
    pub fn close(&mut self) {
        self.cancel_pending();
        self.request += 1;
        self.status = Status::Idle;
        self.selected = None;
        self.player.eject();
    }

    fn apply(&mut self, tagged: Tagged) {
        if tagged.request != self.request {
            debug!(request = tagged.request, current = self.request, "discarding stale update");
            return;
        }
        match tagged.update {
            Update::Parsed => self.status = Status::Synthesizing,
            Update::Audio(bytes) => {
                let Some(format) = self.selected else {
                    return;
                };
                self.cancel = None;
                self.status = Status::Ready;
                let id = format!("{}.{}", format, self.encoding.extension());
                self.player
                    .assign_source(AudioSource::new(id, self.encoding.mime_type(), bytes));
            }
            Update::Failed(reason) => {
                warn!(reason = %reason, "format request failed");
                self.cancel = None;
                self.status = Status::Failed(reason);
            }
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}

impl<D: MediaDecoder> Drop for Controller<D> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
