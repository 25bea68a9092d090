//! Playback session: drives a [`MediaDecoder`] from the pure state machine.

use super::state::{Controls, Effect, Machine, PlaybackEvent, PlaybackState};
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A playable audio resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    /// Display identifier, e.g. `structured.mp3`.
    pub id: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl AudioSource {
    pub fn new(id: impl Into<String>, mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            id: id.into(),
            mime_type: mime_type.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("decoder error: {0}")]
pub struct DecoderError(pub String);

/// Lifecycle signals a decoder emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderSignal {
    Ready,
    TimeUpdate,
    Ended,
    Error(DecoderError),
}

/// A signal stamped with the source generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderEvent {
    pub generation: u64,
    pub signal: DecoderSignal,
}

/// Handle a decoder uses to report signals for the source it was loaded with.
///
/// Signals sent after the player moved on to another source are discarded.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: u64,
    tx: mpsc::UnboundedSender<DecoderEvent>,
}

impl EventSink {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn emit(&self, signal: DecoderSignal) {
        let _ = self.tx.send(DecoderEvent {
            generation: self.generation,
            signal,
        });
    }

    pub fn ready(&self) {
        self.emit(DecoderSignal::Ready);
    }

    pub fn time_update(&self) {
        self.emit(DecoderSignal::TimeUpdate);
    }

    pub fn ended(&self) {
        self.emit(DecoderSignal::Ended);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(DecoderSignal::Error(DecoderError(message.into())));
    }
}

/// Capability interface over a native decoding/playing primitive.
pub trait MediaDecoder: Send {
    /// Start loading `source` from the beginning; report through `events`.
    fn load(&mut self, source: &AudioSource, events: EventSink);
    fn play(&mut self);
    fn pause(&mut self);
    /// Seconds from the start of the resource.
    fn current_position(&self) -> f64;
    /// Total seconds, `NaN` while unknown.
    fn duration(&self) -> f64;
}

type ProgressCallback = Box<dyn FnMut(f64, f64) + Send>;
type EndCallback = Box<dyn FnMut() + Send>;

/// One decoder plus the machine and callbacks governing it.
pub struct Player<D: MediaDecoder> {
    decoder: D,
    machine: Machine,
    source: Option<AudioSource>,
    generation: u64,
    events_tx: mpsc::UnboundedSender<DecoderEvent>,
    events_rx: mpsc::UnboundedReceiver<DecoderEvent>,
    on_progress: Option<ProgressCallback>,
    on_end: Option<EndCallback>,
    last_error: Option<DecoderError>,
}

impl<D: MediaDecoder> Player<D> {
    pub fn new(decoder: D) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            decoder,
            machine: Machine::default(),
            source: None,
            generation: 0,
            events_tx,
            events_rx,
            on_progress: None,
            on_end: None,
            last_error: None,
        }
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.machine.autoplay = autoplay;
        self
    }

    pub fn on_progress(mut self, callback: impl FnMut(f64, f64) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn on_end(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_end = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> PlaybackState {
        self.machine.state
    }

    pub fn progress(&self) -> f64 {
        self.machine.progress
    }

    pub fn controls(&self) -> Controls {
        self.machine.controls()
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.id.as_str())
    }

    pub fn last_error(&self) -> Option<&DecoderError> {
        self.last_error.as_ref()
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the resource. Signals still queued for the old one are ignored.
    pub fn assign_source(&mut self, source: AudioSource) {
        self.generation += 1;
        self.last_error = None;
        debug!(source = %source.id, generation = self.generation, "assigning playback source");
        self.source = Some(source);
        self.dispatch(PlaybackEvent::SourceAssigned);
    }

    /// Tear the session down; the player returns to `Disabled`.
    pub fn eject(&mut self) {
        self.generation += 1;
        self.last_error = None;
        self.dispatch(PlaybackEvent::Ejected);
        self.source = None;
    }

    pub fn play(&mut self) {
        self.dispatch(PlaybackEvent::Play);
    }

    pub fn pause(&mut self) {
        self.dispatch(PlaybackEvent::Pause);
    }

    pub fn stop(&mut self) {
        self.dispatch(PlaybackEvent::Stop);
    }

    /// Apply a decoder signal. Returns `false` when it belonged to a stale source.
    pub fn handle_decoder_event(&mut self, event: DecoderEvent) -> bool {
        if event.generation != self.generation || self.source.is_none() {
            debug!(
                event_generation = event.generation,
                current = self.generation,
                "dropping stale decoder event"
            );
            return false;
        }
        let event = match event.signal {
            DecoderSignal::Ready => PlaybackEvent::Ready,
            DecoderSignal::TimeUpdate => PlaybackEvent::TimeUpdate {
                current_time: self.decoder.current_position(),
                duration: self.decoder.duration(),
            },
            DecoderSignal::Ended => PlaybackEvent::Ended,
            DecoderSignal::Error(err) => {
                warn!(error = %err, "error while loading source");
                self.last_error = Some(err);
                PlaybackEvent::DecodeError
            }
        };
        self.dispatch(event);
        true
    }

    /// Wait for the next decoder signal.
    pub async fn next_decoder_event(&mut self) -> Option<DecoderEvent> {
        self.events_rx.recv().await
    }

    /// Process every signal already queued, in emission order.
    pub fn drain_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_decoder_event(event);
            handled += 1;
        }
        handled
    }

    fn dispatch(&mut self, event: PlaybackEvent) {
        let transition = self.machine.reduce(&event);
        if transition.machine.state != self.machine.state {
            debug!(from = %self.machine.state, to = %transition.machine.state, "playback transition");
        }
        self.machine = transition.machine;
        for effect in transition.effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Load => {
                if let Some(source) = &self.source {
                    let sink = EventSink {
                        generation: self.generation,
                        tx: self.events_tx.clone(),
                    };
                    self.decoder.load(source, sink);
                }
            }
            Effect::StartDecoder => self.decoder.play(),
            Effect::PauseDecoder => self.decoder.pause(),
            Effect::NotifyProgress {
                current_time,
                duration,
            } => {
                if let Some(cb) = self.on_progress.as_mut() {
                    cb(current_time, duration);
                }
            }
            Effect::NotifyEnded => {
                if let Some(cb) = self.on_end.as_mut() {
                    cb();
                }
            }
        }
    }
}
