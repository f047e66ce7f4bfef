//! Audio clip player: play/pause toggle, progress and scrubbing.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::scrub::{DragSession, PointerListeners, ProgressBar, progress_ratio, seek_target};
use crate::carousel::PlayStateSink;

pub const PLAY_LABEL: &str = "Play Audio";
pub const PAUSE_LABEL: &str = "Pause Audio";
pub const PLAY_ARIA_LABEL: &str = "Play audio";
pub const PAUSE_ARIA_LABEL: &str = "Pause audio";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScrubError {
    #[error("audio is still loading")]
    NotReady,
    #[error("audio backend failed: {0}")]
    Backend(String),
}

/// The element actually producing sound.
///
/// Playback changes are not reported through return values. The backend
/// emits [`PlaybackEvent`]s, which the owner feeds to
/// [`AudioPlayer::handle_event`].
#[cfg_attr(test, mockall::automock)]
pub trait AudioBackend: Send {
    fn play(&mut self) -> Result<(), ScrubError>;
    fn pause(&mut self);
    fn seek(&mut self, position: Duration);
    /// `None` until the clip's metadata has loaded.
    fn duration(&self) -> Option<Duration>;
    fn position(&self) -> Duration;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Ready,
    Play,
    Pause,
    Ended,
    TimeUpdate,
}

#[derive(Debug)]
pub struct AudioPlayer<B> {
    backend: B,
    listeners: PointerListeners,
    play_state: Option<PlayStateSink>,
    ready: bool,
    playing: bool,
    progress: f64,
    drag: Option<DragSession>,
}

impl<B: AudioBackend> AudioPlayer<B> {
    /// A player whose controls stay disabled until the backend reports
    /// [`PlaybackEvent::Ready`].
    pub fn new(backend: B, listeners: PointerListeners) -> Self {
        Self {
            backend,
            listeners,
            play_state: None,
            ready: false,
            playing: false,
            progress: 0.0,
            drag: None,
        }
    }

    /// A player over a clip that is preloaded with the page.
    pub fn preloaded(backend: B, listeners: PointerListeners) -> Self {
        Self {
            ready: true,
            ..Self::new(backend, listeners)
        }
    }

    pub fn with_play_state(mut self, sink: PlayStateSink) -> Self {
        self.play_state = Some(sink);
        self
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn label(&self) -> &'static str {
        if self.playing { PAUSE_LABEL } else { PLAY_LABEL }
    }

    pub fn aria_label(&self) -> &'static str {
        if self.playing {
            PAUSE_ARIA_LABEL
        } else {
            PLAY_ARIA_LABEL
        }
    }

    fn ensure_ready(&self) -> Result<(), ScrubError> {
        if self.ready {
            Ok(())
        } else {
            Err(ScrubError::NotReady)
        }
    }

    /// Ask the backend to play or pause. State follows once the backend
    /// reports the change.
    pub fn toggle(&mut self) -> Result<(), ScrubError> {
        self.ensure_ready()?;
        if self.playing {
            self.backend.pause();
            Ok(())
        } else {
            self.backend.play().inspect_err(|err| {
                warn!(error = %err, "audio playback refused");
            })
        }
    }

    pub fn handle_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Ready => {
                if !self.ready {
                    debug!("audio ready");
                }
                self.ready = true;
            }
            PlaybackEvent::Play => self.set_playing(true),
            PlaybackEvent::Pause => self.set_playing(false),
            PlaybackEvent::Ended => {
                self.progress = 0.0;
                self.set_playing(false);
            }
            PlaybackEvent::TimeUpdate => {
                // The pointer owns the bar while dragging.
                if self.drag.is_none() {
                    self.progress =
                        progress_ratio(self.backend.position(), self.backend.duration());
                }
            }
        }
    }

    fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
        if let Some(sink) = &self.play_state {
            sink.report(playing);
        }
    }

    /// Seeking needs readiness and a known duration.
    fn seekable_duration(&self) -> Result<Duration, ScrubError> {
        self.ensure_ready()?;
        self.backend.duration().ok_or(ScrubError::NotReady)
    }

    fn seek_to_ratio(&mut self, ratio: f64, duration: Duration) {
        self.backend.seek(seek_target(ratio, duration));
        self.progress = ratio;
    }

    /// Seek to where the bar was clicked. Returns the new progress ratio.
    pub fn click_seek(&mut self, bar: ProgressBar, pointer_x: f64) -> Result<f64, ScrubError> {
        let duration = self.seekable_duration()?;
        let ratio = bar.ratio_at(pointer_x);
        self.seek_to_ratio(ratio, duration);
        Ok(ratio)
    }

    /// Pointer pressed on the bar: seek there and follow the pointer until
    /// it is released. A drag already running is finished first.
    pub fn begin_drag(&mut self, bar: ProgressBar, pointer_x: f64) -> Result<f64, ScrubError> {
        let duration = self.seekable_duration()?;
        self.end_drag();
        let session = DragSession::begin(&self.listeners, bar, pointer_x);
        let ratio = session.ratio();
        self.drag = Some(session);
        self.seek_to_ratio(ratio, duration);
        Ok(ratio)
    }

    /// Pointer moved anywhere on the page. Ignored unless dragging, or
    /// while the duration is unknown.
    pub fn drag_to(&mut self, pointer_x: f64) -> Option<f64> {
        let drag = self.drag.as_mut()?;
        let duration = self.backend.duration()?;
        let ratio = drag.pointer_move(pointer_x);
        self.seek_to_ratio(ratio, duration);
        Some(ratio)
    }

    /// Pointer released. Removes the drag's listeners.
    pub fn end_drag(&mut self) -> Option<f64> {
        self.drag.take().map(DragSession::finish)
    }
}
