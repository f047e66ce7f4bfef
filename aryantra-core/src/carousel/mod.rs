//! Timed media carousel.
//!
//! [`controller::CarouselController`] holds the state machine and never
//! touches a clock. [`runtime::Carousel`] mounts it behind a tokio task that
//! owns the single [`TransitionTimer`](crate::timer::TransitionTimer) and
//! feeds timer fires and UI commands through it in order.

pub mod controller;
pub mod modal;
pub mod render;
pub mod runtime;

use std::time::Duration;

use serde::Serialize;

pub use controller::{CarouselController, Outcome, TimerCommand, TimerCue};
pub use modal::{Lightbox, LightboxView, OverlayTarget};
pub use render::{PlayStateSink, SlideView, render_current};
pub use runtime::{Carousel, CarouselCommand, CarouselHandle};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(3000);
pub const DEFAULT_FADE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    #[default]
    Idle,
    FadingOut,
    FadingIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Index reached by one step from `index` in a list of `len` items.
    pub fn step(self, index: usize, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        match self {
            Self::Forward => (index + 1) % len,
            Self::Backward => (index + len - 1) % len,
        }
    }
}

/// Observable state of one mounted carousel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CarouselState {
    pub current_index: usize,
    pub transition_phase: TransitionPhase,
    pub is_paused: bool,
    pub is_modal_open: bool,
    pub modal_image: Option<String>,
    pub is_hovered: bool,
}

impl CarouselState {
    /// Prev/next controls show while hovered and hidden behind the lightbox.
    pub fn controls_visible(&self) -> bool {
        self.is_hovered && !self.is_modal_open
    }

    /// The current slide is drawn faded out during the first half of a
    /// transition.
    pub fn slide_visible(&self) -> bool {
        self.transition_phase != TransitionPhase::FadingOut
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselConfig {
    pub interval: Duration,
    pub fade: Duration,
    /// Image carousels pause while hovered. Media carousels ignore hover for
    /// pausing and follow the active item's playback instead.
    pub pause_on_hover: bool,
}

impl CarouselConfig {
    pub fn images() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            fade: DEFAULT_FADE,
            pause_on_hover: true,
        }
    }

    pub fn media() -> Self {
        Self {
            pause_on_hover: false,
            ..Self::images()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_fade(mut self, fade: Duration) -> Self {
        self.fade = fade;
        self
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self::images()
    }
}

/// Broadcast to subscribers of a mounted carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarouselEvent {
    PhaseChanged(TransitionPhase),
    Advanced { from: usize, to: usize },
    PauseChanged(bool),
    ModalOpened(String),
    ModalClosed,
}
