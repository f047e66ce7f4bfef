//! Carousel state machine.
//!
//! The controller decides when the carousel should wait, fade or advance but
//! leaves the waiting to its owner: every operation returns an [`Outcome`]
//! carrying at most one [`TimerCommand`]. Arming always replaces whatever
//! was armed before, so at most one timer is outstanding per carousel.
//!
//! A transition runs `Idle -> FadingOut` when it starts. Once the fade
//! elapses the index steps, the phase passes through `FadingIn` and settles
//! on `Idle`, and the auto-advance wait is armed again if nothing holds the
//! carousel still.

use std::time::Duration;

use tracing::{debug, trace};

use super::{
    CarouselConfig, CarouselEvent, CarouselState, Direction, TransitionPhase,
    modal::{Lightbox, OverlayTarget},
};

/// What an armed timer means when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCue {
    /// The idle interval elapsed.
    AutoAdvance,
    /// The fade-out elapsed; step in the given direction.
    FadeOut(Direction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Replace any outstanding timer with one firing `cue` after `delay`.
    Arm { delay: Duration, cue: TimerCue },
    /// Drop the outstanding timer.
    Cancel,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub timer: Option<TimerCommand>,
    pub events: Vec<CarouselEvent>,
}

impl Outcome {
    pub fn is_empty(&self) -> bool {
        self.timer.is_none() && self.events.is_empty()
    }

    /// Events that changed observable state, paired with the timer command.
    pub fn into_parts(self) -> (Option<TimerCommand>, Vec<CarouselEvent>) {
        (self.timer, self.events)
    }
}

#[derive(Debug)]
pub struct CarouselController {
    config: CarouselConfig,
    item_count: usize,
    state: CarouselState,
    lightbox: Lightbox,
    media_playing: bool,
    armed: Option<TimerCue>,
    mounted: bool,
}

impl CarouselController {
    pub fn new(item_count: usize, config: CarouselConfig) -> Self {
        Self {
            config,
            item_count,
            state: CarouselState::default(),
            lightbox: Lightbox::new(),
            media_playing: false,
            armed: None,
            mounted: false,
        }
    }

    pub fn state(&self) -> &CarouselState {
        &self.state
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// The cue of the outstanding timer, if any.
    pub fn armed(&self) -> Option<TimerCue> {
        self.armed
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn navigable(&self) -> bool {
        self.mounted && self.item_count > 1
    }

    /// Auto-advance is live: mounted, more than one item, nothing pausing
    /// it and no preview open.
    pub fn is_running(&self) -> bool {
        self.navigable() && !self.state.is_paused && !self.state.is_modal_open
    }

    pub fn mount(&mut self) -> Outcome {
        let mut out = Outcome::default();
        if self.mounted {
            return out;
        }
        self.mounted = true;
        debug!(
            items = self.item_count,
            interval_ms = self.config.interval.as_millis() as u64,
            "carousel mounted"
        );
        self.reconcile(&mut out);
        out
    }

    /// Cancel everything and go inert. Later calls are no-ops.
    pub fn unmount(&mut self) -> Outcome {
        let mut out = Outcome::default();
        if !self.mounted {
            return out;
        }
        self.mounted = false;
        if self.armed.take().is_some() {
            out.timer = Some(TimerCommand::Cancel);
        }
        debug!("carousel unmounted");
        out
    }

    /// Handle a timer fire. Cues that are not the armed one are ignored.
    pub fn on_timer(&mut self, cue: TimerCue) -> Outcome {
        let mut out = Outcome::default();
        if !self.mounted || self.armed != Some(cue) {
            trace!(?cue, armed = ?self.armed, "ignoring timer cue");
            return out;
        }
        self.armed = None;

        match cue {
            TimerCue::AutoAdvance => {
                if self.is_running()
                    && self.state.transition_phase == TransitionPhase::Idle
                {
                    self.start_fade(Direction::Forward, &mut out);
                }
            }
            TimerCue::FadeOut(direction) => self.complete_fade(direction, &mut out),
        }
        out
    }

    pub fn next(&mut self) -> Outcome {
        self.navigate(Direction::Forward)
    }

    pub fn prev(&mut self) -> Outcome {
        self.navigate(Direction::Backward)
    }

    fn navigate(&mut self, direction: Direction) -> Outcome {
        let mut out = Outcome::default();
        if !self.navigable() || self.state.is_modal_open {
            return out;
        }
        self.start_fade(direction, &mut out);
        out
    }

    pub fn hover_enter(&mut self) -> Outcome {
        self.set_hovered(true)
    }

    pub fn hover_leave(&mut self) -> Outcome {
        self.set_hovered(false)
    }

    fn set_hovered(&mut self, hovered: bool) -> Outcome {
        let mut out = Outcome::default();
        if !self.mounted {
            return out;
        }
        self.state.is_hovered = hovered;
        self.refresh_pause(&mut out);
        self.reconcile(&mut out);
        out
    }

    /// Playback report from the active item.
    pub fn set_media_playing(&mut self, playing: bool) -> Outcome {
        let mut out = Outcome::default();
        if !self.mounted {
            return out;
        }
        self.media_playing = playing;
        self.refresh_pause(&mut out);
        self.reconcile(&mut out);
        out
    }

    /// Open the preview on `src`. Suspends auto-advance and abandons any
    /// fade in flight, leaving the current index where it is.
    pub fn open_modal(&mut self, src: impl Into<String>) -> Outcome {
        let mut out = Outcome::default();
        if !self.mounted {
            return out;
        }
        let src = src.into();
        if !self.lightbox.open(src.clone()) {
            return out;
        }
        self.sync_modal();
        out.events.push(CarouselEvent::ModalOpened(src));

        if self.armed.take().is_some() {
            out.timer = Some(TimerCommand::Cancel);
        }
        self.set_phase(TransitionPhase::Idle, &mut out);
        out
    }

    /// Close the preview. Auto-advance resumes only when no other pause
    /// condition still holds.
    pub fn close_modal(&mut self) -> Outcome {
        if !self.mounted || !self.lightbox.close() {
            return Outcome::default();
        }
        self.modal_closed()
    }

    /// Route a click on the open overlay. Only the backdrop and the close
    /// button dismiss it.
    pub fn click_overlay(&mut self, target: OverlayTarget) -> Outcome {
        if !self.mounted || !self.lightbox.click(target) {
            return Outcome::default();
        }
        self.modal_closed()
    }

    fn modal_closed(&mut self) -> Outcome {
        let mut out = Outcome::default();
        self.sync_modal();
        out.events.push(CarouselEvent::ModalClosed);
        self.reconcile(&mut out);
        out
    }

    fn sync_modal(&mut self) {
        self.state.is_modal_open = self.lightbox.is_open();
        self.state.modal_image = self.lightbox.image().map(str::to_owned);
    }

    fn start_fade(&mut self, direction: Direction, out: &mut Outcome) {
        self.set_phase(TransitionPhase::FadingOut, out);
        let cue = TimerCue::FadeOut(direction);
        self.armed = Some(cue);
        out.timer = Some(TimerCommand::Arm {
            delay: self.config.fade,
            cue,
        });
    }

    fn complete_fade(&mut self, direction: Direction, out: &mut Outcome) {
        let from = self.state.current_index;
        let to = direction.step(from, self.item_count);
        self.state.current_index = to;
        out.events.push(CarouselEvent::Advanced { from, to });
        trace!(from, to, "carousel advanced");

        // Whatever was playing belonged to the slide that just left.
        self.media_playing = false;
        self.refresh_pause(out);

        self.set_phase(TransitionPhase::FadingIn, out);
        self.set_phase(TransitionPhase::Idle, out);
        self.reconcile(out);
    }

    fn set_phase(&mut self, phase: TransitionPhase, out: &mut Outcome) {
        if self.state.transition_phase != phase {
            self.state.transition_phase = phase;
            out.events.push(CarouselEvent::PhaseChanged(phase));
        }
    }

    fn refresh_pause(&mut self, out: &mut Outcome) {
        let paused = (self.state.is_hovered && self.config.pause_on_hover)
            || self.media_playing;
        if paused != self.state.is_paused {
            self.state.is_paused = paused;
            out.events.push(CarouselEvent::PauseChanged(paused));
        }
    }

    /// Bring the idle timer in line with the running state. A fade already
    /// in flight is left to finish and re-arms on completion.
    fn reconcile(&mut self, out: &mut Outcome) {
        if self.state.transition_phase != TransitionPhase::Idle {
            return;
        }
        match (self.is_running(), self.armed) {
            (true, None) => {
                self.armed = Some(TimerCue::AutoAdvance);
                out.timer = Some(TimerCommand::Arm {
                    delay: self.config.interval,
                    cue: TimerCue::AutoAdvance,
                });
            }
            (false, Some(TimerCue::AutoAdvance)) => {
                self.armed = None;
                out.timer = Some(TimerCommand::Cancel);
            }
            _ => {}
        }
    }
}
