//! Mounted carousel instances.
//!
//! [`Carousel::mount`] spawns one task per carousel. The task is the single
//! owner of the controller and its timer, so UI commands and timer fires are
//! applied one at a time in arrival order. The returned [`CarouselHandle`]
//! sends commands in and reads state out.

use std::{ops::ControlFlow, sync::Arc};

use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{
    CarouselConfig, CarouselEvent, CarouselState,
    controller::{CarouselController, Outcome, TimerCommand, TimerCue},
    modal::{LightboxView, OverlayTarget},
    render::{PlayStateSink, SlideView, render_current},
};
use crate::{
    media::MediaItem,
    timer::{Fired, TransitionTimer},
};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarouselCommand {
    Next,
    Prev,
    Hover(bool),
    MediaPlaying(bool),
    /// Click on the current slide. Opens the preview for image slides.
    ClickSlide,
    OpenModal(String),
    CloseModal,
    ClickOverlay(OverlayTarget),
    Unmount,
}

/// Entry point for mounting carousels.
#[derive(Debug)]
pub struct Carousel;

impl Carousel {
    /// Mount a carousel over `items` and start its task. Must be called from
    /// within a tokio runtime.
    pub fn mount(items: Vec<MediaItem>, config: CarouselConfig) -> CarouselHandle {
        let items: Arc<[MediaItem]> = items.into();
        let controller = CarouselController::new(items.len(), config);
        let (timer, fires) = TransitionTimer::new();
        let (state_tx, state_rx) = watch::channel(controller.state().clone());
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let actor = CarouselActor {
            items: Arc::clone(&items),
            controller,
            timer,
            state_tx,
            events_tx: events_tx.clone(),
        };
        let task = tokio::spawn(actor.run(commands_rx, fires, shutdown.clone()));

        CarouselHandle {
            commands: commands_tx,
            state: state_rx,
            events: events_tx,
            items,
            shutdown,
            task: Some(task),
        }
    }
}

struct CarouselActor {
    items: Arc<[MediaItem]>,
    controller: CarouselController,
    timer: TransitionTimer<TimerCue>,
    state_tx: watch::Sender<CarouselState>,
    events_tx: broadcast::Sender<CarouselEvent>,
}

impl CarouselActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<CarouselCommand>,
        mut fires: mpsc::UnboundedReceiver<Fired<TimerCue>>,
        shutdown: CancellationToken,
    ) {
        let outcome = self.controller.mount();
        self.apply(outcome);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    match self.handle(command) {
                        ControlFlow::Continue(outcome) => self.apply(outcome),
                        ControlFlow::Break(()) => break,
                    }
                }
                Some(fired) = fires.recv() => {
                    if let Some(cue) = self.timer.accept(fired) {
                        let outcome = self.controller.on_timer(cue);
                        self.apply(outcome);
                    }
                }
            }
        }

        let outcome = self.controller.unmount();
        self.apply(outcome);
        self.timer.cancel_all();
    }

    /// Breaks on [`CarouselCommand::Unmount`].
    fn handle(&mut self, command: CarouselCommand) -> ControlFlow<(), Outcome> {
        let outcome = match command {
            CarouselCommand::Next => self.controller.next(),
            CarouselCommand::Prev => self.controller.prev(),
            CarouselCommand::Hover(true) => self.controller.hover_enter(),
            CarouselCommand::Hover(false) => self.controller.hover_leave(),
            CarouselCommand::MediaPlaying(playing) => {
                self.controller.set_media_playing(playing)
            }
            CarouselCommand::ClickSlide => {
                let index = self.controller.state().current_index;
                match self.items.get(index).and_then(MediaItem::image_src) {
                    Some(src) => {
                        let src = src.to_string();
                        self.controller.open_modal(src)
                    }
                    None => Outcome::default(),
                }
            }
            CarouselCommand::OpenModal(src) => self.controller.open_modal(src),
            CarouselCommand::CloseModal => self.controller.close_modal(),
            CarouselCommand::ClickOverlay(target) => self.controller.click_overlay(target),
            CarouselCommand::Unmount => return ControlFlow::Break(()),
        };
        ControlFlow::Continue(outcome)
    }

    fn apply(&mut self, outcome: Outcome) {
        let (timer, events) = outcome.into_parts();
        match timer {
            Some(TimerCommand::Arm { delay, cue }) => {
                self.timer.schedule(delay, cue);
            }
            Some(TimerCommand::Cancel) => {
                self.timer.cancel_all();
            }
            None => {}
        }

        let current = self.controller.state();
        self.state_tx.send_if_modified(|state| {
            if *state == *current {
                false
            } else {
                *state = current.clone();
                true
            }
        });

        for event in events {
            // No subscribers is normal.
            let _ = self.events_tx.send(event);
        }
    }
}

/// Owner-side handle to a mounted carousel.
///
/// Commands are fire-and-forget and never fail; once the carousel is gone
/// they are dropped. Dropping the handle tears the carousel down.
#[derive(Debug)]
pub struct CarouselHandle {
    commands: mpsc::UnboundedSender<CarouselCommand>,
    state: watch::Receiver<CarouselState>,
    events: broadcast::Sender<CarouselEvent>,
    items: Arc<[MediaItem]>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl CarouselHandle {
    fn send(&self, command: CarouselCommand) {
        if self.commands.send(command).is_err() {
            debug!("carousel already unmounted; command dropped");
        }
    }

    pub fn next(&self) {
        self.send(CarouselCommand::Next);
    }

    pub fn prev(&self) {
        self.send(CarouselCommand::Prev);
    }

    /// Pointer entered (`true`) or left (`false`) the carousel.
    pub fn hover(&self, entered: bool) {
        self.send(CarouselCommand::Hover(entered));
    }

    pub fn media_playing(&self, playing: bool) {
        self.send(CarouselCommand::MediaPlaying(playing));
    }

    pub fn click_slide(&self) {
        self.send(CarouselCommand::ClickSlide);
    }

    pub fn open_modal(&self, src: impl Into<String>) {
        self.send(CarouselCommand::OpenModal(src.into()));
    }

    pub fn close_modal(&self) {
        self.send(CarouselCommand::CloseModal);
    }

    pub fn click_overlay(&self, target: OverlayTarget) {
        self.send(CarouselCommand::ClickOverlay(target));
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn snapshot(&self) -> CarouselState {
        self.state.borrow().clone()
    }

    /// Receiver that wakes on every state change.
    pub fn watch(&self) -> watch::Receiver<CarouselState> {
        self.state.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CarouselEvent> {
        self.events.subscribe()
    }

    /// Sink the active slide reports its playback through.
    pub fn play_state_sink(&self) -> PlayStateSink {
        let commands = self.commands.clone();
        PlayStateSink::new(move |playing| {
            let _ = commands.send(CarouselCommand::MediaPlaying(playing));
        })
    }

    /// View of the current slide as of the latest state.
    pub fn render(&self) -> Option<SlideView> {
        let state = self.snapshot();
        render_current(&self.items, state.current_index, &self.play_state_sink())
            .map(|view| view.with_visible(state.slide_visible()))
    }

    /// The preview overlay, while open.
    pub fn lightbox(&self) -> Option<LightboxView> {
        self.state.borrow().modal_image.clone().map(LightboxView::of)
    }

    /// Tear the carousel down and wait for its task to finish. Nothing it
    /// scheduled fires afterwards.
    pub async fn unmount(mut self) {
        self.send(CarouselCommand::Unmount);
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
        {
            warn!(error = %err, "carousel task ended abnormally");
        }
    }
}

impl Drop for CarouselHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::{
        carousel::TransitionPhase,
        media::PhotoAudioSlide,
    };

    fn gallery(n: usize) -> Vec<MediaItem> {
        (0..n).map(|i| MediaItem::image(format!("/gallery/{i}.png"))).collect()
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn auto_advances_after_interval_and_fade() {
        let handle = Carousel::mount(gallery(3), CarouselConfig::images());
        settle().await;

        sleep(Duration::from_millis(2999)).await;
        assert_eq!(handle.snapshot().transition_phase, TransitionPhase::Idle);

        sleep(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(handle.snapshot().transition_phase, TransitionPhase::FadingOut);
        assert!(matches!(handle.render(), Some(SlideView::Image { visible: false, .. })));

        sleep(Duration::from_millis(300)).await;
        settle().await;
        let state = handle.snapshot();
        assert_eq!(state.current_index, 1);
        assert_eq!(state.transition_phase, TransitionPhase::Idle);

        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn wraps_around_the_end() {
        let handle = Carousel::mount(gallery(2), CarouselConfig::images());
        sleep(Duration::from_millis(2 * 3300 + 10)).await;
        settle().await;
        assert_eq!(handle.snapshot().current_index, 0);
        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_next_moves_exactly_one() {
        let handle = Carousel::mount(gallery(5), CarouselConfig::images());
        settle().await;
        for _ in 0..5 {
            handle.next();
        }
        sleep(Duration::from_millis(310)).await;
        settle().await;
        assert_eq!(handle.snapshot().current_index, 1);
        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn hover_suspends_indefinitely() {
        let handle = Carousel::mount(gallery(3), CarouselConfig::images());
        handle.hover(true);
        settle().await;
        assert!(handle.snapshot().is_paused);
        assert!(handle.snapshot().controls_visible());

        sleep(Duration::from_secs(60)).await;
        assert_eq!(handle.snapshot().current_index, 0);

        handle.hover(false);
        sleep(Duration::from_millis(3310)).await;
        settle().await;
        assert_eq!(handle.snapshot().current_index, 1);
        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn events_follow_a_transition() {
        let handle = Carousel::mount(gallery(3), CarouselConfig::images());
        let mut events = handle.subscribe();
        handle.prev();
        sleep(Duration::from_millis(310)).await;
        settle().await;

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                CarouselEvent::PhaseChanged(TransitionPhase::FadingOut),
                CarouselEvent::Advanced { from: 0, to: 2 },
                CarouselEvent::PhaseChanged(TransitionPhase::FadingIn),
                CarouselEvent::PhaseChanged(TransitionPhase::Idle),
            ]
        );
        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn lightbox_pauses_until_dismissed() {
        let handle = Carousel::mount(gallery(3), CarouselConfig::images());
        handle.click_slide();
        settle().await;
        let view = handle.lightbox().expect("preview open");
        assert_eq!(view.src, "/gallery/0.png");
        assert_eq!(view.alt, "Preview");

        handle.next();
        sleep(Duration::from_secs(30)).await;
        assert_eq!(handle.snapshot().current_index, 0);

        handle.click_overlay(OverlayTarget::Content);
        settle().await;
        assert!(handle.snapshot().is_modal_open);

        handle.click_overlay(OverlayTarget::Backdrop);
        settle().await;
        assert!(handle.lightbox().is_none());

        sleep(Duration::from_millis(3310)).await;
        settle().await;
        assert_eq!(handle.snapshot().current_index, 1);
        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn playing_slide_holds_the_carousel() {
        let items = vec![
            MediaItem::custom(PhotoAudioSlide::default()),
            MediaItem::image("/gallery/1.png"),
        ];
        let handle = Carousel::mount(items, CarouselConfig::media());
        let view = handle.render().expect("view");
        let sink = view.play_state().expect("overlay accepts play state").clone();

        sink.report(true);
        sleep(Duration::from_secs(30)).await;
        assert_eq!(handle.snapshot().current_index, 0);
        assert!(handle.snapshot().is_paused);

        sink.report(false);
        sleep(Duration::from_millis(3310)).await;
        settle().await;
        assert_eq!(handle.snapshot().current_index, 1);
        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_fires_after_unmount() {
        let handle = Carousel::mount(gallery(3), CarouselConfig::images());
        let watch = handle.watch();
        handle.next();
        settle().await;
        handle.unmount().await;

        sleep(Duration::from_secs(30)).await;
        let state = watch.borrow().clone();
        assert_eq!(state.current_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_tears_down() {
        let handle = Carousel::mount(gallery(3), CarouselConfig::images());
        let watch = handle.watch();
        settle().await;
        drop(handle);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(watch.borrow().current_index, 0);
    }
}
