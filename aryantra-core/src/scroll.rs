//! Time-based eased scrolling with an interrupt token per animation.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// The header switches to its compact style past this offset.
pub const HEADER_SCROLL_THRESHOLD: f64 = 50.0;
/// Height of the fixed navigation bar kept clear above scroll targets.
pub const NAV_OFFSET: f64 = 80.0;
/// Wait for the page to lay out before measuring a scroll target.
pub const LAYOUT_SETTLE_DELAY: Duration = Duration::from_millis(400);
/// Wait after starting a scroll before focusing the target field.
pub const FOCUS_DELAY: Duration = Duration::from_millis(600);

pub const DEFAULT_SCROLL_DURATION: Duration = Duration::from_millis(600);
pub const FRAME: Duration = Duration::from_millis(16);

pub fn header_is_scrolled(scroll_y: f64) -> bool {
    scroll_y > HEADER_SCROLL_THRESHOLD
}

/// Document offset that puts an element whose viewport top is `rect_top`
/// just below the navigation bar.
pub fn form_scroll_target(rect_top: f64, scroll_top: f64, nav_offset: f64) -> f64 {
    (rect_top + scroll_top - nav_offset).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
        }
    }
}

/// Interrupt handle for one scroll animation.
///
/// Input handlers that should stop the scroll (wheel, touch, key) get a
/// clone; interrupting it only affects the animation that issued it.
#[derive(Debug, Clone, Default)]
pub struct ScrollToken(CancellationToken);

impl ScrollToken {
    pub fn interrupt(&self) {
        self.0.cancel();
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.is_cancelled()
    }

    pub async fn interrupted(&self) {
        self.0.cancelled().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    Completed,
    Interrupted,
}

#[derive(Debug, Clone)]
pub struct SmoothScroll {
    active: bool,
    start: f64,
    target: f64,
    started_at: Instant,
    duration: Duration,
    easing: Easing,
    token: Option<ScrollToken>,
}

impl Default for SmoothScroll {
    fn default() -> Self {
        Self {
            active: false,
            start: 0.0,
            target: 0.0,
            started_at: Instant::now(),
            duration: DEFAULT_SCROLL_DURATION,
            easing: Easing::default(),
            token: None,
        }
    }
}

impl SmoothScroll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Begin scrolling from `current` to `target`. Any animation still
    /// running on this instance is interrupted first.
    pub fn start(
        &mut self,
        current: f64,
        target: f64,
        duration: Duration,
        easing: Easing,
    ) -> ScrollToken {
        self.cancel();
        let token = ScrollToken::default();
        self.active = true;
        self.start = current;
        self.target = target;
        self.started_at = Instant::now();
        self.duration = duration;
        self.easing = easing;
        self.token = Some(token.clone());
        trace!(from = current, to = target, "smooth scroll started");
        token
    }

    /// Position at `now` without advancing state.
    pub fn sample(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.started_at);
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.target;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.start + (self.target - self.start) * self.easing.apply(t)
    }

    /// Returns the next position while animating, or `None` once finished
    /// or interrupted. The final tick yields the exact target.
    pub fn tick(&mut self) -> Option<f64> {
        if !self.active {
            return None;
        }
        if self.token.as_ref().is_some_and(ScrollToken::is_interrupted) {
            self.active = false;
            return None;
        }
        let now = Instant::now();
        if now.saturating_duration_since(self.started_at) >= self.duration {
            self.active = false;
            return Some(self.target);
        }
        Some(self.sample(now))
    }

    /// Stop the current animation immediately.
    pub fn cancel(&mut self) {
        self.active = false;
        if let Some(token) = self.token.take() {
            token.interrupt();
        }
    }

    /// Drive the animation every `frame`, handing each position to `apply`,
    /// until it completes or its token is interrupted.
    pub async fn run(&mut self, frame: Duration, mut apply: impl FnMut(f64)) -> ScrollOutcome {
        let Some(token) = self.token.clone() else {
            return ScrollOutcome::Completed;
        };
        let mut ticker = interval(frame);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.interrupted() => {
                    self.active = false;
                    trace!("smooth scroll interrupted");
                    return ScrollOutcome::Interrupted;
                }
                _ = ticker.tick() => match self.tick() {
                    Some(position) => {
                        apply(position);
                        if !self.active {
                            return ScrollOutcome::Completed;
                        }
                    }
                    None => return ScrollOutcome::Completed,
                },
            }
        }
    }
}

impl Drop for SmoothScroll {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[test]
    fn header_threshold_is_exclusive() {
        assert!(!header_is_scrolled(50.0));
        assert!(header_is_scrolled(50.5));
    }

    #[test]
    fn form_target_clears_the_nav() {
        assert_eq!(form_scroll_target(300.0, 1200.0, NAV_OFFSET), 1420.0);
        assert_eq!(form_scroll_target(10.0, 0.0, NAV_OFFSET), 0.0);
    }

    #[test]
    fn easing_curves_meet_at_the_ends() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
        assert!(Easing::EaseOut.apply(0.5) > Easing::Linear.apply(0.5));
        assert!(Easing::EaseIn.apply(0.5) < Easing::Linear.apply(0.5));
    }

    #[tokio::test(start_paused = true)]
    async fn samples_follow_the_curve() {
        let mut scroll = SmoothScroll::new();
        scroll.start(0.0, 1000.0, Duration::from_millis(400), Easing::Linear);
        advance(Duration::from_millis(100)).await;
        assert_eq!(scroll.tick(), Some(250.0));
        advance(Duration::from_millis(400)).await;
        assert_eq!(scroll.tick(), Some(1000.0));
        assert_eq!(scroll.tick(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn run_completes_on_target() {
        let mut scroll = SmoothScroll::new();
        scroll.start(200.0, 800.0, Duration::from_millis(300), Easing::EaseInOut);
        let mut positions = Vec::new();
        let outcome = scroll.run(FRAME, |y| positions.push(y)).await;

        assert_eq!(outcome, ScrollOutcome::Completed);
        assert_eq!(positions.last(), Some(&800.0));
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn token_interrupts_a_running_scroll() {
        let mut scroll = SmoothScroll::new();
        let token = scroll.start(0.0, 5000.0, Duration::from_secs(2), Easing::Linear);

        let interrupter = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            token.interrupt();
        });

        let mut last = 0.0;
        let outcome = scroll.run(FRAME, |y| last = y).await;
        interrupter.await.expect("interrupter task");

        assert_eq!(outcome, ScrollOutcome::Interrupted);
        assert!(last < 5000.0);
        assert!(!scroll.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_interrupts_the_previous_token() {
        let mut scroll = SmoothScroll::new();
        let first = scroll.start(0.0, 100.0, Duration::from_millis(300), Easing::Linear);
        let second = scroll.start(50.0, 400.0, Duration::from_millis(300), Easing::Linear);
        assert!(first.is_interrupted());
        assert!(!second.is_interrupted());
        assert_eq!(scroll.target(), 400.0);
    }

    #[tokio::test(start_paused = true)]
    async fn instances_do_not_share_tokens() {
        let mut header = SmoothScroll::new();
        let mut form = SmoothScroll::new();
        let header_token = header.start(0.0, 10.0, Duration::from_millis(100), Easing::Linear);
        form.start(0.0, 10.0, Duration::from_millis(100), Easing::Linear);

        header_token.interrupt();
        assert_eq!(header.tick(), None);
        assert!(form.tick().is_some());
    }
}
