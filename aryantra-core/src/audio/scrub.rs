//! Progress bar geometry and drag bookkeeping.

use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use parking_lot::Mutex;

/// Horizontal extent of a progress bar in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressBar {
    pub left: f64,
    pub width: f64,
}

impl ProgressBar {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    /// Ratio under `pointer_x`, clamped to `[0, 1]`. A collapsed bar reads 0.
    pub fn ratio_at(&self, pointer_x: f64) -> f64 {
        seek_ratio(pointer_x, self.left, self.width)
    }
}

pub fn seek_ratio(pointer_x: f64, bar_left: f64, bar_width: f64) -> f64 {
    if bar_width.is_nan() || bar_width <= 0.0 {
        return 0.0;
    }
    let ratio = (pointer_x - bar_left) / bar_width;
    if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) }
}

/// Playback position for `ratio` of a clip of `duration`.
pub fn seek_target(ratio: f64, duration: Duration) -> Duration {
    duration.mul_f64(ratio.clamp(0.0, 1.0))
}

/// Fraction of the clip played. Unknown or zero durations count as one
/// second.
pub fn progress_ratio(position: Duration, duration: Option<Duration>) -> f64 {
    let total = duration
        .filter(|d| !d.is_zero())
        .unwrap_or(Duration::from_secs(1));
    (position.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    active: HashMap<ListenerId, PointerEventKind>,
}

/// Page-wide pointer listeners. Clones share one registry.
#[derive(Clone, Default)]
pub struct PointerListeners {
    inner: Arc<Mutex<Registry>>,
}

impl fmt::Debug for PointerListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerListeners")
            .field("active", &self.count())
            .finish()
    }
}

impl PointerListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, kind: PointerEventKind) -> ListenerId {
        let mut registry = self.inner.lock();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.active.insert(id, kind);
        id
    }

    pub fn detach(&self, id: ListenerId) -> bool {
        self.inner.lock().active.remove(&id).is_some()
    }

    pub fn count(&self) -> usize {
        self.inner.lock().active.len()
    }

    pub fn count_of(&self, kind: PointerEventKind) -> usize {
        self.inner
            .lock()
            .active
            .values()
            .filter(|k| **k == kind)
            .count()
    }
}

/// One drag across a progress bar.
///
/// Beginning a drag attaches exactly one move and one up listener. Both are
/// removed by [`finish`](DragSession::finish) or, failing that, on drop.
#[derive(Debug)]
pub struct DragSession {
    listeners: PointerListeners,
    attached: Option<(ListenerId, ListenerId)>,
    bar: ProgressBar,
    ratio: f64,
}

impl DragSession {
    pub fn begin(listeners: &PointerListeners, bar: ProgressBar, pointer_x: f64) -> Self {
        let move_id = listeners.attach(PointerEventKind::Move);
        let up_id = listeners.attach(PointerEventKind::Up);
        Self {
            listeners: listeners.clone(),
            attached: Some((move_id, up_id)),
            bar,
            ratio: bar.ratio_at(pointer_x),
        }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn is_active(&self) -> bool {
        self.attached.is_some()
    }

    /// Ratio under the pointer as it moves. Measured against the bar the
    /// drag started on, so leaving the bar pins to an end.
    pub fn pointer_move(&mut self, pointer_x: f64) -> f64 {
        if self.is_active() {
            self.ratio = self.bar.ratio_at(pointer_x);
        }
        self.ratio
    }

    /// End the drag and return the final ratio.
    pub fn finish(mut self) -> f64 {
        self.detach();
        self.ratio
    }

    fn detach(&mut self) {
        if let Some((move_id, up_id)) = self.attached.take() {
            self.listeners.detach(move_id);
            self.listeners.detach(up_id);
        }
    }
}

impl Drop for DragSession {
    fn drop(&mut self) {
        self.detach();
    }
}
