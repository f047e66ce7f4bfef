//! Audio playback controls shared by audio slides and the photo overlay.
//!
//! Seeking maps a pointer position on the progress bar to
//! `clamp((x - left) / width, 0, 1)` and the target position to that ratio
//! of the clip's duration.

pub mod player;
pub mod scrub;

pub use player::{AudioBackend, AudioPlayer, PlaybackEvent, ScrubError};
pub use scrub::{
    DragSession, ListenerId, PointerEventKind, PointerListeners, ProgressBar, progress_ratio,
    seek_ratio, seek_target,
};
