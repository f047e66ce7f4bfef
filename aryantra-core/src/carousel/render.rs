//! Turns the current item into something a page can draw.

use std::{fmt, sync::Arc};

use crate::media::{CustomSlide, MediaItem};

/// Callback through which the active slide reports play/pause.
#[derive(Clone)]
pub struct PlayStateSink(Arc<dyn Fn(bool) + Send + Sync>);

impl PlayStateSink {
    pub fn new(report: impl Fn(bool) + Send + Sync + 'static) -> Self {
        Self(Arc::new(report))
    }

    /// A sink that drops every report.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    pub fn report(&self, playing: bool) {
        (self.0)(playing)
    }
}

impl fmt::Debug for PlayStateSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayStateSink").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum SlideView {
    /// Clickable image; a click opens the preview on `src`.
    Image {
        src: String,
        alt: String,
        visible: bool,
    },
    /// Audio player wired to the carousel's play-state sink.
    Audio { src: String, play_state: PlayStateSink },
    /// The supplied slide as-is. `play_state` is only present when the slide
    /// declares it accepts one.
    Custom {
        slide: Arc<dyn CustomSlide>,
        play_state: Option<PlayStateSink>,
    },
}

impl SlideView {
    /// The preview source a click on this view should open.
    pub fn modal_request(&self) -> Option<&str> {
        match self {
            Self::Image { src, .. } => Some(src),
            _ => None,
        }
    }

    pub fn play_state(&self) -> Option<&PlayStateSink> {
        match self {
            Self::Image { .. } => None,
            Self::Audio { play_state, .. } => Some(play_state),
            Self::Custom { play_state, .. } => play_state.as_ref(),
        }
    }

    /// Dim an image view while it fades out.
    pub fn with_visible(mut self, shown: bool) -> Self {
        if let Self::Image { visible, .. } = &mut self {
            *visible = shown;
        }
        self
    }
}

pub fn slide_alt(index: usize) -> String {
    format!("slide {}", index + 1)
}

/// Render the item at `current_index`. Returns `None` for an empty list.
pub fn render_current(
    items: &[MediaItem],
    current_index: usize,
    sink: &PlayStateSink,
) -> Option<SlideView> {
    let item = items.get(current_index)?;
    let view = match item {
        MediaItem::Image { src } => SlideView::Image {
            src: src.clone(),
            alt: slide_alt(current_index),
            visible: true,
        },
        MediaItem::Audio { src } => SlideView::Audio {
            src: src.clone(),
            play_state: sink.clone(),
        },
        MediaItem::Custom(slide) => SlideView::Custom {
            slide: Arc::clone(slide),
            play_state: slide.accepts_play_state().then(|| sink.clone()),
        },
    };
    Some(view)
}
