//! Items a carousel can show.

use std::{fmt, sync::Arc};

/// A slide supplied by the page rather than built from a bare source path.
///
/// Slides that react to playback declare it through
/// [`accepts_play_state`](CustomSlide::accepts_play_state); the renderer
/// only hands them the carousel's play-state sink when they do.
pub trait CustomSlide: fmt::Debug + Send + Sync {
    /// Short human readable name, used in logs and accessible labels.
    fn label(&self) -> &str;

    /// Whether this slide reports its own play/pause state to the carousel.
    fn accepts_play_state(&self) -> bool {
        false
    }
}

/// One entry in a carousel's item list.
#[derive(Debug, Clone)]
pub enum MediaItem {
    Image { src: String },
    Audio { src: String },
    Custom(Arc<dyn CustomSlide>),
}

impl MediaItem {
    pub fn image(src: impl Into<String>) -> Self {
        Self::Image { src: src.into() }
    }

    pub fn audio(src: impl Into<String>) -> Self {
        Self::Audio { src: src.into() }
    }

    pub fn custom(slide: impl CustomSlide + 'static) -> Self {
        Self::Custom(Arc::new(slide))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Image { .. } => "image",
            Self::Audio { .. } => "audio",
            Self::Custom(_) => "custom",
        }
    }

    /// Source of an image item, the only kind that opens the lightbox.
    pub fn image_src(&self) -> Option<&str> {
        match self {
            Self::Image { src } => Some(src),
            _ => None,
        }
    }
}

/// A photo with an audio clip played over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAudioSlide {
    pub photo_src: String,
    pub audio_src: String,
    pub alt: String,
}

impl PhotoAudioSlide {
    pub const DEFAULT_PHOTO: &'static str = "/lead/photo1.png";
    pub const DEFAULT_AUDIO: &'static str = "/lead/Aryantra.wav";
    pub const DEFAULT_ALT: &'static str = "AI Sales Agent";

    pub fn new(photo_src: impl Into<String>, audio_src: impl Into<String>) -> Self {
        Self {
            photo_src: photo_src.into(),
            audio_src: audio_src.into(),
            alt: Self::DEFAULT_ALT.to_string(),
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }
}

impl Default for PhotoAudioSlide {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PHOTO, Self::DEFAULT_AUDIO)
    }
}

impl CustomSlide for PhotoAudioSlide {
    fn label(&self) -> &str {
        &self.alt
    }

    fn accepts_play_state(&self) -> bool {
        true
    }
}
