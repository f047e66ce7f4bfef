//! Full-screen preview of the current image.

use serde::Serialize;

pub const PREVIEW_ALT: &str = "Preview";
pub const CLOSE_LABEL: &str = "Close preview";

/// Where a click on the open overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTarget {
    Backdrop,
    /// The previewed image or anything inside its frame. Clicks here stop
    /// at the content and never reach the backdrop.
    Content,
    CloseButton,
}

impl OverlayTarget {
    pub fn dismisses(self) -> bool {
        !matches!(self, Self::Content)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lightbox {
    image: Option<String>,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Show `src`. Returns false when it was already showing.
    pub fn open(&mut self, src: impl Into<String>) -> bool {
        let src = src.into();
        if self.image.as_deref() == Some(src.as_str()) {
            return false;
        }
        self.image = Some(src);
        true
    }

    /// Returns false when nothing was open.
    pub fn close(&mut self) -> bool {
        self.image.take().is_some()
    }

    /// Route a click on the overlay. Returns true when it closed the preview.
    pub fn click(&mut self, target: OverlayTarget) -> bool {
        target.dismisses() && self.close()
    }
}

/// What the overlay draws while open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightboxView {
    pub src: String,
    pub alt: &'static str,
    pub close_label: &'static str,
}

impl LightboxView {
    pub fn of(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: PREVIEW_ALT,
            close_label: CLOSE_LABEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_clicks_do_not_close() {
        let mut lightbox = Lightbox::new();
        lightbox.open("/gallery/1.png");
        assert!(!lightbox.click(OverlayTarget::Content));
        assert!(lightbox.is_open());
        assert!(lightbox.click(OverlayTarget::Backdrop));
        assert!(!lightbox.is_open());
    }

    #[test]
    fn close_button_dismisses() {
        let mut lightbox = Lightbox::new();
        lightbox.open("/gallery/2.png");
        assert!(lightbox.click(OverlayTarget::CloseButton));
        assert!(!lightbox.click(OverlayTarget::CloseButton));
    }

    #[test]
    fn view_carries_labels() {
        let view = LightboxView::of("/gallery/3.png");
        assert_eq!(view.src, "/gallery/3.png");
        assert_eq!(view.alt, "Preview");
        assert_eq!(view.close_label, "Close preview");
    }
}
