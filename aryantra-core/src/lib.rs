//! Headless widget runtime for the Aryantra site.
//!
//! The interactive pieces of the site live here as plain state machines with
//! a small tokio runtime around them:
//!
//! - [`carousel`]: timed media carousel with fade transitions, hover and
//!   playback pause, and a lightbox overlay.
//! - [`audio`]: play/pause and progress scrubbing for audio slides.
//! - [`scroll`]: eased smooth scrolling with an instance-owned interrupt
//!   token.
//! - [`contact`]: the contact form client that posts to the relay.
//!
//! Every widget instance owns its timers and listeners. Tearing an instance
//! down cancels everything it scheduled, so nothing it owned can fire
//! afterwards.

#![allow(missing_docs)]

pub mod audio;
pub mod carousel;
pub mod contact;
pub mod media;
pub mod scroll;
pub mod timer;

pub use carousel::{
    Carousel, CarouselConfig, CarouselEvent, CarouselHandle, CarouselState,
    Direction, TransitionPhase,
};
pub use contact::{ContactClient, ContactForm, SubmitError, SubmitOutcome};
pub use media::{CustomSlide, MediaItem, PhotoAudioSlide};
pub use scroll::{ScrollToken, SmoothScroll};
pub use timer::{Fired, TimerHandle, TransitionTimer};
