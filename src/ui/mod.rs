//! UI definitions module
//!
//! The watchface talks to its display toolkit only through [`Toolkit`].
//! [`Runtime`] is the toolkit used on the watch.

use chrono::NaiveDateTime;

use crate::clock::{timer, TimeUnits};

pub mod daynight_watchface;
pub mod resources;
pub mod runtime;
pub mod sprite;
pub mod toolkit;

mod slab;

pub use daynight_watchface::DayNightWatchface;
pub use resources::ResourceId;
pub use runtime::Runtime;
pub use sprite::SpriteAnimator;
pub use toolkit::{TextAlignment, Toolkit};

/// Colors used by the watchface
pub mod palette {
    use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

    pub type Color = Rgb565;

    pub const BLACK: Color = Rgb565::BLACK;
    pub const WHITE: Color = Rgb565::WHITE;
    /// 0xFFFFAA
    pub const PASTEL_YELLOW: Color = Rgb565::new(31, 63, 21);
}

/// Events delivered by the application event loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Tick timer notification
    Tick {
        time: NaiveDateTime,
        units_changed: TimeUnits,
    },
    /// A single-shot application timer expired
    Timer,
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// No free slot for a new window, layer, bitmap, font, sequence or timer
    OutOfMemory,
    /// Handle does not refer to a live resource
    InvalidHandle,
    /// Resource id has no artwork of the requested kind
    UnknownResource,
    /// Text did not fit its buffer
    Format,
}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Error::Format
    }
}

impl From<timer::Error> for Error {
    fn from(err: timer::Error) -> Self {
        match err {
            timer::Error::QueueFull => Error::OutOfMemory,
        }
    }
}
