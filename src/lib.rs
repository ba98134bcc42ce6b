//! Day/night watchface for the PineTime.
//!
//! The watchface shows the current time on top of one of three backgrounds
//! (night, sunset, day) picked from the hour of day, refreshed once per
//! minute. It is written against the [`ui::Toolkit`] trait; [`ui::Runtime`]
//! implements that trait on top of `embedded-graphics` so the same
//! controller drives the LCD on the watch and a framebuffer in tests.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
pub mod ui;

pub use config::{SpriteMode, WatchfaceConfig};
pub use ui::{DayNightWatchface, Event, Runtime, Toolkit};
