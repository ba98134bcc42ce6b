//! Backlight control
//!
//! Implementation based upon https://github.com/dbrgn/pinetime-rtic/blob/master/pinetime-rtic/src/backlight.rs
//! and https://wiki.pine64.org/wiki/PineTime.

use embassy_nrf::gpio::{AnyPin, Output};

/// Control the backlight.
///
/// There are three active-low backlight pins, each connected to a FET that
/// toggles backlight power through a resistor.
///
/// - Low: 2.2 kΩ
/// - Mid: 100 Ω
/// - High: 30 Ω
///
/// Through combinations of these pins, 7 brightness levels (+ off) can be
/// configured.
pub struct Backlight {
    low: Output<'static, AnyPin>,
    mid: Output<'static, AnyPin>,
    high: Output<'static, AnyPin>,

    /// The brightness level restored by `on` (value between 1 and 7).
    level: u8,
    /// The current brightness level (value between 0 and 7).
    brightness: u8,
}

impl Backlight {
    /// Initialize the backlight, switched off, remembering `level` (1–7) for `on`.
    pub fn init(
        low: Output<'static, AnyPin>,
        mid: Output<'static, AnyPin>,
        high: Output<'static, AnyPin>,
        level: u8,
    ) -> Self {
        let mut backlight = Self {
            low,
            mid,
            high,
            level: level.clamp(1, 7),
            brightness: 0,
        };
        backlight.set(0);
        backlight
    }

    /// Set the brightness level. Must be a value between 0 (off) and 7 (max
    /// brightness). Higher values are clamped to 7.
    pub fn set(&mut self, brightness: u8) {
        let brightness = brightness.min(7);
        defmt::debug!("Setting backlight brightness to {}", brightness);
        if brightness & 0x01 > 0 {
            self.low.set_low();
        } else {
            self.low.set_high();
        }
        if brightness & 0x02 > 0 {
            self.mid.set_low();
        } else {
            self.mid.set_high();
        }
        if brightness & 0x04 > 0 {
            self.high.set_low();
        } else {
            self.high.set_high();
        }
        self.brightness = brightness;
    }

    /// Turn the backlight on at the configured level.
    pub fn on(&mut self) {
        self.set(self.level);
    }

    /// Turn off the backlight.
    pub fn off(&mut self) {
        self.set(0);
    }

    /// Return the current brightness level (value between 0 and 7).
    #[allow(unused)]
    pub fn get_brightness(&self) -> u8 {
        self.brightness
    }
}
