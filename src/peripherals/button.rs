//! Button control module for PineTime

use debouncr::{debounce_2, Debouncer, Edge, Repeat2};
use embassy_nrf::gpio::{AnyPin, Input, Output};
use embassy_time::{Duration, Timer};

pub struct Button {
    /// Button detection pin (high/low)
    pin_button: Input<'static, AnyPin>,
    /// Button enable pin
    pin_enable: Output<'static, AnyPin>,
    /// Debouncer for button
    debouncer: Debouncer<u8, Repeat2>,
}

impl Button {
    /// Configure button on boot
    pub fn init(button_pin: Input<'static, AnyPin>, enable_pin: Output<'static, AnyPin>) -> Self {
        Self {
            pin_button: button_pin,
            pin_enable: enable_pin,
            debouncer: debounce_2(false),
        }
    }

    /// Sample the button once and report a debounced press.
    ///
    /// Needs to be called periodically, two consecutive high samples count
    /// as a press.
    pub async fn pressed(&mut self) -> bool {
        // Enable button
        self.pin_enable.set_high();
        // The button needs a short time to give stable outputs
        Timer::after(Duration::from_micros(1)).await;

        let pressed = self.debouncer.update(self.pin_button.is_high()) == Some(Edge::Rising);

        // Button consumes around 34µA when P0.15 is left high.
        // To reduce current consumption, set it low most of the time.
        self.pin_enable.set_low();

        pressed
    }
}
