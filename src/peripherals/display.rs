//! Display control module for PineTime

use display_interface_spi::SPIInterface;
use embassy_nrf::{
    gpio::{AnyPin, Output},
    peripherals::SPI2,
    spim::Spim,
};
use embassy_time::Delay;
use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use mipidsi::{models::ST7789, Builder, Orientation};

use pinetime_daynight::Runtime;

const LCD_W: u16 = 240;
const LCD_H: u16 = 240;

type Lcd = mipidsi::Display<
    SPIInterface<Spim<'static, SPI2>, Output<'static, AnyPin>, Output<'static, AnyPin>>,
    ST7789,
    Output<'static, AnyPin>,
>;

#[derive(Debug, defmt::Format)]
pub enum Error {
    /// The controller did not accept the init sequence
    Init,
}

pub struct Display {
    lcd: Lcd,
}

impl Display {
    /// Screen size in pixels
    pub const SIZE: Size = Size::new(LCD_W as u32, LCD_H as u32);

    /// Configure display settings on boot
    pub fn init(
        spim: Spim<'static, SPI2>,
        cs_pin: Output<'static, AnyPin>,
        dc_pin: Output<'static, AnyPin>,
        rst_pin: Output<'static, AnyPin>,
    ) -> Result<Self, Error> {
        let lcd = Builder::st7789(SPIInterface::new(spim, dc_pin, cs_pin))
            .with_display_size(LCD_W, LCD_H)
            .with_orientation(Orientation::Portrait(false))
            .init(&mut Delay, Some(rst_pin))
            .map_err(|_| Error::Init)?;

        let mut display = Self { lcd };
        display.clear(Rgb565::BLACK);
        Ok(display)
    }

    /// Clear the display
    pub fn clear(&mut self, color: Rgb565) {
        if self.lcd.clear(color).is_err() {
            defmt::warn!("Clearing the display failed");
        }
    }

    /// Compose the runtime's top window onto the LCD.
    pub fn present(&mut self, runtime: &mut Runtime) {
        if runtime.render(&mut self.lcd).is_err() {
            defmt::warn!("Display update failed");
        }
    }
}
