//! General system configuration

use embassy_nrf::config::{Config, HfclkSource, LfclkSource};

use pinetime_daynight::WatchfaceConfig;

/// Offset of local time from UTC in seconds
pub const TIMEZONE_OFFSET_SECS: i32 = 3_600;

/// Show the time as 24 hour clock
pub const CLOCK_24H: bool = true;

/// Backlight level while the watchface is shown (1–7)
pub const BRIGHTNESS: u8 = 2;

/// Watchface settings
pub const WATCHFACE: WatchfaceConfig = WatchfaceConfig::new();

pub struct SystemConfig {}

impl SystemConfig {
    /// Create new system configuration
    pub fn new() -> Config {
        // Generate default config, required because Config is set as
        // `non_exhaustive`
        let mut config = Config::default();

        // Set high-frequency and low-frequency clock sources to external
        config.hfclk_source = HfclkSource::ExternalXtal;
        config.lfclk_source = LfclkSource::ExternalXtal;

        // Enable DC/DC regulator to massively reduce runtime current consumption
        config.dcdc.reg1 = true;

        config
    }
}
