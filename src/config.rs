//! Watchface configuration

use crate::clock::{BucketRule, TimeUnits};

/// Playback of the firework sprite
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpriteMode {
    /// Sprite layer is never created
    #[default]
    Disabled,
    /// Play the sequence once. When it runs out the sequence is rewound
    /// but playback is not re-armed.
    Once,
    /// Rewind and re-arm playback whenever the sequence runs out
    Loop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchfaceConfig {
    /// Rule mapping hours to backgrounds
    pub bucket_rule: BucketRule,
    /// Firework sprite playback
    pub sprite: SpriteMode,
    /// Animate the window when it is pushed
    pub animated_push: bool,
    /// Granularity of clock updates
    pub tick_unit: TimeUnits,
}

impl WatchfaceConfig {
    pub const fn new() -> Self {
        Self {
            bucket_rule: BucketRule::Literal,
            sprite: SpriteMode::Disabled,
            animated_push: true,
            tick_unit: TimeUnits::MINUTE,
        }
    }
}

impl Default for WatchfaceConfig {
    fn default() -> Self {
        Self::new()
    }
}
