//! Time-of-day buckets for picking the background

use chrono::{NaiveDateTime, Timelike};

use super::{format_hour_tag, TEXT_BUF_LEN};
use crate::ui::palette::{self, Color};

/// Part of the day a background belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeBucket {
    Night,
    Sunset,
    Day,
}

impl TimeBucket {
    /// Color of the clock text on top of this bucket's background.
    pub fn text_color(self) -> Color {
        match self {
            TimeBucket::Night => palette::WHITE,
            TimeBucket::Sunset => palette::PASTEL_YELLOW,
            TimeBucket::Day => palette::WHITE,
        }
    }
}

/// How an hour is mapped to a bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BucketRule {
    /// Compare the `HHH` hour tag against the two digit literals `06`, `20`,
    /// `10` and `17` as byte strings.
    ///
    /// The tag is one character longer than the literals, so an hour equal
    /// to a literal sorts after it: 20:00 is already night and 17:00 is
    /// already sunset. Night is 00–05 and 20–23, sunset 06–09 and 17–19,
    /// day 10–16.
    #[default]
    Literal,
    /// Same bounds applied to the numeric hour: night 00–05 and 21–23,
    /// sunset 06–09 and 18–20, day 10–17.
    Numeric,
}

impl BucketRule {
    /// Bucket for the given time.
    pub fn classify(self, time: &NaiveDateTime) -> TimeBucket {
        match self {
            BucketRule::Literal => {
                let mut buf = [0u8; TEXT_BUF_LEN];
                match format_hour_tag(&mut buf, time) {
                    Ok(tag) => classify_hour_tag(tag),
                    // A two digit hour and a suffix always fit
                    Err(_) => classify_hour(time.hour()),
                }
            }
            BucketRule::Numeric => classify_hour(time.hour()),
        }
    }
}

/// Bucket for an hour tag such as `07H`, compared lexicographically.
pub fn classify_hour_tag(tag: &str) -> TimeBucket {
    if tag < "06" || tag > "20" {
        TimeBucket::Night
    } else if tag < "10" || tag > "17" {
        TimeBucket::Sunset
    } else {
        TimeBucket::Day
    }
}

/// Bucket for a numeric hour (0–23).
pub fn classify_hour(hour: u32) -> TimeBucket {
    if hour < 6 || hour > 20 {
        TimeBucket::Night
    } else if hour < 10 || hour > 17 {
        TimeBucket::Sunset
    } else {
        TimeBucket::Day
    }
}
