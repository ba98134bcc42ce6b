//! Bundled resources
//!
//! Backgrounds and the firework animation are drawn from primitives at
//! render time, scaled to the frame they are drawn into, so no image data
//! needs to live in flash.

use embedded_graphics::{
    mono_font::MonoFont,
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle, Triangle},
};
use profont::PROFONT_24_POINT;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResourceId {
    /// Clock font
    TimeFont,
    /// Blue night sky
    NightBackground,
    /// Orange sunset
    SunsetBackground,
    /// Green daytime landscape
    DayBackground,
    /// Animated firework burst
    Firework,
}

pub const NIGHT_SKY: Rgb565 = Rgb565::new(1, 4, 11);
const NIGHT_GROUND: Rgb565 = Rgb565::new(1, 6, 4);
const MOON: Rgb565 = Rgb565::new(29, 58, 24);
const STAR: Rgb565 = Rgb565::new(28, 56, 28);

pub const SUNSET_SKY_TOP: Rgb565 = Rgb565::new(12, 8, 14);
const SUNSET_BANDS: [Rgb565; 4] = [
    SUNSET_SKY_TOP,
    Rgb565::new(22, 16, 12),
    Rgb565::new(30, 28, 6),
    Rgb565::new(31, 40, 4),
];
const SUNSET_SUN: Rgb565 = Rgb565::new(31, 52, 6);
const SUNSET_GROUND: Rgb565 = Rgb565::new(10, 10, 3);

pub const DAY_SKY: Rgb565 = Rgb565::new(16, 48, 30);
const DAY_SUN: Rgb565 = Rgb565::new(31, 60, 8);
const DAY_HILL_FAR: Rgb565 = Rgb565::new(8, 40, 8);
const DAY_HILL_NEAR: Rgb565 = Rgb565::new(4, 30, 4);

/// Stars as (x, y) in thousandths of the frame
const STARS: [(i32, i32); 7] = [
    (120, 300),
    (250, 120),
    (400, 220),
    (520, 80),
    (600, 330),
    (880, 420),
    (330, 450),
];

const FIREWORK_FRAMES: u16 = 12;
const FIREWORK_FRAME_DELAY_MS: u32 = 70;
const FIREWORK_SIZE: Size = Size::new(96, 96);
/// Spark directions, unit vectors scaled by 1000
const SPARK_DIRECTIONS: [(i32, i32); 8] = [
    (1000, 0),
    (707, 707),
    (0, 1000),
    (-707, 707),
    (-1000, 0),
    (-707, -707),
    (0, -1000),
    (707, -707),
];

/// Frame timing of an animated resource
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceInfo {
    pub frame_count: u16,
    pub frame_delay_ms: u32,
    pub size: Size,
}

impl ResourceId {
    /// Font stored under this id
    pub fn font(self) -> Option<&'static MonoFont<'static>> {
        match self {
            ResourceId::TimeFont => Some(&PROFONT_24_POINT),
            _ => None,
        }
    }

    /// Whether this id holds a still image
    pub fn is_image(self) -> bool {
        matches!(
            self,
            ResourceId::NightBackground | ResourceId::SunsetBackground | ResourceId::DayBackground
        )
    }

    /// Animation stored under this id
    pub fn sequence(self) -> Option<SequenceInfo> {
        match self {
            ResourceId::Firework => Some(SequenceInfo {
                frame_count: FIREWORK_FRAMES,
                frame_delay_ms: FIREWORK_FRAME_DELAY_MS,
                size: FIREWORK_SIZE,
            }),
            _ => None,
        }
    }
}

/// Point at (`fx`, `fy`) thousandths inside `area`
fn at(area: &Rectangle, fx: i32, fy: i32) -> Point {
    let w = area.size.width as i32;
    let h = area.size.height as i32;
    area.top_left + Point::new(w * fx / 1000, h * fy / 1000)
}

fn fill(color: Rgb565) -> PrimitiveStyle<Rgb565> {
    PrimitiveStyle::with_fill(color)
}

/// Draw the still image `id` scaled into `area`.
pub fn draw_image<D>(id: ResourceId, area: Rectangle, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    match id {
        ResourceId::NightBackground => draw_night(area, target),
        ResourceId::SunsetBackground => draw_sunset(area, target),
        ResourceId::DayBackground => draw_day(area, target),
        _ => Ok(()),
    }
}

fn draw_night<D>(area: Rectangle, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let w = area.size.width;
    let h = area.size.height;
    area.into_styled(fill(NIGHT_SKY)).draw(target)?;

    for (fx, fy) in STARS {
        Rectangle::new(at(&area, fx, fy), Size::new(2, 2))
            .into_styled(fill(STAR))
            .draw(target)?;
    }

    // Crescent moon
    let moon_d = w / 6;
    Circle::new(at(&area, 700, 120), moon_d)
        .into_styled(fill(MOON))
        .draw(target)?;
    Circle::new(at(&area, 700, 120) + Point::new(moon_d as i32 / 3, -(moon_d as i32) / 8), moon_d)
        .into_styled(fill(NIGHT_SKY))
        .draw(target)?;

    Rectangle::new(at(&area, 0, 800), Size::new(w, h - h * 4 / 5))
        .into_styled(fill(NIGHT_GROUND))
        .draw(target)
}

fn draw_sunset<D>(area: Rectangle, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let w = area.size.width;
    let h = area.size.height;
    let band_h = h * 4 / 5 / SUNSET_BANDS.len() as u32 + 1;
    for (i, color) in SUNSET_BANDS.iter().enumerate() {
        Rectangle::new(
            area.top_left + Point::new(0, (i as u32 * band_h) as i32),
            Size::new(w, band_h),
        )
        .into_styled(fill(*color))
        .draw(target)?;
    }

    // Setting sun, half hidden by the ground drawn after it
    let sun_d = w / 3;
    Circle::with_center(at(&area, 500, 800), sun_d)
        .into_styled(fill(SUNSET_SUN))
        .draw(target)?;

    Rectangle::new(at(&area, 0, 800), Size::new(w, h - h * 4 / 5))
        .into_styled(fill(SUNSET_GROUND))
        .draw(target)
}

fn draw_day<D>(area: Rectangle, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let w = area.size.width;
    area.into_styled(fill(DAY_SKY)).draw(target)?;

    Circle::with_center(at(&area, 780, 180), w / 6)
        .into_styled(fill(DAY_SUN))
        .draw(target)?;

    Triangle::new(at(&area, -200, 1000), at(&area, 350, 550), at(&area, 900, 1000))
        .into_styled(fill(DAY_HILL_FAR))
        .draw(target)?;
    Triangle::new(at(&area, 200, 1000), at(&area, 800, 620), at(&area, 1300, 1000))
        .into_styled(fill(DAY_HILL_NEAR))
        .draw(target)?;
    Rectangle::new(at(&area, 0, 900), Size::new(w, area.size.height / 10 + 1))
        .into_styled(fill(DAY_HILL_NEAR))
        .draw(target)
}

/// Draw frame `index` of the animation `id` with its top left corner at `origin`.
pub fn draw_sequence_frame<D>(
    id: ResourceId,
    index: u16,
    origin: Point,
    target: &mut D,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if id != ResourceId::Firework {
        return Ok(());
    }

    let half = Point::new(FIREWORK_SIZE.width as i32, FIREWORK_SIZE.height as i32) / 2;
    let center = origin + half;
    let radius = 6 + index as i32 * 3;
    let (color, spark) = match index {
        0..=3 => (Rgb565::WHITE, 5),
        4..=7 => (Rgb565::new(31, 56, 8), 4),
        _ => (Rgb565::new(31, 20, 4), 3),
    };

    for (dx, dy) in SPARK_DIRECTIONS {
        let pos = center + Point::new(dx * radius / 1000, dy * radius / 1000);
        Circle::with_center(pos, spark)
            .into_styled(fill(color))
            .draw(target)?;
    }
    Ok(())
}
