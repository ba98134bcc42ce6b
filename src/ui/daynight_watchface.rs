//! Day/night watchface
//!
//! A clock on top of one of three stacked backgrounds. Every tick the hour
//! is classified into night, sunset or day; the matching background is
//! shown, the other two hidden, and the clock color follows.

use embedded_graphics::{geometry::Point, prelude::Size, primitives::Rectangle};

use super::{
    palette, sprite::SpriteAnimator, Error, Event, ResourceId, TextAlignment, Toolkit,
};
use crate::{
    clock::{self, Clock, TimeBucket, TimeUnits, TEXT_BUF_LEN},
    config::{SpriteMode, WatchfaceConfig},
};

/// Reference screen height the clock position is laid out for
const LAYOUT_HEIGHT: u32 = 168;
/// Top of the clock text on the reference screen
const TIME_TOP: u32 = 110;
/// Height of the clock text on the reference screen
const TIME_HEIGHT: u32 = 50;

/// Clock text frame within `bounds`, in the bottom third of the window.
pub fn time_frame(bounds: &Rectangle) -> Rectangle {
    let h = bounds.size.height;
    Rectangle::new(
        bounds.top_left + Point::new(0, (h * TIME_TOP / LAYOUT_HEIGHT) as i32),
        Size::new(bounds.size.width, h * TIME_HEIGHT / LAYOUT_HEIGHT),
    )
}

/// Background image with its layer
struct Backdrop<T: Toolkit> {
    bitmap: T::Bitmap,
    layer: T::BitmapLayer,
}

impl<T: Toolkit> Backdrop<T> {
    fn new(
        tk: &mut T,
        parent: T::Layer,
        bounds: Rectangle,
        resource: ResourceId,
    ) -> Result<Self, Error> {
        let bitmap = tk.bitmap_create_with_resource(resource)?;
        let layer = match tk.bitmap_layer_create(bounds) {
            Ok(layer) => layer,
            Err(err) => {
                tk.bitmap_destroy(bitmap);
                return Err(err);
            }
        };
        tk.bitmap_layer_set_bitmap(&layer, &bitmap);
        tk.layer_add_child(parent, tk.bitmap_layer_get_layer(&layer));
        Ok(Self { bitmap, layer })
    }

    fn set_visible(&self, tk: &mut T, visible: bool) {
        tk.layer_set_hidden(tk.bitmap_layer_get_layer(&self.layer), !visible);
    }

    fn destroy(self, tk: &mut T) {
        tk.bitmap_destroy(self.bitmap);
        tk.bitmap_layer_destroy(self.layer);
    }
}

/// Night, sunset and day backgrounds stacked in that order on `parent`
fn load_backdrops<T: Toolkit>(
    tk: &mut T,
    parent: T::Layer,
    bounds: Rectangle,
) -> Result<(Backdrop<T>, Backdrop<T>, Backdrop<T>), Error> {
    let night = Backdrop::new(tk, parent, bounds, ResourceId::NightBackground)?;
    let sunset = match Backdrop::new(tk, parent, bounds, ResourceId::SunsetBackground) {
        Ok(sunset) => sunset,
        Err(err) => {
            night.destroy(tk);
            return Err(err);
        }
    };
    match Backdrop::new(tk, parent, bounds, ResourceId::DayBackground) {
        Ok(day) => Ok((night, sunset, day)),
        Err(err) => {
            sunset.destroy(tk);
            night.destroy(tk);
            Err(err)
        }
    }
}

/// Everything created when the window loads
struct Scene<T: Toolkit> {
    time_layer: T::TextLayer,
    time_font: T::Font,
    night: Backdrop<T>,
    sunset: Backdrop<T>,
    day: Backdrop<T>,
    sprite: Option<SpriteAnimator<T>>,
}

pub struct DayNightWatchface<T: Toolkit, C: Clock> {
    toolkit: T,
    clock: C,
    config: WatchfaceConfig,
    window: Option<T::Window>,
    scene: Option<Scene<T>>,
    /// Background shown after the last update
    bucket: Option<TimeBucket>,
}

impl<T: Toolkit, C: Clock> DayNightWatchface<T, C> {
    pub fn new(toolkit: T, clock: C, config: WatchfaceConfig) -> Self {
        Self {
            toolkit,
            clock,
            config,
            window: None,
            scene: None,
            bucket: None,
        }
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn toolkit_mut(&mut self) -> &mut T {
        &mut self.toolkit
    }

    pub fn time_layer(&self) -> Option<&T::TextLayer> {
        self.scene.as_ref().map(|scene| &scene.time_layer)
    }

    pub fn sprite(&self) -> Option<&SpriteAnimator<T>> {
        self.scene.as_ref()?.sprite.as_ref()
    }

    /// Background shown after the last update
    pub fn bucket(&self) -> Option<TimeBucket> {
        self.bucket
    }

    pub fn is_loaded(&self) -> bool {
        self.scene.is_some()
    }

    /// Set up the window, subscribe to ticks and show the current time.
    pub fn initialize(&mut self) -> Result<(), Error> {
        info!("Initializing watchface");
        let window = self.toolkit.window_create()?;

        self.toolkit.tick_timer_subscribe(self.config.tick_unit);

        self.toolkit
            .window_stack_push(&window, self.config.animated_push);
        let loaded = self.on_window_load(&window);
        self.window = Some(window);
        loaded?;

        self.update_time()?;

        if let Some(window) = self.window.as_ref() {
            self.toolkit
                .window_set_background_color(window, palette::BLACK);
        }
        Ok(())
    }

    /// Tear the window down.
    pub fn deinitialize(&mut self) {
        info!("Deinitializing watchface");
        self.toolkit.tick_timer_unsubscribe();
        if let Some(window) = self.window.take() {
            self.on_window_unload();
            self.toolkit.window_destroy(window);
        }
    }

    /// Build the clock text layer and the background layers.
    fn on_window_load(&mut self, window: &T::Window) -> Result<(), Error> {
        let tk = &mut self.toolkit;
        let root = tk.window_root_layer(window);
        let bounds = tk.layer_bounds(root);

        let time_layer = tk.text_layer_create(time_frame(&bounds))?;
        let time_font = match tk.font_load_custom(ResourceId::TimeFont) {
            Ok(font) => font,
            Err(err) => {
                tk.text_layer_destroy(time_layer);
                return Err(err);
            }
        };

        tk.text_layer_set_background_color(&time_layer, None);
        tk.text_layer_set_text_color(&time_layer, palette::PASTEL_YELLOW);
        tk.text_layer_set_text(&time_layer, "00:00");
        tk.text_layer_set_font(&time_layer, &time_font);
        tk.text_layer_set_text_alignment(&time_layer, TextAlignment::Center);

        let backdrops = load_backdrops(tk, root, bounds);
        let (night, sunset, day) = match backdrops {
            Ok(backdrops) => backdrops,
            Err(err) => {
                tk.text_layer_destroy(time_layer);
                tk.font_unload_custom(time_font);
                return Err(err);
            }
        };

        let sprite = match self.config.sprite {
            SpriteMode::Disabled => None,
            mode => {
                let looping = mode == SpriteMode::Loop;
                match SpriteAnimator::new(tk, root, bounds, looping) {
                    Ok(mut sprite) => {
                        if let Err(err) = sprite.load_sequence(tk, ResourceId::Firework) {
                            warn!("Sprite unavailable: {}", err);
                            sprite.destroy(tk);
                            None
                        } else {
                            Some(sprite)
                        }
                    }
                    Err(err) => {
                        warn!("Sprite unavailable: {}", err);
                        None
                    }
                }
            }
        };

        tk.layer_add_child(root, tk.text_layer_get_layer(&time_layer));

        self.scene = Some(Scene {
            time_layer,
            time_font,
            night,
            sunset,
            day,
            sprite,
        });
        debug!("Window loaded");
        Ok(())
    }

    /// Release everything created by [`Self::on_window_load`].
    fn on_window_unload(&mut self) {
        let Some(scene) = self.scene.take() else {
            return;
        };
        let tk = &mut self.toolkit;

        tk.text_layer_destroy(scene.time_layer);
        tk.font_unload_custom(scene.time_font);
        scene.sunset.destroy(tk);
        scene.night.destroy(tk);
        scene.day.destroy(tk);
        if let Some(sprite) = scene.sprite {
            sprite.destroy(tk);
        }
        self.bucket = None;
        debug!("Window unloaded");
    }

    /// Dispatch an event from the event loop.
    pub fn handle_event(&mut self, event: Event) -> Result<(), Error> {
        match event {
            Event::Tick { units_changed, .. } => self.on_tick(units_changed),
            Event::Timer => self.on_timer(),
        }
    }

    /// Tick handler, refreshes the time whichever unit changed.
    pub fn on_tick(&mut self, _units_changed: TimeUnits) -> Result<(), Error> {
        self.update_time()
    }

    fn on_timer(&mut self) -> Result<(), Error> {
        match self.scene.as_mut().and_then(|scene| scene.sprite.as_mut()) {
            Some(sprite) => sprite.on_timer(&mut self.toolkit),
            None => Ok(()),
        }
    }

    /// Show the current time and the background for the current hour.
    pub fn update_time(&mut self) -> Result<(), Error> {
        let now = self.clock.local_time();

        let mut time_buf = [0u8; TEXT_BUF_LEN];
        let text = clock::format_time(&mut time_buf, &now, self.clock.clock_style())?;
        let bucket = self.config.bucket_rule.classify(&now);

        let Some(scene) = self.scene.as_ref() else {
            warn!("Time update without a loaded window");
            return Ok(());
        };
        let tk = &mut self.toolkit;

        tk.text_layer_set_text_color(&scene.time_layer, bucket.text_color());
        scene.night.set_visible(tk, bucket == TimeBucket::Night);
        scene.sunset.set_visible(tk, bucket == TimeBucket::Sunset);
        scene.day.set_visible(tk, bucket == TimeBucket::Day);
        tk.text_layer_set_text(&scene.time_layer, text);

        if self.bucket != Some(bucket) {
            info!("Background: {}", bucket);
        }
        self.bucket = Some(bucket);
        Ok(())
    }
}
