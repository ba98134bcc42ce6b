//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use embedded_graphics::{pixelcolor::Rgb565, prelude::*, primitives::Rectangle};
use pinetime_daynight::{
    clock::{Clock, TimeUnits},
    ui::{palette::Color, Error, ResourceId, TextAlignment, Toolkit},
};

pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 3)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Clock returning a settable time
pub struct FixedClock {
    pub time: std::cell::Cell<NaiveDateTime>,
    pub h24: bool,
}

impl FixedClock {
    pub fn new(time: NaiveDateTime, h24: bool) -> Self {
        Self {
            time: std::cell::Cell::new(time),
            h24,
        }
    }

    pub fn set(&self, time: NaiveDateTime) {
        self.time.set(time);
    }
}

impl Clock for FixedClock {
    fn local_time(&self) -> NaiveDateTime {
        self.time.get()
    }

    fn is_24h_style(&self) -> bool {
        self.h24
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Kind {
    Window,
    TextLayer,
    BitmapLayer,
    Bitmap,
    Font,
    Sequence,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Handle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LayerId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Create(Kind, u32),
    Destroy(Kind, u32),
    Push { window: u32, animated: bool },
    Subscribe(TimeUnits),
    Timer(u32),
    Restart(u32),
    SetBitmap { layer: u32, bitmap: u32 },
    MarkDirty(u32),
}

/// Toolkit that records every call and tracks live resources
#[derive(Default)]
pub struct Recorder {
    pub next_id: u32,
    pub live: BTreeMap<u32, Kind>,
    pub ops: Vec<Op>,
    pub hidden: BTreeSet<u32>,
    /// Children of each parent layer, in stacking order
    pub children: BTreeMap<u32, Vec<u32>>,
    pub texts: BTreeMap<u32, String>,
    pub text_colors: BTreeMap<u32, Color>,
    pub text_backgrounds: BTreeMap<u32, Option<Color>>,
    pub alignments: BTreeMap<u32, TextAlignment>,
    pub fonts_used: BTreeMap<u32, u32>,
    pub resources: BTreeMap<u32, ResourceId>,
    pub window_background: Option<Color>,
    pub roots: BTreeMap<u32, u32>,
    /// Frames left and frame count for each sequence
    pub sequences: BTreeMap<u32, (u16, u16)>,
    pub frame_count: u16,
    pub frame_delay_ms: u32,
    /// Delay of each armed timer, by timer id
    pub pending_timers: BTreeMap<u32, u32>,
    pub subscription: Option<TimeUnits>,
    /// Creation of this kind fails
    pub fail: Option<Kind>,
    /// Release calls for handles that were not live
    pub bad_releases: usize,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            frame_count: 3,
            frame_delay_ms: 40,
            ..Default::default()
        }
    }

    fn create(&mut self, kind: Kind) -> Result<u32, Error> {
        if self.fail == Some(kind) {
            return Err(Error::OutOfMemory);
        }
        self.next_id += 1;
        let id = self.next_id;
        self.live.insert(id, kind);
        self.ops.push(Op::Create(kind, id));
        Ok(id)
    }

    fn destroy(&mut self, kind: Kind, id: u32) {
        match self.live.remove(&id) {
            Some(live) if live == kind => {}
            _ => self.bad_releases += 1,
        }
        for children in self.children.values_mut() {
            children.retain(|child| *child != id);
        }
        self.ops.push(Op::Destroy(kind, id));
    }

    pub fn live_count(&self, kind: Kind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    pub fn created(&self, kind: Kind) -> Vec<u32> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Create(k, id) if *k == kind => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Visible bitmap layers showing one of the backgrounds
    pub fn visible_backgrounds(&self) -> Vec<ResourceId> {
        self.created(Kind::BitmapLayer)
            .into_iter()
            .filter(|id| self.live.contains_key(id) && !self.layer_is_hidden(LayerId(*id)))
            .filter_map(|id| self.resources.get(&id).copied())
            .filter(|resource| resource.is_image())
            .collect()
    }

    pub fn pending_delays(&self) -> Vec<u32> {
        self.pending_timers.values().copied().collect()
    }

    pub fn only_text(&self) -> Option<&str> {
        let id = *self.created(Kind::TextLayer).last()?;
        self.texts.get(&id).map(String::as_str)
    }

    pub fn only_text_color(&self) -> Option<Color> {
        let id = *self.created(Kind::TextLayer).last()?;
        self.text_colors.get(&id).copied()
    }
}

impl Toolkit for Recorder {
    type Window = Handle;
    type Layer = LayerId;
    type TextLayer = Handle;
    type BitmapLayer = Handle;
    type Bitmap = Handle;
    type Font = Handle;
    type Sequence = Handle;
    type Timer = Handle;

    fn window_create(&mut self) -> Result<Handle, Error> {
        let id = self.create(Kind::Window)?;
        // Root layers share the window's id space but are not tracked
        self.next_id += 1;
        self.roots.insert(id, self.next_id);
        Ok(Handle(id))
    }

    fn window_root_layer(&self, window: &Handle) -> LayerId {
        LayerId(self.roots[&window.0])
    }

    fn window_set_background_color(&mut self, _window: &Handle, color: Color) {
        self.window_background = Some(color);
    }

    fn window_stack_push(&mut self, window: &Handle, animated: bool) {
        self.ops.push(Op::Push {
            window: window.0,
            animated,
        });
    }

    fn window_destroy(&mut self, window: Handle) {
        self.destroy(Kind::Window, window.0);
    }

    fn layer_bounds(&self, _layer: LayerId) -> Rectangle {
        Rectangle::new(Point::zero(), Size::new(144, 168))
    }

    fn layer_add_child(&mut self, parent: LayerId, child: LayerId) {
        self.children.entry(parent.0).or_default().push(child.0);
    }

    fn layer_set_hidden(&mut self, layer: LayerId, hidden: bool) {
        if hidden {
            self.hidden.insert(layer.0);
        } else {
            self.hidden.remove(&layer.0);
        }
    }

    fn layer_is_hidden(&self, layer: LayerId) -> bool {
        self.hidden.contains(&layer.0)
    }

    fn layer_mark_dirty(&mut self, layer: LayerId) {
        self.ops.push(Op::MarkDirty(layer.0));
    }

    fn text_layer_create(&mut self, _frame: Rectangle) -> Result<Handle, Error> {
        self.create(Kind::TextLayer).map(Handle)
    }

    fn text_layer_get_layer(&self, text_layer: &Handle) -> LayerId {
        LayerId(text_layer.0)
    }

    fn text_layer_set_text(&mut self, text_layer: &Handle, text: &str) {
        self.texts.insert(text_layer.0, text.to_string());
    }

    fn text_layer_set_text_color(&mut self, text_layer: &Handle, color: Color) {
        self.text_colors.insert(text_layer.0, color);
    }

    fn text_layer_set_background_color(&mut self, text_layer: &Handle, color: Option<Color>) {
        self.text_backgrounds.insert(text_layer.0, color);
    }

    fn text_layer_set_font(&mut self, text_layer: &Handle, font: &Handle) {
        self.fonts_used.insert(text_layer.0, font.0);
    }

    fn text_layer_set_text_alignment(&mut self, text_layer: &Handle, alignment: TextAlignment) {
        self.alignments.insert(text_layer.0, alignment);
    }

    fn text_layer_destroy(&mut self, text_layer: Handle) {
        self.destroy(Kind::TextLayer, text_layer.0);
    }

    fn font_load_custom(&mut self, resource: ResourceId) -> Result<Handle, Error> {
        let id = self.create(Kind::Font)?;
        self.resources.insert(id, resource);
        Ok(Handle(id))
    }

    fn font_unload_custom(&mut self, font: Handle) {
        self.destroy(Kind::Font, font.0);
    }

    fn bitmap_create_with_resource(&mut self, resource: ResourceId) -> Result<Handle, Error> {
        let id = self.create(Kind::Bitmap)?;
        self.resources.insert(id, resource);
        Ok(Handle(id))
    }

    fn bitmap_create_blank(&mut self, _size: Size) -> Result<Handle, Error> {
        self.create(Kind::Bitmap).map(Handle)
    }

    fn bitmap_destroy(&mut self, bitmap: Handle) {
        self.destroy(Kind::Bitmap, bitmap.0);
    }

    fn bitmap_layer_create(&mut self, _frame: Rectangle) -> Result<Handle, Error> {
        self.create(Kind::BitmapLayer).map(Handle)
    }

    fn bitmap_layer_get_layer(&self, bitmap_layer: &Handle) -> LayerId {
        LayerId(bitmap_layer.0)
    }

    fn bitmap_layer_set_bitmap(&mut self, bitmap_layer: &Handle, bitmap: &Handle) {
        if let Some(resource) = self.resources.get(&bitmap.0).copied() {
            self.resources.insert(bitmap_layer.0, resource);
        }
        self.ops.push(Op::SetBitmap {
            layer: bitmap_layer.0,
            bitmap: bitmap.0,
        });
    }

    fn bitmap_layer_destroy(&mut self, bitmap_layer: Handle) {
        self.destroy(Kind::BitmapLayer, bitmap_layer.0);
    }

    fn sequence_create_with_resource(&mut self, resource: ResourceId) -> Result<Handle, Error> {
        let id = self.create(Kind::Sequence)?;
        self.resources.insert(id, resource);
        self.sequences.insert(id, (self.frame_count, self.frame_count));
        Ok(Handle(id))
    }

    fn sequence_bitmap_size(&self, _sequence: &Handle) -> Size {
        Size::new(96, 96)
    }

    fn sequence_update_bitmap_next_frame(
        &mut self,
        sequence: &mut Handle,
        _bitmap: &mut Handle,
    ) -> Option<u32> {
        let (left, _) = self.sequences.get_mut(&sequence.0)?;
        if *left == 0 {
            return None;
        }
        *left -= 1;
        Some(self.frame_delay_ms)
    }

    fn sequence_restart(&mut self, sequence: &mut Handle) {
        if let Some((left, count)) = self.sequences.get_mut(&sequence.0) {
            *left = *count;
        }
        self.ops.push(Op::Restart(sequence.0));
    }

    fn sequence_destroy(&mut self, sequence: Handle) {
        self.sequences.remove(&sequence.0);
        self.destroy(Kind::Sequence, sequence.0);
    }

    fn tick_timer_subscribe(&mut self, unit: TimeUnits) {
        self.subscription = Some(unit);
        self.ops.push(Op::Subscribe(unit));
    }

    fn tick_timer_unsubscribe(&mut self) {
        self.subscription = None;
    }

    fn timer_register(&mut self, delay_ms: u32) -> Result<Handle, Error> {
        self.next_id += 1;
        self.pending_timers.insert(self.next_id, delay_ms);
        self.ops.push(Op::Timer(delay_ms));
        Ok(Handle(self.next_id))
    }

    fn timer_cancel(&mut self, timer: Handle) {
        self.pending_timers.remove(&timer.0);
    }
}

/// In-memory framebuffer
pub struct FrameBuffer {
    pub size: Size,
    pub pixels: Vec<Rgb565>,
}

impl FrameBuffer {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![Rgb565::new(0, 0, 0); (size.width * size.height) as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb565 {
        self.pixels[(y * self.size.width + x) as usize]
    }

    /// Whether `color` appears anywhere inside `area`
    pub fn contains_color(&self, area: Rectangle, color: Rgb565) -> bool {
        area.points()
            .filter(|p| p.x >= 0 && p.y >= 0)
            .filter(|p| (p.x as u32) < self.size.width && (p.y as u32) < self.size.height)
            .any(|p| self.pixel(p.x as u32, p.y as u32) == color)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && point.y >= 0
                && (point.x as u32) < self.size.width
                && (point.y as u32) < self.size.height
            {
                let index = (point.y as u32 * self.size.width + point.x as u32) as usize;
                self.pixels[index] = color;
            }
        }
        Ok(())
    }
}
