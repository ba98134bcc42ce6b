//! Toolkit runtime for the watch
//!
//! Keeps windows, layers, bitmaps, fonts and bitmap sequences in fixed
//! capacity slabs, composes the visible layer tree of the top window into
//! an `embedded-graphics` draw target and turns clock observations into
//! [`Event`]s for the event loop.

use chrono::NaiveDateTime;
use embedded_graphics::{
    geometry::{Point, Size},
    mono_font::{ascii::FONT_6X10, MonoFont, MonoTextStyleBuilder},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use heapless::{String, Vec};

use super::{
    palette::{self, Color},
    resources::{self, ResourceId, SequenceInfo},
    slab::Slab,
    Error, Event, TextAlignment, Toolkit,
};
use crate::clock::{timer::MAX_TIMERS, TickTimerService, TimeUnits, TimerId, TimerQueue};

pub const MAX_WINDOWS: usize = 2;
pub const MAX_LAYERS: usize = 12;
pub const MAX_CHILDREN: usize = 8;
pub const MAX_BITMAPS: usize = 6;
pub const MAX_FONTS: usize = 2;
pub const MAX_SEQUENCES: usize = 2;
pub const TEXT_LEN: usize = 16;

/// Events produced by a single [`Runtime::poll_events`] call
pub type Events = Vec<Event, { MAX_TIMERS + 1 }>;

#[derive(Debug, PartialEq, Eq)]
pub struct WindowHandle(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerRef(usize);

#[derive(Debug, PartialEq, Eq)]
pub struct TextLayerHandle(usize);

#[derive(Debug, PartialEq, Eq)]
pub struct BitmapLayerHandle(usize);

#[derive(Debug, PartialEq, Eq)]
pub struct BitmapHandle(usize);

#[derive(Debug, PartialEq, Eq)]
pub struct FontHandle(usize);

#[derive(Debug, PartialEq, Eq)]
pub struct SequenceHandle(usize);

/// Number of live resources of each kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub windows: usize,
    pub layers: usize,
    pub bitmaps: usize,
    pub fonts: usize,
    pub sequences: usize,
}

struct WindowSlot {
    root: usize,
    background: Color,
}

struct TextState {
    text: String<TEXT_LEN>,
    color: Color,
    background: Option<Color>,
    font: Option<&'static MonoFont<'static>>,
    alignment: TextAlignment,
}

enum LayerKind {
    Root,
    Text(TextState),
    Bitmap(Option<usize>),
}

struct LayerNode {
    frame: Rectangle,
    hidden: bool,
    parent: Option<usize>,
    children: Vec<usize, MAX_CHILDREN>,
    kind: LayerKind,
}

impl LayerNode {
    fn new(frame: Rectangle, kind: LayerKind) -> Self {
        Self {
            frame,
            hidden: false,
            parent: None,
            children: Vec::new(),
            kind,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum BitmapContent {
    Blank,
    Image(ResourceId),
    Frame(ResourceId, u16),
}

struct BitmapSlot {
    size: Size,
    content: BitmapContent,
}

struct SequenceSlot {
    resource: ResourceId,
    info: SequenceInfo,
    next_frame: u16,
}

pub struct Runtime {
    /// Screen size
    screen: Size,
    windows: Slab<WindowSlot, MAX_WINDOWS>,
    /// Window stack, top window last
    stack: Vec<usize, MAX_WINDOWS>,
    layers: Slab<LayerNode, MAX_LAYERS>,
    bitmaps: Slab<BitmapSlot, MAX_BITMAPS>,
    fonts: Slab<&'static MonoFont<'static>, MAX_FONTS>,
    sequences: Slab<SequenceSlot, MAX_SEQUENCES>,
    ticks: TickTimerService,
    timers: TimerQueue,
    /// Uptime of the last observation
    uptime_ms: u64,
    /// Whether the screen content changed since the last render
    dirty: bool,
}

impl Runtime {
    pub fn new(screen: Size) -> Self {
        Self {
            screen,
            windows: Slab::new(),
            stack: Vec::new(),
            layers: Slab::new(),
            bitmaps: Slab::new(),
            fonts: Slab::new(),
            sequences: Slab::new(),
            ticks: TickTimerService::new(),
            timers: TimerQueue::new(),
            uptime_ms: 0,
            dirty: true,
        }
    }

    /// Record the current uptime, used as the base for new timers.
    pub fn set_uptime_ms(&mut self, uptime_ms: u64) {
        self.uptime_ms = uptime_ms;
    }

    /// Observe the clocks and collect the events that are due.
    pub fn poll_events(&mut self, now: NaiveDateTime, uptime_ms: u64) -> Events {
        self.uptime_ms = uptime_ms;
        let mut events = Events::new();

        if let Some(units_changed) = self.ticks.poll(now) {
            let _ = events.push(Event::Tick {
                time: now,
                units_changed,
            });
        }
        for _ in 0..self.timers.expire(uptime_ms) {
            let _ = events.push(Event::Timer);
        }
        events
    }

    /// Uptime at which [`Self::poll_events`] should run next.
    pub fn next_wakeup_ms(&self, now: &NaiveDateTime, uptime_ms: u64) -> Option<u64> {
        let tick = self.ticks.next_boundary(now).map(|boundary| {
            let wait = boundary.signed_duration_since(*now).num_milliseconds().max(0);
            uptime_ms.saturating_add(wait as u64)
        });
        match (tick, self.timers.next_deadline()) {
            (Some(tick), Some(timer)) => Some(tick.min(timer)),
            (tick, timer) => tick.or(timer),
        }
    }

    pub fn tick_subscription(&self) -> Option<TimeUnits> {
        self.ticks.subscription()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn resource_counts(&self) -> ResourceCounts {
        ResourceCounts {
            windows: self.windows.len(),
            layers: self.layers.len(),
            bitmaps: self.bitmaps.len(),
            fonts: self.fonts.len(),
            sequences: self.sequences.len(),
        }
    }

    pub fn text_layer_text(&self, text_layer: &TextLayerHandle) -> Option<&str> {
        match &self.layers.get(text_layer.0)?.kind {
            LayerKind::Text(state) => Some(state.text.as_str()),
            _ => None,
        }
    }

    pub fn text_layer_color(&self, text_layer: &TextLayerHandle) -> Option<Color> {
        match &self.layers.get(text_layer.0)?.kind {
            LayerKind::Text(state) => Some(state.color),
            _ => None,
        }
    }

    /// Whether the screen needs to be rendered again
    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    /// Compose the top window into `target`.
    pub fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(window) = self.stack.last().and_then(|index| self.windows.get(*index)) else {
            target.clear(palette::BLACK)?;
            self.dirty = false;
            return Ok(());
        };

        target.clear(window.background)?;
        let screen = Rectangle::new(Point::zero(), self.screen);
        self.draw_layer(window.root, Point::zero(), &screen, target)?;
        self.dirty = false;
        Ok(())
    }

    fn draw_layer<D>(
        &self,
        index: usize,
        origin: Point,
        clip: &Rectangle,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(node) = self.layers.get(index) else {
            return Ok(());
        };
        if node.hidden {
            return Ok(());
        }

        let area = Rectangle::new(origin + node.frame.top_left, node.frame.size);
        let visible = clip.intersection(&area);
        if visible.size == Size::zero() {
            return Ok(());
        }

        {
            let mut clipped = target.clipped(&visible);
            match &node.kind {
                LayerKind::Root => {}
                LayerKind::Text(state) => draw_text(state, &area, &mut clipped)?,
                LayerKind::Bitmap(Some(bitmap)) => {
                    if let Some(bitmap) = self.bitmaps.get(*bitmap) {
                        draw_bitmap(bitmap, &area, &mut clipped)?;
                    }
                }
                LayerKind::Bitmap(None) => {}
            }
        }

        for child in node.children.iter() {
            self.draw_layer(*child, area.top_left, &visible, target)?;
        }
        Ok(())
    }

    fn create_layer(&mut self, frame: Rectangle, kind: LayerKind) -> Result<usize, Error> {
        self.layers
            .insert(LayerNode::new(frame, kind))
            .ok_or(Error::OutOfMemory)
    }

    /// Remove a layer, detaching it from its parent and orphaning its children.
    fn destroy_layer(&mut self, index: usize) {
        let Some(node) = self.layers.remove(index) else {
            warn!("Destroying unknown layer {=usize}", index);
            return;
        };
        if let Some(parent) = node.parent.and_then(|parent| self.layers.get_mut(parent)) {
            parent.children.retain(|child| *child != index);
        }
        for child in node.children {
            if let Some(child) = self.layers.get_mut(child) {
                child.parent = None;
            }
        }
        self.dirty = true;
    }

    fn text_state_mut(&mut self, index: usize) -> Option<&mut TextState> {
        match &mut self.layers.get_mut(index)?.kind {
            LayerKind::Text(state) => Some(state),
            _ => None,
        }
    }

    /// Whether `ancestor` is `index` or one of its ancestors
    fn is_ancestor(&self, ancestor: usize, mut index: usize) -> bool {
        loop {
            if index == ancestor {
                return true;
            }
            match self.layers.get(index).and_then(|node| node.parent) {
                Some(parent) => index = parent,
                None => return false,
            }
        }
    }
}

fn draw_text<D>(state: &TextState, area: &Rectangle, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if let Some(background) = state.background {
        (*area)
            .into_styled(PrimitiveStyle::with_fill(background))
            .draw(target)?;
    }

    let character_style = MonoTextStyleBuilder::new()
        .font(state.font.unwrap_or(&FONT_6X10))
        .text_color(state.color)
        .build();
    let (alignment, x) = match state.alignment {
        TextAlignment::Left => (Alignment::Left, area.top_left.x),
        TextAlignment::Center => (Alignment::Center, area.center().x),
        TextAlignment::Right => (
            Alignment::Right,
            area.top_left.x + area.size.width as i32 - 1,
        ),
    };
    let text_style = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(Baseline::Top)
        .build();

    Text::with_text_style(
        state.text.as_str(),
        Point::new(x, area.top_left.y),
        character_style,
        text_style,
    )
    .draw(target)?;
    Ok(())
}

fn draw_bitmap<D>(bitmap: &BitmapSlot, area: &Rectangle, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    match bitmap.content {
        BitmapContent::Blank => Ok(()),
        BitmapContent::Image(resource) => resources::draw_image(resource, *area, target),
        BitmapContent::Frame(resource, index) => {
            let origin = area.center()
                - Point::new(bitmap.size.width as i32 / 2, bitmap.size.height as i32 / 2);
            resources::draw_sequence_frame(resource, index, origin, target)
        }
    }
}

impl Toolkit for Runtime {
    type Window = WindowHandle;
    type Layer = LayerRef;
    type TextLayer = TextLayerHandle;
    type BitmapLayer = BitmapLayerHandle;
    type Bitmap = BitmapHandle;
    type Font = FontHandle;
    type Sequence = SequenceHandle;
    type Timer = TimerId;

    fn window_create(&mut self) -> Result<WindowHandle, Error> {
        let frame = Rectangle::new(Point::zero(), self.screen);
        let root = self.create_layer(frame, LayerKind::Root)?;
        match self.windows.insert(WindowSlot {
            root,
            background: palette::WHITE,
        }) {
            Some(index) => Ok(WindowHandle(index)),
            None => {
                self.layers.remove(root);
                Err(Error::OutOfMemory)
            }
        }
    }

    fn window_root_layer(&self, window: &WindowHandle) -> LayerRef {
        // Dangling references are ignored by every layer call
        LayerRef(self.windows.get(window.0).map_or(usize::MAX, |w| w.root))
    }

    fn window_set_background_color(&mut self, window: &WindowHandle, color: Color) {
        if let Some(window) = self.windows.get_mut(window.0) {
            window.background = color;
            self.dirty = true;
        }
    }

    fn window_stack_push(&mut self, window: &WindowHandle, animated: bool) {
        debug!("Pushing window {=usize} (animated: {=bool})", window.0, animated);
        self.stack.retain(|index| *index != window.0);
        if self.stack.push(window.0).is_err() {
            warn!("Window stack full");
        }
        self.dirty = true;
    }

    fn window_destroy(&mut self, window: WindowHandle) {
        self.stack.retain(|index| *index != window.0);
        if let Some(slot) = self.windows.remove(window.0) {
            self.destroy_layer(slot.root);
        }
        self.dirty = true;
    }

    fn layer_bounds(&self, layer: LayerRef) -> Rectangle {
        self.layers
            .get(layer.0)
            .map_or(Rectangle::zero(), |node| {
                Rectangle::new(Point::zero(), node.frame.size)
            })
    }

    fn layer_add_child(&mut self, parent: LayerRef, child: LayerRef) {
        if self.layers.get(parent.0).is_none() || self.layers.get(child.0).is_none() {
            warn!("Adding unknown layer {=usize} to {=usize}", child.0, parent.0);
            return;
        }
        if self.is_ancestor(child.0, parent.0) {
            warn!("Layer {=usize} would become its own ancestor", child.0);
            return;
        }

        // Re-parenting moves the layer to the top of its new siblings
        let old_parent = self.layers.get(child.0).and_then(|node| node.parent);
        if let Some(old) = old_parent.and_then(|old| self.layers.get_mut(old)) {
            old.children.retain(|index| *index != child.0);
        }
        let added = self
            .layers
            .get_mut(parent.0)
            .map(|node| node.children.push(child.0).is_ok())
            .unwrap_or(false);
        if let Some(node) = self.layers.get_mut(child.0) {
            node.parent = if added { Some(parent.0) } else { None };
        }
        if !added {
            warn!("Layer {=usize} has too many children", parent.0);
        }
        self.dirty = true;
    }

    fn layer_set_hidden(&mut self, layer: LayerRef, hidden: bool) {
        if let Some(node) = self.layers.get_mut(layer.0) {
            if node.hidden != hidden {
                node.hidden = hidden;
                self.dirty = true;
            }
        }
    }

    fn layer_is_hidden(&self, layer: LayerRef) -> bool {
        self.layers.get(layer.0).map_or(true, |node| node.hidden)
    }

    fn layer_mark_dirty(&mut self, layer: LayerRef) {
        if self.layers.get(layer.0).is_some() {
            self.dirty = true;
        }
    }

    fn text_layer_create(&mut self, frame: Rectangle) -> Result<TextLayerHandle, Error> {
        let state = TextState {
            text: String::new(),
            color: palette::BLACK,
            background: Some(palette::WHITE),
            font: None,
            alignment: TextAlignment::Left,
        };
        self.create_layer(frame, LayerKind::Text(state))
            .map(TextLayerHandle)
    }

    fn text_layer_get_layer(&self, text_layer: &TextLayerHandle) -> LayerRef {
        LayerRef(text_layer.0)
    }

    fn text_layer_set_text(&mut self, text_layer: &TextLayerHandle, text: &str) {
        if let Some(state) = self.text_state_mut(text_layer.0) {
            state.text.clear();
            for c in text.chars() {
                if state.text.push(c).is_err() {
                    break;
                }
            }
            self.dirty = true;
        }
    }

    fn text_layer_set_text_color(&mut self, text_layer: &TextLayerHandle, color: Color) {
        if let Some(state) = self.text_state_mut(text_layer.0) {
            state.color = color;
            self.dirty = true;
        }
    }

    fn text_layer_set_background_color(
        &mut self,
        text_layer: &TextLayerHandle,
        color: Option<Color>,
    ) {
        if let Some(state) = self.text_state_mut(text_layer.0) {
            state.background = color;
            self.dirty = true;
        }
    }

    fn text_layer_set_font(&mut self, text_layer: &TextLayerHandle, font: &FontHandle) {
        let Some(font) = self.fonts.get(font.0).copied() else {
            warn!("Unknown font {=usize}", font.0);
            return;
        };
        if let Some(state) = self.text_state_mut(text_layer.0) {
            state.font = Some(font);
            self.dirty = true;
        }
    }

    fn text_layer_set_text_alignment(
        &mut self,
        text_layer: &TextLayerHandle,
        alignment: TextAlignment,
    ) {
        if let Some(state) = self.text_state_mut(text_layer.0) {
            state.alignment = alignment;
            self.dirty = true;
        }
    }

    fn text_layer_destroy(&mut self, text_layer: TextLayerHandle) {
        self.destroy_layer(text_layer.0);
    }

    fn font_load_custom(&mut self, resource: ResourceId) -> Result<FontHandle, Error> {
        let font = resource.font().ok_or(Error::UnknownResource)?;
        self.fonts
            .insert(font)
            .map(FontHandle)
            .ok_or(Error::OutOfMemory)
    }

    fn font_unload_custom(&mut self, font: FontHandle) {
        self.fonts.remove(font.0);
    }

    fn bitmap_create_with_resource(&mut self, resource: ResourceId) -> Result<BitmapHandle, Error> {
        if !resource.is_image() {
            return Err(Error::UnknownResource);
        }
        self.bitmaps
            .insert(BitmapSlot {
                size: self.screen,
                content: BitmapContent::Image(resource),
            })
            .map(BitmapHandle)
            .ok_or(Error::OutOfMemory)
    }

    fn bitmap_create_blank(&mut self, size: Size) -> Result<BitmapHandle, Error> {
        self.bitmaps
            .insert(BitmapSlot {
                size,
                content: BitmapContent::Blank,
            })
            .map(BitmapHandle)
            .ok_or(Error::OutOfMemory)
    }

    fn bitmap_destroy(&mut self, bitmap: BitmapHandle) {
        if self.bitmaps.remove(bitmap.0).is_none() {
            return;
        }
        // Layers still showing the bitmap fall back to showing nothing
        for index in 0..MAX_LAYERS {
            if let Some(node) = self.layers.get_mut(index) {
                if let LayerKind::Bitmap(shown) = &mut node.kind {
                    if *shown == Some(bitmap.0) {
                        *shown = None;
                        self.dirty = true;
                    }
                }
            }
        }
    }

    fn bitmap_layer_create(&mut self, frame: Rectangle) -> Result<BitmapLayerHandle, Error> {
        self.create_layer(frame, LayerKind::Bitmap(None))
            .map(BitmapLayerHandle)
    }

    fn bitmap_layer_get_layer(&self, bitmap_layer: &BitmapLayerHandle) -> LayerRef {
        LayerRef(bitmap_layer.0)
    }

    fn bitmap_layer_set_bitmap(&mut self, bitmap_layer: &BitmapLayerHandle, bitmap: &BitmapHandle) {
        if self.bitmaps.get(bitmap.0).is_none() {
            warn!("Unknown bitmap {=usize}", bitmap.0);
            return;
        }
        if let Some(node) = self.layers.get_mut(bitmap_layer.0) {
            if let LayerKind::Bitmap(shown) = &mut node.kind {
                *shown = Some(bitmap.0);
                self.dirty = true;
            }
        }
    }

    fn bitmap_layer_destroy(&mut self, bitmap_layer: BitmapLayerHandle) {
        self.destroy_layer(bitmap_layer.0);
    }

    fn sequence_create_with_resource(
        &mut self,
        resource: ResourceId,
    ) -> Result<SequenceHandle, Error> {
        let info = resource.sequence().ok_or(Error::UnknownResource)?;
        self.sequences
            .insert(SequenceSlot {
                resource,
                info,
                next_frame: 0,
            })
            .map(SequenceHandle)
            .ok_or(Error::OutOfMemory)
    }

    fn sequence_bitmap_size(&self, sequence: &SequenceHandle) -> Size {
        self.sequences
            .get(sequence.0)
            .map_or(Size::zero(), |slot| slot.info.size)
    }

    fn sequence_update_bitmap_next_frame(
        &mut self,
        sequence: &mut SequenceHandle,
        bitmap: &mut BitmapHandle,
    ) -> Option<u32> {
        let slot = self.sequences.get_mut(sequence.0)?;
        if slot.next_frame >= slot.info.frame_count {
            return None;
        }
        let frame = slot.next_frame;
        slot.next_frame += 1;
        let (resource, delay) = (slot.resource, slot.info.frame_delay_ms);

        let target = self.bitmaps.get_mut(bitmap.0)?;
        target.content = BitmapContent::Frame(resource, frame);
        self.dirty = true;
        Some(delay)
    }

    fn sequence_restart(&mut self, sequence: &mut SequenceHandle) {
        if let Some(slot) = self.sequences.get_mut(sequence.0) {
            slot.next_frame = 0;
        }
    }

    fn sequence_destroy(&mut self, sequence: SequenceHandle) {
        self.sequences.remove(sequence.0);
    }

    fn tick_timer_subscribe(&mut self, unit: TimeUnits) {
        self.ticks.subscribe(unit);
    }

    fn tick_timer_unsubscribe(&mut self) {
        self.ticks.unsubscribe();
    }

    fn timer_register(&mut self, delay_ms: u32) -> Result<TimerId, Error> {
        Ok(self.timers.register(self.uptime_ms, delay_ms)?)
    }

    fn timer_cancel(&mut self, timer: TimerId) {
        if !self.timers.cancel(timer) {
            debug!("Cancelled timer already fired");
        }
    }
}
