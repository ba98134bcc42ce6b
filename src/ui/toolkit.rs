//! Display toolkit interface
//!
//! Window, layer, bitmap and service primitives the watchface is built on.
//! Resource handles are move-only: every `*_destroy`/`*_unload` consumes the
//! handle it releases, so a resource cannot be released twice or used after
//! release.

use embedded_graphics::{geometry::Size, primitives::Rectangle};

use super::{palette::Color, Error, ResourceId};
use crate::clock::TimeUnits;

/// Horizontal alignment of a text layer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

pub trait Toolkit {
    type Window;
    /// Borrowed reference to a layer in the tree
    type Layer: Copy;
    type TextLayer;
    type BitmapLayer;
    type Bitmap;
    type Font;
    type Sequence;
    type Timer;

    // Windows

    fn window_create(&mut self) -> Result<Self::Window, Error>;
    fn window_root_layer(&self, window: &Self::Window) -> Self::Layer;
    fn window_set_background_color(&mut self, window: &Self::Window, color: Color);
    /// Put the window on top of the window stack
    fn window_stack_push(&mut self, window: &Self::Window, animated: bool);
    /// Destroy the window, removing it from the window stack.
    fn window_destroy(&mut self, window: Self::Window);

    // Layers

    fn layer_bounds(&self, layer: Self::Layer) -> Rectangle;
    fn layer_add_child(&mut self, parent: Self::Layer, child: Self::Layer);
    fn layer_set_hidden(&mut self, layer: Self::Layer, hidden: bool);
    fn layer_is_hidden(&self, layer: Self::Layer) -> bool;
    fn layer_mark_dirty(&mut self, layer: Self::Layer);

    // Text layers

    fn text_layer_create(&mut self, frame: Rectangle) -> Result<Self::TextLayer, Error>;
    fn text_layer_get_layer(&self, text_layer: &Self::TextLayer) -> Self::Layer;
    fn text_layer_set_text(&mut self, text_layer: &Self::TextLayer, text: &str);
    fn text_layer_set_text_color(&mut self, text_layer: &Self::TextLayer, color: Color);
    /// `None` leaves the background transparent
    fn text_layer_set_background_color(
        &mut self,
        text_layer: &Self::TextLayer,
        color: Option<Color>,
    );
    fn text_layer_set_font(&mut self, text_layer: &Self::TextLayer, font: &Self::Font);
    fn text_layer_set_text_alignment(
        &mut self,
        text_layer: &Self::TextLayer,
        alignment: TextAlignment,
    );
    fn text_layer_destroy(&mut self, text_layer: Self::TextLayer);

    // Fonts

    fn font_load_custom(&mut self, resource: ResourceId) -> Result<Self::Font, Error>;
    fn font_unload_custom(&mut self, font: Self::Font);

    // Bitmaps

    fn bitmap_create_with_resource(&mut self, resource: ResourceId)
        -> Result<Self::Bitmap, Error>;
    fn bitmap_create_blank(&mut self, size: Size) -> Result<Self::Bitmap, Error>;
    fn bitmap_destroy(&mut self, bitmap: Self::Bitmap);

    fn bitmap_layer_create(&mut self, frame: Rectangle) -> Result<Self::BitmapLayer, Error>;
    fn bitmap_layer_get_layer(&self, bitmap_layer: &Self::BitmapLayer) -> Self::Layer;
    fn bitmap_layer_set_bitmap(&mut self, bitmap_layer: &Self::BitmapLayer, bitmap: &Self::Bitmap);
    fn bitmap_layer_destroy(&mut self, bitmap_layer: Self::BitmapLayer);

    // Bitmap sequences

    fn sequence_create_with_resource(&mut self, resource: ResourceId)
        -> Result<Self::Sequence, Error>;
    /// Native frame size of the sequence
    fn sequence_bitmap_size(&self, sequence: &Self::Sequence) -> Size;
    /// Decode the next frame into `bitmap` and return the delay in
    /// milliseconds until the frame after it. `None` once the sequence is
    /// exhausted.
    fn sequence_update_bitmap_next_frame(
        &mut self,
        sequence: &mut Self::Sequence,
        bitmap: &mut Self::Bitmap,
    ) -> Option<u32>;
    /// Rewind the sequence to its first frame
    fn sequence_restart(&mut self, sequence: &mut Self::Sequence);
    fn sequence_destroy(&mut self, sequence: Self::Sequence);

    // Services

    fn tick_timer_subscribe(&mut self, unit: TimeUnits);
    fn tick_timer_unsubscribe(&mut self);
    /// Arm a single-shot timer delivering [`super::Event::Timer`] after `delay_ms`.
    fn timer_register(&mut self, delay_ms: u32) -> Result<Self::Timer, Error>;
    /// Disarm a pending timer. Timers that already fired are ignored.
    fn timer_cancel(&mut self, timer: Self::Timer);
}
