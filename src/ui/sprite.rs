//! Firework sprite animation
//!
//! Plays an animated resource frame by frame into its own bitmap layer. The
//! next frame is scheduled through a single-shot timer using the delay the
//! sequence reports for the frame just shown.

use embedded_graphics::primitives::Rectangle;

use super::{Error, ResourceId, Toolkit};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpriteState {
    Idle,
    Playing,
}

pub struct SpriteAnimator<T: Toolkit> {
    layer: T::BitmapLayer,
    sequence: Option<T::Sequence>,
    bitmap: Option<T::Bitmap>,
    /// Timer scheduling the next frame
    timer: Option<T::Timer>,
    state: SpriteState,
    /// Re-arm playback after the sequence runs out
    looping: bool,
    /// Frames shown since the last load
    frames_shown: u32,
}

impl<T: Toolkit> SpriteAnimator<T> {
    /// Create the sprite layer over `frame` and stack it on `parent`.
    pub fn new(
        tk: &mut T,
        parent: T::Layer,
        frame: Rectangle,
        looping: bool,
    ) -> Result<Self, Error> {
        let layer = tk.bitmap_layer_create(frame)?;
        tk.layer_add_child(parent, tk.bitmap_layer_get_layer(&layer));
        Ok(Self {
            layer,
            sequence: None,
            bitmap: None,
            timer: None,
            state: SpriteState::Idle,
            looping,
            frames_shown: 0,
        })
    }

    pub fn state(&self) -> SpriteState {
        self.state
    }

    pub fn frames_shown(&self) -> u32 {
        self.frames_shown
    }

    /// Replace the current animation with `resource` and start playing it.
    pub fn load_sequence(&mut self, tk: &mut T, resource: ResourceId) -> Result<(), Error> {
        self.release_sequence(tk);

        let sequence = tk.sequence_create_with_resource(resource)?;
        let size = tk.sequence_bitmap_size(&sequence);
        let bitmap = match tk.bitmap_create_blank(size) {
            Ok(bitmap) => bitmap,
            Err(err) => {
                tk.sequence_destroy(sequence);
                return Err(err);
            }
        };
        self.sequence = Some(sequence);
        self.bitmap = Some(bitmap);
        self.frames_shown = 0;

        debug!("Sprite sequence loaded");
        self.schedule(tk, 1)?;
        self.state = SpriteState::Playing;
        Ok(())
    }

    /// Show the next frame and schedule the one after it.
    ///
    /// When the sequence is exhausted it is rewound. Playback then stops
    /// unless the animator loops.
    pub fn on_timer(&mut self, tk: &mut T) -> Result<(), Error> {
        let (Some(sequence), Some(bitmap)) = (self.sequence.as_mut(), self.bitmap.as_mut()) else {
            self.state = SpriteState::Idle;
            return Ok(());
        };

        match tk.sequence_update_bitmap_next_frame(sequence, bitmap) {
            Some(delay_ms) => {
                tk.bitmap_layer_set_bitmap(&self.layer, bitmap);
                tk.layer_mark_dirty(tk.bitmap_layer_get_layer(&self.layer));
                self.frames_shown += 1;
                self.schedule(tk, delay_ms)?;
                self.state = SpriteState::Playing;
            }
            None => {
                tk.sequence_restart(sequence);
                if self.looping {
                    self.schedule(tk, 1)?;
                } else {
                    self.cancel_timer(tk);
                    debug!("Sprite finished after {=u32} frames", self.frames_shown);
                    self.state = SpriteState::Idle;
                }
            }
        }
        Ok(())
    }

    /// Arm the frame timer, replacing any timer still pending.
    fn schedule(&mut self, tk: &mut T, delay_ms: u32) -> Result<(), Error> {
        self.cancel_timer(tk);
        self.timer = Some(tk.timer_register(delay_ms)?);
        Ok(())
    }

    fn cancel_timer(&mut self, tk: &mut T) {
        if let Some(timer) = self.timer.take() {
            tk.timer_cancel(timer);
        }
    }

    fn release_sequence(&mut self, tk: &mut T) {
        self.cancel_timer(tk);
        if let Some(sequence) = self.sequence.take() {
            tk.sequence_destroy(sequence);
        }
        if let Some(bitmap) = self.bitmap.take() {
            tk.bitmap_destroy(bitmap);
        }
        self.state = SpriteState::Idle;
    }

    /// Release the layer together with any loaded sequence.
    pub fn destroy(mut self, tk: &mut T) {
        self.release_sequence(tk);
        tk.bitmap_layer_destroy(self.layer);
    }
}
