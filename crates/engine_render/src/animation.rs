//! Frame-sequence animation driven by the tick counter.
//!
//! An [`AnimationComponent`] holds an ordered list of sprites and a cursor.
//! [`AnimationComponent::rendered_frame`] advances the cursor only on ticks
//! that are a multiple of the delay and otherwise keeps showing the frame it
//! last selected, so the visible sprite changes once every `delay` ticks no
//! matter how often it is drawn.

use engine_component::{Component, EntityId};
use engine_sprite::SpriteAsset;
use tracing::trace;

use crate::error::AnimationError;

/// Ticks each frame stays visible unless configured otherwise.
pub const DEFAULT_DELAY: u64 = 30;

#[derive(Debug, Clone)]
pub struct AnimationComponent {
    frames: Vec<SpriteAsset>,
    /// `None` until the first advance.
    cursor: Option<usize>,
    delay: u64,
    owner: Option<EntityId>,
}

impl AnimationComponent {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            cursor: None,
            delay: DEFAULT_DELAY,
            owner: None,
        }
    }

    /// Build an animation from frames with the given delay.
    ///
    /// # Errors
    ///
    /// [`AnimationError::ZeroDelay`] if `delay` is 0.
    pub fn with_frames(
        frames: impl IntoIterator<Item = SpriteAsset>,
        delay: u64,
    ) -> Result<Self, AnimationError> {
        let mut animation = Self::new();
        animation.set_delay(delay)?;
        animation.frames.extend(frames);
        Ok(animation)
    }

    /// Append a frame. Returns the new length − 1.
    pub fn push_frame(&mut self, sprite: SpriteAsset) -> usize {
        self.frames.push(sprite);
        self.frames.len() - 1
    }

    /// Remove the last frame. Returns the new length − 1, `None` once empty.
    ///
    /// # Errors
    ///
    /// [`AnimationError::Empty`] if there is no frame to remove.
    pub fn pop_frame(&mut self) -> Result<Option<usize>, AnimationError> {
        self.frames.pop().ok_or(AnimationError::Empty)?;
        let len = self.frames.len();
        self.cursor = match self.cursor {
            _ if len == 0 => None,
            Some(cursor) if cursor >= len => Some(0),
            other => other,
        };
        Ok(len.checked_sub(1))
    }

    /// Move to the next frame, wrapping to 0 after the last one, and return
    /// it. The first advance selects frame 0.
    ///
    /// # Errors
    ///
    /// [`AnimationError::Empty`] if there are no frames.
    pub fn advance(&mut self) -> Result<&SpriteAsset, AnimationError> {
        if self.frames.is_empty() {
            return Err(AnimationError::Empty);
        }
        let next = match self.cursor {
            None => 0,
            Some(cursor) => (cursor + 1) % self.frames.len(),
        };
        self.cursor = Some(next);
        trace!(cursor = next, frames = self.frames.len(), "advanced animation");
        Ok(&self.frames[next])
    }

    /// The sprite to show on `tick`.
    ///
    /// Advances when `tick % delay == 0`; otherwise returns the frame last
    /// selected (frame 0 before any advance).
    ///
    /// # Errors
    ///
    /// [`AnimationError::Empty`] if there are no frames.
    pub fn rendered_frame(&mut self, tick: u64) -> Result<&SpriteAsset, AnimationError> {
        if tick % self.delay == 0 {
            return self.advance();
        }
        self.current()
    }

    /// The frame at the cursor without advancing.
    ///
    /// # Errors
    ///
    /// [`AnimationError::Empty`] if there are no frames.
    pub fn current(&self) -> Result<&SpriteAsset, AnimationError> {
        self.frames
            .get(self.cursor.unwrap_or(0))
            .ok_or(AnimationError::Empty)
    }

    #[must_use]
    pub fn delay(&self) -> u64 {
        self.delay
    }

    /// # Errors
    ///
    /// [`AnimationError::ZeroDelay`] if `delay` is 0.
    pub fn set_delay(&mut self, delay: u64) -> Result<(), AnimationError> {
        if delay == 0 {
            return Err(AnimationError::ZeroDelay);
        }
        self.delay = delay;
        Ok(())
    }

    /// Index of the frame last selected, `None` before the first advance.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn frames(&self) -> &[SpriteAsset] {
        &self.frames
    }

    #[must_use]
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }
}

impl Default for AnimationComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for AnimationComponent {
    fn type_name() -> &'static str {
        "AnimationComponent"
    }

    fn attach(&mut self, owner: EntityId) {
        self.owner = Some(owner);
    }
}

#[cfg(test)]
mod tests {
    use engine_sprite::{Cell, Rgb};

    use super::*;

    fn frame(glyph: char) -> SpriteAsset {
        SpriteAsset::from_cells(1, 1, Rgb::WHITE, vec![Cell::new(glyph, Rgb::WHITE)])
    }

    fn glyph(sprite: &SpriteAsset) -> char {
        sprite.cells()[0].glyph
    }

    #[test]
    fn test_default_delay_is_thirty() {
        let animation = AnimationComponent::default();
        assert_eq!(animation.delay(), 30);
        assert!(animation.is_empty());
        assert_eq!(animation.cursor(), None);
    }

    #[test]
    fn test_push_returns_last_index() {
        let mut animation = AnimationComponent::new();
        assert_eq!(animation.push_frame(frame('A')), 0);
        assert_eq!(animation.push_frame(frame('B')), 1);
        assert_eq!(animation.len(), 2);
    }

    #[test]
    fn test_push_then_pop_restores_count() {
        let mut animation = AnimationComponent::new();
        animation.push_frame(frame('A'));
        let before = animation.len();
        animation.push_frame(frame('Z'));
        assert_eq!(animation.pop_frame(), Ok(Some(0)));
        assert_eq!(animation.len(), before);
        assert_eq!(glyph(&animation.frames()[0]), 'A');
    }

    #[test]
    fn test_pop_on_empty_fails() {
        let mut animation = AnimationComponent::new();
        assert_eq!(animation.pop_frame(), Err(AnimationError::Empty));
    }

    #[test]
    fn test_pop_last_frame_reports_none() {
        let mut animation = AnimationComponent::new();
        animation.push_frame(frame('A'));
        animation.advance().unwrap();
        assert_eq!(animation.pop_frame(), Ok(None));
        assert_eq!(animation.cursor(), None);
    }

    #[test]
    fn test_pop_wraps_cursor_past_end() {
        let mut animation = AnimationComponent::with_frames([frame('A'), frame('B')], 1).unwrap();
        animation.advance().unwrap();
        animation.advance().unwrap();
        assert_eq!(animation.cursor(), Some(1));
        animation.pop_frame().unwrap();
        assert_eq!(animation.cursor(), Some(0));
        assert_eq!(glyph(animation.current().unwrap()), 'A');
    }

    #[test]
    fn test_advance_on_empty_fails() {
        let mut animation = AnimationComponent::new();
        assert_eq!(animation.advance().unwrap_err(), AnimationError::Empty);
        assert_eq!(animation.rendered_frame(1).unwrap_err(), AnimationError::Empty);
    }

    #[test]
    fn test_advance_wraps() {
        let mut animation =
            AnimationComponent::with_frames([frame('A'), frame('B'), frame('C')], 1).unwrap();
        let seen: String = (0..7).map(|_| glyph(animation.advance().unwrap())).collect();
        assert_eq!(seen, "ABCABCA");
    }

    #[test]
    fn test_rendered_frame_holds_for_delay_ticks() {
        let mut animation =
            AnimationComponent::with_frames([frame('A'), frame('B'), frame('C')], 2).unwrap();
        let mut advanced_at = Vec::new();
        let mut seen = String::new();
        for tick in 0..6 {
            let before = animation.cursor();
            seen.push(glyph(animation.rendered_frame(tick).unwrap()));
            if animation.cursor() != before {
                advanced_at.push(tick);
            }
        }
        assert_eq!(seen, "AABBCC");
        assert_eq!(advanced_at, vec![0, 2, 4]);
    }

    #[test]
    fn test_rendered_frame_ignores_call_frequency() {
        let mut animation = AnimationComponent::with_frames([frame('A'), frame('B')], 3).unwrap();
        animation.rendered_frame(0).unwrap();
        for _ in 0..10 {
            assert_eq!(glyph(animation.rendered_frame(1).unwrap()), 'A');
        }
        assert_eq!(glyph(animation.rendered_frame(3).unwrap()), 'B');
    }

    #[test]
    fn test_unstarted_animation_shows_first_frame() {
        let mut animation = AnimationComponent::with_frames([frame('A'), frame('B')], 4).unwrap();
        assert_eq!(glyph(animation.rendered_frame(1).unwrap()), 'A');
        assert_eq!(animation.cursor(), None);
    }

    #[test]
    fn test_zero_delay_rejected() {
        let mut animation = AnimationComponent::new();
        assert_eq!(animation.set_delay(0), Err(AnimationError::ZeroDelay));
        assert_eq!(animation.delay(), DEFAULT_DELAY);
        assert!(AnimationComponent::with_frames([], 0).is_err());
    }
}
