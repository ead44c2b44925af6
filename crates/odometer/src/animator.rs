#![forbid(unsafe_code)]

//! Per-character roll animation.
//!
//! A [`CharacterAnimator`] owns one slot's vertical offset. The slot renders
//! its whole reel as a vertical stack and crops to one cell; the offset scrolls
//! the stack so the target glyph sits in the visible cell:
//!
//! ```text
//! offset = -(target index) * cell height
//! ```
//!
//! # Lifecycle of a roll
//!
//! 1. [`set_target`](CharacterAnimator::set_target) resolves the target's
//!    index in the reel.
//! 2. [`request_roll`](CharacterAnimator::request_roll) asks the host to call
//!    back once interactions are idle. Any earlier pending request is released
//!    first, so a slot never has more than one.
//! 3. [`on_interactions_idle`](CharacterAnimator::on_interactions_idle)
//!    starts the offset tween from wherever it currently is, with the base
//!    duration multiplied by a jitter factor.
//!
//! The frame (width/height) follows the displayed glyph's measured box on its
//! own short tween, so a narrow-to-wide change never stalls the roll.
//!
//! # Failure Modes
//!
//! - Target missing from the reel: logged and clamped to index 0.
//! - No measured box for the reel: the roll is not started and the slot
//!   waits for the next [`request_roll`](CharacterAnimator::request_roll).
//! - Events after [`dispose`](CharacterAnimator::dispose): ignored.

use std::time::Duration;

use odometer_core::animation::jitter::{JitterSource, TransitionKey};
use odometer_core::animation::{Animation, Tween};
use odometer_core::geometry::Size;
use odometer_core::host::{InteractionService, Registration, RegistrationId};

use crate::measure::MeasureMap;
use crate::reel::{Glyph, Reel, SlotSpec};

/// Offset that brings reel position `index` into view.
#[inline]
pub fn target_offset(index: usize, cell_height: f32) -> f32 {
    -(index as f32) * cell_height
}

#[derive(Debug)]
struct PendingRoll {
    registration: Registration,
    target_index: usize,
}

/// Rotation state of one character slot.
#[derive(Debug)]
pub struct CharacterAnimator {
    index: usize,
    spec: SlotSpec,
    target_index: usize,
    offset: Tween,
    width: Tween,
    height: Tween,
    frame_target: Option<Size>,
    pending: Option<PendingRoll>,
    committed: Option<usize>,
    transitions: u64,
    disposed: bool,
}

impl CharacterAnimator {
    /// Create an animator for slot `index`, resting at the top of its reel.
    pub fn new(index: usize, spec: SlotSpec) -> Self {
        let target_index = resolve_index(index, &spec);
        Self {
            index,
            spec,
            target_index,
            offset: Tween::at(0.0),
            width: Tween::at(0.0),
            height: Tween::at(0.0),
            frame_target: None,
            pending: None,
            committed: None,
            transitions: 0,
            disposed: false,
        }
    }

    /// Slot position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The slot's reel.
    pub fn reel(&self) -> &Reel {
        &self.spec.reel
    }

    /// The slot's spec.
    pub fn spec(&self) -> &SlotSpec {
        &self.spec
    }

    /// The glyph this slot should show.
    pub fn target(&self) -> &Glyph {
        &self.spec.target
    }

    /// Reel position being rolled to (0 when the target is missing).
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// The glyph at [`target_index`](Self::target_index).
    pub fn displayed_glyph(&self) -> Option<&Glyph> {
        self.spec.reel.get(self.target_index)
    }

    /// Current vertical offset.
    pub fn offset(&self) -> f32 {
        self.offset.current()
    }

    /// Offset the current roll ends at.
    pub fn resting_offset(&self) -> f32 {
        self.offset.target()
    }

    /// Current frame size.
    pub fn frame(&self) -> Size {
        Size::new(self.width.current(), self.height.current())
    }

    /// Whether the offset is still moving.
    pub fn is_rolling(&self) -> bool {
        !self.offset.is_complete()
    }

    /// Whether the frame is still resizing.
    pub fn is_resizing(&self) -> bool {
        !self.width.is_complete() || !self.height.is_complete()
    }

    /// Whether a roll is waiting for interactions to go idle.
    pub fn has_pending_roll(&self) -> bool {
        self.pending.is_some()
    }

    /// Id of the pending roll's registration.
    pub fn pending_id(&self) -> Option<RegistrationId> {
        self.pending.as_ref().map(|p| p.registration.id())
    }

    /// Number of rolls started so far.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Whether [`dispose`](Self::dispose) was called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Point the slot at a new target on the same reel.
    ///
    /// Returns `true` if the resolved reel position changed. The offset is
    /// left alone; call [`request_roll`](Self::request_roll) to move it.
    pub fn set_target(&mut self, spec: SlotSpec) -> bool {
        debug_assert!(self.spec.same_reel(&spec), "set_target on a different reel");
        if spec.target == self.spec.target {
            self.spec = spec;
            return false;
        }
        let before = self.target_index;
        self.target_index = resolve_index(self.index, &spec);
        self.spec = spec;
        before != self.target_index
    }

    /// Schedule a roll to the current target once interactions are idle.
    ///
    /// Does nothing when a roll to the same position is already pending or
    /// has started. Returns `true` if a new request was made.
    pub fn request_roll<H>(&mut self, host: &mut H) -> bool
    where
        H: InteractionService + ?Sized,
    {
        if self.disposed || self.committed == Some(self.target_index) {
            return false;
        }
        if self.target_index == 0 && self.pending.is_none() && self.offset.current() == 0.0 {
            // Already showing the first glyph; nothing to roll.
            self.offset.stop();
            self.committed = Some(0);
            return false;
        }
        if let Some(previous) = self.pending.take() {
            tracing::trace!(
                slot = self.index,
                id = previous.registration.id(),
                "superseded pending roll"
            );
        }
        let registration = host.run_after_interactions();
        self.pending = Some(PendingRoll {
            registration,
            target_index: self.target_index,
        });
        self.committed = Some(self.target_index);
        true
    }

    /// Start the pending roll if `id` is its registration.
    ///
    /// Returns `true` if a roll started.
    pub fn on_interactions_idle<J>(
        &mut self,
        id: RegistrationId,
        measures: &MeasureMap,
        base_duration: Duration,
        jitter: &mut J,
    ) -> bool
    where
        J: JitterSource + ?Sized,
    {
        if self.disposed {
            return false;
        }
        let pending = match self.pending.take() {
            Some(pending) if pending.registration.id() == id => pending,
            other => {
                self.pending = other;
                return false;
            }
        };

        let cell_height = self.cell_height(measures);
        if cell_height <= 0.0 {
            // Nothing measured to aim at; the next completed measurement re-requests.
            tracing::trace!(slot = self.index, id, "roll deferred until measured");
            self.committed = None;
            return false;
        }
        let to = target_offset(pending.target_index, cell_height);
        let factor = jitter.factor(TransitionKey::new(self.index, self.transitions));
        let duration = self.spec.duration.unwrap_or(base_duration) * factor;
        self.transitions += 1;
        tracing::trace!(
            slot = self.index,
            from = self.offset.current(),
            to,
            factor,
            ?duration,
            "roll started"
        );
        self.offset.retarget(to, duration);
        true
    }

    /// Retarget the frame towards the displayed glyph's measured box.
    pub fn sync_frame(&mut self, measures: &MeasureMap, resize_duration: Duration) {
        if self.disposed {
            return;
        }
        let target = self
            .displayed_glyph()
            .and_then(|g| measures.get(g.as_str()))
            .unwrap_or(Size::ZERO);
        if self.frame_target == Some(target) {
            return;
        }
        self.frame_target = Some(target);
        self.width.retarget(target.width, resize_duration);
        self.height.retarget(target.height, resize_duration);
    }

    /// Height of one reel cell.
    ///
    /// Every glyph of a reel shares the cell height, so any measured member
    /// will do; the displayed glyph is preferred.
    pub fn cell_height(&self, measures: &MeasureMap) -> f32 {
        let preferred = self
            .displayed_glyph()
            .and_then(|g| measures.get(g.as_str()))
            .filter(|s| s.height > 0.0);
        preferred
            .or_else(|| {
                self.spec
                    .reel
                    .iter()
                    .filter_map(|g| measures.get(g.as_str()))
                    .find(|s| s.height > 0.0)
            })
            .map_or(0.0, |s| s.height)
    }

    /// Snap a resting slot onto its target after the cell height changed.
    ///
    /// Returns `true` if the offset moved. Rolling or pending slots are left
    /// alone; their roll already aims at a measured offset.
    pub fn realign(&mut self, measures: &MeasureMap) -> bool {
        if self.disposed || self.pending.is_some() || self.is_rolling() {
            return false;
        }
        if self.committed != Some(self.target_index) {
            return false;
        }
        let resting = target_offset(self.target_index, self.cell_height(measures));
        if self.offset.current() == resting {
            return false;
        }
        self.offset.jump_to(resting);
        true
    }

    /// Advance the offset and frame tweens.
    pub fn tick(&mut self, dt: Duration) {
        if self.disposed {
            return;
        }
        self.offset.tick(dt);
        self.width.tick(dt);
        self.height.tick(dt);
    }

    /// Release the pending roll and freeze in place.
    pub fn dispose(&mut self) {
        self.pending = None;
        self.offset.stop();
        self.width.stop();
        self.height.stop();
        self.disposed = true;
    }
}

fn resolve_index(slot: usize, spec: &SlotSpec) -> usize {
    match spec.target_index() {
        Some(index) => index,
        None => {
            tracing::warn!(
                slot,
                glyph = %spec.target,
                reel_len = spec.reel.len(),
                "target glyph missing from reel; showing first glyph"
            );
            0
        }
    }
}
