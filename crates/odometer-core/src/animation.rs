#![forbid(unsafe_code)]

//! Time-based interpolation for rolling reels.
//!
//! Everything here is driven by the caller: nothing advances unless
//! [`Animation::tick`] is called with the elapsed frame time. A host that
//! polls its frame clock once per frame and forwards the delta gets
//! deterministic, allocation-free animation.
//!
//! The centerpiece is [`Tween`], a scalar interpolator that can be
//! re-targeted mid-flight. Re-targeting starts the new leg from the *current*
//! interpolated value, so the rendered position never jumps.

pub mod jitter;

use std::time::Duration;

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in (slow start).
#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-out (slower end than quadratic).
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

// ---------------------------------------------------------------------------
// Animation trait
// ---------------------------------------------------------------------------

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current output value, clamped to [0.0, 1.0].
    fn value(&self) -> f32;

    /// Reset the animation to its initial state.
    fn reset(&mut self);

    /// Time elapsed past completion.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

#[inline]
fn non_zero(duration: Duration) -> Duration {
    if duration.is_zero() {
        Duration::from_nanos(1)
    } else {
        duration
    }
}

// ---------------------------------------------------------------------------
// Tween
// ---------------------------------------------------------------------------

/// Interpolates an `f32` between `from` and `to` over a duration.
///
/// [`Animation::value`] returns the eased progress; [`Tween::current`] returns
/// the interpolated scalar.
///
/// # Invariants
///
/// 1. `current()` equals `from` before the first tick and `to` once complete.
/// 2. [`retarget`](Tween::retarget) never changes `current()` at the instant
///    it is called.
/// 3. A zero duration is clamped to 1ns, so the next non-zero tick completes.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: f32,
    to: f32,
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Tween {
    /// Create a tween resting at `value`.
    pub fn at(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            elapsed: Duration::from_nanos(1),
            duration: Duration::from_nanos(1),
            easing: ease_in_out,
        }
    }

    /// Create a tween from `from` to `to` over `duration`.
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration: non_zero(duration),
            easing: ease_in_out,
        }
    }

    /// Set the easing function (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    fn progress(&self) -> f32 {
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }

    /// Current interpolated value.
    pub fn current(&self) -> f32 {
        if self.is_complete() {
            return self.to;
        }
        let t = (self.easing)(self.progress());
        self.from + (self.to - self.from) * t
    }

    /// The value this tween is heading towards.
    pub fn target(&self) -> f32 {
        self.to
    }

    /// The configured duration of the current leg.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Redirect towards `to`, starting from the current value.
    pub fn retarget(&mut self, to: f32, duration: Duration) {
        self.from = self.current();
        self.to = to;
        self.elapsed = Duration::ZERO;
        self.duration = non_zero(duration);
    }

    /// Stop and rest at `value` immediately.
    pub fn jump_to(&mut self, value: f32) {
        self.from = value;
        self.to = value;
        self.elapsed = self.duration;
    }

    /// Freeze at the current value.
    pub fn stop(&mut self) {
        let now = self.current();
        self.jump_to(now);
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);
    const MS_100: Duration = Duration::from_millis(100);
    const MS_500: Duration = Duration::from_millis(500);
    const SEC_1: Duration = Duration::from_secs(1);

    // ---- Easing tests ----

    #[test]
    fn easing_endpoints() {
        for f in [linear, ease_in, ease_out, ease_in_out, ease_out_cubic] {
            assert!((f(0.0) - 0.0).abs() < f32::EPSILON);
            assert!((f(1.0) - 1.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn easing_clamps_input() {
        assert!((linear(-1.0) - 0.0).abs() < f32::EPSILON);
        assert!((linear(2.0) - 1.0).abs() < f32::EPSILON);
        assert!((ease_out(1.5) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn ease_in_out_midpoint() {
        assert!((ease_in_out(0.5) - 0.5).abs() < 0.01);
        assert!(ease_in(0.5) < linear(0.5));
        assert!(ease_out(0.5) > linear(0.5));
    }

    // ---- Tween tests ----

    #[test]
    fn at_rests_immediately() {
        let tween = Tween::at(-3.0);
        assert!(tween.is_complete());
        assert!((tween.current() + 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn starts_at_from_ends_at_to() {
        let mut tween = Tween::new(0.0, -7.0, SEC_1);
        assert!((tween.current() - 0.0).abs() < f32::EPSILON);
        tween.tick(SEC_1);
        assert!(tween.is_complete());
        assert!((tween.current() + 7.0).abs() < f32::EPSILON);
    }

    #[test]
    fn linear_midpoint() {
        let mut tween = Tween::new(0.0, 10.0, SEC_1).easing(linear);
        tween.tick(MS_500);
        assert!((tween.current() - 5.0).abs() < 0.01);
        assert!((tween.value() - 0.5).abs() < 0.01);
    }

    #[test]
    fn retarget_is_continuous() {
        let mut tween = Tween::new(0.0, -70.0, SEC_1);
        tween.tick(Duration::from_millis(300));
        let before = tween.current();
        tween.retarget(-80.0, SEC_1);
        assert!((tween.current() - before).abs() < 1e-4);
        assert!(!tween.is_complete());
        tween.tick(SEC_1);
        assert!((tween.current() + 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn retarget_after_completion_starts_from_rest() {
        let mut tween = Tween::new(0.0, 5.0, MS_100);
        tween.tick(SEC_1);
        tween.retarget(0.0, MS_100);
        assert!((tween.current() - 5.0).abs() < f32::EPSILON);
        assert!((tween.target() - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_duration_completes_on_next_tick() {
        let mut tween = Tween::new(1.0, 2.0, Duration::ZERO);
        assert!(!tween.is_complete());
        tween.tick(MS_16);
        assert!(tween.is_complete());
        assert!((tween.current() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn stop_freezes_current_value() {
        let mut tween = Tween::new(0.0, 10.0, SEC_1).easing(linear);
        tween.tick(Duration::from_millis(250));
        tween.stop();
        assert!(tween.is_complete());
        assert!((tween.current() - 2.5).abs() < 0.01);
        tween.tick(SEC_1);
        assert!((tween.current() - 2.5).abs() < 0.01);
    }

    #[test]
    fn reset_restarts_leg() {
        let mut tween = Tween::new(0.0, 1.0, MS_100);
        tween.tick(MS_100);
        tween.reset();
        assert!(!tween.is_complete());
        assert!((tween.current() - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn overshoot_reports_excess() {
        let mut tween = Tween::new(0.0, 1.0, MS_100);
        tween.tick(Duration::from_millis(150));
        assert_eq!(tween.overshoot(), Duration::from_millis(50));
    }
}
