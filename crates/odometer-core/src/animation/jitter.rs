#![forbid(unsafe_code)]

//! Duration jitter for sibling animations.
//!
//! Rolling every digit of a counter with the same duration looks mechanical.
//! A [`JitterSource`] hands out a small integer multiplier per transition so
//! neighbouring slots land at different times.
//!
//! # Invariants
//!
//! 1. [`SeededJitter`] is a pure function of `(seed, slot, transition)`: the
//!    same key always yields the same factor, regardless of call order.
//! 2. Factors are always drawn from the configured set; an empty set yields 1.
//! 3. A factor of 0 is never produced (it would make rolls instantaneous).

/// Identifies one rotation of one character slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionKey {
    /// Position of the slot within the ticker.
    pub slot: usize,
    /// Per-slot transition counter.
    pub transition: u64,
}

impl TransitionKey {
    /// Create a key.
    pub const fn new(slot: usize, transition: u64) -> Self {
        Self { slot, transition }
    }
}

/// Produces a duration multiplier for each transition.
pub trait JitterSource {
    /// Multiplier to apply to the base duration of the transition `key`.
    fn factor(&mut self, key: TransitionKey) -> u32;
}

/// Deterministic jitter seeded once and re-derived per transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededJitter {
    seed: u64,
    factors: Vec<u32>,
}

impl SeededJitter {
    /// Create a jitter source drawing from `factors`.
    ///
    /// Zero factors are dropped.
    pub fn new(seed: u64, factors: impl Into<Vec<u32>>) -> Self {
        let mut factors = factors.into();
        factors.retain(|&f| f > 0);
        Self { seed, factors }
    }

    /// The seed this source was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The multiplier set.
    pub fn factors(&self) -> &[u32] {
        &self.factors
    }
}

impl Default for SeededJitter {
    fn default() -> Self {
        Self::new(0, [1, 2])
    }
}

impl JitterSource for SeededJitter {
    fn factor(&mut self, key: TransitionKey) -> u32 {
        if self.factors.is_empty() {
            return 1;
        }
        let mut state = transition_seed(self.seed, key);
        let draw = xorshift64(&mut state);
        self.factors[(draw % self.factors.len() as u64) as usize]
    }
}

/// Jitter that always returns the same multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedJitter(pub u32);

impl JitterSource for FixedJitter {
    fn factor(&mut self, _key: TransitionKey) -> u32 {
        self.0.max(1)
    }
}

/// Advance a xorshift64 state and return the new value.
///
/// A zero state is remapped so the generator never gets stuck.
#[inline]
pub fn xorshift64(state: &mut u64) -> u64 {
    if *state == 0 {
        *state = 0x9E37_79B9_7F4A_7C15;
    }
    *state ^= *state << 13;
    *state ^= *state >> 7;
    *state ^= *state << 17;
    *state
}

/// Mix the base seed with a transition key (splitmix64 finalizer).
fn transition_seed(seed: u64, key: TransitionKey) -> u64 {
    let mut z = seed
        ^ (key.slot as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ key.transition.wrapping_mul(0xD1B5_4A32_D192_ED03);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_factor() {
        let mut a = SeededJitter::new(42, [1, 2]);
        let mut b = SeededJitter::new(42, [1, 2]);
        for slot in 0..8 {
            for transition in 0..8 {
                let key = TransitionKey::new(slot, transition);
                assert_eq!(a.factor(key), b.factor(key));
            }
        }
    }

    #[test]
    fn order_independent() {
        let mut jitter = SeededJitter::new(7, [1, 2, 3]);
        let key = TransitionKey::new(3, 9);
        let first = jitter.factor(key);
        for slot in 0..20 {
            jitter.factor(TransitionKey::new(slot, 0));
        }
        assert_eq!(jitter.factor(key), first);
    }

    #[test]
    fn factors_come_from_set() {
        let mut jitter = SeededJitter::default();
        for slot in 0..64 {
            let f = jitter.factor(TransitionKey::new(slot, 1));
            assert!(f == 1 || f == 2, "unexpected factor {f}");
        }
    }

    #[test]
    fn both_factors_are_reachable() {
        let mut jitter = SeededJitter::new(1234, [1, 2]);
        let draws: Vec<u32> = (0..64)
            .map(|slot| jitter.factor(TransitionKey::new(slot, 0)))
            .collect();
        assert!(draws.contains(&1));
        assert!(draws.contains(&2));
    }

    #[test]
    fn empty_or_zero_factors_yield_one() {
        let mut empty = SeededJitter::new(5, Vec::new());
        assert_eq!(empty.factor(TransitionKey::new(0, 0)), 1);
        let mut zeros = SeededJitter::new(5, [0, 0]);
        assert!(zeros.factors().is_empty());
        assert_eq!(zeros.factor(TransitionKey::new(0, 0)), 1);
    }

    #[test]
    fn fixed_jitter_never_zero() {
        assert_eq!(FixedJitter(0).factor(TransitionKey::new(0, 0)), 1);
        assert_eq!(FixedJitter(3).factor(TransitionKey::new(9, 9)), 3);
    }

    #[test]
    fn xorshift_escapes_zero_state() {
        let mut state = 0;
        assert_ne!(xorshift64(&mut state), 0);
    }
}
