#![forbid(unsafe_code)]

//! Reel construction: which glyphs each character position can roll through.
//!
//! # Overview
//!
//! Ticker content is a list of [`ContentNode`]s. Literal text is split into
//! grapheme clusters, one [`SlotSpec`] per cluster:
//!
//! - a single ASCII digit gets the shared *numeric reel*: `0`–`9`, then the
//!   configured numeric extras, then caller-supplied display items;
//! - any other glyph gets a singleton reel holding only itself.
//!
//! A nested ticker contributes one slot with its declared reel, untouched.
//!
//! # Invariants
//!
//! 1. A [`Reel`] never contains the same glyph twice; first occurrence wins.
//! 2. Reels are derived deterministically from content and configuration.
//! 3. Every numeric slot shares one reel, independent of its digit.
//!
//! # Failure Modes
//!
//! - Empty content: zero slots.
//! - A nested reel missing its target: reported by [`SlotSpec::target_index`]
//!   returning `None`; the caller decides between failing and clamping.

use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use unicode_segmentation::UnicodeSegmentation;

/// Glyph shown in place of every digit before measurement completes.
pub const PLACEHOLDER_GLYPH: &str = "0";

/// One renderable unit, compared by value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Glyph(Box<str>);

impl Glyph {
    /// Create a glyph.
    pub fn new(value: impl Into<Box<str>>) -> Self {
        Self(value.into())
    }

    /// The glyph's text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this glyph rolls on the numeric reel.
    pub fn is_numeric(&self) -> bool {
        is_numeric(&self.0)
    }
}

impl fmt::Debug for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Glyph {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Glyph {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Glyph {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for Glyph {
    fn from(value: String) -> Self {
        Self(value.into_boxed_str())
    }
}

impl From<char> for Glyph {
    fn from(value: char) -> Self {
        Self(value.to_string().into_boxed_str())
    }
}

impl PartialEq<str> for Glyph {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Glyph {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Whether `glyph` is a single ASCII digit.
#[inline]
pub fn is_numeric(glyph: &str) -> bool {
    let bytes = glyph.as_bytes();
    bytes.len() == 1 && bytes[0].is_ascii_digit()
}

/// Ordered, duplicate-free sequence of glyphs a slot rolls through.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Reel {
    glyphs: SmallVec<[Glyph; 1]>,
}

impl Reel {
    /// Build a reel, dropping repeated glyphs (first occurrence wins).
    pub fn new<I, G>(glyphs: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<Glyph>,
    {
        let mut seen = FxHashSet::default();
        let glyphs = glyphs
            .into_iter()
            .map(Into::into)
            .filter(|g: &Glyph| seen.insert(g.clone()))
            .collect();
        Self { glyphs }
    }

    /// A reel holding exactly one glyph.
    pub fn single(glyph: impl Into<Glyph>) -> Self {
        let mut glyphs = SmallVec::new();
        glyphs.push(glyph.into());
        Self { glyphs }
    }

    /// Position of `glyph` in the reel.
    pub fn position(&self, glyph: &str) -> Option<usize> {
        self.glyphs.iter().position(|g| g.as_str() == glyph)
    }

    /// Whether the reel contains `glyph`.
    pub fn contains(&self, glyph: &str) -> bool {
        self.position(glyph).is_some()
    }

    /// Glyph at `index`.
    pub fn get(&self, index: usize) -> Option<&Glyph> {
        self.glyphs.get(index)
    }

    /// All glyphs in roll order.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Iterate glyphs in roll order.
    pub fn iter(&self) -> std::slice::Iter<'_, Glyph> {
        self.glyphs.iter()
    }

    /// Number of glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether the reel is empty.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl fmt::Debug for Reel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.glyphs.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Reel {
    type Item = &'a Glyph;
    type IntoIter = std::slice::Iter<'a, Glyph>;

    fn into_iter(self) -> Self::IntoIter {
        self.glyphs.iter()
    }
}

/// A sub-ticker whose reel is chosen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedTicker {
    /// The reel, used as-is.
    pub reel: Reel,
    /// The glyph to roll to.
    pub target: Glyph,
    /// Roll duration override for this slot.
    pub duration: Option<Duration>,
}

impl NestedTicker {
    /// Create a nested ticker rolling `reel` to `target`.
    pub fn new<I, G>(reel: I, target: impl Into<Glyph>) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<Glyph>,
    {
        Self {
            reel: Reel::new(reel),
            target: target.into(),
            duration: None,
        }
    }

    /// Override the roll duration for this slot.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// One child of a ticker.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    /// Text (or a number rendered as text), one slot per grapheme.
    Literal(String),
    /// A single slot with an explicit reel.
    Nested(NestedTicker),
}

impl From<&str> for ContentNode {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_owned())
    }
}

impl From<String> for ContentNode {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<NestedTicker> for ContentNode {
    fn from(value: NestedTicker) -> Self {
        Self::Nested(value)
    }
}

macro_rules! content_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ContentNode {
                fn from(value: $ty) -> Self {
                    Self::Literal(value.to_string())
                }
            }
        )*
    };
}

content_from_number!(i32, i64, u32, u64, usize, f64);

/// Reel assignment for one character position.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSpec {
    /// Glyphs this slot can show.
    pub reel: Rc<Reel>,
    /// Glyph this slot should show.
    pub target: Glyph,
    /// Roll duration override.
    pub duration: Option<Duration>,
}

impl SlotSpec {
    /// Position of the target in the reel, if present.
    pub fn target_index(&self) -> Option<usize> {
        self.reel.position(self.target.as_str())
    }

    /// Whether both specs roll through the same glyphs.
    pub fn same_reel(&self, other: &SlotSpec) -> bool {
        Rc::ptr_eq(&self.reel, &other.reel) || self.reel == other.reel
    }
}

/// Derives [`SlotSpec`]s from ticker content.
#[derive(Debug, Clone)]
pub struct ReelBuilder {
    numeric: Rc<Reel>,
}

impl ReelBuilder {
    /// Create a builder whose numeric reel is `0`–`9`, then `extras`, then
    /// `additional`.
    pub fn new<S: AsRef<str>>(extras: &[S], additional: &[S]) -> Self {
        let digits = (0..10u8).map(|d| Glyph::from(char::from(b'0' + d)));
        let extras = extras.iter().chain(additional).map(|s| Glyph::from(s.as_ref()));
        Self {
            numeric: Rc::new(Reel::new(digits.chain(extras))),
        }
    }

    /// The shared numeric reel.
    pub fn numeric_reel(&self) -> &Rc<Reel> {
        &self.numeric
    }

    /// One slot per displayed character, in display order.
    pub fn build(&self, children: &[ContentNode]) -> Vec<SlotSpec> {
        let mut slots = Vec::new();
        for child in children {
            match child {
                ContentNode::Literal(text) => {
                    slots.extend(text.graphemes(true).map(|g| self.literal_slot(g)));
                }
                ContentNode::Nested(nested) => slots.push(SlotSpec {
                    reel: Rc::new(nested.reel.clone()),
                    target: nested.target.clone(),
                    duration: nested.duration,
                }),
            }
        }
        slots
    }

    fn literal_slot(&self, grapheme: &str) -> SlotSpec {
        let reel = if is_numeric(grapheme) {
            Rc::clone(&self.numeric)
        } else {
            Rc::new(Reel::single(grapheme))
        };
        SlotSpec {
            reel,
            target: Glyph::from(grapheme),
            duration: None,
        }
    }
}

/// Every distinct glyph across `slots`, in first-seen order.
pub fn required_glyphs(slots: &[SlotSpec]) -> Vec<Glyph> {
    let mut seen: FxHashSet<&Glyph> = FxHashSet::default();
    let mut out = Vec::new();
    for slot in slots {
        for glyph in slot.reel.iter() {
            if seen.insert(glyph) {
                out.push(glyph.clone());
            }
        }
    }
    out
}

/// The static rendition shown while glyphs are still being measured.
///
/// Digits become [`PLACEHOLDER_GLYPH`]; a nested ticker shows its target.
pub fn placeholder(children: &[ContentNode]) -> Vec<Glyph> {
    let mut out = Vec::new();
    for child in children {
        match child {
            ContentNode::Literal(text) => out.extend(text.graphemes(true).map(|g| {
                if is_numeric(g) {
                    Glyph::from(PLACEHOLDER_GLYPH)
                } else {
                    Glyph::from(g)
                }
            })),
            ContentNode::Nested(nested) => out.push(nested.target.clone()),
        }
    }
    out
}
