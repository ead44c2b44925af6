#![forbid(unsafe_code)]

//! Render model handed to the host each frame.
//!
//! A [`TickerView`] is a borrowed snapshot of what the host should draw:
//!
//! - the row container with its style and accessibility label;
//! - either the static placeholder glyphs or one [`SlotView`] per character;
//! - the glyphs that still need off-screen measurement. These are drawn
//!   invisibly in both modes, so the next generation can be measured while
//!   the current one is on screen.

use odometer_core::geometry::Size;
use odometer_core::style::{ContainerStyle, FlowDirection, TextProps, TextStyle};

use crate::reel::{Glyph, Reel};

/// What the ticker shows.
#[derive(Debug, Clone)]
pub enum ViewContent<'a> {
    /// Static text shown until every glyph is measured.
    Placeholder(&'a [Glyph]),
    /// One rolling slot per character.
    Animated(Vec<SlotView<'a>>),
}

/// One rolling character slot.
///
/// The host stacks every reel glyph vertically inside a frame of size
/// `frame`, translates the stack by `offset`, and crops to the frame.
#[derive(Debug, Clone, Copy)]
pub struct SlotView<'a> {
    /// Slot position.
    pub index: usize,
    /// Glyphs stacked in the slot.
    pub reel: &'a Reel,
    /// The glyph being rolled to.
    pub target: &'a Glyph,
    /// Vertical translation of the stack.
    pub offset: f32,
    /// Visible frame size.
    pub frame: Size,
    /// Height of one stack cell.
    pub cell_height: f32,
}

impl SlotView<'_> {
    /// Reel position closest to the visible cell.
    pub fn visible_index(&self) -> usize {
        if self.cell_height <= 0.0 || self.reel.is_empty() {
            return 0;
        }
        let raw = (-self.offset / self.cell_height).round();
        let last = self.reel.len() - 1;
        if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(last)
        }
    }

    /// Glyph closest to the visible cell.
    pub fn visible_glyph(&self) -> Option<&Glyph> {
        self.reel.get(self.visible_index())
    }
}

/// Everything a host needs to draw one ticker.
#[derive(Debug, Clone)]
pub struct TickerView<'a> {
    /// Label for assistive technology.
    pub accessibility_label: Option<&'a str>,
    /// Row container style.
    pub container_style: &'a ContainerStyle,
    /// Glyph style.
    pub text_style: &'a TextStyle,
    /// Host properties for every glyph.
    pub text_props: &'a TextProps,
    /// Visible content.
    pub content: ViewContent<'a>,
    /// Glyphs to render invisibly for measurement.
    pub measuring: Vec<&'a Glyph>,
}

impl TickerView<'_> {
    /// Whether the placeholder is showing.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, ViewContent::Placeholder(_))
    }

    /// Number of visible character positions.
    pub fn len(&self) -> usize {
        match &self.content {
            ViewContent::Placeholder(glyphs) => glyphs.len(),
            ViewContent::Animated(slots) => slots.len(),
        }
    }

    /// Whether nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visible glyphs in logical (content) order.
    pub fn visible_glyphs(&self) -> Vec<&Glyph> {
        match &self.content {
            ViewContent::Placeholder(glyphs) => glyphs.iter().collect(),
            ViewContent::Animated(slots) => {
                slots.iter().filter_map(SlotView::visible_glyph).collect()
            }
        }
    }

    /// Visible text in display order (reversed for right-to-left flow).
    pub fn snapshot(&self) -> String {
        let glyphs = self.visible_glyphs();
        match self.container_style.direction {
            FlowDirection::LeftToRight => glyphs.iter().map(|g| g.as_str()).collect(),
            FlowDirection::RightToLeft => glyphs.iter().rev().map(|g| g.as_str()).collect(),
        }
    }
}
