#![forbid(unsafe_code)]

//! Presentation value types passed through to the host.
//!
//! The ticker never interprets colors or attributes itself. It forwards these
//! values with every glyph it asks the host to render or measure, and treats a
//! [`TextStyle`] change as a reason to re-measure every glyph.

use bitflags::bitflags;

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a color from its components.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

bitflags! {
    /// Text attributes that may change a glyph's rendered box.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextAttrs: u8 {
        const BOLD      = 0b0000_0001;
        const DIM       = 0b0000_0010;
        const ITALIC    = 0b0000_0100;
        const UNDERLINE = 0b0000_1000;
    }
}

/// Style applied to every glyph of a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextStyle {
    /// Foreground color.
    pub fg: Option<Rgb>,
    /// Background color.
    pub bg: Option<Rgb>,
    /// Text attributes.
    pub attrs: TextAttrs,
}

impl TextStyle {
    /// Create an empty style.
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: TextAttrs::empty(),
        }
    }

    /// Set the foreground color.
    #[must_use]
    pub const fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color.
    #[must_use]
    pub const fn bg(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add text attributes.
    #[must_use]
    pub fn attrs(mut self, attrs: TextAttrs) -> Self {
        self.attrs |= attrs;
        self
    }

    /// Whether no color or attribute is set.
    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_empty()
    }
}

/// Direction in which character slots flow inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowDirection {
    #[default]
    LeftToRight,
    /// Slots are laid out in reverse order (RTL locales).
    RightToLeft,
}

/// Style of the row that holds the character slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerStyle {
    /// Slot flow direction.
    pub direction: FlowDirection,
    /// Whether content outside the container bounds is cropped.
    pub clip: bool,
}

impl Default for ContainerStyle {
    fn default() -> Self {
        Self {
            direction: FlowDirection::LeftToRight,
            clip: true,
        }
    }
}

impl ContainerStyle {
    /// Set the flow direction.
    #[must_use]
    pub const fn direction(mut self, direction: FlowDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// Extra host-specific properties forwarded to every rendered glyph.
///
/// Keys keep insertion order; setting an existing key replaces its value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextProps {
    entries: Vec<(String, String)>,
}

impl TextProps {
    /// Create an empty property bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property (builder).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a property in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a property.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_style_builder() {
        let style = TextStyle::new()
            .fg(Rgb::new(255, 0, 0))
            .attrs(TextAttrs::BOLD)
            .attrs(TextAttrs::UNDERLINE);
        assert_eq!(style.fg, Some(Rgb::new(255, 0, 0)));
        assert!(style.attrs.contains(TextAttrs::BOLD | TextAttrs::UNDERLINE));
        assert!(!style.is_empty());
        assert!(TextStyle::default().is_empty());
    }

    #[test]
    fn container_defaults_to_clipped_ltr() {
        let container = ContainerStyle::default();
        assert_eq!(container.direction, FlowDirection::LeftToRight);
        assert!(container.clip);
    }

    #[test]
    fn text_props_replace_keeps_order() {
        let mut props = TextProps::new().with("testID", "score").with("selectable", "false");
        props.set("testID", "counter");
        let keys: Vec<_> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["testID", "selectable"]);
        assert_eq!(props.get("testID"), Some("counter"));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn text_props_missing_key() {
        assert_eq!(TextProps::new().get("nope"), None);
        assert!(TextProps::new().is_empty());
    }
}
