#![forbid(unsafe_code)]

//! Geometric primitives.

/// The measured box of a rendered glyph.
///
/// Units are whatever the host lays text out in: cells for a terminal host,
/// logical pixels for a graphical one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Size {
    /// A zero-sized box.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Check if either dimension is zero (or negative).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<(f32, f32)> for Size {
    fn from((width, height): (f32, f32)) -> Self {
        Self::new(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_empty() {
        assert!(Size::ZERO.is_empty());
        assert_eq!(Size::default(), Size::ZERO);
    }

    #[test]
    fn partial_zero_is_empty() {
        assert!(Size::new(0.0, 1.0).is_empty());
        assert!(Size::new(3.0, 0.0).is_empty());
        assert!(!Size::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn from_tuple() {
        assert_eq!(Size::from((2.0, 1.0)), Size::new(2.0, 1.0));
    }
}
