#![forbid(unsafe_code)]

//! Core: animation primitives, glyph geometry, styles, and host service contracts.

pub mod animation;
pub mod geometry;
pub mod host;
pub mod style;
