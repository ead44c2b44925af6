#![forbid(unsafe_code)]

//! Odometer-style text ticker.
//!
//! Each character of the content rolls vertically through a reel of glyphs
//! until the target glyph is in view. Digits share one numeric reel so a
//! counter rolls consistently; other glyphs sit still on a reel of one.
//!
//! The widget is host-agnostic. A host implements
//! [`MeasureService`](odometer_core::host::MeasureService) and
//! [`InteractionService`](odometer_core::host::InteractionService), feeds
//! completions back through [`Ticker::handle_event`], advances time with
//! [`Ticker::tick`], and draws [`Ticker::view`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use odometer::{Ticker, TickerConfig};
//! use odometer_core::geometry::Size;
//! use odometer_core::host::testing::ScriptedHost;
//!
//! let mut host = ScriptedHost::new();
//! let mut ticker = Ticker::new(TickerConfig::new());
//! ticker.update(["1,024"], &mut host).unwrap();
//! assert_eq!(ticker.view().snapshot(), "0,000");
//!
//! for event in host.measure_all(|_| Size::new(1.0, 1.0)) {
//!     ticker.handle_event(event, &mut host);
//! }
//! ticker.tick(Duration::from_millis(1500), &mut host);
//! for event in host.settle_interactions() {
//!     ticker.handle_event(event, &mut host);
//! }
//! ticker.tick(Duration::from_secs(1), &mut host);
//! assert_eq!(ticker.view().snapshot(), "1,024");
//! ```

pub mod animator;
pub mod config;
pub mod error;
pub mod measure;
pub mod reel;
pub mod ticker;
pub mod view;

pub use animator::CharacterAnimator;
pub use config::TickerConfig;
pub use error::TickerError;
pub use measure::{GlyphMeasurements, MeasureMap, MeasurePhase, MeasureStats, SyncOutcome};
pub use reel::{ContentNode, Glyph, NestedTicker, Reel, ReelBuilder, SlotSpec};
pub use ticker::{Ticker, UpdateSummary};
pub use view::{SlotView, TickerView, ViewContent};
