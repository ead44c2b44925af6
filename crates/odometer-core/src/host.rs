#![forbid(unsafe_code)]

//! Contracts between a ticker and the UI host that renders it.
//!
//! The host owns three things the ticker cannot do itself: laying glyphs out
//! to learn their size, knowing when user interaction has gone idle, and
//! driving frames. The first two are asynchronous. Every asynchronous request
//! returns a [`Registration`]; the host reports completion later by feeding a
//! [`HostEvent`] carrying the registration's id back into the ticker.
//!
//! # Cancellation
//!
//! Releasing (or dropping) a [`Registration`] cancels the pending work. The
//! host should check [`CancelToken::is_cancelled`] and skip delivery, but the
//! ticker also ignores events whose id it no longer tracks, so a late event
//! after teardown is always a no-op.
//!
//! # Threading
//!
//! The model is single-threaded and event-driven: all requests, events, and
//! frame ticks happen on the host's UI thread. Tokens use `Rc`, so handles
//! cannot cross threads by construction.

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

use std::cell::Cell;
use std::rc::Rc;

use crate::geometry::Size;
use crate::style::{TextProps, TextStyle};

/// Identifier of one asynchronous request.
pub type RegistrationId = u64;

/// Host-side view of a registration: tells whether it was cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    /// Whether the owning [`Registration`] has been released.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Widget-side handle for one pending asynchronous request.
///
/// Dropping the handle cancels the request.
#[derive(Debug)]
pub struct Registration {
    id: RegistrationId,
    cancelled: Rc<Cell<bool>>,
}

impl Registration {
    /// Create a registration and the token the host keeps to observe it.
    pub fn pair(id: RegistrationId) -> (Self, CancelToken) {
        let cancelled = Rc::new(Cell::new(false));
        let token = CancelToken {
            cancelled: Rc::clone(&cancelled),
        };
        (Self { id, cancelled }, token)
    }

    /// The id the host will report back in a [`HostEvent`].
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// Whether this registration has been cancelled.
    pub fn is_released(&self) -> bool {
        self.cancelled.get()
    }

    /// Cancel the pending request.
    pub fn release(self) {
        // Drop does the work.
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.cancelled.set(true);
    }
}

/// Monotonic id allocator for hosts.
#[derive(Debug, Clone, Default)]
pub struct RegistrationIds {
    next: RegistrationId,
}

impl RegistrationIds {
    /// Allocate the next id and its registration pair.
    pub fn issue(&mut self) -> (Registration, CancelToken) {
        self.next += 1;
        Registration::pair(self.next)
    }
}

/// A request to lay out one glyph invisibly and report its box.
#[derive(Debug, Clone, Copy)]
pub struct MeasureRequest<'a> {
    /// The glyph to measure.
    pub glyph: &'a str,
    /// Style the glyph will be rendered with.
    pub style: &'a TextStyle,
    /// Host properties the glyph will be rendered with.
    pub props: &'a TextProps,
}

/// Off-screen glyph measurement.
///
/// Implementations render the glyph with zero opacity and without affecting
/// layout, then deliver [`HostEvent::Measured`] after their layout pass.
/// Delivery order across glyphs is unspecified, and a request may never
/// complete.
pub trait MeasureService {
    /// Start measuring a glyph.
    fn measure_offscreen(&mut self, request: MeasureRequest<'_>) -> Registration;
}

/// Deferral until pending user interactions settle.
///
/// Implementations deliver [`HostEvent::InteractionsIdle`] once, after
/// in-flight gestures and transitions complete.
pub trait InteractionService {
    /// Schedule a single idle notification.
    fn run_after_interactions(&mut self) -> Registration;
}

/// Everything a ticker needs from its host.
pub trait TickerHost: MeasureService + InteractionService {}

impl<T: MeasureService + InteractionService + ?Sized> TickerHost for T {}

/// Completion of an asynchronous host request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// A glyph finished layout.
    Measured {
        /// Registration id from [`MeasureService::measure_offscreen`].
        id: RegistrationId,
        /// Measured box.
        size: Size,
    },
    /// Interactions went idle.
    InteractionsIdle {
        /// Registration id from [`InteractionService::run_after_interactions`].
        id: RegistrationId,
    },
}

impl HostEvent {
    /// The registration this event completes.
    pub fn id(&self) -> RegistrationId {
        match *self {
            Self::Measured { id, .. } | Self::InteractionsIdle { id } => id,
        }
    }
}
