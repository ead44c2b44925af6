#![forbid(unsafe_code)]

//! A terminal implementation of the ticker host services.
//!
//! Terminal cells make measurement trivial: a glyph is as wide as its display
//! width and one row tall. Results are still delivered asynchronously, on the
//! frame after the request and in reverse request order, so the widget sees
//! the same unordered arrival a real layout engine produces.
//!
//! "Interactions" are keyboard input. Deferrals are released only on frames
//! where no input arrived.

use odometer_core::geometry::Size;
use odometer_core::host::{
    CancelToken, HostEvent, InteractionService, MeasureRequest, MeasureService, Registration,
    RegistrationId, RegistrationIds,
};
use unicode_width::UnicodeWidthStr;

#[derive(Debug)]
struct QueuedMeasure {
    id: RegistrationId,
    size: Size,
    token: CancelToken,
}

#[derive(Debug)]
struct QueuedDeferral {
    id: RegistrationId,
    token: CancelToken,
}

/// Terminal host: queues requests and releases them frame by frame.
#[derive(Debug, Default)]
pub struct TerminalHost {
    ids: RegistrationIds,
    measures: Vec<QueuedMeasure>,
    deferrals: Vec<QueuedDeferral>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests still waiting for delivery, cancelled ones included.
    #[cfg(test)]
    pub fn queued(&self) -> usize {
        self.measures.len() + self.deferrals.len()
    }

    /// Collect the completions due this frame.
    ///
    /// Measurements are always delivered; deferrals only when `input_pending`
    /// is false. Cancelled requests are dropped silently.
    pub fn poll_events(&mut self, input_pending: bool) -> Vec<HostEvent> {
        let mut events: Vec<HostEvent> = std::mem::take(&mut self.measures)
            .into_iter()
            .rev()
            .filter(|m| !m.token.is_cancelled())
            .map(|m| HostEvent::Measured {
                id: m.id,
                size: m.size,
            })
            .collect();
        if !input_pending {
            events.extend(
                std::mem::take(&mut self.deferrals)
                    .into_iter()
                    .filter(|d| !d.token.is_cancelled())
                    .map(|d| HostEvent::InteractionsIdle { id: d.id }),
            );
        }
        if !events.is_empty() {
            tracing::trace!(count = events.len(), input_pending, "host events due");
        }
        events
    }
}

/// Terminal box of a glyph: display width by one row.
pub fn cell_size(glyph: &str) -> Size {
    Size::new(glyph.width() as f32, 1.0)
}

impl MeasureService for TerminalHost {
    fn measure_offscreen(&mut self, request: MeasureRequest<'_>) -> Registration {
        let (registration, token) = self.ids.issue();
        self.measures.push(QueuedMeasure {
            id: registration.id(),
            size: cell_size(request.glyph),
            token,
        });
        registration
    }
}

impl InteractionService for TerminalHost {
    fn run_after_interactions(&mut self) -> Registration {
        let (registration, token) = self.ids.issue();
        self.deferrals.push(QueuedDeferral {
            id: registration.id(),
            token,
        });
        registration
    }
}
