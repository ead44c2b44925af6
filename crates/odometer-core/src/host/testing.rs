#![forbid(unsafe_code)]

//! A scripted host for tests.
//!
//! [`ScriptedHost`] records every request a ticker makes and hands back
//! [`HostEvent`]s on demand, so tests control exactly when (and in which
//! order) measurements land and interactions go idle.

use crate::geometry::Size;
use crate::host::{
    CancelToken, HostEvent, InteractionService, MeasureRequest, MeasureService, Registration,
    RegistrationId, RegistrationIds,
};

/// A recorded measurement request.
#[derive(Debug, Clone)]
pub struct PendingMeasure {
    pub id: RegistrationId,
    pub glyph: String,
    token: CancelToken,
}

impl PendingMeasure {
    /// Whether the widget released this request.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A recorded deferral request.
#[derive(Debug, Clone)]
pub struct PendingDeferral {
    pub id: RegistrationId,
    token: CancelToken,
}

impl PendingDeferral {
    /// Whether the widget released this request.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Host double that queues requests until the test flushes them.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    ids: RegistrationIds,
    measures: Vec<PendingMeasure>,
    deferrals: Vec<PendingDeferral>,
    measure_requests: usize,
    deferral_requests: usize,
}

impl ScriptedHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total measurement requests received.
    pub fn measure_requests(&self) -> usize {
        self.measure_requests
    }

    /// Total deferral requests received.
    pub fn deferral_requests(&self) -> usize {
        self.deferral_requests
    }

    /// Queued measurement requests that are still live.
    pub fn pending_measures(&self) -> Vec<&PendingMeasure> {
        self.measures.iter().filter(|m| !m.is_cancelled()).collect()
    }

    /// Glyphs with a live measurement request, in request order.
    pub fn pending_glyphs(&self) -> Vec<String> {
        self.pending_measures()
            .into_iter()
            .map(|m| m.glyph.clone())
            .collect()
    }

    /// Queued deferrals that are still live.
    pub fn pending_deferrals(&self) -> Vec<&PendingDeferral> {
        self.deferrals.iter().filter(|d| !d.is_cancelled()).collect()
    }

    /// Complete every live measurement, sizing each glyph with `size_of`.
    ///
    /// Cancelled requests are dropped without an event.
    pub fn measure_all(&mut self, mut size_of: impl FnMut(&str) -> Size) -> Vec<HostEvent> {
        std::mem::take(&mut self.measures)
            .into_iter()
            .filter(|m| !m.is_cancelled())
            .map(|m| HostEvent::Measured {
                id: m.id,
                size: size_of(&m.glyph),
            })
            .collect()
    }

    /// Complete live measurements for the listed glyphs only.
    pub fn measure_only(&mut self, glyphs: &[&str], size: Size) -> Vec<HostEvent> {
        let mut events = Vec::new();
        self.measures.retain(|m| {
            if m.is_cancelled() {
                return false;
            }
            if glyphs.contains(&m.glyph.as_str()) {
                events.push(HostEvent::Measured { id: m.id, size });
                false
            } else {
                true
            }
        });
        events
    }

    /// Signal idleness for every live deferral.
    pub fn settle_interactions(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.deferrals)
            .into_iter()
            .filter(|d| !d.is_cancelled())
            .map(|d| HostEvent::InteractionsIdle { id: d.id })
            .collect()
    }

    /// Signal idleness for every deferral, including cancelled ones.
    ///
    /// Models a host that ignores cancellation tokens.
    pub fn settle_interactions_unchecked(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.deferrals)
            .into_iter()
            .map(|d| HostEvent::InteractionsIdle { id: d.id })
            .collect()
    }
}

impl MeasureService for ScriptedHost {
    fn measure_offscreen(&mut self, request: MeasureRequest<'_>) -> Registration {
        self.measure_requests += 1;
        let (registration, token) = self.ids.issue();
        self.measures.push(PendingMeasure {
            id: registration.id(),
            glyph: request.glyph.to_owned(),
            token,
        });
        registration
    }
}

impl InteractionService for ScriptedHost {
    fn run_after_interactions(&mut self) -> Registration {
        self.deferral_requests += 1;
        let (registration, token) = self.ids.issue();
        self.deferrals.push(PendingDeferral {
            id: registration.id(),
            token,
        });
        registration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{TextProps, TextStyle};

    fn request<'a>(glyph: &'a str, style: &'a TextStyle, props: &'a TextProps) -> MeasureRequest<'a> {
        MeasureRequest {
            glyph,
            style,
            props,
        }
    }

    #[test]
    fn cancelled_measures_are_not_delivered() {
        let style = TextStyle::default();
        let props = TextProps::default();
        let mut host = ScriptedHost::new();
        let keep = host.measure_offscreen(request("1", &style, &props));
        let dropped = host.measure_offscreen(request("2", &style, &props));
        drop(dropped);

        assert_eq!(host.pending_glyphs(), vec!["1".to_string()]);
        let events = host.measure_all(|_| Size::new(1.0, 1.0));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id(), keep.id());
        assert_eq!(host.measure_requests(), 2);
    }

    #[test]
    fn measure_only_leaves_others_queued() {
        let style = TextStyle::default();
        let props = TextProps::default();
        let mut host = ScriptedHost::new();
        let _a = host.measure_offscreen(request("a", &style, &props));
        let _b = host.measure_offscreen(request("b", &style, &props));

        let events = host.measure_only(&["b"], Size::new(2.0, 1.0));
        assert_eq!(events.len(), 1);
        assert_eq!(host.pending_glyphs(), vec!["a".to_string()]);
    }

    #[test]
    fn unchecked_settle_includes_cancelled() {
        let mut host = ScriptedHost::new();
        let live = host.run_after_interactions();
        drop(host.run_after_interactions());
        assert_eq!(host.pending_deferrals().len(), 1);
        assert_eq!(host.settle_interactions_unchecked().len(), 2);
        assert!(host.settle_interactions().is_empty());
        assert_eq!(host.deferral_requests(), 2);
        drop(live);
    }
}
