#![forbid(unsafe_code)]

//! Glyph measurement cache.
//!
//! This module provides [`GlyphMeasurements`], which asks the host to lay out
//! every glyph a ticker may display exactly once, collects the reported boxes
//! into a [`MeasureMap`], and decides when the ticker may switch from its
//! placeholder rendering to animated slots.
//!
//! # Generations
//!
//! The set of required glyphs is versioned. [`GlyphMeasurements::sync`]
//! compares a new set against the current one:
//!
//! | new set                 | outcome                 | requests            |
//! |-------------------------|-------------------------|---------------------|
//! | equal                   | [`SyncOutcome::Unchanged`] | none             |
//! | strict superset         | [`SyncOutcome::Extended`]  | new glyphs only  |
//! | anything else           | [`SyncOutcome::Rebuilt`]   | missing glyphs; dropped glyphs are forgotten and their requests released |
//!
//! Entries are never evicted one by one. A text style change goes through
//! [`GlyphMeasurements::invalidate`], which starts over.
//!
//! # Completion
//!
//! ```text
//! Measuring ──last box arrives──▶ Settling(window) ──tick ≥ window──▶ Complete
//!     ▲                                │                                 │
//!     └────────── new glyph required ──┴─────────────────────────────────┘
//! ```
//!
//! Completion is monotonic within a generation: only a sync that introduces
//! an unmeasured glyph moves the phase back to `Measuring`.
//!
//! # Failure Modes
//!
//! - A host that never reports a glyph keeps the phase at `Measuring`
//!   forever; the ticker stays in placeholder mode, which is always valid.
//! - Reports for unknown or released ids are counted as stale and ignored.

use std::time::Duration;

use odometer_core::geometry::Size;
use odometer_core::host::{MeasureRequest, MeasureService, Registration, RegistrationId};
use odometer_core::style::{TextProps, TextStyle};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::reel::Glyph;

/// Measured boxes keyed by glyph.
#[derive(Debug, Clone, Default)]
pub struct MeasureMap {
    entries: FxHashMap<Glyph, Size>,
}

impl MeasureMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Measured box of `glyph`.
    pub fn get(&self, glyph: &str) -> Option<Size> {
        self.entries.get(glyph).copied()
    }

    /// Whether `glyph` has been measured.
    pub fn contains(&self, glyph: &str) -> bool {
        self.entries.contains_key(glyph)
    }

    /// Number of measured glyphs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been measured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate measured glyphs.
    pub fn iter(&self) -> impl Iterator<Item = (&Glyph, Size)> {
        self.entries.iter().map(|(g, s)| (g, *s))
    }

    fn insert(&mut self, glyph: Glyph, size: Size) {
        self.entries.insert(glyph, size);
    }

    fn retain(&mut self, keep: impl Fn(&Glyph) -> bool) {
        self.entries.retain(|g, _| keep(g));
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

impl FromIterator<(Glyph, Size)> for MeasureMap {
    fn from_iter<I: IntoIterator<Item = (Glyph, Size)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Result of [`GlyphMeasurements::sync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Same glyph set; nothing requested.
    Unchanged,
    /// New glyphs were added to the set.
    Extended {
        /// Measurement requests issued.
        requested: usize,
    },
    /// The set changed in some other way.
    Rebuilt {
        /// Measurement requests issued.
        requested: usize,
    },
}

impl SyncOutcome {
    /// Measurement requests issued by this sync.
    pub fn requested(&self) -> usize {
        match *self {
            Self::Unchanged => 0,
            Self::Extended { requested } | Self::Rebuilt { requested } => requested,
        }
    }
}

/// Measurement progress for the current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurePhase {
    /// At least one required glyph has no box yet.
    Measuring,
    /// Every glyph is measured; waiting out the settle window.
    Settling {
        /// Time left before completion.
        remaining: Duration,
    },
    /// Ready for animated rendering.
    Complete,
}

/// Counters about measurement traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeasureStats {
    /// Current generation.
    pub generation: u64,
    /// Distinct glyphs required.
    pub required: usize,
    /// Required glyphs with a box.
    pub measured: usize,
    /// Measurement requests issued since creation.
    pub requests: u64,
    /// Reports ignored because their id was unknown.
    pub stale_reports: u64,
}

#[derive(Debug)]
struct InFlight {
    glyph: Glyph,
    // Held for its drop: releasing it cancels the host request.
    _registration: Registration,
}

/// Owns the measurement map and drives measurement for one ticker.
#[derive(Debug)]
pub struct GlyphMeasurements {
    map: MeasureMap,
    required: Vec<Glyph>,
    required_set: FxHashSet<Glyph>,
    in_flight: FxHashMap<RegistrationId, InFlight>,
    generation: u64,
    phase: MeasurePhase,
    settle_window: Duration,
    requests: u64,
    stale_reports: u64,
}

impl GlyphMeasurements {
    /// Create an empty cache with the given settle window.
    pub fn new(settle_window: Duration) -> Self {
        Self {
            map: MeasureMap::new(),
            required: Vec::new(),
            required_set: FxHashSet::default(),
            in_flight: FxHashMap::default(),
            generation: 0,
            phase: MeasurePhase::Measuring,
            settle_window,
            requests: 0,
            stale_reports: 0,
        }
    }

    /// The measured boxes.
    pub fn map(&self) -> &MeasureMap {
        &self.map
    }

    /// The required glyphs, in first-seen order.
    pub fn required(&self) -> &[Glyph] {
        &self.required
    }

    /// Glyphs with a request still in flight, in required order.
    pub fn in_flight(&self) -> impl Iterator<Item = &Glyph> {
        let pending: FxHashSet<&Glyph> = self.in_flight.values().map(|f| &f.glyph).collect();
        self.required.iter().filter(move |g| pending.contains(g))
    }

    /// Number of requests in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Required glyphs without a box.
    pub fn missing(&self) -> impl Iterator<Item = &Glyph> {
        self.required.iter().filter(|g| !self.map.contains(g.as_str()))
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current phase.
    pub fn phase(&self) -> MeasurePhase {
        self.phase
    }

    /// Whether the ticker may render animated slots.
    pub fn is_complete(&self) -> bool {
        self.phase == MeasurePhase::Complete
    }

    /// Traffic counters.
    pub fn stats(&self) -> MeasureStats {
        MeasureStats {
            generation: self.generation,
            required: self.required.len(),
            measured: self.required.len() - self.missing().count(),
            requests: self.requests,
            stale_reports: self.stale_reports,
        }
    }

    /// Bring the required glyph set in line with `required`.
    pub fn sync<M>(
        &mut self,
        required: &[Glyph],
        style: &TextStyle,
        props: &TextProps,
        host: &mut M,
    ) -> SyncOutcome
    where
        M: MeasureService + ?Sized,
    {
        let next: FxHashSet<Glyph> = required.iter().cloned().collect();
        if next == self.required_set {
            self.required = required.to_vec();
            self.refresh_phase();
            return SyncOutcome::Unchanged;
        }

        let extends = self.required_set.is_subset(&next);
        self.generation += 1;
        self.required = required.to_vec();
        self.required_set = next;

        if !extends {
            let keep = &self.required_set;
            self.map.retain(|g| keep.contains(g));
            self.in_flight.retain(|_, f| keep.contains(&f.glyph));
        }

        let requested = self.request_missing(style, props, host);
        tracing::debug!(
            generation = self.generation,
            required = self.required.len(),
            requested,
            extends,
            "glyph set changed"
        );
        self.refresh_phase();

        if extends {
            SyncOutcome::Extended { requested }
        } else {
            SyncOutcome::Rebuilt { requested }
        }
    }

    /// Forget every box and re-measure the whole set (style change).
    pub fn invalidate<M>(&mut self, style: &TextStyle, props: &TextProps, host: &mut M) -> usize
    where
        M: MeasureService + ?Sized,
    {
        self.generation += 1;
        self.map.clear();
        self.in_flight.clear();
        let requested = self.request_missing(style, props, host);
        tracing::debug!(generation = self.generation, requested, "measurements invalidated");
        self.phase = MeasurePhase::Measuring;
        self.refresh_phase();
        requested
    }

    /// Record a box reported by the host.
    ///
    /// Returns `false` for ids this cache is not waiting on.
    pub fn record(&mut self, id: RegistrationId, size: Size) -> bool {
        let Some(flight) = self.in_flight.remove(&id) else {
            self.stale_reports += 1;
            tracing::trace!(id, "stale measurement ignored");
            return false;
        };
        self.map.insert(flight.glyph, size);
        self.refresh_phase();
        true
    }

    /// Advance the settle countdown.
    ///
    /// Returns `true` when this tick completed measurement.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let MeasurePhase::Settling { remaining } = self.phase else {
            return false;
        };
        let remaining = remaining.saturating_sub(dt);
        if remaining.is_zero() {
            self.phase = MeasurePhase::Complete;
            tracing::debug!(generation = self.generation, "measurement complete");
            true
        } else {
            self.phase = MeasurePhase::Settling { remaining };
            false
        }
    }

    /// Release every in-flight request.
    pub fn dispose(&mut self) {
        self.in_flight.clear();
    }

    fn request_missing<M>(&mut self, style: &TextStyle, props: &TextProps, host: &mut M) -> usize
    where
        M: MeasureService + ?Sized,
    {
        let pending: FxHashSet<&Glyph> = self.in_flight.values().map(|f| &f.glyph).collect();
        let wanted: Vec<Glyph> = self
            .required
            .iter()
            .filter(|g| !self.map.contains(g.as_str()) && !pending.contains(g))
            .cloned()
            .collect();

        for glyph in &wanted {
            let registration = host.measure_offscreen(MeasureRequest {
                glyph: glyph.as_str(),
                style,
                props,
            });
            self.in_flight.insert(
                registration.id(),
                InFlight {
                    glyph: glyph.clone(),
                    _registration: registration,
                },
            );
        }
        self.requests += wanted.len() as u64;
        wanted.len()
    }

    fn refresh_phase(&mut self) {
        let missing = self.missing().next().is_some();
        self.phase = match (self.phase, missing) {
            (_, true) => MeasurePhase::Measuring,
            (MeasurePhase::Measuring, false) if self.settle_window.is_zero() => {
                MeasurePhase::Complete
            }
            (MeasurePhase::Measuring, false) => MeasurePhase::Settling {
                remaining: self.settle_window,
            },
            (phase, false) => phase,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odometer_core::host::testing::ScriptedHost;
    use odometer_core::host::HostEvent;

    const SETTLE: Duration = Duration::from_millis(1500);
    const CELL: Size = Size::new(1.0, 1.0);

    fn glyphs(list: &[&str]) -> Vec<Glyph> {
        list.iter().map(|g| Glyph::from(*g)).collect()
    }

    fn sync(cache: &mut GlyphMeasurements, host: &mut ScriptedHost, list: &[&str]) -> SyncOutcome {
        cache.sync(&glyphs(list), &TextStyle::default(), &TextProps::default(), host)
    }

    fn deliver(cache: &mut GlyphMeasurements, events: Vec<HostEvent>) {
        for event in events {
            if let HostEvent::Measured { id, size } = event {
                cache.record(id, size);
            }
        }
    }

    #[test]
    fn first_sync_requests_everything() {
        let mut cache = GlyphMeasurements::new(SETTLE);
        let mut host = ScriptedHost::new();
        let outcome = sync(&mut cache, &mut host, &["1", "2", "3"]);
        assert_eq!(outcome, SyncOutcome::Extended { requested: 3 });
        assert_eq!(host.pending_glyphs(), vec!["1", "2", "3"]);
        assert_eq!(cache.phase(), MeasurePhase::Measuring);
        assert_eq!(cache.generation(), 1);
    }

    #[test]
    fn same_set_is_unchanged() {
        let mut cache = GlyphMeasurements::new(SETTLE);
        let mut host = ScriptedHost::new();
        sync(&mut cache, &mut host, &["a", "b"]);
        let outcome = sync(&mut cache, &mut host, &["b", "a"]);
        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert_eq!(host.measure_requests(), 2);
        assert_eq!(cache.generation(), 1);
    }

    #[test]
    fn completes_after_settle_window() {
        let mut cache = GlyphMeasurements::new(SETTLE);
        let mut host = ScriptedHost::new();
        sync(&mut cache, &mut host, &["a", "b"]);

        deliver(&mut cache, host.measure_only(&["b"], CELL));
        assert_eq!(cache.phase(), MeasurePhase::Measuring);
        deliver(&mut cache, host.measure_all(|_| CELL));
        assert_eq!(cache.phase(), MeasurePhase::Settling { remaining: SETTLE });

        assert!(!cache.tick(Duration::from_millis(1000)));
        assert!(!cache.is_complete());
        assert!(cache.tick(Duration::from_millis(500)));
        assert!(cache.is_complete());
        assert!(!cache.tick(Duration::from_millis(16)));
    }

    #[test]
    fn zero_window_completes_on_last_report() {
        let mut cache = GlyphMeasurements::new(Duration::ZERO);
        let mut host = ScriptedHost::new();
        sync(&mut cache, &mut host, &["a"]);
        deliver(&mut cache, host.measure_all(|_| CELL));
        assert!(cache.is_complete());
    }

    #[test]
    fn extension_measures_only_new_glyphs() {
        let mut cache = GlyphMeasurements::new(Duration::ZERO);
        let mut host = ScriptedHost::new();
        sync(&mut cache, &mut host, &["a", "b"]);
        deliver(&mut cache, host.measure_all(|_| CELL));
        assert!(cache.is_complete());

        let outcome = sync(&mut cache, &mut host, &["a", "b", "c"]);
        assert_eq!(outcome, SyncOutcome::Extended { requested: 1 });
        assert_eq!(host.pending_glyphs(), vec!["c"]);
        assert!(!cache.is_complete());
        assert!(cache.map().contains("a"));
        assert_eq!(cache.generation(), 2);
    }

    #[test]
    fn rebuild_drops_unrequired_and_releases_requests() {
        let mut cache = GlyphMeasurements::new(SETTLE);
        let mut host = ScriptedHost::new();
        sync(&mut cache, &mut host, &["a", "b", "c"]);
        deliver(&mut cache, host.measure_only(&["a"], CELL));

        let outcome = sync(&mut cache, &mut host, &["a", "d"]);
        assert_eq!(outcome, SyncOutcome::Rebuilt { requested: 1 });
        // "b" and "c" were released; "d" is new.
        assert_eq!(host.pending_glyphs(), vec!["d"]);
        assert!(cache.map().contains("a"));
        assert_eq!(cache.in_flight_count(), 1);
    }

    #[test]
    fn shrinking_a_complete_set_stays_complete() {
        let mut cache = GlyphMeasurements::new(Duration::ZERO);
        let mut host = ScriptedHost::new();
        sync(&mut cache, &mut host, &["a", "b"]);
        deliver(&mut cache, host.measure_all(|_| CELL));
        let outcome = sync(&mut cache, &mut host, &["a"]);
        assert_eq!(outcome, SyncOutcome::Rebuilt { requested: 0 });
        assert!(cache.is_complete());
        assert_eq!(cache.map().len(), 1);
    }

    #[test]
    fn in_flight_glyph_not_requested_twice() {
        let mut cache = GlyphMeasurements::new(SETTLE);
        let mut host = ScriptedHost::new();
        sync(&mut cache, &mut host, &["a"]);
        sync(&mut cache, &mut host, &["a", "b"]);
        assert_eq!(host.measure_requests(), 2);
    }

    #[test]
    fn stale_report_is_ignored() {
        let mut cache = GlyphMeasurements::new(SETTLE);
        assert!(!cache.record(77, CELL));
        assert_eq!(cache.stats().stale_reports, 1);
        assert!(cache.map().is_empty());
    }

    #[test]
    fn released_request_report_is_stale() {
        let mut cache = GlyphMeasurements::new(SETTLE);
        let mut host = ScriptedHost::new();
        sync(&mut cache, &mut host, &["a", "b"]);
        let ids: Vec<_> = host.pending_measures().iter().map(|m| m.id).collect();
        sync(&mut cache, &mut host, &["a"]);
        // The host ignored cancellation and reported "b" anyway.
        assert!(!cache.record(ids[1], CELL));
        assert!(!cache.map().contains("b"));
    }

    #[test]
    fn invalidate_remeasures_everything() {
        let mut cache = GlyphMeasurements::new(Duration::ZERO);
        let mut host = ScriptedHost::new();
        sync(&mut cache, &mut host, &["a", "b"]);
        deliver(&mut cache, host.measure_all(|_| CELL));
        assert!(cache.is_complete());

        let requested = cache.invalidate(&TextStyle::default(), &TextProps::default(), &mut host);
        assert_eq!(requested, 2);
        assert!(cache.map().is_empty());
        assert_eq!(cache.phase(), MeasurePhase::Measuring);
    }

    #[test]
    fn never_reported_glyph_stays_measuring() {
        let mut cache = GlyphMeasurements::new(Duration::ZERO);
        let mut host = ScriptedHost::new();
        sync(&mut cache, &mut host, &["a", "b"]);
        deliver(&mut cache, host.measure_only(&["a"], CELL));
        for _ in 0..100 {
            cache.tick(Duration::from_secs(1));
        }
        assert_eq!(cache.phase(), MeasurePhase::Measuring);
        assert_eq!(cache.missing().count(), 1);
    }

    #[test]
    fn dispose_releases_in_flight() {
        let mut cache = GlyphMeasurements::new(SETTLE);
        let mut host = ScriptedHost::new();
        sync(&mut cache, &mut host, &["a", "b"]);
        cache.dispose();
        assert!(host.pending_glyphs().is_empty());
        assert_eq!(cache.in_flight_count(), 0);
    }

    #[test]
    fn empty_set_settles_from_fresh() {
        let mut cache = GlyphMeasurements::new(SETTLE);
        let mut host = ScriptedHost::new();
        assert_eq!(sync(&mut cache, &mut host, &[]), SyncOutcome::Unchanged);
        assert!(matches!(cache.phase(), MeasurePhase::Settling { .. }));
        assert!(cache.tick(SETTLE));
        assert!(cache.is_complete());
        assert_eq!(host.measure_requests(), 0);
    }

    #[test]
    fn in_flight_follows_required_order() {
        let mut cache = GlyphMeasurements::new(SETTLE);
        let mut host = ScriptedHost::new();
        let order = ["q", "w", "e", "r", "t", "y", "u", "i", "o", "p"];
        sync(&mut cache, &mut host, &order);
        deliver(&mut cache, host.measure_only(&["e", "o"], CELL));
        let pending: Vec<&str> = cache.in_flight().map(Glyph::as_str).collect();
        assert_eq!(pending, ["q", "w", "r", "t", "y", "u", "i", "p"]);
    }

    #[test]
    fn stats_track_progress() {
        let mut cache = GlyphMeasurements::new(SETTLE);
        let mut host = ScriptedHost::new();
        sync(&mut cache, &mut host, &["a", "b"]);
        deliver(&mut cache, host.measure_only(&["a"], CELL));
        let stats = cache.stats();
        assert_eq!(stats.required, 2);
        assert_eq!(stats.measured, 1);
        assert_eq!(stats.requests, 2);
    }
}
