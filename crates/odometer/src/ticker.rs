#![forbid(unsafe_code)]

//! Ticker orchestration.
//!
//! [`Ticker`] ties the pieces together for one widget instance:
//!
//! ```text
//! update(children) ──► ReelBuilder ──► SlotSpecs ──► reconcile slots
//!                          │
//!                          └─► required glyphs ──► GlyphMeasurements
//! HostEvent::Measured ───────────────────────────► record box
//! HostEvent::InteractionsIdle ───────────────────► matching slot rolls
//! tick(dt) ──► settle countdown, slot tweens
//! view() ──► placeholder until measured, rolling slots after
//! ```
//!
//! # Invariants
//!
//! 1. Slot count equals the number of slots the reel builder derived from
//!    the latest content.
//! 2. Rolls are only requested while every required glyph is measured and
//!    settled; reaching that state requests a roll on every slot.
//! 3. Re-submitting identical content recreates nothing and requests nothing.
//! 4. After [`dispose`](Ticker::dispose) no host request is made and every
//!    event is ignored.
//!
//! # Failure Modes
//!
//! - A reel without its target: `Err(TickerError::MissingTarget)` when
//!   [`TickerConfig::strict_reels`] is set, otherwise a warning and index 0.
//! - Events after dispose: `handle_event` returns `false`.

use std::time::Duration;

use odometer_core::animation::jitter::{JitterSource, SeededJitter};
use odometer_core::host::{HostEvent, InteractionService, MeasureService};
use odometer_core::style::TextStyle;

use crate::animator::CharacterAnimator;
use crate::config::TickerConfig;
use crate::error::TickerError;
use crate::measure::{GlyphMeasurements, SyncOutcome};
use crate::reel::{ContentNode, Glyph, ReelBuilder, SlotSpec, placeholder, required_glyphs};
use crate::view::{SlotView, TickerView, ViewContent};

/// What an [`update`](Ticker::update) changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Slot count after the update.
    pub slots: usize,
    /// Slots created fresh (new position or different reel).
    pub recreated: usize,
    /// Kept slots whose target position changed.
    pub retargeted: usize,
    /// Trailing slots dropped.
    pub removed: usize,
    /// Effect on the glyph measurement cache.
    pub measure: SyncOutcome,
}

impl UpdateSummary {
    /// Whether the update changed nothing.
    pub fn is_noop(&self) -> bool {
        self.recreated == 0
            && self.retargeted == 0
            && self.removed == 0
            && self.measure == SyncOutcome::Unchanged
    }
}

/// An animated text ticker.
pub struct Ticker {
    config: TickerConfig,
    builder: ReelBuilder,
    children: Vec<ContentNode>,
    placeholder: Vec<Glyph>,
    measurements: GlyphMeasurements,
    slots: Vec<CharacterAnimator>,
    jitter: Box<dyn JitterSource>,
    disposed: bool,
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker")
            .field("slots", &self.slots.len())
            .field("phase", &self.measurements.phase())
            .field("generation", &self.measurements.generation())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl Ticker {
    /// Create a ticker with seeded jitter from `config`.
    pub fn new(config: TickerConfig) -> Self {
        let jitter = SeededJitter::new(config.seed, config.jitter_factors.clone());
        Self::with_jitter(config, jitter)
    }

    /// Create a ticker with a custom jitter source.
    pub fn with_jitter(config: TickerConfig, jitter: impl JitterSource + 'static) -> Self {
        let builder = ReelBuilder::new(&config.numeric_extras, &config.additional_display_items);
        let measurements = GlyphMeasurements::new(config.settle_window);
        Self {
            config,
            builder,
            children: Vec::new(),
            placeholder: Vec::new(),
            measurements,
            slots: Vec::new(),
            jitter: Box::new(jitter),
            disposed: false,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    /// Content from the latest update.
    pub fn children(&self) -> &[ContentNode] {
        &self.children
    }

    /// Character slots in content order.
    pub fn slots(&self) -> &[CharacterAnimator] {
        &self.slots
    }

    /// Glyph measurement state.
    pub fn measurements(&self) -> &GlyphMeasurements {
        &self.measurements
    }

    /// Whether every required glyph is measured and the settle window passed.
    pub fn is_measured(&self) -> bool {
        self.measurements.is_complete()
    }

    /// Whether anything is still moving or waiting to move.
    pub fn is_animating(&self) -> bool {
        !self.disposed
            && (!self.is_measured()
                || self
                    .slots
                    .iter()
                    .any(|s| s.is_rolling() || s.is_resizing() || s.has_pending_roll()))
    }

    /// Whether [`dispose`](Self::dispose) was called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Label for assistive technology.
    pub fn accessibility_label(&self) -> Option<&str> {
        self.config.accessibility_label.as_deref()
    }

    /// Replace the displayed content.
    pub fn update<I, C, H>(&mut self, children: I, host: &mut H) -> Result<UpdateSummary, TickerError>
    where
        I: IntoIterator<Item = C>,
        C: Into<ContentNode>,
        H: MeasureService + InteractionService + ?Sized,
    {
        if self.disposed {
            return Err(TickerError::Disposed);
        }
        let children: Vec<ContentNode> = children.into_iter().map(Into::into).collect();
        let specs = self.builder.build(&children);

        if self.config.strict_reels {
            check_targets(&specs)?;
        }

        let required = required_glyphs(&specs);
        let measure =
            self.measurements
                .sync(&required, &self.config.text_style, &self.config.text_props, host);

        let (recreated, retargeted, removed) = self.reconcile(specs);
        self.placeholder = placeholder(&children);
        self.children = children;

        if self.is_measured() {
            self.sync_frames();
            self.request_rolls(host);
        }

        let summary = UpdateSummary {
            slots: self.slots.len(),
            recreated,
            retargeted,
            removed,
            measure,
        };
        if !summary.is_noop() {
            tracing::debug!(
                slots = summary.slots,
                recreated,
                retargeted,
                removed,
                requested = measure.requested(),
                "ticker content updated"
            );
        }
        Ok(summary)
    }

    /// Route a host completion.
    ///
    /// Returns `true` if the event was expected.
    pub fn handle_event<H>(&mut self, event: HostEvent, host: &mut H) -> bool
    where
        H: InteractionService + ?Sized,
    {
        if self.disposed {
            tracing::trace!(id = event.id(), "event after dispose ignored");
            return false;
        }
        match event {
            HostEvent::Measured { id, size } => {
                let was_measured = self.is_measured();
                let accepted = self.measurements.record(id, size);
                if accepted && !was_measured && self.is_measured() {
                    self.on_measured(host);
                }
                accepted
            }
            HostEvent::InteractionsIdle { id } => {
                let measures = self.measurements.map();
                let started = self.slots.iter_mut().any(|slot| {
                    slot.on_interactions_idle(id, measures, self.config.duration, &mut *self.jitter)
                });
                if !started {
                    tracing::trace!(id, "stale deferral ignored");
                }
                started
            }
        }
    }

    /// Advance the settle countdown and every slot.
    pub fn tick<H>(&mut self, dt: Duration, host: &mut H)
    where
        H: InteractionService + ?Sized,
    {
        if self.disposed {
            return;
        }
        if self.measurements.tick(dt) {
            self.on_measured(host);
        }
        for slot in &mut self.slots {
            slot.tick(dt);
        }
    }

    /// Change the glyph style; every glyph is measured again.
    pub fn set_text_style<H>(&mut self, style: TextStyle, host: &mut H) -> usize
    where
        H: MeasureService + ?Sized,
    {
        if self.disposed || style == self.config.text_style {
            return 0;
        }
        self.config.text_style = style;
        self.measurements
            .invalidate(&self.config.text_style, &self.config.text_props, host)
    }

    /// Render model for the current frame.
    pub fn view(&self) -> TickerView<'_> {
        let content = if self.is_measured() {
            let measures = self.measurements.map();
            ViewContent::Animated(
                self.slots
                    .iter()
                    .map(|slot| SlotView {
                        index: slot.index(),
                        reel: slot.reel(),
                        target: slot.target(),
                        offset: slot.offset(),
                        frame: slot.frame(),
                        cell_height: slot.cell_height(measures),
                    })
                    .collect(),
            )
        } else {
            ViewContent::Placeholder(&self.placeholder)
        };
        TickerView {
            accessibility_label: self.accessibility_label(),
            container_style: &self.config.container_style,
            text_style: &self.config.text_style,
            text_props: &self.config.text_props,
            content,
            measuring: self.measurements.in_flight().collect(),
        }
    }

    /// Release every host registration and stop reacting to events.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for slot in &mut self.slots {
            slot.dispose();
        }
        self.measurements.dispose();
        self.disposed = true;
        tracing::debug!(slots = self.slots.len(), "ticker disposed");
    }

    fn reconcile(&mut self, specs: Vec<SlotSpec>) -> (usize, usize, usize) {
        let mut recreated = 0;
        let mut retargeted = 0;
        let mut old = std::mem::take(&mut self.slots).into_iter();
        for (index, spec) in specs.into_iter().enumerate() {
            match old.next() {
                Some(mut slot) if slot.spec().same_reel(&spec) => {
                    if slot.set_target(spec) {
                        retargeted += 1;
                    }
                    self.slots.push(slot);
                }
                Some(mut slot) => {
                    slot.dispose();
                    recreated += 1;
                    self.slots.push(CharacterAnimator::new(index, spec));
                }
                None => {
                    recreated += 1;
                    self.slots.push(CharacterAnimator::new(index, spec));
                }
            }
        }
        let mut removed = 0;
        for mut slot in old {
            slot.dispose();
            removed += 1;
        }
        (recreated, retargeted, removed)
    }

    fn on_measured<H>(&mut self, host: &mut H)
    where
        H: InteractionService + ?Sized,
    {
        let measures = self.measurements.map();
        for slot in &mut self.slots {
            slot.realign(measures);
        }
        self.sync_frames();
        let requested = self.request_rolls(host);
        tracing::debug!(
            generation = self.measurements.generation(),
            requested,
            "glyphs measured; slots animating"
        );
    }

    fn sync_frames(&mut self) {
        let measures = self.measurements.map();
        for slot in &mut self.slots {
            slot.sync_frame(measures, self.config.resize_duration);
        }
    }

    fn request_rolls<H>(&mut self, host: &mut H) -> usize
    where
        H: InteractionService + ?Sized,
    {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.request_roll(host).then_some(()))
            .count()
    }
}

fn check_targets(specs: &[SlotSpec]) -> Result<(), TickerError> {
    match specs
        .iter()
        .enumerate()
        .find(|(_, spec)| spec.target_index().is_none())
    {
        Some((slot, spec)) => Err(TickerError::MissingTarget {
            slot,
            target: spec.target.clone(),
            reel_len: spec.reel.len(),
        }),
        None => Ok(()),
    }
}
