#![forbid(unsafe_code)]

//! Ticker configuration.

use std::time::Duration;

use odometer_core::style::{ContainerStyle, TextProps, TextStyle};

/// Base duration of one roll before jitter.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(300);

/// Quiet period between the last glyph measurement and switching to
/// animated rendering.
pub const DEFAULT_SETTLE_WINDOW: Duration = Duration::from_millis(1500);

/// Duration of the slot frame resize when the target glyph's box changes.
pub const DEFAULT_RESIZE_DURATION: Duration = Duration::from_millis(50);

/// Symbols that share a reel with the digits.
pub const NUMERIC_EXTRAS: &[&str] = &["-", ",", ".", "k", "M", "G", "T", "P", "E"];

/// Roll duration multipliers drawn per transition.
pub const DEFAULT_JITTER_FACTORS: &[u32] = &[1, 2];

/// Configuration for a [`Ticker`](crate::Ticker).
#[derive(Debug, Clone, PartialEq)]
pub struct TickerConfig {
    /// Base roll duration.
    pub duration: Duration,
    /// Debounce between the last measurement and animated rendering.
    pub settle_window: Duration,
    /// Slot frame resize duration.
    pub resize_duration: Duration,
    /// Symbols included in every numeric reel after the digits.
    pub numeric_extras: Vec<String>,
    /// Caller-supplied symbols appended to the numeric reel.
    pub additional_display_items: Vec<String>,
    /// Roll duration multipliers.
    pub jitter_factors: Vec<u32>,
    /// Seed for roll jitter.
    pub seed: u64,
    /// Style of the slot row.
    pub container_style: ContainerStyle,
    /// Style of every glyph.
    pub text_style: TextStyle,
    /// Host properties forwarded to every glyph.
    pub text_props: TextProps,
    /// Label exposed to assistive technology.
    pub accessibility_label: Option<String>,
    /// Reject reels that do not contain their target instead of clamping.
    pub strict_reels: bool,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            settle_window: DEFAULT_SETTLE_WINDOW,
            resize_duration: DEFAULT_RESIZE_DURATION,
            numeric_extras: NUMERIC_EXTRAS.iter().map(|s| (*s).to_owned()).collect(),
            additional_display_items: Vec::new(),
            jitter_factors: DEFAULT_JITTER_FACTORS.to_vec(),
            seed: 0,
            container_style: ContainerStyle::default(),
            text_style: TextStyle::default(),
            text_props: TextProps::default(),
            accessibility_label: None,
            strict_reels: cfg!(debug_assertions),
        }
    }
}

impl TickerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base roll duration.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the measurement settle window.
    #[must_use]
    pub fn settle_window(mut self, window: Duration) -> Self {
        self.settle_window = window;
        self
    }

    /// Set the slot resize duration.
    #[must_use]
    pub fn resize_duration(mut self, duration: Duration) -> Self {
        self.resize_duration = duration;
        self
    }

    /// Replace the built-in numeric extras.
    #[must_use]
    pub fn numeric_extras<I, S>(mut self, extras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_extras = extras.into_iter().map(Into::into).collect();
        self
    }

    /// Append symbols to the numeric reel (e.g. currency or unit suffixes).
    #[must_use]
    pub fn additional_display_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additional_display_items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Set the jitter multipliers.
    #[must_use]
    pub fn jitter_factors(mut self, factors: impl Into<Vec<u32>>) -> Self {
        self.jitter_factors = factors.into();
        self
    }

    /// Set the jitter seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the container style.
    #[must_use]
    pub fn container_style(mut self, style: ContainerStyle) -> Self {
        self.container_style = style;
        self
    }

    /// Set the glyph style.
    #[must_use]
    pub fn text_style(mut self, style: TextStyle) -> Self {
        self.text_style = style;
        self
    }

    /// Set the host properties forwarded to every glyph.
    #[must_use]
    pub fn text_props(mut self, props: TextProps) -> Self {
        self.text_props = props;
        self
    }

    /// Set the accessibility label.
    #[must_use]
    pub fn accessibility_label(mut self, label: impl Into<String>) -> Self {
        self.accessibility_label = Some(label.into());
        self
    }

    /// Choose between rejecting (`true`) and clamping (`false`) reels that
    /// miss their target glyph.
    #[must_use]
    pub fn strict_reels(mut self, strict: bool) -> Self {
        self.strict_reels = strict;
        self
    }
}
