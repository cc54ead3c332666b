//! Think time formatters
//!
//! The session controller reads think times as short textual
//! distribution descriptions, e.g. `n(3000 300)` for a normal distribution
//! with mean 3000ms and deviation 300ms. One formatter exists per
//! [`ThinkTimeKind`]; the [`ThinkTimeFormatters`] registry is built by the
//! caller and handed to the matrix builder.

use std::collections::HashMap;
use workload_types::{ThinkTime, ThinkTimeKind};

/// Renders think times of one kind
pub trait ThinkTimeFormatter: Send + Sync {
    /// The kind this formatter renders
    fn kind(&self) -> ThinkTimeKind;

    /// Render a think time; `None` if it is not of this formatter's kind
    fn format(&self, think_time: &ThinkTime) -> Option<String>;

    /// Rendering used for cells without a transition
    fn default_think_time(&self) -> String;
}

// ── Built-in formatters ──────────────────────────────────────────────

/// `n(<mean> <deviation>)`
#[derive(Clone, Copy, Debug, Default)]
pub struct NormalThinkTimeFormatter;

impl ThinkTimeFormatter for NormalThinkTimeFormatter {
    fn kind(&self) -> ThinkTimeKind {
        ThinkTimeKind::Normal
    }

    fn format(&self, think_time: &ThinkTime) -> Option<String> {
        match think_time {
            ThinkTime::Normal { mean, deviation } => Some(format!(
                "n({} {})",
                format_millis(*mean),
                format_millis(*deviation)
            )),
            _ => None,
        }
    }

    fn default_think_time(&self) -> String {
        "n(0 0)".to_string()
    }
}

/// `u(<min> <max>)`
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformThinkTimeFormatter;

impl ThinkTimeFormatter for UniformThinkTimeFormatter {
    fn kind(&self) -> ThinkTimeKind {
        ThinkTimeKind::Uniform
    }

    fn format(&self, think_time: &ThinkTime) -> Option<String> {
        match think_time {
            ThinkTime::Uniform { min, max } => Some(format!(
                "u({} {})",
                format_millis(*min),
                format_millis(*max)
            )),
            _ => None,
        }
    }

    fn default_think_time(&self) -> String {
        "u(0 0)".to_string()
    }
}

/// Whole milliseconds print without a fractional part
fn format_millis(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

// ── Registry ─────────────────────────────────────────────────────────

/// Formatters keyed by think time kind
pub struct ThinkTimeFormatters {
    formatters: HashMap<ThinkTimeKind, Box<dyn ThinkTimeFormatter>>,
}

impl ThinkTimeFormatters {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    /// A registry with the normal and uniform formatters
    pub fn with_defaults() -> Self {
        Self::new()
            .with(Box::new(NormalThinkTimeFormatter))
            .with(Box::new(UniformThinkTimeFormatter))
    }

    /// Register a formatter, replacing any previous one of the same kind
    pub fn register(&mut self, formatter: Box<dyn ThinkTimeFormatter>) {
        self.formatters.insert(formatter.kind(), formatter);
    }

    pub fn with(mut self, formatter: Box<dyn ThinkTimeFormatter>) -> Self {
        self.register(formatter);
        self
    }

    pub fn get(&self, kind: &ThinkTimeKind) -> Option<&dyn ThinkTimeFormatter> {
        self.formatters.get(kind).map(|f| f.as_ref())
    }

    pub fn contains(&self, kind: &ThinkTimeKind) -> bool {
        self.formatters.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}

impl Default for ThinkTimeFormatters {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ThinkTimeFormatters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.formatters.keys().collect();
        kinds.sort();
        f.debug_struct("ThinkTimeFormatters")
            .field("kinds", &kinds)
            .finish()
    }
}
