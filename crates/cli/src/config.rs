//! Settings layered from the environment and the command line.

use anyhow::{Context, Result};
use livelocator_domain::{ProviderConfig, ProviderPriority, TrackerConfig};
use serde::Serialize;
use tracing::warn;

/// Provider and tracker settings before validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub priority: ProviderPriority,
    pub interval_ms: u64,
    pub fastest_interval_ms: u64,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let provider = ProviderConfig::default();
        Self {
            priority: provider.priority,
            interval_ms: provider.interval_ms,
            fastest_interval_ms: provider.fastest_interval_ms,
            fill_color: None,
            stroke_color: None,
        }
    }
}

/// Reads `key` through `lookup` and parses it, keeping `fallback` when the
/// variable is unset or malformed.
fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    fallback: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Ignoring malformed setting");
            fallback
        }),
        None => fallback,
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by the `LOCATOR_*` variables `lookup` returns.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            priority: parsed(&lookup, "LOCATOR_PRIORITY", defaults.priority),
            interval_ms: parsed(&lookup, "LOCATOR_INTERVAL_MS", defaults.interval_ms),
            fastest_interval_ms: parsed(
                &lookup,
                "LOCATOR_FASTEST_INTERVAL_MS",
                defaults.fastest_interval_ms,
            ),
            fill_color: lookup("LOCATOR_FILL_COLOR"),
            stroke_color: lookup("LOCATOR_STROKE_COLOR"),
        }
    }

    /// Applies command line overrides on top.
    #[must_use]
    pub fn with_overrides(
        mut self,
        priority: Option<ProviderPriority>,
        interval_ms: Option<u64>,
        fastest_interval_ms: Option<u64>,
    ) -> Self {
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(interval_ms) = interval_ms {
            self.interval_ms = interval_ms;
            // a lone --interval-ms should not trip the fastest > interval check
            if fastest_interval_ms.is_none() && self.fastest_interval_ms > interval_ms {
                self.fastest_interval_ms = interval_ms;
            }
        }
        if let Some(fastest_interval_ms) = fastest_interval_ms {
            self.fastest_interval_ms = fastest_interval_ms;
        }
        self
    }

    pub fn provider_config(&self) -> Result<ProviderConfig> {
        ProviderConfig::new(self.priority, self.interval_ms, self.fastest_interval_ms)
            .context("Invalid provider settings")
    }

    pub fn tracker_config(&self) -> Result<TrackerConfig> {
        let mut builder = TrackerConfig::builder();
        if let Some(fill) = &self.fill_color {
            builder = builder.fill_color(fill.clone());
        }
        if let Some(stroke) = &self.stroke_color {
            builder = builder.stroke_color(stroke.clone());
        }
        builder.build().context("Invalid tracker colours")
    }
}
