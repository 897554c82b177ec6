// src/modifiers/mod.rs

//! Content modifier pipeline
//!
//! Every piece of text materialized from a config map runs through a list
//! of [`Modifier`]s before being written to disk. Modifiers currently only
//! detect: they accumulate a report of patterns worth a human's attention
//! (today, embedded absolute URLs) and never rewrite content. The registry
//! is built per generation run and handed back to the caller with the
//! finished compose file.

mod url;

pub use url::UrlReplacer;

use crate::error::Result;
use std::collections::BTreeMap;

/// A stateful content scanner applied during volume materialization.
pub trait Modifier {
    /// Human-readable name used when surfacing the detection report.
    fn name(&self) -> &str;

    /// Scan one piece of content, accumulating detections. Detections are
    /// never rolled back, even if a later generation step fails.
    fn detect(&mut self, input: &str) -> Result<()>;

    /// All distinct detected patterns, mapped to their (future) replacement.
    fn detections(&self) -> &BTreeMap<String, String>;

    /// Whether this modifier has rewritten any content. Always false for
    /// detection-only modifiers.
    fn is_applied(&self) -> bool;
}

/// The default pipeline for a generation run.
pub fn default_pipeline() -> Vec<Box<dyn Modifier>> {
    vec![Box::new(UrlReplacer::new())]
}
