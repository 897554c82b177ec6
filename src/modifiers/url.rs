// src/modifiers/url.rs

//! URL detection in materialized content
//!
//! Config files pulled out of a cluster routinely embed absolute URLs that
//! point at in-cluster or environment-specific hosts. Those will not
//! resolve from a laptop, so every distinct URL-shaped substring is
//! recorded and reported after generation for the user to adjust by hand.

use crate::error::Result;
use crate::modifiers::Modifier;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

/// URL shape: http/https/jdbc scheme, dotted hostname, optional port and path.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?|jdbc)://(?:[A-Za-z0-9-]+\.)+[A-Za-z]{2,}(?::\d+)?(?:/\S*)?").unwrap()
});

/// Detects embedded URLs; does not rewrite content.
#[derive(Debug, Default)]
pub struct UrlReplacer {
    applied: bool,
    replacements: BTreeMap<String, String>,
}

impl UrlReplacer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Modifier for UrlReplacer {
    fn name(&self) -> &str {
        "URL Replacer"
    }

    fn detect(&mut self, input: &str) -> Result<()> {
        for found in URL_REGEX.find_iter(input) {
            let url = found.as_str().to_string();
            debug!(url = %url, "detected embedded URL");
            self.replacements.insert(url.clone(), url);
        }
        Ok(())
    }

    fn detections(&self) -> &BTreeMap<String, String> {
        &self.replacements
    }

    fn is_applied(&self) -> bool {
        self.applied
    }
}
