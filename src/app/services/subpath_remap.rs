//! Scan file path relocation
//!
//! Data files store the absolute path of the scan file used to drive the
//! instrument. When the storage layout moves, those paths are rewritten by an
//! ordered list of literal substring replacements.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// One literal replacement: every occurrence of `from` becomes `to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubpathRule {
    pub from: String,
    pub to: String,
}

impl SubpathRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl FromStr for SubpathRule {
    type Err = Error;

    /// Parse `FROM=TO`
    fn from_str(s: &str) -> Result<Self> {
        let (from, to) = s.split_once('=').ok_or_else(|| {
            Error::configuration(format!("Invalid subpath remap '{}', expected FROM=TO", s))
        })?;
        if from.is_empty() {
            return Err(Error::configuration(format!(
                "Invalid subpath remap '{}': FROM cannot be empty",
                s
            )));
        }
        Ok(SubpathRule::new(from, to))
    }
}

/// Ordered set of subpath replacements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubpathRemapper {
    rules: Vec<SubpathRule>,
}

impl SubpathRemapper {
    pub fn new(rules: Vec<SubpathRule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: SubpathRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[SubpathRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order; later rules see the output of earlier ones
    pub fn apply(&self, file_path: &str) -> String {
        let mut new_path = file_path.to_string();

        for rule in &self.rules {
            if rule.from.is_empty() {
                continue;
            }
            new_path = new_path.replace(&rule.from, &rule.to);
            debug!(
                "Scan file (updated path): {} <WAS: {}, NOW: {}>",
                new_path, rule.from, rule.to
            );
        }

        debug!("Scan file (updated path): {}", new_path);
        new_path
    }
}

impl FromIterator<SubpathRule> for SubpathRemapper {
    fn from_iter<I: IntoIterator<Item = SubpathRule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
