// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Mapping of senders to CSS style classes.
//!
//! The mapping is given as comma-separated `name:class` pairs, for example
//! `alice:sender2,bob:sender3`. Senders without an entry use
//! [`DEFAULT_CLASS`].

use snafu::prelude::*;
use std::collections::HashMap;

/// Style class used for senders missing from the map.
pub const DEFAULT_CLASS: &str = "sender1";

/// Error type for malformed style configuration.
#[derive(Debug, Snafu)]
pub enum StyleError {
    /// A pair is not of the form `name:class`.
    #[snafu(display("invalid style pair {pair:?}: expected name:class"))]
    InvalidPair {
        /// The offending pair as written.
        pair: String,
    },
}

/// Read-only lookup from sender name to style class.
///
/// # Example
///
/// ```
/// use dm2epub::style::StyleMap;
///
/// let styles = StyleMap::from_config("alice:sender2").unwrap();
/// assert_eq!(styles.class_for("alice"), "sender2");
/// assert_eq!(styles.class_for("mallory"), "sender1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    classes: HashMap<String, String>,
}

impl StyleMap {
    /// Builds the map from a comma-separated list of `name:class` pairs.
    ///
    /// Whitespace around names and classes is ignored, as are empty entries.
    /// The class is taken after the last colon, so names may contain colons.
    /// A later pair for the same name replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns an error if a pair has no colon or an empty name or class.
    pub fn from_config(config: &str) -> Result<Self, StyleError> {
        let mut classes = HashMap::new();
        for pair in config.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, class) = pair
                .rsplit_once(':')
                .map(|(n, c)| (n.trim(), c.trim()))
                .filter(|(n, c)| !n.is_empty() && !c.is_empty())
                .context(InvalidPairSnafu { pair })?;
            classes.insert(name.to_owned(), class.to_owned());
        }
        Ok(Self { classes })
    }

    /// Returns the style class for `sender`, or [`DEFAULT_CLASS`].
    #[must_use]
    pub fn class_for(&self, sender: &str) -> &str {
        self.classes.get(sender).map_or(DEFAULT_CLASS, String::as_str)
    }

    /// Number of configured senders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no sender is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_configured_sender() {
        let styles = StyleMap::from_config("alice:sender2").unwrap();
        assert_eq!(styles.class_for("alice"), "sender2");
    }

    #[test]
    fn falls_back_to_default_class() {
        let styles = StyleMap::from_config("alice:sender2").unwrap();
        assert_eq!(styles.class_for("bob"), DEFAULT_CLASS);
        assert_eq!(StyleMap::default().class_for("alice"), "sender1");
    }

    #[test]
    fn parses_multiple_pairs_with_whitespace() {
        let styles = StyleMap::from_config(" alice : sender2 , bob:sender3,").unwrap();
        assert_eq!(styles.len(), 2);
        assert_eq!(styles.class_for("alice"), "sender2");
        assert_eq!(styles.class_for("bob"), "sender3");
    }

    #[test]
    fn allows_colons_in_names() {
        let styles = StyleMap::from_config("team:ops:sender4").unwrap();
        assert_eq!(styles.class_for("team:ops"), "sender4");
    }

    #[test]
    fn empty_config_is_empty_map() {
        assert!(StyleMap::from_config("").unwrap().is_empty());
    }

    #[test]
    fn rejects_pair_without_colon() {
        let err = StyleMap::from_config("alice").unwrap_err();
        assert!(err.to_string().contains("\"alice\""));
    }

    #[test]
    fn rejects_empty_name_or_class() {
        assert!(StyleMap::from_config(":sender2").is_err());
        assert!(StyleMap::from_config("alice:").is_err());
    }
}
