// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Timestamp parsing and display projections.
//!
//! Archives carry ISO-8601 timestamps with fractional seconds and a trailing
//! `Z`, e.g. `2019-05-08T08:27:07.472Z`. A [`Timestamp`] keeps the raw string
//! next to the parsed value so the year can be sliced straight from the input.
//!
//! # Example
//!
//! ```
//! use dm2epub::date::Timestamp;
//!
//! let ts = Timestamp::parse("2019-05-08T08:27:07.472Z").unwrap();
//! assert_eq!(ts.display(), "Wed 08 May 2019 08:27");
//! assert_eq!(ts.year(), "2019");
//! assert_eq!(ts.month(), "May");
//! assert_eq!(ts.date(), "Wed 08 May 2019");
//! ```

use chrono::NaiveDateTime;
use snafu::prelude::*;

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Error type for timestamp parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// The timestamp does not start with a four digit year.
    #[snafu(display("timestamp {timestamp:?} does not start with YYYY-"))]
    Format {
        /// The offending raw timestamp.
        timestamp: String,
    },

    /// The timestamp could not be parsed as a date and time.
    #[snafu(display("invalid timestamp {timestamp:?}: {source}"))]
    Chrono {
        /// The offending raw timestamp.
        timestamp: String,
        /// The underlying chrono error.
        source: chrono::ParseError,
    },
}

/// A parsed message timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    parsed: NaiveDateTime,
}

impl Timestamp {
    /// Parses a `YYYY-MM-DDTHH:MM:SS.sssZ` timestamp.
    ///
    /// The trailing `Z` is stripped before parsing. Fractional seconds are
    /// optional and preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not begin with a four digit year
    /// or is not a valid ISO-8601 date and time.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let bytes = raw.as_bytes();
        ensure!(
            bytes.len() > 4 && bytes[..4].iter().all(u8::is_ascii_digit) && bytes[4] == b'-',
            FormatSnafu { timestamp: raw }
        );

        let trimmed = raw.strip_suffix('Z').unwrap_or(raw);
        let parsed = NaiveDateTime::parse_from_str(trimmed, ISO_FORMAT)
            .context(ChronoSnafu { timestamp: raw })?;

        Ok(Self {
            raw: raw.to_owned(),
            parsed,
        })
    }

    /// Returns the timestamp exactly as it appeared in the archive.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Full display form, e.g. `Wed 08 May 2019 08:27`.
    #[must_use]
    pub fn display(&self) -> String {
        self.parsed.format("%a %d %b %Y %H:%M").to_string()
    }

    /// The first four characters of the raw timestamp.
    #[must_use]
    pub fn year(&self) -> &str {
        // validated as ASCII digits in `parse`
        &self.raw[..4]
    }

    /// Three letter month abbreviation, e.g. `May`.
    #[must_use]
    pub fn month(&self) -> String {
        self.parsed.format("%b").to_string()
    }

    /// Day-level form without the time, e.g. `Wed 08 May 2019`.
    #[must_use]
    pub fn date(&self) -> String {
        self.parsed.format("%a %d %b %Y").to_string()
    }
}
