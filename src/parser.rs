// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Line parsing for tab-separated message archives.
//!
//! Each archive line holds three tab-separated fields: an ISO-8601
//! timestamp, the sender and the message text. Lines that do not split into
//! exactly three fields never abort a conversion. They are reported through
//! `tracing` and replaced with a fallback [`Record`] that carries the last
//! good timestamp, the [`UNKNOWN_SENDER`] sentinel and the raw line.
//!
//! # Example
//!
//! ```
//! use dm2epub::parser::{LineParser, UNKNOWN_SENDER};
//!
//! let mut parser = LineParser::new();
//! let first = parser.parse_line("2019-05-08T08:27:07.472Z\talice\thi");
//! assert_eq!(first.sender, "alice");
//!
//! let broken = parser.parse_line("truncated");
//! assert_eq!(broken.sender, UNKNOWN_SENDER);
//! assert_eq!(broken.timestamp.as_deref(), Some("2019-05-08T08:27:07.472Z"));
//! ```

use std::borrow::Cow;
use tracing::warn;

/// Sender recorded for lines that could not be parsed.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// A single message from the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number in the archive.
    pub line: usize,

    /// The raw timestamp field.
    ///
    /// `None` only for a malformed line seen before any well-formed one.
    pub timestamp: Option<String>,

    /// The sender's name.
    pub sender: String,

    /// The raw message text.
    pub text: String,
}

/// Splits archive lines into [`Record`]s, remembering the last good timestamp.
///
/// One parser is used per conversion run so that fallback timestamps never
/// leak between runs.
#[derive(Debug, Clone, Default)]
pub struct LineParser {
    last_timestamp: Option<String>,
    line: usize,
}

impl LineParser {
    /// Creates a parser with no timestamp seen yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The timestamp of the most recent well-formed line.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<&str> {
        self.last_timestamp.as_deref()
    }

    /// Parses the next line of the archive.
    ///
    /// A trailing `\r` or `\n` is ignored. Malformed lines produce a
    /// fallback record and a warning; this function never fails.
    pub fn parse_line(&mut self, raw: &str) -> Record {
        self.line += 1;
        let line = raw.trim_end_matches(['\r', '\n']);

        let fields: Vec<&str> = line.split('\t').collect();
        if let [timestamp, sender, text] = fields.as_slice() {
            self.last_timestamp = Some((*timestamp).to_owned());
            return Record {
                line: self.line,
                timestamp: Some((*timestamp).to_owned()),
                sender: (*sender).to_owned(),
                text: (*text).to_owned(),
            };
        }

        warn!(
            line = self.line,
            fields = fields.len(),
            record = line,
            "malformed record, expected 3 tab-separated fields"
        );
        Record {
            line: self.line,
            timestamp: self.last_timestamp.clone(),
            sender: UNKNOWN_SENDER.to_owned(),
            text: format!("Error: cannot parse line {}: {line}", self.line),
        }
    }
}

/// Decodes raw archive bytes as UTF-8.
///
/// Invalid byte sequences are replaced with U+FFFD and reported, so a single
/// bad byte only affects the line it appears on.
#[must_use]
pub fn decode_archive(bytes: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(bytes);
    if matches!(text, Cow::Owned(_)) {
        let lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains(char::REPLACEMENT_CHARACTER))
            .map(|(i, _)| (i + 1).to_string())
            .collect::<Vec<_>>()
            .join(",");
        warn!(lines = %lines, "archive contains invalid UTF-8, replaced with U+FFFD");
    }
    text
}

/// Parses a whole archive, one record per line, in input order.
#[must_use]
pub fn parse_archive(input: &str) -> Vec<Record> {
    let mut parser = LineParser::new();
    input.lines().map(|line| parser.parse_line(line)).collect()
}
