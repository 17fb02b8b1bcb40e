// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Markdown assembly for message archives.
//!
//! Each message becomes one block of HTML-flavoured Markdown:
//!
//! ```text
//! {heading}<div class=entry><span class={class}>{sender}</span> <span class=namedash>&ndash;</span> {text}&ensp;<span class=datesmall>{date}</span>
//! </div>
//!
//! ```
//!
//! Blocks are written in input order with no merging or reordering. The
//! heading is empty unless the message starts a new day.
//!
//! # Example
//!
//! ```
//! use dm2epub::renderer::render_archive;
//! use dm2epub::style::StyleMap;
//!
//! let styles = StyleMap::from_config("alice:sender2").unwrap();
//! let markdown = render_archive("2019-05-08T08:27:07.472Z\talice\tHi!\n", &styles).unwrap();
//!
//! assert!(markdown.starts_with("## 2019 - May\n\n### Wed 08 May 2019\n\n"));
//! assert!(markdown.contains("<span class=sender2>alice</span>"));
//! assert!(markdown.contains("Hi!&ensp;<span class=datesmall>Wed&nbsp;08&nbsp;May&nbsp;2019&nbsp;08:27</span>"));
//! ```

use crate::date::{self, Timestamp};
use crate::heading::HeadingGrouper;
use crate::parser::{LineParser, Record};
use crate::style::StyleMap;
use crate::text;
use snafu::prelude::*;
use std::fmt::Write;

/// Error type for document rendering failures.
#[derive(Debug, Snafu)]
pub enum RenderError {
    /// A well-formed line carried a timestamp that could not be parsed.
    #[snafu(display("line {line}: {source}"))]
    Timestamp {
        /// 1-based line number in the archive.
        line: usize,
        /// The underlying timestamp error.
        source: date::ParseError,
    },
}

/// Builds the Markdown document one record at a time.
///
/// The assembler owns the per-run parsing and heading state, so independent
/// runs never interfere.
#[derive(Debug)]
pub struct DocumentAssembler<'a> {
    styles: &'a StyleMap,
    parser: LineParser,
    headings: HeadingGrouper,
    out: String,
    blocks: usize,
}

impl<'a> DocumentAssembler<'a> {
    /// Creates an empty document using `styles` for sender classes.
    #[must_use]
    pub fn new(styles: &'a StyleMap) -> Self {
        Self {
            styles,
            parser: LineParser::new(),
            headings: HeadingGrouper::new(),
            out: String::new(),
            blocks: 0,
        }
    }

    /// Parses one archive line and appends its block.
    ///
    /// # Errors
    ///
    /// Returns an error if a well-formed line has an invalid timestamp.
    pub fn push_line(&mut self, line: &str) -> Result<(), RenderError> {
        let record = self.parser.parse_line(line);
        self.push_record(&record)
    }

    /// Appends the block for an already parsed record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record's timestamp cannot be parsed.
    pub fn push_record(&mut self, record: &Record) -> Result<(), RenderError> {
        let timestamp = record
            .timestamp
            .as_deref()
            .map(Timestamp::parse)
            .transpose()
            .context(TimestampSnafu { line: record.line })?;

        let heading = timestamp
            .as_ref()
            .map(|ts| self.headings.heading_for(ts))
            .unwrap_or_default();

        write!(
            self.out,
            "{heading}<div class=entry>{}{}",
            sender_markup(&record.sender, self.styles.class_for(&record.sender)),
            text::sanitize(&record.text)
        )
        .unwrap();
        if let Some(ts) = &timestamp {
            write!(self.out, "&ensp;{}", date_markup(ts)).unwrap();
        }
        self.out.push_str("\n</div>\n\n");
        self.blocks += 1;

        Ok(())
    }

    /// Number of blocks written so far.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.blocks
    }

    /// Returns `true` if no block has been written.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.blocks == 0
    }

    /// Consumes the assembler and returns the finished document.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }
}

/// Renders a complete archive as Markdown.
///
/// This is the main entry point for conversion.
///
/// # Errors
///
/// Returns an error if a well-formed line has an invalid timestamp.
/// Malformed lines are not errors; they become fallback blocks.
pub fn render_archive(input: &str, styles: &StyleMap) -> Result<String, RenderError> {
    let mut doc = DocumentAssembler::new(styles);
    for line in input.lines() {
        doc.push_line(line)?;
    }
    Ok(doc.finish())
}

fn sender_markup(name: &str, class: &str) -> String {
    format!("<span class={class}>{name}</span> <span class=namedash>&ndash;</span> ")
}

/// Date span with non-breaking spaces.
fn date_markup(ts: &Timestamp) -> String {
    format!(
        "<span class=datesmall>{}</span>",
        ts.display().replace(' ', "&nbsp;")
    )
}
