// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Convert exported direct message archives to Markdown and e-books.
//!
//! An archive is a text file with one message per line and three
//! tab-separated fields: timestamp, sender and text. This crate turns it into
//! a Markdown document grouped under month and day headings, then hands the
//! document to an external generator to produce an EPUB.
//!
//! # Overview
//!
//! 1. [`parser`] splits lines into records, recovering from malformed lines
//! 2. [`renderer`] assembles the document, using [`heading`], [`date`],
//!    [`text`] and [`style`] for the individual parts
//! 3. [`export`] runs the document generator
//!
//! # Example
//!
//! ```
//! use dm2epub::{renderer, style::StyleMap};
//!
//! let archive = "2019-05-08T08:27:07.472Z\talice\tsee http://example.com/x.html\n";
//! let styles = StyleMap::from_config("alice:sender2").unwrap();
//!
//! let markdown = renderer::render_archive(archive, &styles).unwrap();
//! assert!(markdown.contains("[http://example.com/x.html](http://example.com/x.html)"));
//! ```
//!
//! # Modules
//!
//! - [`parser`]: line splitting and malformed-line recovery
//! - [`date`]: timestamp parsing and display forms
//! - [`text`]: message body escaping and linkification
//! - [`style`]: sender to CSS class mapping
//! - [`heading`]: month and day section headings
//! - [`renderer`]: Markdown document assembly
//! - [`export`]: e-book generation via `pandoc`

#![deny(missing_docs)]

pub mod date;
pub mod export;
pub mod heading;
pub mod parser;
pub mod renderer;
pub mod style;
pub mod text;
