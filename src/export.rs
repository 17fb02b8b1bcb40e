// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! E-book generation from the rendered Markdown.
//!
//! The conversion to EPUB is delegated to an external document generator.
//! [`PandocExporter`] drives `pandoc`; other generators can be plugged in by
//! implementing [`Exporter`].

use snafu::prelude::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Error type for e-book generation failures.
#[derive(Debug, Snafu)]
pub enum ExportError {
    /// The generator could not be started (missing or not executable).
    #[snafu(display("failed to run {}: {source}", program.display()))]
    Spawn {
        /// The program that was invoked.
        program: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The generator ran but reported failure.
    #[snafu(display("{} failed: {status}", program.display()))]
    Failed {
        /// The program that was invoked.
        program: PathBuf,
        /// The generator's exit status.
        status: ExitStatus,
    },
}

impl ExportError {
    /// The generator's exit code, if it ran and exited normally.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { status, .. } => status.code(),
            Self::Spawn { .. } => None,
        }
    }
}

/// Book metadata and layout options passed to the generator.
///
/// Unset fields are left out of the generator's command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookMetadata {
    /// Book title.
    pub title: Option<String>,
    /// Book author.
    pub author: Option<String>,
    /// Publication date or year range.
    pub date: Option<String>,
    /// Publisher name.
    pub publisher: Option<String>,
    /// Copyright statement.
    pub rights: Option<String>,
    /// Cover image file.
    pub cover_image: Option<PathBuf>,
    /// Style sheet file.
    pub css: Option<PathBuf>,
    /// Generator template file.
    pub template: Option<PathBuf>,
    /// Markdown placed before the messages, e.g. a title page.
    pub front_matter: Option<PathBuf>,
    /// Markdown dialect of the input, e.g. `markdown-tex_math_dollars`.
    pub markdown_dialect: Option<String>,
    /// Depth of the table of contents; enables the table when set.
    pub toc_depth: Option<u8>,
    /// Heading level at which the book is split into chapters.
    pub split_level: Option<u8>,
}

impl BookMetadata {
    /// Present `key`/`value` pairs of the textual metadata, in a fixed order.
    fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("title", &self.title),
            ("author", &self.author),
            ("date", &self.date),
            ("publisher", &self.publisher),
            ("rights", &self.rights),
        ]
        .into_iter()
        .filter_map(|(key, value)| Some((key, value.as_deref()?)))
    }
}

/// A document generator turning Markdown into an e-book file.
pub trait Exporter {
    /// Human-readable name of the generator.
    fn name(&self) -> &str;

    /// Converts `markdown` into the e-book at `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if the generator cannot be run or fails.
    fn export(
        &self,
        markdown: &Path,
        output: &Path,
        metadata: &BookMetadata,
    ) -> Result<(), ExportError>;
}

/// Generates EPUB files with `pandoc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PandocExporter {
    program: PathBuf,
}

impl Default for PandocExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PandocExporter {
    /// Default markdown dialect when none is configured.
    pub const DEFAULT_DIALECT: &'static str = "markdown";

    /// Uses `pandoc` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("pandoc")
    }

    /// Uses the given program instead of `pandoc`.
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The program that will be invoked.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Builds the argument list for one conversion.
    ///
    /// # Example
    ///
    /// ```
    /// use dm2epub::export::{BookMetadata, PandocExporter};
    /// use std::path::Path;
    ///
    /// let meta = BookMetadata {
    ///     title: Some("Letters".into()),
    ///     ..Default::default()
    /// };
    /// let args = PandocExporter::new().args(Path::new("dm.md"), Path::new("dm.epub"), &meta);
    ///
    /// assert_eq!(args, ["dm.md", "-f", "markdown", "-t", "epub", "-o", "dm.epub", "--metadata=title:Letters"]);
    /// ```
    #[must_use]
    pub fn args(&self, markdown: &Path, output: &Path, metadata: &BookMetadata) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        if let Some(front) = &metadata.front_matter {
            args.push(front.into());
        }
        args.push(markdown.into());

        let dialect = metadata
            .markdown_dialect
            .as_deref()
            .unwrap_or(Self::DEFAULT_DIALECT);
        args.extend(["-f", dialect, "-t", "epub", "-o"].map(OsString::from));
        args.push(output.into());

        for (key, value) in metadata.fields() {
            args.push(format!("--metadata={key}:{value}").into());
        }

        for (flag, path) in [
            ("--epub-cover-image=", &metadata.cover_image),
            ("--css=", &metadata.css),
            ("--template=", &metadata.template),
        ] {
            if let Some(path) = path {
                let mut arg = OsString::from(flag);
                arg.push(path);
                args.push(arg);
            }
        }

        if let Some(depth) = metadata.toc_depth {
            args.push("--toc".into());
            args.push(format!("--toc-depth={depth}").into());
        }
        if let Some(level) = metadata.split_level {
            args.push(format!("--split-level={level}").into());
        }

        args
    }
}

impl Exporter for PandocExporter {
    fn name(&self) -> &str {
        "pandoc"
    }

    fn export(
        &self,
        markdown: &Path,
        output: &Path,
        metadata: &BookMetadata,
    ) -> Result<(), ExportError> {
        let args = self.args(markdown, output, metadata);
        debug!(program = %self.program.display(), ?args, "running document generator");

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .context(SpawnSnafu {
                program: &self.program,
            })?;

        ensure!(
            status.success(),
            FailedSnafu {
                program: &self.program,
                status,
            }
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(metadata: &BookMetadata) -> Vec<String> {
        PandocExporter::new()
            .args(Path::new("out/dm.md"), Path::new("out/dm.epub"), metadata)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn minimal_arguments() {
        assert_eq!(
            args_of(&BookMetadata::default()),
            ["out/dm.md", "-f", "markdown", "-t", "epub", "-o", "out/dm.epub"]
        );
    }

    #[test]
    fn front_matter_comes_first() {
        let meta = BookMetadata {
            front_matter: Some("template/front_matter.md".into()),
            ..Default::default()
        };
        let args = args_of(&meta);

        assert_eq!(args[0], "template/front_matter.md");
        assert_eq!(args[1], "out/dm.md");
    }

    #[test]
    fn passes_all_metadata() {
        let meta = BookMetadata {
            title: Some("Messages".into()),
            author: Some("A. Writer".into()),
            date: Some("2019-2020".into()),
            publisher: Some("Self".into()),
            rights: Some("CC BY".into()),
            cover_image: Some("media/cover.jpg".into()),
            css: Some("template/style.css".into()),
            template: Some("template/epub.html".into()),
            front_matter: None,
            markdown_dialect: Some("markdown-tex_math_dollars".into()),
            toc_depth: Some(2),
            split_level: Some(3),
        };
        let args = args_of(&meta);

        assert_eq!(args[2], "markdown-tex_math_dollars");
        for expected in [
            "--metadata=title:Messages",
            "--metadata=author:A. Writer",
            "--metadata=date:2019-2020",
            "--metadata=publisher:Self",
            "--metadata=rights:CC BY",
            "--epub-cover-image=media/cover.jpg",
            "--css=template/style.css",
            "--template=template/epub.html",
            "--toc",
            "--toc-depth=2",
            "--split-level=3",
        ] {
            assert!(args.iter().any(|a| a == expected), "missing {expected}");
        }
    }

    #[test]
    fn omits_unset_options() {
        let args = args_of(&BookMetadata {
            author: Some("A. Writer".into()),
            ..Default::default()
        });

        assert!(!args.iter().any(|a| a.starts_with("--metadata=title")));
        assert!(!args.iter().any(|a| a.starts_with("--toc")));
        assert!(!args.iter().any(|a| a.starts_with("--css")));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let exporter = PandocExporter::with_program("/nonexistent/dm2epub-generator");
        let err = exporter
            .export(
                Path::new("dm.md"),
                Path::new("dm.epub"),
                &BookMetadata::default(),
            )
            .unwrap_err();

        assert!(matches!(err, ExportError::Spawn { .. }));
        assert_eq!(err.exit_code(), None);
    }
}
