// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for dm2epub.
//!
//! This binary provides the `dm2epub` command for converting direct message
//! archives to Markdown and then to EPUB.

use dm2epub::export::{BookMetadata, ExportError, Exporter, PandocExporter};
use dm2epub::parser::decode_archive;
use dm2epub::renderer::{self, DocumentAssembler};
use dm2epub::style::{DEFAULT_CLASS, StyleError, StyleMap};
use lexopt::prelude::*;
use snafu::{OptionExt, ensure, prelude::*};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[allow(clippy::struct_excessive_bools)]
struct Cli {
    input: Vec<PathBuf>,
    dst_folder: PathBuf,
    styles: String,
    metadata: BookMetadata,
    pandoc: PathBuf,
    markdown_only: bool,
    verbose: bool,
    quiet: bool,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("at least one input file or directory is required"))]
    NoInputFiles,

    #[snafu(display("invalid --styles: {source}"))]
    Styles { source: StyleError },

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to convert {}: {source}", path.display()))]
    Render {
        path: PathBuf,
        source: renderer::RenderError,
    },

    #[snafu(display("invalid input filename: no file stem"))]
    InvalidFilename,

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to create {}: {source}", path.display()))]
    Export { path: PathBuf, source: ExportError },
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert direct message archives via Markdown to EPUB

Usage: {name} [OPTIONS] --dst-folder <PATH> <INPUT>...

Arguments:
  <INPUT>...  Message files (timestamp, sender, text separated by tabs)
              or directories containing *.txt archives

Options:
  -d, --dst-folder <PATH>    Folder to write Markdown and EPUB files to
  -s, --styles <MAP>         Sender styles as name:class pairs, e.g. alice:sender2,bob:sender3
      --md-format <FORMAT>   Pandoc markdown format (default: markdown)
      --epub-template <PATH> Pandoc EPUB template
      --cover-image <PATH>   Image for the cover of the e-book
      --front-matter <PATH>  Markdown placed before the messages
      --css <PATH>           Style sheet for the e-book
      --pandoc <PATH>        Document generator to run (default: pandoc)
      --markdown-only        Write Markdown only, do not create the e-book

Book metadata:
      --title <TEXT>         Title of the e-book
      --author <TEXT>        Author of the e-book
      --date <TEXT>          Date or year range of the e-book
      --publisher <TEXT>     Publisher of the e-book
      --rights <TEXT>        Copyright statement
      --toc-depth <N>        Include a table of contents N levels deep (1-6)
      --split-level <N>      Start a new chapter at heading level N (1-6)

Other options:
  -v, --verbose              Report progress in detail
  -q, --quiet                Suppress progress messages
  -n, --dry-run              Show what would be written without writing
  -f, --force                Overwrite existing output files
  -h, --help                 Print help
  -V, --version              Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    );
}

fn parse_level(parser: &mut lexopt::Parser, option: &str) -> Result<u8, lexopt::Error> {
    let val: u8 = parser
        .value()?
        .parse()
        .map_err(|_| format!("{option} must be a number 1-6"))?;
    if !(1..=6).contains(&val) {
        return Err(format!("{option} must be 1-6").into());
    }
    Ok(val)
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut input = Vec::new();
    let mut dst_folder: Option<PathBuf> = None;
    let mut styles = String::new();
    let mut metadata = BookMetadata::default();
    let mut pandoc = PathBuf::from("pandoc");
    let mut markdown_only = false;
    let mut verbose = false;
    let mut quiet = false;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('d') | Long("dst-folder") => dst_folder = Some(parser.value()?.parse()?),
            Short('s') | Long("styles") => styles = parser.value()?.parse()?,
            Long("md-format") => metadata.markdown_dialect = Some(parser.value()?.parse()?),
            Long("epub-template") => metadata.template = Some(parser.value()?.parse()?),
            Long("cover-image") => metadata.cover_image = Some(parser.value()?.parse()?),
            Long("front-matter") => metadata.front_matter = Some(parser.value()?.parse()?),
            Long("css") => metadata.css = Some(parser.value()?.parse()?),
            Long("title") => metadata.title = Some(parser.value()?.parse()?),
            Long("author") => metadata.author = Some(parser.value()?.parse()?),
            Long("date") => metadata.date = Some(parser.value()?.parse()?),
            Long("publisher") => metadata.publisher = Some(parser.value()?.parse()?),
            Long("rights") => metadata.rights = Some(parser.value()?.parse()?),
            Long("toc-depth") => metadata.toc_depth = Some(parse_level(&mut parser, "toc-depth")?),
            Long("split-level") => {
                metadata.split_level = Some(parse_level(&mut parser, "split-level")?);
            }
            Long("pandoc") => pandoc = parser.value()?.parse()?,
            Long("markdown-only") => markdown_only = true,
            Short('v') | Long("verbose") => verbose = true,
            Short('q') | Long("quiet") => quiet = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Short('f') | Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) => input.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        input,
        dst_folder: dst_folder.ok_or("missing required option: --dst-folder")?,
        styles,
        metadata,
        pandoc,
        markdown_only,
        verbose,
        quiet,
        dry_run,
        force,
    })
}

/// Sends diagnostics to stderr; `RUST_LOG` overrides the flag-derived level.
fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            // Pass the generator's own exit code through unchanged
            let code = match &err {
                Error::Export { source, .. } => source.exit_code(),
                _ => None,
            };
            code.and_then(|c| u8::try_from(c).ok())
                .map_or(ExitCode::FAILURE, ExitCode::from)
        }
    }
}

fn run() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    init_logging(&cli);

    ensure!(!cli.input.is_empty(), NoInputFilesSnafu);
    let styles = StyleMap::from_config(&cli.styles).context(StylesSnafu)?;
    if styles.is_empty() {
        debug!("no sender styles configured, every sender uses {DEFAULT_CLASS}");
    } else {
        debug!(senders = styles.len(), "loaded sender styles");
    }

    let files = collect_input_files(&cli.input);

    if !cli.dry_run {
        std::fs::create_dir_all(&cli.dst_folder).context(CreateOutputDirSnafu)?;
    }
    let exporter = PandocExporter::with_program(&cli.pandoc);
    for file in &files {
        process_file(file, &styles, &exporter, &cli)?;
    }

    Ok(())
}

/// Collects all text archives from the given inputs (files and directories).
fn collect_input_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "txt"))
            {
                files.push(entry.path().to_path_buf());
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Converts one archive to `<dst>/<stem>.md` and then `<dst>/<stem>.epub`.
fn process_file(
    input: &Path,
    styles: &StyleMap,
    exporter: &dyn Exporter,
    cli: &Cli,
) -> Result<(), Error> {
    let stem = input.file_stem().context(InvalidFilenameSnafu)?;
    let md_path = cli
        .dst_folder
        .join(format!("{}.md", stem.to_string_lossy()));
    let epub_path = cli
        .dst_folder
        .join(format!("{}.epub", stem.to_string_lossy()));

    // Handle dry-run mode
    if cli.dry_run {
        eprintln!("Would write {}", md_path.display());
        if !cli.markdown_only {
            eprintln!("Would write {}", epub_path.display());
        }
        return Ok(());
    }

    let target = if cli.markdown_only { &md_path } else { &epub_path };
    if target.exists() && !cli.force {
        eprintln!(
            "Skipping {} (already exists, use --force to overwrite)",
            target.display()
        );
        return Ok(());
    }

    let bytes = std::fs::read(input).context(ReadFileSnafu { path: input })?;
    let archive = decode_archive(&bytes);

    let mut doc = DocumentAssembler::new(styles);
    for line in archive.lines() {
        doc.push_line(line).context(RenderSnafu { path: input })?;
    }
    if doc.is_empty() {
        warn!(path = %input.display(), "archive contains no messages");
    }
    let messages = doc.len();
    let markdown = doc.finish();

    std::fs::write(&md_path, &markdown).context(WriteFileSnafu { path: &md_path })?;
    if !cli.quiet {
        eprintln!("Wrote {} ({messages} messages)", md_path.display());
    }

    if cli.markdown_only {
        return Ok(());
    }

    exporter
        .export(&md_path, &epub_path, &cli.metadata)
        .context(ExportSnafu { path: &epub_path })?;
    if !cli.quiet {
        eprintln!("Wrote {} ({})", epub_path.display(), exporter.name());
    }
    Ok(())
}
