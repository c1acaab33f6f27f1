//! cctag CLI
//!
//! # What this program is
//! A small command-line tool that reads and writes license claims embedded
//! in MP3 files (ID3v2 `TCOP` frame), and upgrades old ID3v2.2 tags to v2.3.
//!
//! # Commands
//! - `show`: title / artist / year / license for files or whole folders
//! - `embed`: write a claim ("{year} {holder}. Licensed to the public under ...")
//! - `upgrade`: rebuild v2.2 tags as v2.3 (frames with no v2.3 id are dropped)
//! - `frames`: dump a file's raw frame list
//! - `parse-claim`: split a claim string into its fields
//!
//! # Architecture constraints (on purpose)
//! - The CLI calls `core::*` for everything that touches tags.
//! - Per-file failures are reported and counted; the run keeps going.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cctag::core::claim;
use cctag::core::index::license_of;
use cctag::core::metadata::{AudioMetadata, MetadataError, metadata_for};
use cctag::core::tags::{
    FrameValue, IdMapping, TagStore, Version, current_to_legacy, legacy_to_current, upgrade,
};
use cctag::core::{read_tracks, scan_paths};

#[derive(Parser, Debug)]
#[command(name = "cctag", version, about = "Embed and read license claims in MP3 files")]
struct Cli {
    /// More log output (repeat for trace). RUST_LOG overrides this.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show title, artist, year and license of files (folders are scanned).
    Show {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Embed a license claim.
    Embed {
        /// License URL, e.g. http://creativecommons.org/licenses/by/2.0/
        #[arg(long)]
        license: String,

        /// URL of the page that verifies the claim.
        #[arg(long = "verify-at")]
        verify_at: String,

        /// Copyright year.
        #[arg(long)]
        year: String,

        /// Copyright holder.
        #[arg(long)]
        holder: String,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Upgrade ID3v2.2 tags to ID3v2.3.
    Upgrade {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the frames of a file's ID3v2 tag.
    Frames { file: PathBuf },

    /// Split a claim string into copyright / license / verify-at.
    ParseClaim { claim: String },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Show { paths } => show(&paths),
        Command::Embed {
            license,
            verify_at,
            year,
            holder,
            files,
        } => embed(&files, &license, &verify_at, &year, &holder),
        Command::Upgrade { files } => upgrade_files(&files),
        Command::Frames { file } => frames(&file),
        Command::ParseClaim { claim } => {
            parse_claim(&claim);
            Ok(0)
        }
    };

    match result {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            tracing::error!("{failures} file(s) failed");
            ExitCode::FAILURE
        }
        Err(msg) => {
            tracing::error!("{msg}");
            ExitCode::FAILURE
        }
    }
}

/// Returns the number of files that failed.
fn show(roots: &[PathBuf]) -> Result<usize, String> {
    let paths = scan_paths(roots)?;
    let (rows, failures) = read_tracks(paths);

    for row in &rows {
        // Same mapping an indexer sees ("(not licensed)" when there's no claim).
        let license = license_of(row.claim.as_deref());

        println!("{}", row.path.display());
        println!("  title:   {}", row.title);
        println!("  artist:  {}", row.artist);
        println!("  year:    {}", row.year);
        println!("  license: {license}");
        if let Some(claim) = &row.claim {
            println!("  claim:   {claim}");
        }
    }

    for (path, err) in &failures {
        tracing::warn!(path = %path.display(), "{err}");
    }
    Ok(failures.len())
}

fn embed(
    files: &[PathBuf],
    license: &str,
    verify_at: &str,
    year: &str,
    holder: &str,
) -> Result<usize, String> {
    let mut failures = 0;

    for path in files {
        let result = metadata_for(path).and_then(|mut meta| {
            if !meta.is_writable()? {
                return Err(MetadataError::NotWritable(path.clone()));
            }
            meta.embed(license, verify_at, year, holder)
        });

        match result {
            Ok(report) => {
                for dropped in &report.dropped {
                    println!("{}: {dropped}", path.display());
                }
                println!("{}: claim embedded", path.display());
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "{e}");
                failures += 1;
            }
        }
    }

    Ok(failures)
}

fn upgrade_files(files: &[PathBuf]) -> Result<usize, String> {
    let mut failures = 0;

    for path in files {
        let result = TagStore::open_or_empty(path).and_then(|mut store| upgrade(&mut store));

        match result {
            Ok(report) if !report.upgraded => {
                println!("{}: already ID3v{}", path.display(), Version::CURRENT);
            }
            Ok(report) => {
                for dropped in &report.dropped {
                    println!("{}: {dropped}", path.display());
                }
                let from = report
                    .from
                    .map(|v| format!("ID3v{v}"))
                    .unwrap_or_else(|| "no tag".into());
                println!("{}: {from} -> ID3v{}", path.display(), Version::CURRENT);
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "{e}");
                failures += 1;
            }
        }
    }

    Ok(failures)
}

fn frames(path: &Path) -> Result<usize, String> {
    let store = TagStore::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    println!("{}: ID3v{}", path.display(), store.version());

    for frame in store.frames() {
        let value = match frame.value() {
            FrameValue::Text(s) => format!("text {s:?}"),
            FrameValue::Date(s) => format!("date {s:?}"),
            FrameValue::Opaque(bytes) => format!("{} bytes", bytes.len()),
        };

        // Legacy tags: what the frame becomes on upgrade. Current tags: the
        // v2.2 id it was upgraded from, if there is one.
        let target = if store.version() < Version::CURRENT {
            match legacy_to_current(frame.id()) {
                IdMapping::Current(id) => format!(" -> {id}"),
                IdMapping::Unmapped => " -> (dropped on upgrade)".to_string(),
            }
        } else {
            current_to_legacy(frame.id())
                .map(|old| format!(" (v2.2: {old})"))
                .unwrap_or_default()
        };

        println!("  {}{target}  {value}", frame.id());
    }

    Ok(0)
}

fn parse_claim(text: &str) {
    let fields = claim::parse(text);
    println!("copyright: {}", fields.copyright);
    println!("license:   {}", fields.license.as_deref().unwrap_or("-"));
    println!("verify at: {}", fields.verify_at.as_deref().unwrap_or("-"));
}
