//! dnest CLI - Command-line tool for Dragon Nest resource extraction.
//!
//! This is the main entry point for the dnest command-line application.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::Level;

use dnest::prelude::*;

/// dnest - Dragon Nest resource extraction tool
#[derive(Parser)]
#[command(name = "dnest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract files from a PAK archive
    PakExtract {
        /// Path to the PAK file
        #[arg(short, long, env = "DNEST_PAK")]
        pak: PathBuf,

        /// Output directory
        #[arg(short, long, env = "DNEST_OUTPUT")]
        output: PathBuf,

        /// Filter pattern (glob, matched against `/`-separated paths)
        #[arg(short, long)]
        filter: Option<String>,

        /// Extract on all cores (needs the `parallel` build feature)
        #[arg(long)]
        parallel: bool,
    },

    /// List contents of a PAK archive
    PakList {
        /// Path to the PAK file
        #[arg(short, long, env = "DNEST_PAK")]
        pak: PathBuf,

        /// Filter pattern (glob, matched against `/`-separated paths)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show sizes and offsets
        #[arg(short, long)]
        detailed: bool,
    },

    /// Dump a DNT table as JSON
    DntDump {
        /// Input DNT file
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,

        /// Print the column schema instead of the rows
        #[arg(long)]
        columns: bool,
    },

    /// Look up messages in a UIString XML file
    UistringGet {
        /// Input uistring.xml file
        #[arg(short, long)]
        input: PathBuf,

        /// Message ids to print
        #[arg(required = true)]
        ids: Vec<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::PakExtract {
            pak,
            output,
            filter,
            parallel,
        } => {
            cmd_pak_extract(&pak, &output, filter.as_deref(), parallel)?;
        }
        Commands::PakList { pak, filter, detailed } => {
            cmd_pak_list(&pak, filter.as_deref(), detailed)?;
        }
        Commands::DntDump {
            input,
            output,
            pretty,
            columns,
        } => {
            cmd_dnt_dump(&input, output.as_deref(), pretty, columns)?;
        }
        Commands::UistringGet { input, ids } => {
            cmd_uistring_get(&input, &ids)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn cmd_pak_extract(
    pak_path: &Path,
    output: &Path,
    filter: Option<&str>,
    parallel: bool,
) -> Result<()> {
    check_parallel(parallel)?;
    println!("Opening PAK archive: {}", pak_path.display());

    let start = Instant::now();
    let archive = PakArchive::open(pak_path).context("Failed to open PAK archive")?;

    println!("Loaded {} entries in {:?}", archive.len(), start.elapsed());

    let filter = compile_filter(filter)?;
    let selected: Vec<&PakEntry> = archive
        .iter()
        .filter(|e| matches_filter(filter.as_ref(), e))
        .collect();

    println!("Extracting {} entries...", selected.len());

    let pb = ProgressBar::new(selected.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    let mut extracted = 0;
    let mut errors = 0;

    if parallel {
        for result in extract_parallel(&archive, &selected, output)? {
            match result {
                Ok(_) => extracted += 1,
                Err(e) => {
                    pb.suspend(|| eprintln!("Error extracting {}", e));
                    errors += 1;
                }
            }
            pb.inc(1);
        }
    } else {
        // Entries are in offset order, so this walks the archive front to back
        for entry in &selected {
            match archive.extract(entry, output) {
                Ok(_) => extracted += 1,
                Err(e) => {
                    pb.suspend(|| eprintln!("Error extracting {}", e));
                    errors += 1;
                }
            }
            pb.inc(1);
        }
    }

    pb.finish_with_message("Done");
    println!(
        "Extracted {} entries in {:?} ({} errors)",
        extracted,
        start.elapsed(),
        errors
    );

    Ok(())
}

const NO_PARALLEL: &str = "--parallel requires dnest to be built with the `parallel` feature";

fn check_parallel(parallel: bool) -> Result<()> {
    if parallel && !cfg!(feature = "parallel") {
        anyhow::bail!(NO_PARALLEL);
    }
    Ok(())
}

#[cfg(feature = "parallel")]
fn extract_parallel(
    archive: &PakArchive,
    entries: &[&PakEntry],
    output: &Path,
) -> Result<Vec<dnest::pak::Result<PathBuf>>> {
    Ok(archive.extract_parallel(entries, output)?)
}

#[cfg(not(feature = "parallel"))]
fn extract_parallel(
    _archive: &PakArchive,
    _entries: &[&PakEntry],
    _output: &Path,
) -> Result<Vec<dnest::pak::Result<PathBuf>>> {
    anyhow::bail!(NO_PARALLEL)
}

fn cmd_pak_list(pak_path: &Path, filter: Option<&str>, detailed: bool) -> Result<()> {
    let archive = PakArchive::open(pak_path).context("Failed to open PAK archive")?;
    let filter = compile_filter(filter)?;

    let mut count = 0;
    for entry in archive.iter() {
        if !matches_filter(filter.as_ref(), entry) {
            continue;
        }

        if detailed {
            println!(
                "{:>#10x} {:>12} {:>12} {}",
                entry.offset(),
                entry.compressed_size(),
                entry.uncompressed_size(),
                entry
            );
        } else {
            println!("{}", entry);
        }
        count += 1;
    }

    println!("\nTotal: {} entries", count);

    Ok(())
}

fn cmd_dnt_dump(input: &Path, output: Option<&Path>, pretty: bool, columns: bool) -> Result<()> {
    let table = DntFile::open(input).context("Failed to parse DNT file")?;

    if columns {
        for (index, column) in table.columns().iter().enumerate() {
            println!("{:>4} {:<10} {}", index, column.kind(), column.name());
        }
        println!(
            "\n{} columns, {} rows{}",
            table.column_count(),
            table.row_count(),
            if table.has_end_marker() { "" } else { " (no end marker)" }
        );
        return Ok(());
    }

    match output {
        Some(path) => {
            let file = File::create(path).context("Failed to create output file")?;
            let mut writer = BufWriter::new(file);
            table.write_json(&mut writer, pretty)?;
            writer.flush()?;
            eprintln!("Wrote {} rows to {}", table.row_count(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            table.write_json(&mut writer, pretty)?;
            writeln!(writer)?;
        }
    }

    Ok(())
}

fn cmd_uistring_get(input: &Path, ids: &[u32]) -> Result<()> {
    let strings = UiStringTable::open(input).context("Failed to load UIString file")?;

    for id in ids {
        match strings.get(*id) {
            Some(text) => println!("{}\t{}", id, text),
            None => eprintln!("{}\t<missing>", id),
        }
    }

    Ok(())
}

fn compile_filter(filter: Option<&str>) -> Result<Option<Pattern>> {
    filter
        .map(|pattern| {
            Pattern::new(&pattern.replace('\\', "/"))
                .with_context(|| format!("Invalid filter pattern: {}", pattern))
        })
        .transpose()
}

/// Case-insensitive glob match against the entry's `/`-separated path.
fn matches_filter(filter: Option<&Pattern>, entry: &PakEntry) -> bool {
    let Some(pattern) = filter else {
        return true;
    };

    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    pattern.matches_with(&entry.segments().join("/"), options)
}
