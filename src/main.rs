//! VPVP CLI - Command-line tool for inspecting and extracting VPVP archives.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use vpvp_archive::{EntryStream, HandleMode, OpenOptions, VpvpArchive};

/// VPVP - archive inspection and extraction tool
#[derive(Parser)]
#[command(name = "vpvp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log progress and per-entry details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the archive header and index statistics
    Info {
        /// Path to the archive
        #[arg(short, long, env = "VPVP_ARCHIVE")]
        archive: PathBuf,
    },

    /// List contents of an archive
    List {
        /// Path to the archive
        #[arg(short, long, env = "VPVP_ARCHIVE")]
        archive: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Extract files from an archive
    Extract {
        /// Path to the archive
        #[arg(short, long, env = "VPVP_ARCHIVE")]
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, env = "VPVP_OUTPUT")]
        output: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Open a separate file handle for every entry
        #[arg(long)]
        per_read_handles: bool,
    },

    /// Write a single entry to stdout
    Cat {
        /// Path to the archive
        #[arg(short, long, env = "VPVP_ARCHIVE")]
        archive: PathBuf,

        /// Full path of the entry
        entry: String,

        /// Size of each chunk copied to stdout
        #[arg(long, default_value_t = 64 * 1024)]
        chunk_size: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { archive } => {
            cmd_info(&archive)?;
        }
        Commands::List {
            archive,
            filter,
            detailed,
        } => {
            cmd_list(&archive, filter.as_deref(), detailed)?;
        }
        Commands::Extract {
            archive,
            output,
            filter,
            per_read_handles,
        } => {
            let mode = if per_read_handles {
                HandleMode::PerRead
            } else {
                HandleMode::Shared
            };
            cmd_extract(&archive, &output, filter.as_deref(), mode)?;
        }
        Commands::Cat {
            archive,
            entry,
            chunk_size,
        } => {
            cmd_cat(&archive, &entry, chunk_size)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn open_archive(path: &Path) -> Result<VpvpArchive> {
    VpvpArchive::open(path).with_context(|| format!("Failed to open archive {}", path.display()))
}

fn cmd_info(path: &Path) -> Result<()> {
    let start = Instant::now();
    let archive = open_archive(path)?;
    let elapsed = start.elapsed();

    if let Some(header) = archive.header() {
        println!("Archive:       {}", archive.name());
        println!("Version:       {}", header.version);
        println!("Index offset:  {}", header.index_offset);
        println!("Index records: {}", header.index_count);
    }

    let stats = archive.stats();
    let (stored, unpacked) = archive.iter().fold((0u64, 0u64), |(s, u), (_, item)| {
        (s + item.size as u64, u + item.data_size() as u64)
    });

    println!("Files:         {}", archive.len());
    println!("Directories:   {}", stats.directories);
    println!("Stored bytes:  {}", stored);
    println!("Data bytes:    {}", unpacked);
    if stats.invalid_directories + stats.orphan_pops + stats.duplicates > 0 {
        println!(
            "Anomalies:     {} invalid directories, {} orphan pops, {} duplicates",
            stats.invalid_directories, stats.orphan_pops, stats.duplicates
        );
    }
    println!("Loaded in {:?}", elapsed);

    Ok(())
}

fn cmd_list(path: &Path, filter: Option<&str>, detailed: bool) -> Result<()> {
    let archive = open_archive(path)?;
    let pattern = filter.map(compile_filter).transpose()?;

    let mut count = 0;
    for (name, item) in archive.iter() {
        if let Some(pattern) = &pattern {
            if !pattern.matches(name) {
                continue;
            }
        }

        if detailed {
            println!(
                "{:>12} {:>12} {} {:>10} {}",
                item.size,
                item.data_size(),
                if item.is_compressed() { "B" } else { " " },
                item.timestamp,
                name
            );
        } else {
            println!("{}", name);
        }
        count += 1;
    }

    println!("\nTotal: {} entries", count);

    Ok(())
}

fn cmd_extract(
    path: &Path,
    output: &Path,
    filter: Option<&str>,
    mode: HandleMode,
) -> Result<()> {
    println!("Opening archive: {}", path.display());

    let start = Instant::now();
    let archive = OpenOptions::new()
        .handle_mode(mode)
        .open(path)
        .with_context(|| format!("Failed to open archive {}", path.display()))?;

    println!("Loaded {} entries in {:?}", archive.len(), start.elapsed());

    let pattern = filter.map(compile_filter).transpose()?;
    let names: Vec<&str> = archive
        .iter()
        .map(|(name, _)| name)
        .filter(|name| pattern.as_ref().map_or(true, |p| p.matches(name)))
        .collect();

    println!("Extracting {} entries...", names.len());

    let pb = ProgressBar::new(names.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    let mut errors = 0;
    for name in &names {
        let Some(output_path) = output_path_for(output, name) else {
            pb.suspend(|| eprintln!("Skipping unsafe entry path {}", name));
            errors += 1;
            pb.inc(1);
            continue;
        };

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        match archive.read_entry(name) {
            Ok(data) => fs::write(&output_path, data)
                .with_context(|| format!("Failed to write {}", output_path.display()))?,
            Err(e) => {
                pb.suspend(|| eprintln!("Error extracting {}: {}", name, e));
                errors += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!(
        "Extraction completed in {:?} ({} errors)",
        start.elapsed(),
        errors
    );

    Ok(())
}

fn cmd_cat(path: &Path, entry: &str, chunk_size: usize) -> Result<()> {
    let archive = open_archive(path)?;
    let mut stream = EntryStream::open(&archive, entry)
        .with_context(|| format!("Failed to read {}", entry))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = stream.read_chunk(&mut buf);
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
    }
    out.flush()?;

    Ok(())
}

/// Join an entry path onto the output directory, rejecting escapes.
fn output_path_for(output: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));

    if escapes || name.is_empty() {
        None
    } else {
        Some(output.join(relative))
    }
}

fn compile_filter(pattern: &str) -> Result<glob::Pattern> {
    glob::Pattern::new(pattern).with_context(|| format!("Invalid filter pattern {}", pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for() {
        let out = Path::new("out");

        assert_eq!(
            output_path_for(out, "ui/index.html"),
            Some(PathBuf::from("out/ui/index.html"))
        );
        assert_eq!(output_path_for(out, "../etc/passwd"), None);
        assert_eq!(output_path_for(out, "/abs.txt"), None);
    }
}
