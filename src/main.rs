//! Deduper CLI
//!
//! Thin presentation layer over the duplicate-finder core: scan
//! directories into the index, list duplicate groups, delete redundant
//! copies (dry-run by default), and report statistics.

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

use deduper::{format_size, DedupError, DuplicateFinder, FinderConfig, HashAlgorithm, ScanSummary};

/// Find and remove duplicate files by content fingerprint
#[derive(Parser)]
#[command(name = "deduper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite index file
    #[arg(short = 'd', long, global = true, default_value = "deduper.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan directories into the index
    Scan {
        /// Root directories to scan (repeatable)
        #[arg(short = 'r', long = "root", required = true)]
        roots: Vec<PathBuf>,

        /// Only scan direct children of each root
        #[arg(long)]
        no_recursive: bool,

        /// Fingerprint algorithm (sha256 or md5)
        #[arg(short = 'a', long, default_value = "sha256")]
        algorithm: HashAlgorithm,
    },

    /// List duplicate groups in the index
    Duplicates {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete duplicates, keeping one copy per group
    Delete {
        /// Keep the lexicographically last path instead of the first
        #[arg(long)]
        keep_last: bool,

        /// Actually delete files (default is a dry run)
        #[arg(long)]
        force: bool,
    },

    /// Show index statistics
    Stats {
        /// Break totals down by file extension
        #[arg(long)]
        by_extension: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove all file records from the index
    Clear,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), DedupError> {
    match cli.command {
        Commands::Scan {
            roots,
            no_recursive,
            algorithm,
        } => {
            let config = FinderConfig::builder()
                .db_path(cli.db)
                .algorithm(algorithm)
                .build();
            let finder = DuplicateFinder::with_config(config)?;

            let mut total = ScanSummary::default();
            for root in &roots {
                info!("scanning {}", root.display());
                total.merge(finder.scan(root, !no_recursive)?);
            }
            println!(
                "Indexed {} file(s), {} unreadable",
                total.scanned_files, total.unreadable_files
            );
        }

        Commands::Duplicates { json } => {
            let finder = DuplicateFinder::open(&cli.db)?;
            let groups = finder.find_duplicate_groups()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&groups).unwrap());
            } else if groups.is_empty() {
                println!("No duplicates found.");
            } else {
                for group in &groups {
                    println!(
                        "{} ({} files, {} wasted)",
                        group.fingerprint(),
                        group.len(),
                        format_size(group.wasted_space())
                    );
                    for path in group {
                        println!("  {}", path.display());
                    }
                }
            }
        }

        Commands::Delete { keep_last, force } => {
            let finder = DuplicateFinder::open(&cli.db)?;
            let dry_run = !force;
            let deleted = finder.delete_duplicates(!keep_last, dry_run)?;

            for path in &deleted {
                println!("{}", path.display());
            }
            if dry_run {
                println!(
                    "Dry run: {} file(s) would be deleted (pass --force to delete)",
                    deleted.len()
                );
            } else {
                println!("Deleted {} file(s)", deleted.len());
            }
        }

        Commands::Stats { by_extension, json } => {
            let finder = DuplicateFinder::open(&cli.db)?;

            if by_extension {
                let by_ext = finder.statistics_by_extension()?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&by_ext).unwrap());
                } else {
                    for entry in &by_ext {
                        let label = if entry.extension.is_empty() {
                            "(none)"
                        } else {
                            entry.extension.as_str()
                        };
                        println!(
                            "{label}: {} file(s), {}",
                            entry.count,
                            format_size(entry.total_size_bytes)
                        );
                    }
                }
            } else {
                let stats = finder.statistics()?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats).unwrap());
                } else {
                    println!("Total files:      {}", stats.total_files);
                    println!("Duplicate groups: {}", stats.duplicate_groups);
                    println!("Duplicate files:  {}", stats.duplicate_files);
                    println!("Unique files:     {}", stats.unique_files);
                    println!("Total size:       {}", format_size(stats.total_size_bytes));
                }
            }
        }

        Commands::Clear => {
            let finder = DuplicateFinder::open(&cli.db)?;
            finder.clear()?;
            println!("Index cleared.");
        }
    }

    Ok(())
}
