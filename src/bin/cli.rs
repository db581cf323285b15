//! ArchiveKV CLI
//!
//! Command-line interface for inspecting and editing an archive file.

use std::path::PathBuf;
use std::process;

use archivekv::{ArchiveError, CompactionMode, Store, StoreConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// ArchiveKV CLI
#[derive(Parser, Debug)]
#[command(name = "archivekv-cli")]
#[command(about = "CLI for ArchiveKV single-file archives")]
#[command(version)]
struct Args {
    /// Archive file
    #[arg(short, long, default_value = archivekv::DEFAULT_STORAGE_FILE)]
    file: PathBuf,

    /// Compact through a staging file instead of shifting in place
    #[arg(long)]
    staged: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by locator
    Get {
        /// The locator to read
        locator: String,
    },

    /// Create or overwrite an entry
    Put {
        /// The locator to write
        locator: String,

        /// The value to store (UTF-8)
        value: String,
    },

    /// Delete an entry
    Del {
        /// The locator to delete
        locator: String,
    },

    /// List locators with offsets and sizes
    List,

    /// Print the header entry count
    Count,

    /// Walk the file and compare against the header
    Verify,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,archivekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(e) => {
            tracing::error!("{}", e);
            process::exit(1);
        }
    }
}

/// Locator absent on `get`
const EXIT_NOT_FOUND: i32 = 2;

/// `verify` found the header and the entry chain out of step
const EXIT_INCONSISTENT: i32 = 3;

/// Execute one command and return the process exit code
///
/// The store is closed before returning on every non-error path.
fn run(args: Args) -> Result<i32, ArchiveError> {
    let compaction = if args.staged {
        CompactionMode::Staged
    } else {
        CompactionMode::InPlace
    };

    let config = StoreConfig::builder()
        .path(&args.file)
        .compaction(compaction)
        .build();
    let mut store = Store::open(config)?;
    let mut code = 0;

    match args.command {
        Commands::Get { locator } => match store.get_raw(locator.as_bytes())? {
            Some(data) => println!("{}", String::from_utf8_lossy(&data)),
            None => {
                eprintln!("(not found)");
                code = EXIT_NOT_FOUND;
            }
        },
        Commands::Put { locator, value } => {
            store.put_raw(locator.as_bytes(), value.as_bytes())?;
        }
        Commands::Del { locator } => {
            store.delete(locator.as_bytes())?;
        }
        Commands::List => {
            for item in store.entries() {
                let (offset, entry) = item?;
                println!(
                    "{:>10}  {:>8}  {}",
                    offset,
                    entry.data.len(),
                    String::from_utf8_lossy(&entry.locator)
                );
            }
        }
        Commands::Count => println!("{}", store.len()),
        Commands::Verify => {
            let report = store.verify()?;
            println!(
                "header={} found={} end={} size={} consistent={}",
                report.header_count,
                report.entries_found,
                report.end_offset,
                report.file_size,
                report.is_consistent()
            );
            if !report.is_consistent() {
                code = EXIT_INCONSISTENT;
            }
        }
    }

    store.close()?;
    Ok(code)
}
