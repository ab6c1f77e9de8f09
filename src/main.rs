//! Library circulation CLI
//!
//! Command-line interface for managing members, books and loans stored in a
//! SQLite database.
//!
//! # Usage
//!
//! ```bash
//! library member add "Ana Souza" 529.982.247-25 --email ana@example.com
//! library book add "Dom Casmurro" "Machado de Assis" --year 1899 --copies 2
//! library book import catalog.csv
//! library loan create 1 1
//! library loan return 1
//! library report overdue > overdue.csv
//! library --database /var/lib/library.db report period 2024-01-01 2024-01-31
//! ```
//!
//! Results are written to stdout as CSV. Logs go to stderr; the filter comes
//! from `RUST_LOG` when set, otherwise from `--log-level`.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (validation failure, ineligible loan, unknown id, storage error, etc.)

use library_circulation::cli;
use library_circulation::core::Library;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = cli::parse_args();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = args.to_store_config();
    debug!(database = %args.database.display(), pool_size = config.pool_size, "opening library");

    let result = Library::open(&config).and_then(|library| {
        let stdout = std::io::stdout();
        let mut output = stdout.lock();
        cli::execute(args.command, &library, &mut output)
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
