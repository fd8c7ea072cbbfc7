//! docshim CLI entry point
//!
//! Parsing, dispatch and output all live in the CLI module; this only maps
//! failure to a non-zero exit status.

use docshim::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
