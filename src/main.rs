//! tide-explore CLI entry point
//!
//! Coastal tide lookup - CLI + web app

use tide_explore::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
