//! `live-url`: decode, encode and extract bracket-notation query strings.
//!
//! Usage:
//!   live-url decode '<query>'
//!   live-url encode <name> [--simple] < value.json
//!   live-url extract '<mapping-json>' '<query>'
//!   live-url paths '<query>'
//!
//! Logging goes to stderr, filtered by `LIVE_URL_LOG` (default `warn`).

use std::io::{self, Write};

use live_url::cli::{run, CliError, USAGE};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let filter = std::env::var("LIVE_URL_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .without_time()
                .compact(),
        )
        .init();
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args, &mut io::stdin()) {
        Ok(out) => {
            let mut stdout = io::stdout();
            if writeln!(stdout, "{out}").is_err() {
                std::process::exit(1);
            }
        }
        Err(CliError::Usage(message)) => {
            eprintln!("{message}\n{USAGE}");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
