// qdebug - main.rs
//
// `qtail`: print and follow the q log file.
// 1. CLI argument parsing
// 2. Logging initialisation (debug mode support)
// 3. Dump the log, then optionally follow appends

use clap::Parser;
use qdebug::app::tail;
use qdebug::platform::fs;
use qdebug::util;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

/// qtail - view the output of `q!` debug calls.
///
/// Prints the q log file and, with --follow, keeps streaming new entries.
#[derive(Parser, Debug)]
#[command(name = "qtail", version, about)]
struct Cli {
    /// Log file to read (defaults to the q file in the system temp directory).
    #[arg(long = "file")]
    file: Option<PathBuf>,

    /// Keep running and print entries as they are appended.
    #[arg(short = 'f', long = "follow")]
    follow: bool,

    /// Print the log file path and exit.
    #[arg(long = "print-path")]
    print_path: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    util::logging::init(cli.debug);

    let path = cli.file.unwrap_or_else(fs::default_log_path);
    tracing::debug!(
        version = util::constants::APP_VERSION,
        path = %path.display(),
        follow = cli.follow,
        "qtail starting"
    );

    if cli.print_path {
        println!("{}", path.display());
        return;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = tail::dump(&path, &mut out).and_then(|cursor| {
        if cli.follow {
            // Runs until the process is interrupted.
            let never = AtomicBool::new(false);
            tail::follow(&path, cursor, &mut out, &never)
        } else {
            Ok(())
        }
    });

    if let Err(e) = result {
        tracing::error!(error = %e, "qtail failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
