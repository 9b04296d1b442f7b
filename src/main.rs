//! linkstate
//!
//! Reads a weighted directed graph written as an adjacency matrix and
//! prints a link-state (Dijkstra) walkthrough from node 1: one table row
//! per visited node with the visited set, distances and predecessors.
//!
//! ```text
//! 0,3,N.
//! N,0,1.
//! 2,N,0.
//! EOF.
//! ```
//!
//! `N` marks a missing edge.  Exit codes: 1 usage, 2 I/O, 3 out of memory,
//! 4 inconsistent row/column counts, 5 empty first row, 6 invalid input.

mod engine;
mod error;
mod matrix;
mod token;
mod trace;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use engine::ShortestPathEngine;
use error::{LinkStateError, LinkStateResult};
use matrix::MatrixBuilder;
use trace::TraceFormatter;

#[derive(Parser)]
#[command(name = "linkstate")]
#[command(version)]
#[command(about = "Print a link-state shortest path trace for an adjacency matrix")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Adjacency matrix file
    file: PathBuf,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => e.exit(),
            _ => {
                let usage = LinkStateError::Usage;
                eprintln!("{usage}");
                std::process::exit(usage.exit_code());
            }
        },
    };

    init_logging(cli.verbose);

    let exit_code = match run(&cli.file) {
        Ok(()) => 0,
        Err(e) => {
            debug!(kind = ?e.kind(), position = ?e.position(), "run failed");
            eprintln!("{e}");
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

/// Log to stderr so the trace on stdout stays clean.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();
}

/// Parse the matrix at `path` and write the full trace to stdout.
fn run(path: &Path) -> LinkStateResult<()> {
    let file = File::open(path).map_err(|source| LinkStateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "reading matrix");

    let matrix = MatrixBuilder::new(BufReader::new(file)).build()?;
    info!(nodes = matrix.size(), "matrix loaded");

    let formatter = TraceFormatter::new(matrix.size());
    let mut out = BufWriter::new(io::stdout().lock());
    formatter.write_header(&mut out)?;
    let mut engine = ShortestPathEngine::new(&matrix);
    for step in engine.by_ref() {
        formatter.write_step(&mut out, &step)?;
    }
    out.flush()?;

    let reached = engine.state().distance.iter().flatten().count();
    info!(reached, nodes = matrix.size(), "trace complete");
    Ok(())
}
