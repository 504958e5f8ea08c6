//! # mmsim
//!
//! Interactive shell for the segmented, demand-paged memory manager.
//!
//! Reads commands from stdin (or replays a script) and prints the results.
//! Page transfers and command tracing go to stderr through the `log` facade.

mod logger;
mod render;
mod shell;
mod store;

use crate::logger::ConsoleLogger;
use crate::shell::Shell;
use crate::store::LoggingStore;
use clap::Parser;
use kernel_alloc::vmm::MemoryManager;
use kernel_vmem::ReplacementPolicy;
use log::{LevelFilter, error, info};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Replacement policy for new processes: fifo (0) or lru (1).
    #[arg(long, default_value_t = ReplacementPolicy::Lru)]
    policy: ReplacementPolicy,

    /// Maximum level of log records written to stderr.
    #[arg(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,

    /// Replay commands from this file instead of reading stdin.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Do not print the startup banner.
    #[arg(long, short)]
    quiet: bool,
}

fn run(args: Args) -> io::Result<()> {
    let mm = MemoryManager::with_store(LoggingStore::default()).with_policy(args.policy);
    let mut shell = Shell::new(mm);

    let mut out = io::stdout().lock();
    if !args.quiet {
        writeln!(out, "{}", render::banner(args.policy))?;
        writeln!(out, "Enter 'help' for more information")?;
    }

    match args.script {
        Some(path) => {
            info!("replaying {}", path.display());
            let file = File::open(&path)?;
            shell.run(BufReader::new(file), &mut out, true)?;
        }
        None => shell.run(io::stdin().lock(), &mut out, false)?,
    }

    let store = shell.manager().store();
    info!(
        "{} page reads, {} page writes",
        store.reads(),
        store.writes()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = ConsoleLogger::new(args.log_level).init() {
        eprintln!("failed to install logger: {e}");
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
