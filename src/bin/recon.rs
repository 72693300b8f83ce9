use std::path::Path;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use env_logger::Env;
use log::info;

use dirfuzz::cli::ReconArgs;
use dirfuzz::portscan::NmapScanner;
use dirfuzz::recon::Machine;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    // Bare invocation prints usage and exits cleanly.
    if std::env::args().len() <= 1 {
        ReconArgs::command().print_help()?;
        return Ok(());
    }

    let args = ReconArgs::parse();

    println!("{}", "recon - port scan and web fuzzing".cyan().bold());

    let machine = Machine::new(
        &args.ip,
        &args.name,
        Path::new(&args.working_directory),
        args.wordlist,
    )?;

    let handles = machine.run(&NmapScanner).await?;
    if handles.is_empty() {
        info!("no open web ports on {}", args.ip);
    }

    // Tokio tasks die with the runtime, so the process waits for the
    // per-port fuzzers before exiting.
    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}
