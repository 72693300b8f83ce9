use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use env_logger::Env;
use log::info;

use dirfuzz::cli::FuzzArgs;
use dirfuzz::config::{parse_codes, parse_extensions};
use dirfuzz::fuzzer::Fuzzer;
use dirfuzz::probe::HttpProber;
use dirfuzz::sink::OutputSink;
use dirfuzz::wordlist;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    // Bare invocation prints usage and exits cleanly.
    if std::env::args().len() <= 1 {
        FuzzArgs::command().print_help()?;
        return Ok(());
    }

    let args = FuzzArgs::parse();

    println!("{}", "dirfuzz - web path discovery".cyan().bold());

    let codes = parse_codes(&args.codes)?;
    let extensions = parse_extensions(&args.extensions);

    let names = match (&args.wordlist, &args.numeric) {
        (_, Some(range)) => wordlist::numeric_range(range)?,
        (Some(path), None) => wordlist::load_wordlist(Path::new(path))?,
        (None, None) => bail!("either --wordlist or --numeric is required"),
    };

    let sink = match &args.output {
        Some(path) => OutputSink::file(Path::new(path))?,
        None => OutputSink::Stdout,
    };

    let prober = Arc::new(HttpProber::new(args.timeout.map(Duration::from_secs))?);

    info!("fuzzing {} with {} candidates", args.url, names.len());

    let fuzzer = Arc::new(Fuzzer::new(
        &args.url,
        codes,
        extensions,
        sink,
        names,
        args.threads,
        prober,
    )?);

    tokio::select! {
        _ = fuzzer.run() => {}
        _ = tokio::signal::ctrl_c() => {
            println!("Interrupt received. Exiting.");
        }
    }

    Ok(())
}
