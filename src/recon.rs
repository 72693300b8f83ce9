use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info};
use tokio::task::JoinHandle;

use crate::config::{FuzzConfig, DEFAULT_WORDLIST, PORT_SCAN_UPPER, WEB_PORTS};
use crate::fuzzer::Fuzzer;
use crate::portscan::PortScanner;
use crate::probe::HttpProber;
use crate::sink::OutputSink;
use crate::wordlist;

/// One target host under reconnaissance. Owns the per-target artifact
/// directory and drives port discovery followed by per-web-port fuzzing.
pub struct Machine {
    ip: String,
    name: String,
    /// Directory the orchestrator was started from; the wordlist resolves
    /// against it, not against the artifact directory.
    base_dir: PathBuf,
    /// Artifact directory `<working_dir>/<name>`.
    dir: PathBuf,
    wordlist: String,
}

impl Machine {
    /// Creates the artifact directory if needed; an already-existing
    /// directory is reused, not an error.
    pub fn new(ip: &str, name: &str, working_dir: &Path, wordlist: Option<String>) -> Result<Self> {
        let base_dir = std::env::current_dir().context("failed to resolve current directory")?;

        let dir = working_dir.join(name);
        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(e).with_context(|| format!("failed to create {}", dir.display()))
            }
        }

        Ok(Machine {
            ip: ip.to_string(),
            name: name.to_string(),
            base_dir,
            dir,
            wordlist: wordlist.unwrap_or_else(|| DEFAULT_WORDLIST.to_string()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn nmapout_path(&self) -> PathBuf {
        self.dir.join(format!("{}.nmapout", self.name))
    }

    /// The port number is part of the filename so concurrent per-port
    /// fuzzers never share an output file.
    pub fn fuzzout_path(&self, port: u16) -> PathBuf {
        self.dir.join(format!("{}.{}.fuzzout", self.name, port))
    }

    /// Scans the target's ports, persists the scan report, and spawns one
    /// independent fuzzing task per open web port. Scanner failure is fatal
    /// here and leaves no partial report. Returns the fuzzing task handles;
    /// the caller decides whether to wait on them.
    pub async fn run(&self, scanner: &dyn PortScanner) -> Result<Vec<JoinHandle<()>>> {
        let range = format!("1-{PORT_SCAN_UPPER}");
        let report = scanner.scan(&self.ip, &range).await?;

        let report_path = self.nmapout_path();
        fs::write(&report_path, report.render())
            .with_context(|| format!("failed to write {}", report_path.display()))?;
        info!("wrote port scan report to {}", report_path.display());

        let mut handles = Vec::new();
        for port in WEB_PORTS {
            if report.is_open(port) {
                info!("port {port} open on {}, starting fuzzer", self.ip);
                handles.push(self.spawn_fuzz_task(port));
            }
        }
        Ok(handles)
    }

    /// A failure inside one port's task (missing wordlist, unwritable sink)
    /// is logged and confined to that task; sibling ports keep running.
    fn spawn_fuzz_task(&self, port: u16) -> JoinHandle<()> {
        let url = format!("http://{}:{}/", self.ip, port);
        let wordlist_path = self.base_dir.join(&self.wordlist);
        let out_path = self.fuzzout_path(port);

        tokio::spawn(async move {
            if let Err(e) = fuzz_web_port(&url, &wordlist_path, &out_path).await {
                error!("fuzzing {url} failed: {e:#}");
            }
        })
    }
}

async fn fuzz_web_port(url: &str, wordlist_path: &Path, out_path: &Path) -> Result<()> {
    let cfg = FuzzConfig::default();
    let names = wordlist::load_wordlist(wordlist_path)?;
    let sink = OutputSink::file(out_path)?;
    let prober = Arc::new(HttpProber::new(cfg.timeout)?);

    let fuzzer = Arc::new(Fuzzer::new(
        url,
        cfg.codes,
        cfg.extensions,
        sink,
        names,
        cfg.threads,
        prober,
    )?);
    fuzzer.run().await;
    Ok(())
}
