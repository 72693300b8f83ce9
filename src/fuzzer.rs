use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use log::{debug, info};
use tokio::task::JoinHandle;
use url::Url;

use crate::probe::Prober;
use crate::sink::OutputSink;

/// One accepted probe: the status that matched, the candidate that produced
/// it, and the concrete suffix that was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub status: u16,
    pub candidate: String,
    pub suffix: String,
}

/// Concurrent path discovery engine. One instance owns one work queue of
/// candidates and drains it with a fixed pool of workers, writing accepted
/// probes to the shared sink.
pub struct Fuzzer {
    base: String,
    codes: HashSet<u16>,
    extensions: Vec<String>,
    sink: OutputSink,
    queue: Mutex<VecDeque<String>>,
    threads: usize,
    prober: Arc<dyn Prober>,
}

impl Fuzzer {
    /// An empty candidate list is accepted and makes `run` a no-op.
    pub fn new(
        base: &str,
        codes: HashSet<u16>,
        extensions: Vec<String>,
        sink: OutputSink,
        candidates: Vec<String>,
        threads: usize,
        prober: Arc<dyn Prober>,
    ) -> Result<Self> {
        Url::parse(base).with_context(|| format!("invalid base URL {:?}", base))?;

        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Fuzzer {
            base,
            codes,
            extensions,
            sink,
            queue: Mutex::new(candidates.into()),
            threads,
            prober,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Expands one candidate into the suffixes to probe: the directory form
    /// first, then one file form per extension in configured order.
    /// Candidates with a leading dot (hidden files such as `.htaccess`) are
    /// not expanded and therefore never probed.
    pub fn expand(candidate: &str, extensions: &[String]) -> Vec<String> {
        let mut suffixes = Vec::new();
        if !candidate.starts_with('.') {
            suffixes.push(format!("{candidate}/"));
            for ext in extensions {
                suffixes.push(format!("{candidate}.{ext}"));
            }
        }
        suffixes
    }

    /// Launches the worker pool and returns without waiting on it. Callers
    /// that need the queue fully drained await the returned handles (or use
    /// [`Fuzzer::run`]).
    pub fn spawn_workers(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        info!("spawning {} workers against {}", self.threads, self.base);
        (0..self.threads)
            .map(|id| {
                let engine = Arc::clone(&self);
                tokio::spawn(async move { engine.drain(id).await })
            })
            .collect()
    }

    /// Runs the worker pool to queue exhaustion.
    pub async fn run(self: Arc<Self>) {
        for handle in self.spawn_workers() {
            let _ = handle.await;
        }
    }

    /// Worker loop: pop one candidate, expand, probe each suffix. The pop is
    /// the only queue access and happens under the mutex, so exactly one
    /// worker wins any given candidate; the lock is released before any
    /// network I/O.
    async fn drain(&self, worker: usize) {
        loop {
            let candidate = { self.queue.lock().unwrap().pop_front() };
            let Some(candidate) = candidate else { break };

            for suffix in Self::expand(&candidate, &self.extensions) {
                self.probe_one(&candidate, &suffix).await;
            }
        }
        debug!("worker {worker} drained");
    }

    /// Transport failures are confined to the probe that hit them: one
    /// diagnostic line on the console, then on to the next suffix. They are
    /// never fatal to the worker or the engine.
    async fn probe_one(&self, candidate: &str, suffix: &str) {
        let url = format!("{}{}", self.base, suffix);

        match self.prober.fetch_status(&url).await {
            Ok(code) if self.codes.contains(&code) => {
                let result = MatchResult {
                    status: code,
                    candidate: candidate.to_string(),
                    suffix: suffix.to_string(),
                };
                if let Err(e) = self.sink.write_match(&result) {
                    eprintln!("Error ({suffix}): {e}");
                }
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error ({suffix}): {e}");
            }
        }
    }
}
