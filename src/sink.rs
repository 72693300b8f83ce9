use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};

use crate::fuzzer::MatchResult;

/// Destination for match lines. A file sink is shared by every worker of one
/// engine instance, so writes go through a mutex; a full line is written per
/// lock acquisition and partial lines never interleave.
pub enum OutputSink {
    Stdout,
    File(Mutex<File>),
}

impl OutputSink {
    pub fn file(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to create output file {}", path.display()))?;
        Ok(OutputSink::File(Mutex::new(file)))
    }

    /// Writes one `<code> -> <suffix>` line. Sink errors are reported by the
    /// caller as diagnostics; they never abort a worker.
    pub fn write_match(&self, result: &MatchResult) -> Result<()> {
        let line = format!("{} -> {}", result.status, result.suffix);
        match self {
            OutputSink::Stdout => {
                println!("{line}");
                Ok(())
            }
            OutputSink::File(file) => {
                let mut guard = file.lock().unwrap();
                writeln!(guard, "{line}").context("failed to write match line")?;
                Ok(())
            }
        }
    }
}
