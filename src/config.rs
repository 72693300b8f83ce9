use std::collections::HashSet;
use std::time::Duration;

/// Status codes that count as a hit when nothing else is configured.
pub const DEFAULT_CODES: [u16; 3] = [200, 301, 403];

/// File extensions tried for every candidate when nothing else is configured.
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["php", "html", "js", "txt"];

pub const DEFAULT_THREADS: usize = 10;

/// Ports worth fuzzing when the port scan reports them open.
pub const WEB_PORTS: [u16; 4] = [80, 443, 8080, 8443];

/// Upper bound of the orchestrator's port-scan range (inclusive, from port 1).
pub const PORT_SCAN_UPPER: u16 = 1024;

/// Wordlist the orchestrator loads from its original working directory.
pub const DEFAULT_WORDLIST: &str = "dirs.txt";

/// Engine settings shared by both entry points. Built once, passed explicitly.
#[derive(Debug, Clone)]
pub struct FuzzConfig {
    pub codes: HashSet<u16>,
    pub extensions: Vec<String>,
    pub threads: usize,
    /// Per-request timeout. `None` leaves the transport unbounded, which is
    /// the historical behavior of this tool.
    pub timeout: Option<Duration>,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        FuzzConfig {
            codes: DEFAULT_CODES.into_iter().collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            threads: DEFAULT_THREADS,
            timeout: None,
        }
    }
}

/// Parses a comma-separated status code list, e.g. `"200,301,403"`.
pub fn parse_codes(raw: &str) -> anyhow::Result<HashSet<u16>> {
    raw.split(',')
        .map(|c| {
            c.trim()
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("invalid status code: {:?}", c.trim()))
        })
        .collect()
}

/// Parses a comma-separated extension list, e.g. `"php,html"`. Leading dots
/// are tolerated so `-e .php` and `-e php` mean the same thing.
pub fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = FuzzConfig::default();
        assert!(cfg.codes.contains(&200));
        assert!(cfg.codes.contains(&301));
        assert!(cfg.codes.contains(&403));
        assert_eq!(cfg.extensions, vec!["php", "html", "js", "txt"]);
        assert_eq!(cfg.threads, 10);
        assert!(cfg.timeout.is_none());
    }

    #[test]
    fn test_parse_codes() {
        let codes = parse_codes("200, 404,500").unwrap();
        assert_eq!(codes.len(), 3);
        assert!(codes.contains(&404));
    }

    #[test]
    fn test_parse_codes_rejects_garbage() {
        assert!(parse_codes("200,abc").is_err());
    }

    #[test]
    fn test_parse_extensions() {
        assert_eq!(parse_extensions("php,.html, js"), vec!["php", "html", "js"]);
    }
}
