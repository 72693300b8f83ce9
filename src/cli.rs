use clap::{ArgGroup, Parser};

use crate::config::{DEFAULT_CODES, DEFAULT_EXTENSIONS, DEFAULT_THREADS};

#[derive(Parser, Debug)]
#[command(name = "dirfuzz")]
#[command(version)]
#[command(about = "Concurrent discovery of web server paths from a wordlist or numeric range.", long_about = None)]
#[command(group(ArgGroup::new("candidates").required(true).args(["wordlist", "numeric"])))]
pub struct FuzzArgs {
    /// URL to fuzz, e.g. http://target.url:8080/
    #[arg(short, long)]
    pub url: String,

    /// Path to a wordlist text file (one candidate per line, `#` comments).
    #[arg(short, long)]
    pub wordlist: Option<String>,

    /// Probe a numeric candidate range instead of a wordlist (format: 100-1000).
    #[arg(short, long)]
    pub numeric: Option<String>,

    /// Write results to a file; if not specified, results are printed to stdout.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Acceptable status codes, comma separated.
    #[arg(short, long, default_value_t = DEFAULT_CODES.map(|c| c.to_string()).join(","))]
    pub codes: String,

    /// File extensions tried for every candidate, comma separated.
    #[arg(short, long, default_value_t = DEFAULT_EXTENSIONS.join(","))]
    pub extensions: String,

    /// Number of concurrent workers.
    #[arg(short, long, default_value_t = DEFAULT_THREADS)]
    pub threads: usize,

    /// Per-request timeout in seconds; requests are unbounded when omitted.
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(name = "recon")]
#[command(version)]
#[command(about = "Port-scan a target machine and fuzz every open web port.", long_about = None)]
pub struct ReconArgs {
    /// IP address of the target machine.
    #[arg(short, long)]
    pub ip: String,

    /// Name of the target machine; artifacts land in a subdirectory named after it.
    #[arg(short, long)]
    pub name: String,

    /// Path to the working directory (files are stored in a subdirectory here).
    #[arg(short = 'w', long = "working-directory")]
    pub working_directory: String,

    /// Wordlist filename, resolved against the directory recon was started from.
    #[arg(short = 'l', long)]
    pub wordlist: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_fuzz_args_are_well_formed() {
        FuzzArgs::command().debug_assert();
    }

    #[test]
    fn test_recon_args_are_well_formed() {
        ReconArgs::command().debug_assert();
    }

    #[test]
    fn test_fuzz_defaults_come_from_config() {
        let args = FuzzArgs::parse_from(["dirfuzz", "-u", "http://x/", "-w", "list.txt"]);
        assert_eq!(args.codes, "200,301,403");
        assert_eq!(args.extensions, "php,html,js,txt");
        assert_eq!(args.threads, 10);
        assert!(args.timeout.is_none());
    }

    #[test]
    fn test_wordlist_and_numeric_are_exclusive() {
        let result =
            FuzzArgs::try_parse_from(["dirfuzz", "-u", "http://x/", "-w", "list.txt", "-n", "1-9"]);
        assert!(result.is_err());
    }
}
