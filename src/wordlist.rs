use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::debug;

/// Loads candidates from a plain-text wordlist, one per line. Lines that are
/// empty after trimming or start with `#` are dropped; duplicates are kept so
/// a candidate is probed once per occurrence in the file.
pub fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open wordlist {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut names = Vec::new();
    for line in reader.lines() {
        let line = line.with_context(|| format!("failed to read wordlist {}", path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        names.push(trimmed.to_string());
    }

    debug!("loaded {} candidates from {}", names.len(), path.display());
    Ok(names)
}

/// Expands an inclusive numeric range `lo-hi` into string candidates
/// `"lo"` through `"hi"`.
pub fn numeric_range(range: &str) -> Result<Vec<String>> {
    let (lo, hi) = range
        .split_once('-')
        .with_context(|| format!("invalid numeric range {:?}, expected lo-hi", range))?;

    let lo: u64 = lo
        .trim()
        .parse()
        .with_context(|| format!("invalid range lower bound {:?}", lo))?;
    let hi: u64 = hi
        .trim()
        .parse()
        .with_context(|| format!("invalid range upper bound {:?}", hi))?;

    if lo > hi {
        bail!("numeric range lower bound {} exceeds upper bound {}", lo, hi);
    }

    Ok((lo..=hi).map(|n| n.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_wordlist_filters_comments_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "admin").unwrap();
        writeln!(file, "# a comment").unwrap();
        writeln!(file, "").unwrap();
        writeln!(file, "   ").unwrap();
        writeln!(file, "  login  ").unwrap();
        writeln!(file, "admin").unwrap();

        let names = load_wordlist(file.path()).unwrap();
        assert_eq!(names, vec!["admin", "login", "admin"]);
    }

    #[test]
    fn test_wordlist_missing_file() {
        assert!(load_wordlist(Path::new("/nonexistent/wordlist.txt")).is_err());
    }

    #[test]
    fn test_numeric_range() {
        assert_eq!(numeric_range("10-12").unwrap(), vec!["10", "11", "12"]);
    }

    #[test]
    fn test_numeric_range_single_value() {
        assert_eq!(numeric_range("7-7").unwrap(), vec!["7"]);
    }

    #[test]
    fn test_numeric_range_rejects_inverted() {
        assert!(numeric_range("12-10").is_err());
    }

    #[test]
    fn test_numeric_range_rejects_malformed() {
        assert!(numeric_range("abc").is_err());
        assert!(numeric_range("1-x").is_err());
    }
}
