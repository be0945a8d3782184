// src/extract/output.rs
// =============================================================================
// Writes the extracted sets to urls.txt and ips.txt.
//
// Entries are newline-joined with no trailing newline, in the sorted order
// the sets already keep.
// =============================================================================

use super::classify::Classified;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const URLS_FILE: &str = "urls.txt";
pub const IPS_FILE: &str = "ips.txt";

/// Writes both files into `dir` and returns their paths.
pub fn write_lists(dir: &Path, classified: &Classified) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let urls: Vec<&str> = classified.urls.iter().map(String::as_str).collect();
    let ips: Vec<String> = classified.ips.iter().map(|ip| ip.to_string()).collect();

    let urls_path = dir.join(URLS_FILE);
    std::fs::write(&urls_path, urls.join("\n"))
        .with_context(|| format!("writing {}", urls_path.display()))?;

    let ips_path = dir.join(IPS_FILE);
    std::fs::write(&ips_path, ips.join("\n"))
        .with_context(|| format!("writing {}", ips_path.display()))?;

    Ok((urls_path, ips_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::classify_entries;

    #[test]
    fn test_writes_sorted_lists() {
        let dir = tempfile::tempdir().unwrap();
        let classified = classify_entries("b.test\n10.0.0.2\na.test\n2.0.0.1");

        let (urls_path, ips_path) = write_lists(dir.path(), &classified).unwrap();

        assert_eq!(std::fs::read_to_string(urls_path).unwrap(), "a.test\nb.test");
        assert_eq!(std::fs::read_to_string(ips_path).unwrap(), "2.0.0.1\n10.0.0.2");
    }
}
