// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - fetch:   fetch a set of URLs through the engine and report on each one
// - extract: download a blocklist and split it into urls.txt / ips.txt
//
// Both share the engine flags in EngineArgs, which turn into a FetchConfig.
// =============================================================================

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use fetch_guardian::extract::DEFAULT_LIST_URL;
use fetch_guardian::FetchConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fetch-guardian",
    version = "0.1.0",
    about = "Fetch many HTTP endpoints concurrently, with retries and a concurrency ceiling",
    long_about = "fetch-guardian fetches every unique URL exactly once, retrying transient failures \
                  with exponential backoff, and reports an outcome for every one of them. \
                  It can also harvest a blocklist into separate URL and IP lists."
)]
pub struct Cli {
    /// Show debug output (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one or more URLs and report which ones succeeded
    ///
    /// Example: fetch-guardian fetch https://example.com https://example.org --concurrency 2
    Fetch {
        /// URLs to fetch (duplicates are fetched once)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Download a blocklist and write urls.txt and ips.txt
    ///
    /// Example: fetch-guardian extract --out-dir lists/
    Extract {
        /// Blocklist to download (one entry per line)
        #[arg(default_value = DEFAULT_LIST_URL)]
        list_url: String,

        /// Directory to write urls.txt and ips.txt into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

/// Engine settings. Flags win over values from --config.
#[derive(Args, Debug, Default)]
pub struct EngineArgs {
    /// JSON file with FetchConfig fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum number of endpoints in flight at once (default: 5)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Request header as NAME:VALUE. Repeat for more; replaces the default set
    #[arg(long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Attempts per endpoint, including the first (default: 8)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Per-attempt timeout in seconds (default: 15)
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Stop starting new attempts after this many seconds
    #[arg(long)]
    pub deadline: Option<f64>,
}

impl EngineArgs {
    /// Builds the FetchConfig: defaults, then the config file, then flags.
    pub fn to_config(&self) -> Result<FetchConfig> {
        let mut config = match &self.config {
            Some(path) => FetchConfig::from_json_file(path)?,
            None => FetchConfig::default(),
        };

        if let Some(concurrency) = self.concurrency {
            config.concurrency_limit = concurrency;
        }
        if !self.headers.is_empty() {
            config.headers = self
                .headers
                .iter()
                .map(|raw| parse_header(raw))
                .collect::<Result<_>>()?;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout = timeout;
        }
        if self.deadline.is_some() {
            config.deadline = self.deadline;
        }

        Ok(config)
    }
}

// "Accept: text/plain" -> ("Accept", "text/plain")
fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("Header '{}' is not in NAME:VALUE form", raw))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Accept: text/plain").unwrap(),
            ("Accept".to_string(), "text/plain".to_string())
        );
        assert!(parse_header("no-colon").is_err());
    }

    #[test]
    fn test_headers_replace_defaults() {
        let args = EngineArgs {
            headers: vec!["User-Agent: fetch-guardian".to_string()],
            concurrency: Some(2),
            ..EngineArgs::default()
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.concurrency_limit, 2);
        assert_eq!(config.headers.len(), 1);
        assert!(!config.headers.contains_key("Accept"));
    }

    #[test]
    fn test_fetch_command_parses() {
        let cli = Cli::parse_from([
            "fetch-guardian",
            "fetch",
            "https://a.test",
            "https://b.test",
            "--concurrency",
            "3",
            "--json",
        ]);
        match cli.command {
            Commands::Fetch { urls, json, engine } => {
                assert_eq!(urls.len(), 2);
                assert!(json);
                assert_eq!(engine.concurrency, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_extract_defaults_to_known_list() {
        let cli = Cli::parse_from(["fetch-guardian", "extract"]);
        match cli.command {
            Commands::Extract { list_url, out_dir, .. } => {
                assert_eq!(list_url, DEFAULT_LIST_URL);
                assert_eq!(out_dir, PathBuf::from("."));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
