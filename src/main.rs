// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, written to stderr so JSON on stdout stays clean)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = all good, 1 = failures, 2 = error)
// =============================================================================

mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use fetch_guardian::extract;
use fetch_guardian::{FetchConfig, FetchEngine, FetchOutcome, ResultMapping};
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = every endpoint fetched / lists written
//   Ok(1) = some endpoints failed / nothing extracted
//   Err   = fatal error (bad arguments, bad config, I/O)
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Fetch { urls, json, engine } => {
            let config = engine.to_config()?;
            handle_fetch(urls, json, config).await
        }
        Commands::Extract {
            list_url,
            out_dir,
            engine,
        } => {
            let config = engine.to_config()?;
            handle_extract(&list_url, &out_dir, config).await
        }
    }
}

// Handles the 'fetch' subcommand
async fn handle_fetch(urls: Vec<String>, json: bool, config: FetchConfig) -> Result<i32> {
    // Reject malformed URLs before any request goes out
    for url in &urls {
        Url::parse(url).map_err(|e| anyhow!("Invalid URL '{}': {}", url, e))?;
    }

    let engine = FetchEngine::new(&config).context("invalid fetch configuration")?;
    let mapping = engine.run(urls).await;

    let reports = build_reports(&mapping);
    print_results(&reports, json)?;

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    Ok(if failed > 0 { 1 } else { 0 })
}

// Handles the 'extract' subcommand
async fn handle_extract(list_url: &str, out_dir: &Path, config: FetchConfig) -> Result<i32> {
    Url::parse(list_url).map_err(|e| anyhow!("Invalid URL '{}': {}", list_url, e))?;

    let engine = FetchEngine::new(&config).context("invalid fetch configuration")?;
    let classified = extract::harvest(&engine, list_url).await;

    if classified.is_empty() {
        tracing::error!("No URLs found.");
        return Ok(1);
    }

    let (urls_path, ips_path) = extract::write_lists(out_dir, &classified)?;
    tracing::info!(
        urls = classified.urls.len(),
        ips = classified.ips.len(),
        "wrote {} and {}",
        urls_path.display(),
        ips_path.display()
    );
    Ok(0)
}

/// One row of the fetch report
#[derive(Debug, Clone, Serialize)]
struct FetchReport {
    url: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

impl FetchReport {
    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

// Turns the mapping into rows sorted by URL (the mapping itself is unordered)
fn build_reports(mapping: &ResultMapping) -> Vec<FetchReport> {
    let mut reports: Vec<FetchReport> = mapping
        .iter()
        .map(|(url, outcome)| match outcome {
            FetchOutcome::Success { payload } => FetchReport {
                url: url.clone(),
                status: "ok",
                bytes: Some(payload.len()),
                errors: Vec::new(),
            },
            FetchOutcome::Failed { errors } => FetchReport {
                url: url.clone(),
                status: "failed",
                bytes: None,
                errors: errors.clone(),
            },
        })
        .collect();
    reports.sort_by(|a, b| a.url.cmp(&b.url));
    reports
}

fn print_results(reports: &[FetchReport], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(reports)?;
        println!("{}", json_output);
    } else {
        print_table(reports);
    }
    Ok(())
}

fn print_table(reports: &[FetchReport]) {
    println!("{:<60} {:<10} {:<30}", "URL", "STATUS", "DETAIL");
    println!("{}", "=".repeat(100));

    for report in reports {
        let url_display = if report.url.chars().count() > 57 {
            format!("{}...", report.url.chars().take(57).collect::<String>())
        } else {
            report.url.clone()
        };

        let detail = match (report.bytes, report.errors.last()) {
            (Some(bytes), _) => format!("{} bytes", bytes),
            (None, Some(last)) => format!("{} attempt(s), last: {}", report.errors.len(), last),
            (None, None) => String::new(),
        };

        let status = if report.is_ok() { "✅ OK" } else { "❌ FAILED" };
        println!("{:<60} {:<10} {:<30}", url_display, status, detail);
    }

    println!();

    let ok_count = reports.iter().filter(|r| r.is_ok()).count();
    println!("📊 Summary:");
    println!("   ✅ Fetched: {}", ok_count);
    println!("   ❌ Failed: {}", reports.len() - ok_count);
    println!("   📋 Total: {}", reports.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_are_sorted_and_classified() {
        let mut mapping = ResultMapping::new();
        mapping.insert(
            "https://b.test".to_string(),
            FetchOutcome::Failed {
                errors: vec!["request to https://b.test timed out".to_string()],
            },
        );
        mapping.insert(
            "https://a.test".to_string(),
            FetchOutcome::Success {
                payload: b"hello".to_vec(),
            },
        );

        let reports = build_reports(&mapping);
        assert_eq!(reports[0].url, "https://a.test");
        assert!(reports[0].is_ok());
        assert_eq!(reports[0].bytes, Some(5));
        assert!(!reports[1].is_ok());
        assert_eq!(reports[1].errors.len(), 1);
    }

    #[test]
    fn test_json_report_skips_empty_fields() {
        let report = FetchReport {
            url: "https://a.test".to_string(),
            status: "ok",
            bytes: Some(2),
            errors: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json.get("errors").is_none());
    }
}
