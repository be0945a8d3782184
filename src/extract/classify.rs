// src/extract/classify.rs
// =============================================================================
// Splits a downloaded blocklist into URLs and IPv4 addresses.
//
// One entry per line. For each non-empty entry we look at its host part:
//   "http://10.0.0.1:8080/login"  -> IP 10.0.0.1
//   "10.0.0.1"                    -> IP 10.0.0.1
//   "evil.example/phish"          -> URL, kept exactly as written
//
// Only strict dotted quads count as addresses ("10.1" stays a URL).
// =============================================================================

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

/// The two sets an extraction produces. BTreeSet keeps them sorted:
/// URLs lexicographically, addresses numerically.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Classified {
    pub urls: BTreeSet<String>,
    pub ips: BTreeSet<Ipv4Addr>,
}

impl Classified {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty() && self.ips.is_empty()
    }
}

/// Classifies every line of `text`.
pub fn classify_entries(text: &str) -> Classified {
    let mut classified = Classified::default();

    for line in text.lines() {
        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }

        match ipv4_host(entry) {
            Some(ip) => {
                classified.ips.insert(ip);
            }
            None => {
                classified.urls.insert(entry.to_string());
            }
        }
    }

    classified
}

// Pulls the host out of an entry (scheme optional) and parses it as IPv4
fn ipv4_host(entry: &str) -> Option<Ipv4Addr> {
    let rest = match entry.split_once("://") {
        Some((_scheme, rest)) => rest,
        None => entry,
    };

    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    let host = match host_port.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => host_port,
    };

    host.parse().ok()
}
