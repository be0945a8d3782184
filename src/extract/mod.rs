// src/extract/mod.rs
// =============================================================================
// Blocklist extraction: download a list through the fetch engine, split it
// into URLs and IPv4 addresses, write both out.
//
// Submodules:
// - classify: entry -> URL or IP
// - output:   urls.txt / ips.txt
// =============================================================================

mod classify;
mod output;

pub use classify::{classify_entries, Classified};
pub use output::{write_lists, IPS_FILE, URLS_FILE};

use crate::fetch::{FetchEngine, FetchOutcome, Transport};

/// The list the tool was originally written for.
pub const DEFAULT_LIST_URL: &str = "https://www.usom.gov.tr/url-list.txt";

/// Downloads `list_url` and classifies its entries.
///
/// A list that could not be downloaded yields an empty result; the engine
/// has already logged why.
pub async fn harvest<T: Transport>(engine: &FetchEngine<T>, list_url: &str) -> Classified {
    let mut mapping = engine.run([list_url]).await;

    match mapping.remove(list_url) {
        Some(FetchOutcome::Success { payload }) => classify_entries(&String::from_utf8_lossy(&payload)),
        _ => Classified::default(),
    }
}
