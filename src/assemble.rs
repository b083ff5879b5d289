//! Patch extraction output with the values the caller already knows.
//!
//! The model is asked to echo the lottery key, source URL and fetch time, but
//! its answer is never trusted for those: the configured key and URL always
//! win, and `fetched_at` falls back to the capture timestamp when the model
//! left it empty. Everything else is written through as returned.

use crate::config::LotterySource;
use crate::models::{
    AggregateDocument, AggregateItem, Draws, ExtractedLottery, LotteryDocument,
};
use crate::schema::{MAX_DRAWS, SchemaKind};
use tracing::{debug, warn};

/// The extractor's `fetched_at` if present and non-blank, otherwise `captured_at`.
pub fn resolve_fetched_at(extracted: Option<&str>, captured_at: &str) -> String {
    match extracted {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => captured_at.to_string(),
    }
}

/// Resolve `fetched_at` and default-fill the draws of one extraction.
fn patch(
    source: &LotterySource,
    extracted: ExtractedLottery,
    captured_at: &str,
) -> (String, Draws) {
    if extracted.lottery_str() != Some(source.key.as_str()) {
        debug!(
            expected = %source.key,
            returned = ?extracted.lottery,
            "Overriding lottery identifier from extractor"
        );
    }
    if extracted.source_url_str() != Some(source.url.as_str()) {
        debug!(
            expected = %source.url,
            returned = ?extracted.source_url,
            "Overriding source_url from extractor"
        );
    }
    match extracted.draws.entry_count() {
        Some(count) if (1..=MAX_DRAWS).contains(&count) => {}
        Some(count) => warn!(
            lottery = %source.key,
            draws = count,
            "Extractor returned an unexpected number of draws"
        ),
        None => warn!(
            lottery = %source.key,
            "Extractor returned draws that are not an array; writing them through"
        ),
    }

    let fetched_at = resolve_fetched_at(extracted.fetched_at_str(), captured_at);
    let mut draws = extracted.draws;
    draws.fill_defaults(SchemaKind::for_key(&source.key));
    (fetched_at, draws)
}

/// Build the single-source output document.
///
/// # Arguments
///
/// * `source` - The configured source; its key and URL always win
/// * `extracted` - The payload returned by the extractor
/// * `captured_at` - Timestamp taken just before the page fetch
///
/// # Returns
///
/// A [`LotteryDocument`] with the extractor's draws, default-filled.
pub fn assemble_single(
    source: &LotterySource,
    extracted: ExtractedLottery,
    captured_at: &str,
) -> LotteryDocument {
    let (fetched_at, draws) = patch(source, extracted, captured_at);
    LotteryDocument {
        lottery: source.key.clone(),
        source_url: source.url.clone(),
        fetched_at,
        draws,
    }
}

/// Build one entry of the aggregate document.
///
/// Same policy as [`assemble_single`], with the source's display name added.
pub fn assemble_item(
    source: &LotterySource,
    extracted: ExtractedLottery,
    captured_at: &str,
) -> AggregateItem {
    let (fetched_at, draws) = patch(source, extracted, captured_at);
    AggregateItem {
        key: source.key.clone(),
        name: source.name.clone(),
        source_url: source.url.clone(),
        fetched_at,
        draws,
    }
}

/// Accumulates per-source items in the order they are pushed.
#[derive(Debug)]
pub struct AggregateBuilder {
    updated_at: String,
    items: Vec<AggregateItem>,
}

impl AggregateBuilder {
    /// `updated_at` is the time the aggregate run began.
    pub fn new(updated_at: impl Into<String>) -> Self {
        Self {
            updated_at: updated_at.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: AggregateItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn finish(self) -> AggregateDocument {
        AggregateDocument {
            updated_at: self.updated_at,
            items: self.items,
        }
    }
}
