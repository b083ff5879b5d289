//! Per-source extraction pipeline.
//!
//! For each source: fetch (with fallbacks) → normalize → extract → assemble.
//! Sources are processed strictly one after another in configured order; the
//! only suspension points are the network calls.
//!
//! Failure policy differs by run mode:
//! - [`Pipeline::run_aggregate`] logs a failing source and leaves it out
//! - [`Pipeline::run_single`] returns the error to the caller

use crate::api::{ExtractionRequest, Extractor};
use crate::assemble::{AggregateBuilder, assemble_item, assemble_single};
use crate::config::LotterySource;
use crate::error::Result;
use crate::models::{AggregateDocument, ExtractedLottery, LotteryDocument};
use crate::normalize::clean_text;
use crate::schedule::now_iso;
use crate::scrapers::{PageFetcher, candidates};
use chrono::FixedOffset;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use tracing::{debug, error, info, instrument, warn};

pub struct Pipeline<E> {
    fetcher: PageFetcher,
    extractor: E,
    /// Offset used for capture and `updated_at` timestamps.
    offset: FixedOffset,
}

impl<E: Extractor> Pipeline<E> {
    pub fn new(fetcher: PageFetcher, extractor: E, offset: FixedOffset) -> Self {
        Self { fetcher, extractor, offset }
    }

    /// Fetch, normalize and extract one source.
    ///
    /// The capture timestamp is taken before the first fetch attempt, so it
    /// reflects when the page was requested rather than when the model answered.
    ///
    /// # Arguments
    ///
    /// * `source` - The lottery source to process
    ///
    /// # Returns
    ///
    /// The extraction payload together with the capture timestamp. Payloads of
    /// unexpected shape are accepted; see [`ExtractedLottery::from_payload`].
    ///
    /// # Errors
    ///
    /// Network errors when no fetch candidate answers, and upstream or parse
    /// errors from the extractor.
    #[instrument(level = "info", skip_all, fields(lottery = %source.key))]
    pub async fn extract_source(
        &self,
        source: &LotterySource,
    ) -> Result<(ExtractedLottery, String)> {
        let captured_at = now_iso(self.offset);

        let html = self.fetcher.fetch_first(&candidates(source)).await?;
        let text = clean_text(&html);
        debug!(
            html_bytes = html.len(),
            text_chars = text.chars().count(),
            "Normalized page text"
        );

        let request = ExtractionRequest {
            source,
            fetched_at: &captured_at,
            text: &text,
        };
        let value = self.extractor.extract(&request).await?;
        if !value.is_object() {
            warn!("Extraction payload is not a JSON object; treating it as empty");
        }
        let extracted = ExtractedLottery::from_payload(value)?;
        debug!(
            draws = ?extracted.draws.entry_count(),
            dates = %extracted.draws.records().map(|d| d.draw_date.as_str()).join(", "),
            "Parsed extraction payload"
        );

        Ok((extracted, captured_at))
    }

    /// Single-source run: any failure is returned.
    pub async fn run_single(&self, source: &LotterySource) -> Result<LotteryDocument> {
        let (extracted, captured_at) = self.extract_source(source).await?;
        Ok(assemble_single(source, extracted, &captured_at))
    }

    /// Multi-source run: failing sources are logged and omitted.
    ///
    /// `items` keeps the order of `sources`; `updated_at` is taken before the
    /// first fetch.
    #[instrument(level = "info", skip_all, fields(sources = sources.len()))]
    pub async fn run_aggregate(&self, sources: &[LotterySource]) -> AggregateDocument {
        let mut builder = AggregateBuilder::new(now_iso(self.offset));

        let items: Vec<_> = stream::iter(sources)
            .then(|source| async move {
                info!(lottery = %source.key, name = %source.name, "Processing source");
                match self.extract_source(source).await {
                    Ok((extracted, captured_at)) => {
                        let item = assemble_item(source, extracted, &captured_at);
                        info!(
                            lottery = %source.key,
                            draws = ?item.draws.entry_count(),
                            "Source done"
                        );
                        Some(item)
                    }
                    Err(e) => {
                        error!(
                            lottery = %source.key,
                            kind = %e.kind(),
                            error = %e,
                            "Source failed; skipping"
                        );
                        None
                    }
                }
            })
            .filter_map(std::future::ready)
            .collect()
            .await;

        for item in items {
            builder.push(item);
        }
        info!(
            succeeded = builder.len(),
            failed = sources.len() - builder.len(),
            "Completed aggregate run"
        );
        builder.finish()
    }
}
