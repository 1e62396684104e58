use crate::clock::Clock;
use crate::connector::PageFetcher;
use crate::timeseries::merge::merge_pages;
use crate::timeseries::util::{drop_unclosed_tail, normalize};
use crate::{
    KlinesError, KlinesRequest, MAX_PAGE_SIZE, Page, Resolution, Series, Timeframe, resolve,
};

/// Extra candles requested on top of the resolved count.
///
/// Must cover the boundary rows repeated between consecutive pages plus the
/// dropped live candle.
pub const SAFETY_MARGIN: u64 = 10;

/// Explicit state of the backward pagination loop.
///
/// Holds the remaining candle budget, the cursor for the next (older) page and
/// the pages fetched so far, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    remaining: u64,
    next_cursor: Option<i64>,
    pages: Vec<Page>,
    exhausted: bool,
}

impl Pagination {
    /// Start with a budget of `total_candles_needed + SAFETY_MARGIN`.
    #[must_use]
    pub const fn new(total_candles_needed: u64) -> Self {
        Self {
            remaining: total_candles_needed.saturating_add(SAFETY_MARGIN),
            next_cursor: None,
            pages: Vec::new(),
            exhausted: false,
        }
    }

    /// Candles still to request.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// End-time cursor for the next request; `None` before the first page.
    #[must_use]
    pub const fn next_cursor(&self) -> Option<i64> {
        self.next_cursor
    }

    /// Pages accumulated so far, in fetch order.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// True once the budget is spent or the source ran out of older data.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.exhausted || self.remaining == 0
    }

    /// The next page request, or `None` when pagination is finished.
    ///
    /// `limit = min(MAX_PAGE_SIZE, remaining)`; the first request carries no
    /// cursor, later ones are bounded by the previous page's earliest close time.
    #[must_use]
    pub fn next_request(&self, pair: &str, timeframe: Timeframe) -> Option<KlinesRequest> {
        if self.is_done() {
            return None;
        }
        let limit = self.remaining.min(u64::from(MAX_PAGE_SIZE));
        let req = KlinesRequest::new(pair, timeframe, limit);
        Some(match self.next_cursor {
            Some(cursor) => req.end_time(cursor),
            None => req,
        })
    }

    /// Record a fetched page that was requested with `limit`.
    ///
    /// Appends the page, moves the cursor to its earliest close time and
    /// decrements the budget by `limit`. Pagination ends when there is no older
    /// data: the page is empty, or its earliest close time does not move the
    /// cursor back (the source keeps returning its boundary row).
    pub fn record(&mut self, limit: u32, page: Page) {
        match page.min_close_time() {
            Some(cursor) => {
                let stalled = self.next_cursor.is_some_and(|prev| cursor >= prev);
                if stalled {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        cursor,
                        remaining = self.remaining,
                        "cursor did not advance; no older candles available"
                    );
                    self.exhausted = true;
                }
                self.next_cursor = Some(self.next_cursor.map_or(cursor, |prev| prev.min(cursor)));
                self.remaining = self.remaining.saturating_sub(u64::from(limit));
                self.pages.push(page);
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    remaining = self.remaining,
                    "empty page; no older candles available"
                );
                self.exhausted = true;
            }
        }
    }

    /// Consume the state, yielding the pages in fetch order.
    #[must_use]
    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

/// Drives a [`PageFetcher`] backward in time and assembles one ordered,
/// deduplicated series of closed candles.
pub struct SeriesAssembler<'a> {
    fetcher: &'a dyn PageFetcher,
    clock: &'a dyn Clock,
}

impl<'a> SeriesAssembler<'a> {
    /// Assemble with `fetcher` as the page source and `clock` as "now".
    #[must_use]
    pub const fn new(fetcher: &'a dyn PageFetcher, clock: &'a dyn Clock) -> Self {
        Self { fetcher, clock }
    }

    /// Resolve `timeframe` against `requested_candle_count` and assemble the series.
    ///
    /// # Errors
    /// - `InvalidTimeframe` / `EmptyRequest` / `InvalidArg` from resolution.
    /// - `Fetch` from the first failing page request; already fetched pages are discarded.
    /// - `Data` if a candle time cannot be represented.
    pub async fn assemble(
        &self,
        pair: &str,
        timeframe: &str,
        requested_candle_count: i64,
    ) -> Result<Series, KlinesError> {
        let resolution = resolve(timeframe, requested_candle_count)?;
        self.assemble_resolved(pair, resolution).await
    }

    /// Assemble from an already resolved request.
    ///
    /// # Errors
    /// See [`SeriesAssembler::assemble`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "klines_core::assembler::assemble",
            skip(self, resolution),
            fields(
                timeframe = %resolution.timeframe,
                total = resolution.total_candles_needed,
            ),
        )
    )]
    pub async fn assemble_resolved(
        &self,
        pair: &str,
        resolution: Resolution,
    ) -> Result<Series, KlinesError> {
        if pair.trim().is_empty() {
            return Err(KlinesError::InvalidArg("pair must not be empty".into()));
        }
        let timeframe = resolution.timeframe;

        let mut state = Pagination::new(resolution.total_candles_needed);
        while let Some(req) = state.next_request(pair, timeframe) {
            let limit = req.limit;
            let page = self.fetcher.fetch_page(req).await?;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                limit,
                rows = page.len(),
                cursor = ?state.next_cursor(),
                "fetched page"
            );
            state.record(limit, page);
        }

        let merged = merge_pages(state.into_pages());
        #[cfg(feature = "tracing")]
        tracing::debug!(
            rows = merged.rows.len(),
            duplicates = merged.duplicates,
            conflicts = merged.conflicts,
            "merged pages"
        );

        let mut rows = merged.rows;
        if let Some(_live) = drop_unclosed_tail(&mut rows, self.clock.now()) {
            #[cfg(feature = "tracing")]
            tracing::info!(open_time = _live.open_time, "dropped unclosed candle");
        }

        Ok(Series {
            pair: pair.to_string(),
            timeframe,
            candles: normalize(&rows, timeframe)?,
        })
    }
}
