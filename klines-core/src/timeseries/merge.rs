use std::collections::{BTreeMap, btree_map::Entry};

use crate::{Page, RawKline};

/// Outcome of merging fetched pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Merged {
    /// Rows ascending by open time, one per open time.
    pub rows: Vec<RawKline>,
    /// Rows dropped because an identical row was already present.
    pub duplicates: usize,
    /// Rows dropped because a different row with the same open time was already present.
    pub conflicts: usize,
}

/// Merge pages in fetch order (first page has priority).
///
/// - Rows are keyed by `open_time` and returned ascending.
/// - Exact duplicates (pages overlapping at their boundary) are dropped.
/// - If two rows share an open time but differ, the first-fetched one wins.
///   The newest page is fetched first, so its copy is kept.
#[must_use]
pub fn merge_pages<I>(pages: I) -> Merged
where
    I: IntoIterator<Item = Page>,
{
    let mut map: BTreeMap<i64, RawKline> = BTreeMap::new();
    let mut duplicates = 0usize;
    let mut conflicts = 0usize;

    for page in pages {
        for row in page.rows {
            match map.entry(row.open_time) {
                Entry::Vacant(v) => {
                    v.insert(row);
                }
                Entry::Occupied(o) => {
                    if *o.get() == row {
                        duplicates += 1;
                    } else {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            open_time = row.open_time,
                            "conflicting rows for one open time; keeping the newer page's row"
                        );
                        conflicts += 1;
                    }
                }
            }
        }
    }

    Merged {
        rows: map.into_values().collect(),
        duplicates,
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(open_time: i64, close: f64) -> RawKline {
        RawKline {
            open_time,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close,
            volume: 1.0,
            close_time: open_time + 59_999,
            quote_volume: 1.0,
            n_trades: 1,
            taker_buy_base_volume: 0.5,
            taker_buy_quote_volume: 0.5,
            ignore: "0".into(),
        }
    }

    #[test]
    fn first_page_wins_on_conflict() {
        let newer = Page::new(vec![row(60_000, 9.0), row(120_000, 9.0)]);
        let older = Page::new(vec![row(0, 1.0), row(60_000, 1.0)]);
        let m = merge_pages([newer, older]);
        assert_eq!(m.rows.len(), 3);
        assert_eq!(m.conflicts, 1);
        assert_eq!(m.duplicates, 0);
        assert!((m.rows[1].close - 9.0).abs() < f64::EPSILON);
    }
}
