//! Series helpers used by the assembler.
//!
//! - `merge`: concatenate pages, order by open time and drop boundary duplicates
//! - `util`: trim the unclosed tail and normalize raw rows into candles
/// Page merging with duplicate detection.
pub mod merge;
/// Live-candle trimming and row normalization.
pub mod util;
