use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::KlinesError;

/// Unit letter of a timeframe token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    /// `s`
    Second,
    /// `m`
    Minute,
    /// `h`
    Hour,
    /// `d`
    Day,
    /// `w`
    Week,
}

impl TimeUnit {
    /// Length of one unit in seconds.
    #[must_use]
    pub const fn seconds(self) -> u64 {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
            Self::Week => 604_800,
        }
    }

    /// The unit letter used in tokens.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Second => 's',
            Self::Minute => 'm',
            Self::Hour => 'h',
            Self::Day => 'd',
            Self::Week => 'w',
        }
    }

    const fn from_code(c: char) -> Option<Self> {
        match c {
            's' => Some(Self::Second),
            'm' => Some(Self::Minute),
            'h' => Some(Self::Hour),
            'd' => Some(Self::Day),
            'w' => Some(Self::Week),
            _ => None,
        }
    }
}

/// Candle width: a positive multiplier of a [`TimeUnit`], e.g. `1h` or `15m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeframe {
    multiplier: u32,
    unit: TimeUnit,
}

impl Timeframe {
    /// Build a timeframe from parts.
    ///
    /// # Errors
    /// Returns `InvalidTimeframe` if `multiplier` is zero.
    pub fn new(multiplier: u32, unit: TimeUnit) -> Result<Self, KlinesError> {
        if multiplier == 0 {
            return Err(KlinesError::invalid_timeframe(
                format!("0{}", unit.code()),
                "multiplier must be positive",
            ));
        }
        Ok(Self { multiplier, unit })
    }

    /// Parse a token such as `"1h"`, `"5s"` or `"15m"`.
    ///
    /// The token is a positive decimal multiplier followed by exactly one unit
    /// letter out of `s`, `m`, `h`, `d`, `w`.
    ///
    /// # Errors
    /// Returns `InvalidTimeframe` for an unknown unit letter, a missing, zero or
    /// non-numeric multiplier, or trailing characters after the unit.
    pub fn parse(token: &str) -> Result<Self, KlinesError> {
        let digits_end = token
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(token.len(), |(i, _)| i);
        let (digits, rest) = token.split_at(digits_end);
        if digits.is_empty() {
            return Err(KlinesError::invalid_timeframe(
                token,
                "expected a numeric multiplier",
            ));
        }
        let multiplier: u32 = digits
            .parse()
            .map_err(|_| KlinesError::invalid_timeframe(token, "multiplier out of range"))?;
        if multiplier == 0 {
            return Err(KlinesError::invalid_timeframe(
                token,
                "multiplier must be positive",
            ));
        }

        let mut chars = rest.chars();
        let unit = match (chars.next(), chars.next()) {
            (Some(c), None) => TimeUnit::from_code(c).ok_or_else(|| {
                KlinesError::invalid_timeframe(token, format!("unknown unit '{c}'"))
            })?,
            (None, _) => return Err(KlinesError::invalid_timeframe(token, "missing unit")),
            (Some(_), Some(_)) => {
                return Err(KlinesError::invalid_timeframe(
                    token,
                    "unexpected characters after unit",
                ));
            }
        };
        Ok(Self { multiplier, unit })
    }

    /// The numeric multiplier.
    #[must_use]
    pub const fn multiplier(self) -> u32 {
        self.multiplier
    }

    /// The unit.
    #[must_use]
    pub const fn unit(self) -> TimeUnit {
        self.unit
    }

    /// Width of one candle in seconds.
    #[must_use]
    pub const fn duration_seconds(self) -> u64 {
        self.multiplier as u64 * self.unit.seconds()
    }

    /// Width of one candle in milliseconds.
    #[must_use]
    pub const fn duration_ms(self) -> i64 {
        // multiplier is u32 and the largest unit is a week, so this cannot overflow i64.
        self.duration_seconds() as i64 * 1_000
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.multiplier, self.unit.code())
    }
}

impl FromStr for Timeframe {
    type Err = KlinesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Outcome of resolving a timeframe token against a requested candle count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The parsed timeframe.
    pub timeframe: Timeframe,
    /// `multiplier * unit_seconds`.
    pub duration_seconds: u64,
    /// `duration_seconds * requested_candle_count`.
    pub total_candles_needed: u64,
}

/// Resolve a timeframe token and a per-unit candle count into the number of
/// candles to retrieve.
///
/// `total_candles_needed = multiplier * unit_seconds * requested_candle_count`.
///
/// # Errors
/// - `InvalidTimeframe` if the token does not parse.
/// - `EmptyRequest` if `requested_candle_count` is zero or negative.
/// - `InvalidArg` if the product overflows.
pub fn resolve(token: &str, requested_candle_count: i64) -> Result<Resolution, KlinesError> {
    let timeframe = Timeframe::parse(token)?;
    let requested = u64::try_from(requested_candle_count)
        .ok()
        .filter(|n| *n > 0)
        .ok_or(KlinesError::EmptyRequest {
            requested: requested_candle_count,
        })?;
    let duration_seconds = timeframe.duration_seconds();
    let total_candles_needed = duration_seconds.checked_mul(requested).ok_or_else(|| {
        KlinesError::InvalidArg(format!(
            "{requested} candles of {timeframe} overflows the candle budget"
        ))
    })?;
    Ok(Resolution {
        timeframe,
        duration_seconds,
        total_candles_needed,
    })
}
