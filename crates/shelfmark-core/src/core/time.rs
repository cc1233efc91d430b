// crates/shelfmark-core/src/core/time.rs
// ============================================================================
// Module: Shelfmark Time Model
// Description: Canonical timestamp representations for identifier records.
// Purpose: Provide deterministic, replayable time values across Shelfmark records.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Shelfmark uses explicit time values embedded in requests and records to keep
//! synchronization attempts replayable. The core engine never reads wall-clock
//! time directly; hosts must supply timestamps via requests or record fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Date layout used in session display labels.
const LABEL_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month]/[day]/[year]");

/// Canonical timestamp used in Shelfmark records and synchronization requests.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }

    /// Renders the timestamp as a `MM/DD/YYYY` date for display labels.
    ///
    /// Logical timestamps and out-of-range epoch values render as the raw
    /// value so labels stay total.
    #[must_use]
    pub fn display_date(&self) -> String {
        match self {
            Self::UnixMillis(millis) => {
                let seconds = millis.div_euclid(1000);
                OffsetDateTime::from_unix_timestamp(seconds)
                    .ok()
                    .and_then(|moment| moment.format(LABEL_DATE_FORMAT).ok())
                    .unwrap_or_else(|| format!("unix_millis {millis}"))
            }
            Self::Logical(tick) => format!("logical {tick}"),
        }
    }
}
