// crates/shelfmark-core/src/core/status.rs
// ============================================================================
// Module: Shelfmark Synchronize Status
// Description: Per-identifier synchronization status and roll-up rules.
// Purpose: Provide the single status derivation shared by model and runtime.
// Dependencies: serde, crate::core::time
// ============================================================================

//! ## Overview
//! Synchronization status is stored optionally on each identifier and derived
//! everywhere else. [`SynchronizeStatus::effective`] is the one derivation
//! rule; [`SynchronizeStatus::aggregate`] is the one roll-up rule. Batches and
//! sessions call both rather than re-deriving locally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Status Values
// ============================================================================

/// Synchronization status of an identifier, batch, or session.
///
/// # Invariants
/// - Variants are stable for serialization and ledger round-trips.
/// - Aggregation tiers follow the declaration order below, worst first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynchronizeStatus {
    /// A synchronization attempt ended in failure.
    SynchronizeFailed,
    /// No synchronization attempt has ever been made.
    NeverSynchronized,
    /// Local changes have not been pushed to the remote service.
    Unsynchronized,
    /// An attempt is currently in flight.
    Synchronizing,
    /// The remote service carries the identifier's current data.
    Synchronized,
}

impl SynchronizeStatus {
    /// Returns the stable string form used in serialized records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SynchronizeFailed => "synchronize_failed",
            Self::NeverSynchronized => "never_synchronized",
            Self::Unsynchronized => "unsynchronized",
            Self::Synchronizing => "synchronizing",
            Self::Synchronized => "synchronized",
        }
    }

    /// Derives the effective status from a stored status and success timestamp.
    ///
    /// An explicit stored status always wins. Without one, a recorded
    /// `synchronized_at` means `synchronized`; otherwise `unsynchronized`.
    #[must_use]
    pub const fn effective(
        stored: Option<Self>,
        synchronized_at: Option<Timestamp>,
    ) -> Self {
        match stored {
            Some(status) => status,
            None => {
                if synchronized_at.is_some() {
                    Self::Synchronized
                } else {
                    Self::Unsynchronized
                }
            }
        }
    }

    /// Rolls child statuses up into one status.
    ///
    /// The first matching tier wins, in order: `synchronize_failed`,
    /// `never_synchronized`, `unsynchronized`, `synchronizing`, and finally
    /// `synchronized`. An empty collection reports `synchronized`, the
    /// vacuous form of "no child is behind".
    #[must_use]
    pub fn aggregate<I>(children: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut any_failed = false;
        let mut any_never = false;
        let mut any_unsynchronized = false;
        let mut any_synchronizing = false;
        for status in children {
            match status {
                Self::SynchronizeFailed => any_failed = true,
                Self::NeverSynchronized => any_never = true,
                Self::Unsynchronized => any_unsynchronized = true,
                Self::Synchronizing => any_synchronizing = true,
                Self::Synchronized => {}
            }
        }
        if any_failed {
            Self::SynchronizeFailed
        } else if any_never {
            Self::NeverSynchronized
        } else if any_unsynchronized {
            Self::Unsynchronized
        } else if any_synchronizing {
            Self::Synchronizing
        } else {
            Self::Synchronized
        }
    }
}

impl fmt::Display for SynchronizeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
