// crates/shelfmark-core/tests/status_rollup.rs
// ============================================================================
// Module: Status Roll-Up Tests
// Description: Tests for status derivation and batch/session aggregation.
// Purpose: Ensure the one derivation rule and one roll-up rule hold everywhere.
// Dependencies: shelfmark-core, serde_json
// ============================================================================

//! ## Overview
//! Validates effective-status derivation, worst-first aggregation across
//! batches and sessions, and the stable serialized status tokens.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::iter;

use shelfmark_core::AbsoluteId;
use shelfmark_core::Barcode;
use shelfmark_core::Batch;
use shelfmark_core::BatchId;
use shelfmark_core::ContainerSnapshot;
use shelfmark_core::IdentifierId;
use shelfmark_core::LocationSnapshot;
use shelfmark_core::ProfileSnapshot;
use shelfmark_core::ProvenanceSnapshot;
use shelfmark_core::Session;
use shelfmark_core::SessionId;
use shelfmark_core::SynchronizeStatus;
use shelfmark_core::Timestamp;
use shelfmark_core::UserId;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

fn identifier(
    id: u64,
    status: Option<SynchronizeStatus>,
    synchronized_at: Option<Timestamp>,
) -> AbsoluteId {
    AbsoluteId {
        id: IdentifierId::new(id),
        barcode: Barcode::default(),
        index: 0,
        container: ContainerSnapshot::default(),
        container_profile: ProfileSnapshot::default(),
        location: LocationSnapshot::default(),
        provenance: ProvenanceSnapshot::default(),
        synchronize_status: status,
        synchronizing: matches!(status, Some(SynchronizeStatus::Synchronizing)),
        synchronized_at,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies an explicit stored status always wins the derivation.
#[test]
fn effective_status_prefers_the_stored_value() {
    let stored = [
        SynchronizeStatus::SynchronizeFailed,
        SynchronizeStatus::NeverSynchronized,
        SynchronizeStatus::Unsynchronized,
        SynchronizeStatus::Synchronizing,
        SynchronizeStatus::Synchronized,
    ];
    for status in stored {
        assert_eq!(SynchronizeStatus::effective(Some(status), None), status);
        assert_eq!(
            SynchronizeStatus::effective(Some(status), Some(Timestamp::Logical(1))),
            status
        );
    }
    assert_eq!(
        SynchronizeStatus::effective(None, Some(Timestamp::Logical(1))),
        SynchronizeStatus::Synchronized
    );
    assert_eq!(
        SynchronizeStatus::effective(None, None),
        SynchronizeStatus::Unsynchronized
    );
}

/// Verifies the worst child status wins regardless of counts.
#[test]
fn aggregate_reports_the_worst_child_status() {
    assert_eq!(
        SynchronizeStatus::aggregate([
            SynchronizeStatus::Synchronized,
            SynchronizeStatus::SynchronizeFailed,
            SynchronizeStatus::Unsynchronized,
        ]),
        SynchronizeStatus::SynchronizeFailed
    );
    assert_eq!(
        SynchronizeStatus::aggregate([
            SynchronizeStatus::Synchronized,
            SynchronizeStatus::NeverSynchronized,
            SynchronizeStatus::Unsynchronized,
            SynchronizeStatus::Synchronizing,
        ]),
        SynchronizeStatus::NeverSynchronized
    );
    assert_eq!(
        SynchronizeStatus::aggregate([
            SynchronizeStatus::Synchronized,
            SynchronizeStatus::Unsynchronized,
            SynchronizeStatus::Synchronizing,
        ]),
        SynchronizeStatus::Unsynchronized
    );
    assert_eq!(
        SynchronizeStatus::aggregate([
            SynchronizeStatus::Synchronized,
            SynchronizeStatus::Synchronizing,
        ]),
        SynchronizeStatus::Synchronizing
    );
    assert_eq!(
        SynchronizeStatus::aggregate([SynchronizeStatus::Synchronized; 3]),
        SynchronizeStatus::Synchronized
    );
}

/// Verifies the vacuous roll-up of an empty collection.
#[test]
fn aggregate_of_no_children_is_synchronized() {
    assert_eq!(
        SynchronizeStatus::aggregate(iter::empty()),
        SynchronizeStatus::Synchronized
    );

    let batch = Batch {
        id: BatchId::new(1),
        user_id: UserId::new(1),
        identifiers: Vec::new(),
    };
    assert_eq!(batch.synchronize_status(), SynchronizeStatus::Synchronized);
    assert!(batch.is_synchronized());
    assert!(!batch.is_synchronizing());

    let session = Session {
        id: SessionId::new(1),
        user_id: UserId::new(1),
        created_at: Timestamp::Logical(0),
        batches: Vec::new(),
    };
    assert_eq!(session.synchronize_status(), SynchronizeStatus::Synchronized);
    assert!(session.is_synchronized());
}

/// Verifies batch status derives from member effective statuses.
#[test]
fn batch_status_rolls_up_member_effective_statuses() {
    let behind = Batch {
        id: BatchId::new(3),
        user_id: UserId::new(7),
        identifiers: vec![
            identifier(1, Some(SynchronizeStatus::Synchronized), Some(Timestamp::Logical(4))),
            identifier(2, None, Some(Timestamp::Logical(5))),
            identifier(3, None, None),
        ],
    };
    assert_eq!(behind.synchronize_status(), SynchronizeStatus::Unsynchronized);
    assert!(!behind.is_synchronized());

    let failed = Batch {
        id: BatchId::new(4),
        user_id: UserId::new(7),
        identifiers: vec![
            identifier(4, Some(SynchronizeStatus::SynchronizeFailed), None),
            identifier(5, None, Some(Timestamp::Logical(6))),
        ],
    };
    assert_eq!(failed.synchronize_status(), SynchronizeStatus::SynchronizeFailed);
}

/// Verifies the all/any semantics of the batch predicates.
#[test]
fn batch_predicates_use_all_and_any_semantics() {
    let mixed = Batch {
        id: BatchId::new(9),
        user_id: UserId::new(2),
        identifiers: vec![
            identifier(1, None, Some(Timestamp::Logical(1))),
            identifier(2, Some(SynchronizeStatus::Synchronizing), None),
        ],
    };
    assert!(mixed.is_synchronizing());
    assert!(!mixed.is_synchronized());

    let done = Batch {
        id: BatchId::new(10),
        user_id: UserId::new(2),
        identifiers: vec![
            identifier(3, None, Some(Timestamp::Logical(2))),
            identifier(4, Some(SynchronizeStatus::Synchronized), Some(Timestamp::Logical(3))),
        ],
    };
    assert!(done.is_synchronized());
    assert!(!done.is_synchronizing());
}

/// Verifies session status derives from batch roll-ups.
#[test]
fn session_status_rolls_up_batch_statuses() {
    let session = Session {
        id: SessionId::new(5),
        user_id: UserId::new(2),
        created_at: Timestamp::UnixMillis(1_611_234_000_000),
        batches: vec![
            Batch {
                id: BatchId::new(1),
                user_id: UserId::new(2),
                identifiers: vec![identifier(1, None, Some(Timestamp::Logical(9)))],
            },
            Batch {
                id: BatchId::new(2),
                user_id: UserId::new(2),
                identifiers: vec![identifier(2, Some(SynchronizeStatus::SynchronizeFailed), None)],
            },
        ],
    };
    assert_eq!(session.synchronize_status(), SynchronizeStatus::SynchronizeFailed);
    assert!(!session.is_synchronized());
    assert!(!session.is_synchronizing());
    assert_eq!(session.absolute_ids().count(), 2);
}

/// Verifies the stable status tokens in display and serde forms.
#[test]
fn status_serializes_with_stable_tokens() {
    let tokens = [
        (SynchronizeStatus::SynchronizeFailed, "synchronize_failed"),
        (SynchronizeStatus::NeverSynchronized, "never_synchronized"),
        (SynchronizeStatus::Unsynchronized, "unsynchronized"),
        (SynchronizeStatus::Synchronizing, "synchronizing"),
        (SynchronizeStatus::Synchronized, "synchronized"),
    ];
    for (status, token) in tokens {
        assert_eq!(status.as_str(), token);
        assert_eq!(status.to_string(), token);
        let json = serde_json::to_string(&status).expect("serialize");
        assert_eq!(json, format!("\"{token}\""));
        let decoded: SynchronizeStatus = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, status);
    }
}

/// Verifies identifier records survive a serde round trip unchanged.
#[test]
fn identifier_records_round_trip_through_serde() {
    let record = identifier(
        11,
        Some(SynchronizeStatus::Synchronized),
        Some(Timestamp::UnixMillis(42)),
    );
    let json = serde_json::to_string(&record).expect("serialize");
    let decoded: AbsoluteId = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, record);
}
