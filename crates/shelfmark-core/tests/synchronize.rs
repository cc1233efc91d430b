// crates/shelfmark-core/tests/synchronize.rs
// ============================================================================
// Module: Synchronizer Tests
// Description: Tests for the per-identifier synchronization engine.
// Purpose: Ensure validation ordering, failure policy, and persisted states.
// ============================================================================

//! ## Overview
//! Validates the attempt loop end to end against seeded in-memory endpoints:
//! skips, successful updates, uniqueness conflicts, the asymmetric link-failure
//! policy, and the three persisted record states per attempt.

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

use shelfmark_core::AbsoluteId;
use shelfmark_core::ArchiveCall;
use shelfmark_core::ArchiveFaults;
use shelfmark_core::AttemptOutcome;
use shelfmark_core::ConflictKind;
use shelfmark_core::ContainerLocation;
use shelfmark_core::ContainerRecord;
use shelfmark_core::ContainerSnapshot;
use shelfmark_core::GenerateRequest;
use shelfmark_core::IdentifierId;
use shelfmark_core::InMemoryArchive;
use shelfmark_core::InMemoryLedger;
use shelfmark_core::LocationRecord;
use shelfmark_core::LocationSnapshot;
use shelfmark_core::MissingResource;
use shelfmark_core::ProfileSnapshot;
use shelfmark_core::ProvenanceSnapshot;
use shelfmark_core::RecordUri;
use shelfmark_core::RemoteError;
use shelfmark_core::RepositoryRecord;
use shelfmark_core::SkipReason;
use shelfmark_core::SynchronizeFailure;
use shelfmark_core::SynchronizeRequest;
use shelfmark_core::SynchronizeStatus;
use shelfmark_core::Synchronizer;
use shelfmark_core::SynchronizerError;
use shelfmark_core::Timestamp;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

const REPOSITORY_URI: &str = "/repositories/4";
const CONTAINER_URI: &str = "/repositories/4/top_containers/118091";
const LOCATION_URI: &str = "/locations/23640";
const PROFILE_URI: &str = "/container_profiles/2";
const BARCODE: &str = "32101103191142";
const STALE_BARCODE: &str = "32101103190000";

fn repository() -> RepositoryRecord {
    RepositoryRecord {
        id: 4,
        uri: RecordUri::from(REPOSITORY_URI),
        repo_code: Some("univarchives".to_string()),
        name: Some("University Archives".to_string()),
    }
}

fn container() -> ContainerRecord {
    ContainerRecord {
        id: 118_091,
        uri: RecordUri::from(CONTAINER_URI),
        indicator: Some("118091".to_string()),
        barcode: Some(STALE_BARCODE.to_string()),
        container_locations: Vec::new(),
    }
}

fn location() -> LocationRecord {
    LocationRecord {
        id: 23_640,
        uri: RecordUri::from(LOCATION_URI),
        building: Some("Annex".to_string()),
        classification: Some("anxb".to_string()),
    }
}

fn identifier() -> AbsoluteId {
    AbsoluteId::generate(GenerateRequest {
        id: IdentifierId::new(1),
        index: 0,
        barcode: Some(BARCODE.to_string()),
        container: ContainerSnapshot {
            id: Some(118_091),
            uri: Some(RecordUri::from(CONTAINER_URI)),
            barcode: Some(STALE_BARCODE.to_string()),
            indicator: Some("118091".to_string()),
        },
        container_profile: ProfileSnapshot {
            id: Some(2),
            uri: Some(RecordUri::from(PROFILE_URI)),
            name: Some("Elephant size box".to_string()),
        },
        location: LocationSnapshot {
            id: Some(23_640),
            uri: Some(RecordUri::from(LOCATION_URI)),
            building: Some("Annex".to_string()),
            area: Some("Annex B".to_string()),
            classification: Some("anxb".to_string()),
        },
        provenance: ProvenanceSnapshot {
            repository_uri: Some(RecordUri::from(REPOSITORY_URI)),
            repository_name: Some("University Archives".to_string()),
            repository_code: Some("univarchives".to_string()),
            resource_uri: Some(RecordUri::from("/repositories/4/resources/4188")),
            resource_title: Some("AbID Testing Resource #1".to_string()),
        },
    })
    .expect("generate identifier")
}

fn seeded_endpoints() -> (InMemoryArchive, InMemoryArchive) {
    let source = InMemoryArchive::new();
    source.insert_repository(repository()).expect("seed source repository");
    source
        .insert_container(RecordUri::from(REPOSITORY_URI), container())
        .expect("seed source container");
    source.insert_location(location()).expect("seed source location");

    let target = InMemoryArchive::new();
    target.insert_repository(repository()).expect("seed target repository");
    target
        .insert_container(RecordUri::from(REPOSITORY_URI), container())
        .expect("seed target container");
    target.insert_location(location()).expect("seed target location");
    (source, target)
}

fn seeded_ledger(record: AbsoluteId) -> InMemoryLedger {
    let ledger = InMemoryLedger::new();
    ledger.insert(record).expect("seed ledger");
    ledger
}

fn request() -> SynchronizeRequest {
    SynchronizeRequest {
        identifier: IdentifierId::new(1),
        requested_at: Timestamp::Logical(7),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies a full attempt updates the target container and persists
/// the in-flight, terminal, and flag-cleared record states in order.
#[test]
fn synchronize_updates_the_target_container() {
    let (source, target) = seeded_endpoints();
    let ledger = seeded_ledger(identifier());
    let engine = Synchronizer::new(source, target.clone(), ledger.clone());

    let report = engine.synchronize(&request()).expect("synchronize");

    assert_eq!(report.outcome, AttemptOutcome::Completed);
    assert_eq!(
        report.identifier.effective_status(),
        SynchronizeStatus::Synchronized
    );
    assert_eq!(report.identifier.synchronized_at, Some(Timestamp::Logical(7)));
    assert!(!report.identifier.synchronizing);

    let updated = target
        .container(&RecordUri::from(CONTAINER_URI))
        .expect("read container")
        .expect("container seeded");
    assert_eq!(updated.barcode.as_deref(), Some(BARCODE));
    assert_eq!(updated.indicator.as_deref(), Some("P-000000"));
    assert_eq!(updated.container_locations.len(), 1);
    assert_eq!(updated.container_locations[0].uri.as_str(), LOCATION_URI);

    let saves = ledger.save_log().expect("save log");
    assert_eq!(saves.len(), 3);
    assert_eq!(saves[0].synchronize_status, Some(SynchronizeStatus::Synchronizing));
    assert!(saves[0].synchronizing);
    assert_eq!(saves[1].synchronize_status, Some(SynchronizeStatus::Synchronized));
    assert!(saves[1].synchronizing);
    assert_eq!(saves[2].synchronize_status, Some(SynchronizeStatus::Synchronized));
    assert!(!saves[2].synchronizing);
}

/// Verifies both uniqueness searches run before the container mutation.
#[test]
fn validation_precedes_the_container_update() {
    let (source, target) = seeded_endpoints();
    let ledger = seeded_ledger(identifier());
    let engine = Synchronizer::new(source, target.clone(), ledger);

    engine.synchronize(&request()).expect("synchronize");

    let calls = target.calls().expect("call log");
    let expected = vec![
        ArchiveCall::FindRepository {
            uri: RecordUri::from(REPOSITORY_URI),
        },
        ArchiveCall::FindTopContainer {
            uri: RecordUri::from(CONTAINER_URI),
        },
        ArchiveCall::SearchByBarcode {
            repository: RecordUri::from(REPOSITORY_URI),
            barcode: BARCODE.to_string(),
        },
        ArchiveCall::SearchByIndicator {
            repository: RecordUri::from(REPOSITORY_URI),
            indicator: "P-000000".to_string(),
        },
        ArchiveCall::UpdateContainer {
            container: RecordUri::from(CONTAINER_URI),
        },
        ArchiveCall::LinkContainerProfile {
            profile: RecordUri::from(PROFILE_URI),
        },
        ArchiveCall::LinkLocation {
            location: RecordUri::from(LOCATION_URI),
        },
    ];
    assert_eq!(calls, expected);
}

/// Verifies ineligible identifiers are skipped without saves or remote calls.
#[test]
fn synchronize_skips_identifiers_with_incomplete_snapshots() {
    let (source, target) = seeded_endpoints();
    let mut unshelved = identifier();
    unshelved.location = LocationSnapshot::default();
    let ledger = seeded_ledger(unshelved);
    let engine = Synchronizer::new(source.clone(), target.clone(), ledger.clone());

    let report = engine.synchronize(&request()).expect("synchronize");

    assert_eq!(
        report.outcome,
        AttemptOutcome::Skipped {
            reason: SkipReason::EmptyLocationSnapshot,
        }
    );
    assert_eq!(
        report.identifier.effective_status(),
        SynchronizeStatus::NeverSynchronized
    );
    assert!(ledger.save_log().expect("save log").is_empty());
    assert!(source.calls().expect("source calls").is_empty());
    assert!(target.calls().expect("target calls").is_empty());

    let mut uncontained = identifier();
    uncontained.container = ContainerSnapshot::default();
    let ledger = seeded_ledger(uncontained);
    let engine = Synchronizer::new(source, target, ledger.clone());

    let report = engine.synchronize(&request()).expect("synchronize");

    assert_eq!(
        report.outcome,
        AttemptOutcome::Skipped {
            reason: SkipReason::EmptyContainerSnapshot,
        }
    );
    assert!(ledger.save_log().expect("save log").is_empty());
}

/// Verifies a barcode already held by a different container aborts the
/// attempt before any mutation reaches the target service.
#[test]
fn duplicate_barcodes_fail_the_attempt_before_mutation() {
    let (source, target) = seeded_endpoints();
    target
        .insert_container(
            RecordUri::from(REPOSITORY_URI),
            ContainerRecord {
                id: 99_099,
                uri: RecordUri::from("/repositories/4/top_containers/99099"),
                indicator: Some("B-000777".to_string()),
                barcode: Some(BARCODE.to_string()),
                container_locations: Vec::new(),
            },
        )
        .expect("seed duplicate container");
    let ledger = seeded_ledger(identifier());
    let engine = Synchronizer::new(source, target.clone(), ledger.clone());

    let report = engine.synchronize(&request()).expect("synchronize");

    assert_eq!(
        report.outcome,
        AttemptOutcome::Failed {
            failure: SynchronizeFailure::Conflict {
                kind: ConflictKind::Barcode,
                value: BARCODE.to_string(),
            },
        }
    );
    assert_eq!(
        report.identifier.effective_status(),
        SynchronizeStatus::SynchronizeFailed
    );
    assert!(!report.identifier.synchronizing);
    assert!(report.identifier.synchronized_at.is_none());

    let calls = target.calls().expect("call log");
    assert!(calls.iter().all(|call| !matches!(call, ArchiveCall::UpdateContainer { .. })));

    let untouched = target
        .container(&RecordUri::from(CONTAINER_URI))
        .expect("read container")
        .expect("container seeded");
    assert_eq!(untouched.barcode.as_deref(), Some(STALE_BARCODE));

    let saves = ledger.save_log().expect("save log");
    assert_eq!(saves.len(), 3);
    assert_eq!(saves[1].synchronize_status, Some(SynchronizeStatus::SynchronizeFailed));
}

/// Verifies an indicator already held by a different container aborts
/// the attempt.
#[test]
fn duplicate_indicators_fail_the_attempt() {
    let (source, target) = seeded_endpoints();
    target
        .insert_container(
            RecordUri::from(REPOSITORY_URI),
            ContainerRecord {
                id: 99_100,
                uri: RecordUri::from("/repositories/4/top_containers/99100"),
                indicator: Some("P-000000".to_string()),
                barcode: None,
                container_locations: Vec::new(),
            },
        )
        .expect("seed duplicate container");
    let ledger = seeded_ledger(identifier());
    let engine = Synchronizer::new(source, target, ledger);

    let report = engine.synchronize(&request()).expect("synchronize");

    assert_eq!(
        report.outcome,
        AttemptOutcome::Failed {
            failure: SynchronizeFailure::Conflict {
                kind: ConflictKind::Indicator,
                value: "P-000000".to_string(),
            },
        }
    );
}

/// Verifies the self-match exemption: a target container already carrying
/// the identifier's values passes uniqueness validation on re-run.
#[test]
fn resynchronizing_the_same_container_is_not_a_conflict() {
    let (source, target) = seeded_endpoints();
    let ledger = seeded_ledger(identifier());
    let engine = Synchronizer::new(source, target, ledger);

    let first = engine.synchronize(&request()).expect("first attempt");
    assert_eq!(first.outcome, AttemptOutcome::Completed);

    let second = engine.synchronize(&request()).expect("second attempt");
    assert_eq!(second.outcome, AttemptOutcome::Completed);
    assert_eq!(
        second.identifier.effective_status(),
        SynchronizeStatus::Synchronized
    );
}

/// Verifies failing link steps leave the identifier synchronized.
#[test]
fn link_failures_do_not_fail_the_attempt() {
    let (source, target) = seeded_endpoints();
    target
        .set_faults(ArchiveFaults {
            drop_profile_links: true,
            drop_location_links: true,
            ..ArchiveFaults::default()
        })
        .expect("set faults");
    let ledger = seeded_ledger(identifier());
    let engine = Synchronizer::new(source, target.clone(), ledger);

    let report = engine.synchronize(&request()).expect("synchronize");

    assert_eq!(report.outcome, AttemptOutcome::Completed);
    assert_eq!(
        report.identifier.effective_status(),
        SynchronizeStatus::Synchronized
    );
    let updated = target
        .container(&RecordUri::from(CONTAINER_URI))
        .expect("read container")
        .expect("container seeded");
    assert_eq!(updated.barcode.as_deref(), Some(BARCODE));
}

/// Verifies a profile snapshot without a URI skips only the profile link.
#[test]
fn missing_profile_uri_skips_only_the_profile_link() {
    let (source, target) = seeded_endpoints();
    let mut record = identifier();
    record.container_profile.uri = None;
    let ledger = seeded_ledger(record);
    let engine = Synchronizer::new(source, target.clone(), ledger);

    let report = engine.synchronize(&request()).expect("synchronize");

    assert_eq!(report.outcome, AttemptOutcome::Completed);
    let calls = target.calls().expect("call log");
    assert!(calls.iter().all(|call| !matches!(call, ArchiveCall::LinkContainerProfile { .. })));
    assert!(calls.iter().any(|call| matches!(call, ArchiveCall::LinkLocation { .. })));
}

/// Verifies an adapter-rejected core-field update marks the identifier
/// failed and suppresses the link steps.
#[test]
fn rejected_updates_mark_the_identifier_failed() {
    let (source, target) = seeded_endpoints();
    target
        .set_faults(ArchiveFaults {
            fail_update: Some(RemoteError::Update("lock version conflict".to_string())),
            ..ArchiveFaults::default()
        })
        .expect("set faults");
    let ledger = seeded_ledger(identifier());
    let engine = Synchronizer::new(source, target.clone(), ledger);

    let report = engine.synchronize(&request()).expect("synchronize");

    match report.outcome {
        AttemptOutcome::Failed {
            failure: SynchronizeFailure::UpdateFailed { uri, message },
        } => {
            assert_eq!(uri.as_str(), CONTAINER_URI);
            assert!(message.contains("lock version conflict"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        report.identifier.effective_status(),
        SynchronizeStatus::SynchronizeFailed
    );
    let calls = target.calls().expect("call log");
    assert!(calls.iter().all(|call| {
        !matches!(
            call,
            ArchiveCall::LinkContainerProfile { .. } | ArchiveCall::LinkLocation { .. }
        )
    }));
}

/// Verifies an acknowledged update without a returned record completes.
#[test]
fn acknowledged_updates_without_a_record_still_complete() {
    let (source, target) = seeded_endpoints();
    target
        .set_faults(ArchiveFaults {
            update_returns_none: true,
            ..ArchiveFaults::default()
        })
        .expect("set faults");
    let ledger = seeded_ledger(identifier());
    let engine = Synchronizer::new(source, target, ledger);

    let report = engine.synchronize(&request()).expect("synchronize");

    assert_eq!(report.outcome, AttemptOutcome::Completed);
    assert_eq!(
        report.identifier.effective_status(),
        SynchronizeStatus::Synchronized
    );
}

/// Verifies unresolved records fail the attempt with the missing
/// resource named.
#[test]
fn missing_records_fail_the_attempt() {
    let (source, target) = seeded_endpoints();
    let mut record = identifier();
    record.provenance.repository_uri = None;
    let ledger = seeded_ledger(record);
    let engine = Synchronizer::new(source.clone(), target, ledger);

    let report = engine.synchronize(&request()).expect("synchronize");

    assert_eq!(
        report.outcome,
        AttemptOutcome::Failed {
            failure: SynchronizeFailure::NotFound {
                resource: MissingResource::SourceRepository,
                uri: None,
            },
        }
    );

    let bare_target = InMemoryArchive::new();
    bare_target
        .insert_repository(repository())
        .expect("seed target repository");
    let ledger = seeded_ledger(identifier());
    let engine = Synchronizer::new(source, bare_target, ledger);

    let report = engine.synchronize(&request()).expect("synchronize");

    assert_eq!(
        report.outcome,
        AttemptOutcome::Failed {
            failure: SynchronizeFailure::NotFound {
                resource: MissingResource::TargetContainer,
                uri: Some(RecordUri::from(CONTAINER_URI)),
            },
        }
    );
    assert_eq!(
        report.identifier.effective_status(),
        SynchronizeStatus::SynchronizeFailed
    );
}

/// Verifies an unknown ledger key surfaces as an error rather than a
/// business failure.
#[test]
fn unknown_identifiers_surface_as_errors() {
    let (source, target) = seeded_endpoints();
    let ledger = InMemoryLedger::new();
    let engine = Synchronizer::new(source, target, ledger);

    let error = engine.synchronize(&request()).expect_err("unknown identifier");
    assert!(matches!(
        error,
        SynchronizerError::UnknownIdentifier(id) if id == IdentifierId::new(1)
    ));
}

/// Verifies a stale in-flight flag from a crashed attempt does not block
/// a new attempt.
#[test]
fn stale_in_flight_flags_do_not_block_new_attempts() {
    let (source, target) = seeded_endpoints();
    let mut record = identifier();
    record.synchronizing = true;
    record.synchronize_status = Some(SynchronizeStatus::Synchronizing);
    let ledger = seeded_ledger(record);
    let engine = Synchronizer::new(source, target, ledger);

    let report = engine.synchronize(&request()).expect("synchronize");

    assert_eq!(report.outcome, AttemptOutcome::Completed);
    assert!(!report.identifier.synchronizing);
}

/// Verifies links to other locations survive the update and the own
/// location link is not duplicated on retry.
#[test]
fn existing_location_links_are_retained_without_duplicates() {
    let (source, target) = seeded_endpoints();
    let mut seeded = container();
    seeded.container_locations = vec![
        ContainerLocation {
            uri: RecordUri::from("/locations/23652"),
            status: Some("current".to_string()),
        },
        ContainerLocation {
            uri: RecordUri::from(LOCATION_URI),
            status: Some("current".to_string()),
        },
    ];
    target
        .insert_container(RecordUri::from(REPOSITORY_URI), seeded)
        .expect("reseed target container");
    let ledger = seeded_ledger(identifier());
    let engine = Synchronizer::new(source, target.clone(), ledger);

    let report = engine.synchronize(&request()).expect("synchronize");
    assert_eq!(report.outcome, AttemptOutcome::Completed);

    let updated = target
        .container(&RecordUri::from(CONTAINER_URI))
        .expect("read container")
        .expect("container seeded");
    let own_links = updated
        .container_locations
        .iter()
        .filter(|link| link.uri.as_str() == LOCATION_URI)
        .count();
    assert_eq!(own_links, 1);
    assert!(
        updated
            .container_locations
            .iter()
            .any(|link| link.uri.as_str() == "/locations/23652")
    );
    assert_eq!(updated.container_locations.len(), 2);
}
