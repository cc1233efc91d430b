// crates/shelfmark-core/src/runtime/synchronizer.rs
// ============================================================================
// Module: Shelfmark Synchronizer
// Description: Per-identifier synchronization engine against two endpoints.
// Purpose: Validate uniqueness and push identifier data into the target service.
// Dependencies: crate::{core, interfaces}, thiserror, tracing
// ============================================================================

//! ## Overview
//! The synchronizer runs one attempt per identifier: resolve the records the
//! snapshots refer to on the source endpoint, map them to the target endpoint,
//! validate barcode and indicator uniqueness, then apply the core-field update
//! followed by the profile and location links. Core-field problems are fatal;
//! link problems are logged and skipped. Every attempt ends with a persisted
//! terminal status and a cleared in-flight flag, and the caller observes a
//! tagged outcome rather than an unwound error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::slice;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::core::identifiers::IdentifierId;
use crate::core::identifiers::RecordUri;
use crate::core::model::AbsoluteId;
use crate::core::remote::ContainerLocation;
use crate::core::remote::ContainerRecord;
use crate::core::remote::ContainerUpdate;
use crate::core::remote::LocationRecord;
use crate::core::remote::RepositoryRecord;
use crate::core::status::SynchronizeStatus;
use crate::core::time::Timestamp;
use crate::interfaces::ArchiveClient;
use crate::interfaces::IdentifierLedger;
use crate::interfaces::LedgerError;
use crate::interfaces::RemoteError;

// ============================================================================
// SECTION: Requests and Reports
// ============================================================================

/// Request to synchronize one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronizeRequest {
    /// Ledger key of the identifier to synchronize.
    pub identifier: IdentifierId,
    /// Timestamp recorded as `synchronized_at` on success.
    pub requested_at: Timestamp,
}

/// Result of one synchronization attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronizeReport {
    /// The identifier record as persisted when the attempt ended.
    pub identifier: AbsoluteId,
    /// What the attempt did.
    pub outcome: AttemptOutcome,
}

/// Tagged outcome of a synchronization attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// All fatal steps succeeded; the identifier is synchronized.
    Completed,
    /// The identifier was not eligible; nothing changed.
    Skipped {
        /// Why the attempt was skipped.
        reason: SkipReason,
    },
    /// A fatal step failed; the identifier is marked failed.
    Failed {
        /// The failing step's outcome.
        failure: SynchronizeFailure,
    },
}

/// Why an attempt was skipped before any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The container snapshot holds no data.
    EmptyContainerSnapshot,
    /// The location snapshot holds no data.
    EmptyLocationSnapshot,
}

impl SkipReason {
    /// Returns the stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyContainerSnapshot => "empty_container_snapshot",
            Self::EmptyLocationSnapshot => "empty_location_snapshot",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Failures
// ============================================================================

/// Record that could not be resolved during an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingResource {
    /// Repository on the source endpoint.
    SourceRepository,
    /// Container on the source endpoint.
    SourceContainer,
    /// Location on the source endpoint.
    SourceLocation,
    /// Repository on the target endpoint.
    TargetRepository,
    /// Container on the target endpoint.
    TargetContainer,
}

impl MissingResource {
    /// Returns a human-readable resource name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceRepository => "source repository",
            Self::SourceContainer => "source container",
            Self::SourceLocation => "source location",
            Self::TargetRepository => "target repository",
            Self::TargetContainer => "target container",
        }
    }
}

impl fmt::Display for MissingResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniqueness constraint violated against the target repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Another container already carries the barcode.
    Barcode,
    /// Another container already carries the indicator.
    Indicator,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Barcode => f.write_str("barcode"),
            Self::Indicator => f.write_str("indicator"),
        }
    }
}

/// Fatal outcome of a synchronization step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SynchronizeFailure {
    /// A required record could not be resolved.
    NotFound {
        /// Which record was missing.
        resource: MissingResource,
        /// URI looked up, when the snapshot supplied one.
        uri: Option<RecordUri>,
    },
    /// The barcode or indicator is already taken by a different container.
    Conflict {
        /// Which value collided.
        #[serde(rename = "conflict_kind")]
        kind: ConflictKind,
        /// The colliding value.
        value: String,
    },
    /// The service rejected the core-field update.
    UpdateFailed {
        /// Container the update targeted.
        uri: RecordUri,
        /// Error reported by the adapter.
        message: String,
    },
    /// Transport or protocol failure on a fatal step.
    Remote {
        /// Error reported by the adapter.
        message: String,
    },
}

impl SynchronizeFailure {
    /// Builds a not-found failure.
    const fn not_found(resource: MissingResource, uri: Option<RecordUri>) -> Self {
        Self::NotFound { resource, uri }
    }

    /// Builds a uniqueness-conflict failure.
    fn conflict(kind: ConflictKind, value: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            value: value.into(),
        }
    }

    /// Builds an update-rejected failure.
    fn update_failed(uri: RecordUri, error: &RemoteError) -> Self {
        Self::UpdateFailed {
            uri,
            message: error.to_string(),
        }
    }

    /// Builds a transport failure.
    fn remote(error: RemoteError) -> Self {
        Self::Remote {
            message: error.to_string(),
        }
    }
}

impl fmt::Display for SynchronizeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { resource, uri } => match uri {
                Some(uri) => write!(f, "{resource} not found at {uri}"),
                None => write!(f, "{resource} not found: snapshot carries no uri"),
            },
            Self::Conflict { kind, value } => {
                write!(f, "{kind} {value} is already in use by another container")
            }
            Self::UpdateFailed { uri, message } => {
                write!(f, "update of container {uri} failed: {message}")
            }
            Self::Remote { message } => write!(f, "remote call failed: {message}"),
        }
    }
}

/// Infrastructure errors surfaced by [`Synchronizer::synchronize`].
///
/// Business failures never land here; they are reported through
/// [`AttemptOutcome`] and the persisted status.
#[derive(Debug, Error)]
pub enum SynchronizerError {
    /// The requested identifier does not exist in the ledger.
    #[error("identifier {0} not present in the ledger")]
    UnknownIdentifier(IdentifierId),
    /// The ledger failed to load or save.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ============================================================================
// SECTION: Synchronizer
// ============================================================================

/// Per-identifier synchronization engine.
///
/// Holds a source-endpoint client, a target-endpoint client, and the ledger.
/// Attempts are strictly sequential per identifier; callers may run attempts
/// for distinct identifiers concurrently.
#[derive(Debug, Clone)]
pub struct Synchronizer<S, T, L> {
    /// Client for the endpoint the snapshots were captured from.
    source: S,
    /// Client for the endpoint being written to.
    target: T,
    /// Durable identifier store.
    ledger: L,
}

impl<S, T, L> Synchronizer<S, T, L>
where
    S: ArchiveClient,
    T: ArchiveClient,
    L: IdentifierLedger,
{
    /// Creates a synchronizer over explicit source and target clients.
    #[must_use]
    pub const fn new(source: S, target: T, ledger: L) -> Self {
        Self {
            source,
            target,
            ledger,
        }
    }

    /// Runs one synchronization attempt for the requested identifier.
    ///
    /// Safe to call repeatedly: a target container already carrying the
    /// identifier's barcode and indicator passes uniqueness validation, and a
    /// stale in-flight flag from a crashed attempt is treated as idle.
    ///
    /// # Errors
    ///
    /// Returns [`SynchronizerError`] only for infrastructure problems: an
    /// unknown identifier or a failing ledger. Every business failure is
    /// reported through the returned [`SynchronizeReport`].
    pub fn synchronize(
        &self,
        request: &SynchronizeRequest,
    ) -> Result<SynchronizeReport, SynchronizerError> {
        let Some(mut record) = self.ledger.load(request.identifier)? else {
            return Err(SynchronizerError::UnknownIdentifier(request.identifier));
        };

        if record.container.is_empty() {
            return Ok(skipped(record, SkipReason::EmptyContainerSnapshot));
        }
        if record.location.is_empty() {
            return Ok(skipped(record, SkipReason::EmptyLocationSnapshot));
        }

        record.synchronizing = true;
        record.synchronize_status = Some(SynchronizeStatus::Synchronizing);
        self.ledger.save(&record)?;

        let outcome = match self.apply_updates(&record) {
            Ok(()) => {
                record.synchronized_at = Some(request.requested_at);
                record.synchronize_status = Some(SynchronizeStatus::Synchronized);
                AttemptOutcome::Completed
            }
            Err(failure) => {
                warn!(identifier = %record.id, %failure, "failed to synchronize identifier");
                record.synchronize_status = Some(SynchronizeStatus::SynchronizeFailed);
                AttemptOutcome::Failed { failure }
            }
        };
        self.ledger.save(&record)?;

        record.synchronizing = false;
        self.ledger.save(&record)?;
        Ok(SynchronizeReport {
            identifier: record,
            outcome,
        })
    }

    /// Runs the resolution, validation, and update steps of one attempt.
    ///
    /// The caller has already verified that the container and location
    /// snapshots are non-empty.
    fn apply_updates(&self, record: &AbsoluteId) -> Result<(), SynchronizeFailure> {
        let source_repository = self.source_repository(record)?;
        let source_container = self.source_container(record)?;
        let source_location = self.source_location(record)?;

        let target_repository = self.target_repository(&source_repository)?;
        let target_container = self.target_container(&source_container)?;

        let indicator = record.label().unwrap_or_default();
        self.validate_unique_barcode(
            &target_repository,
            record.barcode.as_str(),
            target_container.id,
        )?;
        self.validate_unique_indicator(&target_repository, &indicator, target_container.id)?;

        let container_locations = retained_locations(&target_container, &source_location);
        let update = ContainerUpdate {
            barcode: record.barcode.clone(),
            indicator,
            container_locations,
        };
        match self.target.update_container(&target_container, &update) {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(container = %target_container.uri, "container update returned no record");
            }
            Err(error) => {
                return Err(SynchronizeFailure::update_failed(
                    target_container.uri.clone(),
                    &error,
                ));
            }
        }

        self.link_container_profile(record, &target_repository, &target_container);
        self.link_location(&target_repository, &target_container, &source_location);
        Ok(())
    }

    /// Resolves the repository named by the provenance snapshot.
    fn source_repository(
        &self,
        record: &AbsoluteId,
    ) -> Result<RepositoryRecord, SynchronizeFailure> {
        let Some(uri) = record.provenance.repository_uri.as_ref() else {
            return Err(SynchronizeFailure::not_found(
                MissingResource::SourceRepository,
                None,
            ));
        };
        self.source
            .find_repository(uri)
            .map_err(SynchronizeFailure::remote)?
            .ok_or_else(|| {
                SynchronizeFailure::not_found(MissingResource::SourceRepository, Some(uri.clone()))
            })
    }

    /// Resolves the container named by the container snapshot.
    fn source_container(&self, record: &AbsoluteId) -> Result<ContainerRecord, SynchronizeFailure> {
        let Some(uri) = record.container.uri.as_ref() else {
            return Err(SynchronizeFailure::not_found(
                MissingResource::SourceContainer,
                None,
            ));
        };
        self.source
            .find_top_container(uri)
            .map_err(SynchronizeFailure::remote)?
            .ok_or_else(|| {
                SynchronizeFailure::not_found(MissingResource::SourceContainer, Some(uri.clone()))
            })
    }

    /// Resolves the location named by the location snapshot.
    fn source_location(&self, record: &AbsoluteId) -> Result<LocationRecord, SynchronizeFailure> {
        let Some(uri) = record.location.uri.as_ref() else {
            return Err(SynchronizeFailure::not_found(
                MissingResource::SourceLocation,
                None,
            ));
        };
        self.source
            .find_location(uri)
            .map_err(SynchronizeFailure::remote)?
            .ok_or_else(|| {
                SynchronizeFailure::not_found(MissingResource::SourceLocation, Some(uri.clone()))
            })
    }

    /// Maps a source repository to its target-endpoint counterpart by URI.
    fn target_repository(
        &self,
        source_repository: &RepositoryRecord,
    ) -> Result<RepositoryRecord, SynchronizeFailure> {
        self.target
            .find_repository(&source_repository.uri)
            .map_err(SynchronizeFailure::remote)?
            .ok_or_else(|| {
                SynchronizeFailure::not_found(
                    MissingResource::TargetRepository,
                    Some(source_repository.uri.clone()),
                )
            })
    }

    /// Maps a source container to its target-endpoint counterpart by URI.
    fn target_container(
        &self,
        source_container: &ContainerRecord,
    ) -> Result<ContainerRecord, SynchronizeFailure> {
        self.target
            .find_top_container(&source_container.uri)
            .map_err(SynchronizeFailure::remote)?
            .ok_or_else(|| {
                SynchronizeFailure::not_found(
                    MissingResource::TargetContainer,
                    Some(source_container.uri.clone()),
                )
            })
    }

    /// Ensures no other target container carries the identifier's barcode.
    ///
    /// A result set that is empty or includes the container being updated
    /// passes; re-synchronizing the same container is not a conflict.
    fn validate_unique_barcode(
        &self,
        repository: &RepositoryRecord,
        barcode: &str,
        container_id: u64,
    ) -> Result<(), SynchronizeFailure> {
        let matches = self
            .target
            .search_containers_by_barcode(repository, barcode)
            .map_err(SynchronizeFailure::remote)?;
        if matches.is_empty() || matches.iter().any(|container| container.id == container_id) {
            Ok(())
        } else {
            Err(SynchronizeFailure::conflict(ConflictKind::Barcode, barcode))
        }
    }

    /// Ensures no other target container carries the identifier's label.
    fn validate_unique_indicator(
        &self,
        repository: &RepositoryRecord,
        indicator: &str,
        container_id: u64,
    ) -> Result<(), SynchronizeFailure> {
        let matches = self
            .target
            .search_containers_by_indicator(repository, indicator)
            .map_err(SynchronizeFailure::remote)?;
        if matches.is_empty() || matches.iter().any(|container| container.id == container_id) {
            Ok(())
        } else {
            Err(SynchronizeFailure::conflict(
                ConflictKind::Indicator,
                indicator,
            ))
        }
    }

    /// Applies the container-profile link; failures are logged, never fatal.
    fn link_container_profile(
        &self,
        record: &AbsoluteId,
        repository: &RepositoryRecord,
        container: &ContainerRecord,
    ) {
        let Some(profile_uri) = record.container_profile.uri.as_ref() else {
            warn!(
                container = %container.uri,
                "profile snapshot carries no uri; skipping profile link"
            );
            return;
        };
        let linked = self.target.batch_link_container_profile(
            repository,
            slice::from_ref(container),
            profile_uri,
        );
        match linked {
            Ok(containers) if !containers.is_empty() => {}
            Ok(_) => {
                warn!(
                    container = %container.uri,
                    profile = %profile_uri,
                    "failed to link container profile"
                );
            }
            Err(error) => {
                warn!(
                    container = %container.uri,
                    profile = %profile_uri,
                    error = %error,
                    "failed to link container profile"
                );
            }
        }
    }

    /// Applies the location link; failures are logged, never fatal.
    fn link_location(
        &self,
        repository: &RepositoryRecord,
        container: &ContainerRecord,
        location: &LocationRecord,
    ) {
        let linked = self.target.batch_link_location(
            repository,
            slice::from_ref(container),
            &location.uri,
        );
        match linked {
            Ok(containers) if !containers.is_empty() => {}
            Ok(_) => {
                warn!(
                    container = %container.uri,
                    location = %location.uri,
                    "failed to link location"
                );
            }
            Err(error) => {
                warn!(
                    container = %container.uri,
                    location = %location.uri,
                    error = %error,
                    "failed to link location"
                );
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a skip report without touching the record.
const fn skipped(record: AbsoluteId, reason: SkipReason) -> SynchronizeReport {
    SynchronizeReport {
        identifier: record,
        outcome: AttemptOutcome::Skipped { reason },
    }
}

/// Returns the target container's location links minus the resolved location.
///
/// The dropped link is re-added by the dedicated location-link step, which
/// keeps retries from stacking duplicate links.
fn retained_locations(
    container: &ContainerRecord,
    location: &LocationRecord,
) -> Vec<ContainerLocation> {
    container
        .container_locations
        .iter()
        .filter(|link| link.uri != location.uri)
        .cloned()
        .collect()
}
