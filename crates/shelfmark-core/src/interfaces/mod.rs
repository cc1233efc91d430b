// crates/shelfmark-core/src/interfaces/mod.rs
// ============================================================================
// Module: Shelfmark Interfaces
// Description: Backend-agnostic interfaces for remote archives and the ledger.
// Purpose: Define the contract surfaces used by the Shelfmark runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how Shelfmark integrates with external systems without
//! embedding backend-specific details. The synchronizer receives two
//! [`ArchiveClient`] instances (source and target) and one
//! [`IdentifierLedger`]; implementations must be synchronous and fail closed
//! on invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::IdentifierId;
use crate::core::identifiers::RecordUri;
use crate::core::model::AbsoluteId;
use crate::core::remote::ContainerRecord;
use crate::core::remote::ContainerUpdate;
use crate::core::remote::LocationRecord;
use crate::core::remote::RepositoryRecord;

// ============================================================================
// SECTION: Archive Client
// ============================================================================

/// Remote archival service errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Transport-level failure before a response arrived.
    #[error("remote transport error: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("remote service returned status {status} for {uri}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Request URI the status was returned for.
        uri: String,
    },
    /// The response body could not be validated into a record.
    #[error("remote payload invalid: {0}")]
    InvalidPayload(String),
    /// The endpoint configuration is unusable.
    #[error("remote endpoint rejected: {0}")]
    Endpoint(String),
    /// The service rejected a container update.
    #[error("remote update rejected: {0}")]
    Update(String),
}

/// Synchronous client for one remote archival service endpoint.
///
/// Lookups return `Ok(None)` for records that do not exist; errors are
/// reserved for transport, protocol, and validation failures. The client owns
/// its timeout policy.
pub trait ArchiveClient {
    /// Resolves a repository by service-relative URI.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the service cannot be queried.
    fn find_repository(&self, uri: &RecordUri) -> Result<Option<RepositoryRecord>, RemoteError>;

    /// Resolves a top container by service-relative URI.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the service cannot be queried.
    fn find_top_container(
        &self,
        uri: &RecordUri,
    ) -> Result<Option<ContainerRecord>, RemoteError>;

    /// Resolves a location by service-relative URI.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the service cannot be queried.
    fn find_location(&self, uri: &RecordUri) -> Result<Option<LocationRecord>, RemoteError>;

    /// Searches a repository for containers carrying a barcode.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the search cannot be executed.
    fn search_containers_by_barcode(
        &self,
        repository: &RepositoryRecord,
        barcode: &str,
    ) -> Result<Vec<ContainerRecord>, RemoteError>;

    /// Searches a repository for containers carrying a display indicator.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the search cannot be executed.
    fn search_containers_by_indicator(
        &self,
        repository: &RepositoryRecord,
        indicator: &str,
    ) -> Result<Vec<ContainerRecord>, RemoteError>;

    /// Applies a core-field update to one container.
    ///
    /// `Ok(None)` reports that the service acknowledged the call without
    /// returning an updated record; callers treat it as a non-fatal miss.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the update is rejected or cannot be sent.
    fn update_container(
        &self,
        container: &ContainerRecord,
        update: &ContainerUpdate,
    ) -> Result<Option<ContainerRecord>, RemoteError>;

    /// Links a container profile to the given containers.
    ///
    /// An empty result list signals that nothing was updated; callers treat
    /// it as a non-fatal failure.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the call cannot be sent.
    fn batch_link_container_profile(
        &self,
        repository: &RepositoryRecord,
        containers: &[ContainerRecord],
        profile_uri: &RecordUri,
    ) -> Result<Vec<ContainerRecord>, RemoteError>;

    /// Links a location to the given containers.
    ///
    /// Same empty-list convention as [`ArchiveClient::batch_link_container_profile`].
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the call cannot be sent.
    fn batch_link_location(
        &self,
        repository: &RepositoryRecord,
        containers: &[ContainerRecord],
        location_uri: &RecordUri,
    ) -> Result<Vec<ContainerRecord>, RemoteError>;
}

// ============================================================================
// SECTION: Identifier Ledger
// ============================================================================

/// Identifier ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Ledger I/O error.
    #[error("identifier ledger io error: {0}")]
    Io(String),
    /// Ledger data is invalid.
    #[error("identifier ledger invalid data: {0}")]
    Invalid(String),
    /// Ledger reported an error.
    #[error("identifier ledger error: {0}")]
    Store(String),
}

/// Durable store of identifier records keyed by ledger id.
///
/// Read-modify-write with last-write-wins; no optimistic locking is imposed.
pub trait IdentifierLedger {
    /// Loads an identifier record by key.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when loading fails.
    fn load(&self, id: IdentifierId) -> Result<Option<AbsoluteId>, LedgerError>;

    /// Saves an identifier record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when saving fails.
    fn save(&self, record: &AbsoluteId) -> Result<(), LedgerError>;
}
