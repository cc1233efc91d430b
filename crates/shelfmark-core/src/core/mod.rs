// crates/shelfmark-core/src/core/mod.rs
// ============================================================================
// Module: Shelfmark Core Types
// Description: Canonical identifier, snapshot, status, and remote record types.
// Purpose: Provide stable, serializable types for Shelfmark records and adapters.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Shelfmark core types define absolute identifiers, their remote snapshots,
//! the synchronization status vocabulary, and the records adapters resolve
//! from remote services. These types are the canonical source of truth for any
//! derived API surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod barcode;
pub mod identifiers;
pub mod model;
pub mod prefix;
pub mod remote;
pub mod snapshot;
pub mod status;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use barcode::Barcode;
pub use barcode::BarcodeError;
pub use barcode::DEFAULT_BARCODE_VALUE;
pub use identifiers::BatchId;
pub use identifiers::IdentifierId;
pub use identifiers::RecordUri;
pub use identifiers::SessionId;
pub use identifiers::UserId;
pub use model::AbsoluteId;
pub use model::Batch;
pub use model::GenerateRequest;
pub use model::Session;
pub use prefix::DEFAULT_PREFIX;
pub use prefix::prefix_for;
pub use remote::ContainerLocation;
pub use remote::ContainerRecord;
pub use remote::ContainerUpdate;
pub use remote::LocationRecord;
pub use remote::RepositoryRecord;
pub use snapshot::ContainerSnapshot;
pub use snapshot::LocationSnapshot;
pub use snapshot::ProfileSnapshot;
pub use snapshot::ProvenanceSnapshot;
pub use status::SynchronizeStatus;
pub use time::Timestamp;
