// crates/shelfmark-core/src/core/model.rs
// ============================================================================
// Module: Shelfmark Identifier Records
// Description: Absolute identifier, batch, and session record types.
// Purpose: Provide the ledger-facing records and their derived labels and status.
// Dependencies: serde, crate::core::{barcode, identifiers, prefix, snapshot, status, time}
// ============================================================================

//! ## Overview
//! An [`AbsoluteId`] binds a Luhn-checked barcode to one physical container via
//! four remote snapshots. Batches group the identifiers of one creation
//! request; sessions group the batches of one requesting user. Labels and
//! status are derived, never stored: labels from prefix and index, status
//! through [`SynchronizeStatus::effective`] and [`SynchronizeStatus::aggregate`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::barcode::Barcode;
use crate::core::barcode::BarcodeError;
use crate::core::barcode::DEFAULT_BARCODE_VALUE;
use crate::core::identifiers::BatchId;
use crate::core::identifiers::IdentifierId;
use crate::core::identifiers::SessionId;
use crate::core::identifiers::UserId;
use crate::core::prefix::prefix_for;
use crate::core::snapshot::ContainerSnapshot;
use crate::core::snapshot::LocationSnapshot;
use crate::core::snapshot::ProfileSnapshot;
use crate::core::snapshot::ProvenanceSnapshot;
use crate::core::status::SynchronizeStatus;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Absolute Identifier
// ============================================================================

/// Inputs for generating one absolute identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Ledger key assigned to the new record.
    pub id: IdentifierId,
    /// Sequence number within the identifier's prefix series.
    pub index: u32,
    /// Barcode value; the zero default is assigned when absent.
    #[serde(default)]
    pub barcode: Option<String>,
    /// Container snapshot captured from the source service.
    #[serde(default)]
    pub container: ContainerSnapshot,
    /// Container-profile snapshot captured from the source service.
    #[serde(default)]
    pub container_profile: ProfileSnapshot,
    /// Location snapshot captured from the source service.
    #[serde(default)]
    pub location: LocationSnapshot,
    /// Repository and resource linkage captured from the source service.
    #[serde(default)]
    pub provenance: ProvenanceSnapshot,
}

/// One absolute identifier bound to a physical container.
///
/// # Invariants
/// - `barcode` satisfies its own Luhn check (enforced by [`Barcode`]).
/// - `label` derivation requires a non-empty location snapshot.
/// - Snapshots are immutable copies; only status-bearing fields change after
///   generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsoluteId {
    /// Ledger key.
    pub id: IdentifierId,
    /// Luhn-checked barcode value.
    pub barcode: Barcode,
    /// Sequence number used in the display label.
    pub index: u32,
    /// Container snapshot.
    #[serde(default)]
    pub container: ContainerSnapshot,
    /// Container-profile snapshot.
    #[serde(default)]
    pub container_profile: ProfileSnapshot,
    /// Location snapshot.
    #[serde(default)]
    pub location: LocationSnapshot,
    /// Repository and resource linkage snapshot.
    #[serde(default)]
    pub provenance: ProvenanceSnapshot,
    /// Explicitly recorded status; effective status derives when absent.
    #[serde(default)]
    pub synchronize_status: Option<SynchronizeStatus>,
    /// True only while a synchronization attempt is in flight.
    #[serde(default)]
    pub synchronizing: bool,
    /// Set on successful completion of a synchronization attempt.
    #[serde(default)]
    pub synchronized_at: Option<Timestamp>,
}

impl AbsoluteId {
    /// Generates a new identifier from a creation request.
    ///
    /// Assigns [`DEFAULT_BARCODE_VALUE`] when the request carries no barcode,
    /// stores the snapshots verbatim, and records the initial
    /// `never_synchronized` status.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError`] when the supplied value fails validation.
    pub fn generate(request: GenerateRequest) -> Result<Self, BarcodeError> {
        let value = request
            .barcode
            .unwrap_or_else(|| DEFAULT_BARCODE_VALUE.to_string());
        let barcode = Barcode::new(value)?;
        Ok(Self {
            id: request.id,
            barcode,
            index: request.index,
            container: request.container,
            container_profile: request.container_profile,
            location: request.location,
            provenance: request.provenance,
            synchronize_status: Some(SynchronizeStatus::NeverSynchronized),
            synchronizing: false,
            synchronized_at: None,
        })
    }

    /// Returns the label prefix for the identifier's profile snapshot.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        prefix_for(self.container_profile.name.as_deref())
    }

    /// Returns the display label, absent when the location snapshot is empty.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        if self.location.is_empty() {
            return None;
        }
        Some(format!("{}-{:06}", self.prefix(), self.index))
    }

    /// Returns the effective synchronization status.
    #[must_use]
    pub const fn effective_status(&self) -> SynchronizeStatus {
        SynchronizeStatus::effective(self.synchronize_status, self.synchronized_at)
    }

    /// Returns true once a synchronization attempt has succeeded.
    #[must_use]
    pub const fn is_synchronized(&self) -> bool {
        self.synchronized_at.is_some()
    }

    /// Returns true while a synchronization attempt is in flight.
    #[must_use]
    pub const fn is_synchronizing(&self) -> bool {
        self.synchronizing
    }
}

// ============================================================================
// SECTION: Batches
// ============================================================================

/// Ordered collection of identifiers sharing one creation request.
///
/// # Invariants
/// - Identifiers belong to exactly one batch.
/// - Membership never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Ledger key.
    pub id: BatchId,
    /// User the batch was created for.
    pub user_id: UserId,
    /// Identifiers in creation order.
    pub identifiers: Vec<AbsoluteId>,
}

impl Batch {
    /// Returns the batch display label.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Batch {:06}", self.id.get())
    }

    /// Rolls the member identifiers' statuses up into one status.
    #[must_use]
    pub fn synchronize_status(&self) -> SynchronizeStatus {
        SynchronizeStatus::aggregate(
            self.identifiers
                .iter()
                .map(AbsoluteId::effective_status),
        )
    }

    /// Returns true when every member identifier has synchronized.
    #[must_use]
    pub fn is_synchronized(&self) -> bool {
        self.identifiers.iter().all(AbsoluteId::is_synchronized)
    }

    /// Returns true when any member identifier is mid-attempt.
    #[must_use]
    pub fn is_synchronizing(&self) -> bool {
        self.identifiers.iter().any(AbsoluteId::is_synchronizing)
    }
}

// ============================================================================
// SECTION: Sessions
// ============================================================================

/// Ordered collection of batches belonging to one requesting user.
///
/// # Invariants
/// - Batches belong to exactly one session.
/// - Membership never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Ledger key.
    pub id: SessionId,
    /// Requesting user.
    pub user_id: UserId,
    /// Creation time supplied by the caller at creation.
    pub created_at: Timestamp,
    /// Batches in creation order.
    pub batches: Vec<Batch>,
}

impl Session {
    /// Returns the session display label with its creation date.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Session {} ({})", self.id.get(), self.created_at.display_date())
    }

    /// Rolls the member batches' statuses up into one status.
    #[must_use]
    pub fn synchronize_status(&self) -> SynchronizeStatus {
        SynchronizeStatus::aggregate(self.batches.iter().map(Batch::synchronize_status))
    }

    /// Returns true when every identifier in every batch has synchronized.
    #[must_use]
    pub fn is_synchronized(&self) -> bool {
        self.batches.iter().all(Batch::is_synchronized)
    }

    /// Returns true when any identifier in any batch is mid-attempt.
    #[must_use]
    pub fn is_synchronizing(&self) -> bool {
        self.batches.iter().any(Batch::is_synchronizing)
    }

    /// Iterates all identifiers across the session's batches.
    pub fn absolute_ids(&self) -> impl Iterator<Item = &AbsoluteId> {
        self.batches.iter().flat_map(|batch| batch.identifiers.iter())
    }
}
