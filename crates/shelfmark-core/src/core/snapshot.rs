// crates/shelfmark-core/src/core/snapshot.rs
// ============================================================================
// Module: Shelfmark Remote Snapshots
// Description: Point-in-time copies of remote records stored on an identifier.
// Purpose: Replace free-form snapshot bags with typed, independently-empty records.
// Dependencies: serde, crate::core::identifiers
// ============================================================================

//! ## Overview
//! Each identifier stores four snapshots captured at creation time: the
//! container being labeled, the container profile it was sized under, the
//! location it shelves at, and the provenance linkage (repository and owning
//! resource). Snapshots are copies, never live references, and any of them may
//! be empty when the source data was incomplete. Emptiness gates both label
//! derivation and synchronization eligibility.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::RecordUri;

// ============================================================================
// SECTION: Snapshot Kinds
// ============================================================================

/// Snapshot of the top container an identifier labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSnapshot {
    /// Numeric record id in the source service.
    pub id: Option<u64>,
    /// Service-relative URI.
    pub uri: Option<RecordUri>,
    /// Barcode attached at capture time.
    pub barcode: Option<String>,
    /// Display indicator at capture time.
    pub indicator: Option<String>,
}

impl ContainerSnapshot {
    /// Returns true when no field was captured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.uri.is_none()
            && self.barcode.is_none()
            && self.indicator.is_none()
    }
}

/// Snapshot of the container profile an identifier was assigned under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSnapshot {
    /// Numeric record id in the source service.
    pub id: Option<u64>,
    /// Service-relative URI.
    pub uri: Option<RecordUri>,
    /// Profile name; drives label prefix lookup.
    pub name: Option<String>,
}

impl ProfileSnapshot {
    /// Returns true when no field was captured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.id.is_none() && self.uri.is_none() && self.name.is_none()
    }
}

/// Snapshot of the shelving location an identifier was assigned at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSnapshot {
    /// Numeric record id in the source service.
    pub id: Option<u64>,
    /// Service-relative URI.
    pub uri: Option<RecordUri>,
    /// Building the location sits in.
    pub building: Option<String>,
    /// Floor or wing within the building.
    pub area: Option<String>,
    /// Shelving classification code.
    pub classification: Option<String>,
}

impl LocationSnapshot {
    /// Returns true when no field was captured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.uri.is_none()
            && self.building.is_none()
            && self.area.is_none()
            && self.classification.is_none()
    }
}

/// Snapshot of the repository and resource an identifier descends from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvenanceSnapshot {
    /// Repository URI in the source service.
    pub repository_uri: Option<RecordUri>,
    /// Repository name.
    pub repository_name: Option<String>,
    /// Short repository code.
    pub repository_code: Option<String>,
    /// URI of the owning archival resource.
    pub resource_uri: Option<RecordUri>,
    /// Title of the owning archival resource.
    pub resource_title: Option<String>,
}

impl ProvenanceSnapshot {
    /// Returns true when no field was captured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.repository_uri.is_none()
            && self.repository_name.is_none()
            && self.repository_code.is_none()
            && self.resource_uri.is_none()
            && self.resource_title.is_none()
    }
}
