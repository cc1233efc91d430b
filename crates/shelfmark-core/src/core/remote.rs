// crates/shelfmark-core/src/core/remote.rs
// ============================================================================
// Module: Shelfmark Remote Records
// Description: Typed records resolved from a remote archival service.
// Purpose: Provide the vocabulary shared by adapters and the synchronizer.
// Dependencies: serde, crate::core::{barcode, identifiers}
// ============================================================================

//! ## Overview
//! These records are the synchronizer's view of the remote service: just the
//! fields the engine reads or writes. Adapters validate wire payloads into
//! these shapes at the boundary; optional fields stay optional because the
//! remote service omits them freely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::barcode::Barcode;
use crate::core::identifiers::RecordUri;

// ============================================================================
// SECTION: Resolved Records
// ============================================================================

/// Repository resolved in a remote archival service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// Numeric record id.
    pub id: u64,
    /// Service-relative URI.
    pub uri: RecordUri,
    /// Short repository code.
    #[serde(default)]
    pub repo_code: Option<String>,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Top container resolved in a remote archival service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// Numeric record id.
    pub id: u64,
    /// Service-relative URI.
    pub uri: RecordUri,
    /// Display indicator, the remote counterpart of an identifier label.
    #[serde(default)]
    pub indicator: Option<String>,
    /// Barcode currently attached to the container.
    #[serde(default)]
    pub barcode: Option<String>,
    /// Location links currently attached to the container.
    #[serde(default)]
    pub container_locations: Vec<ContainerLocation>,
}

/// Location resolved in a remote archival service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Numeric record id.
    pub id: u64,
    /// Service-relative URI.
    pub uri: RecordUri,
    /// Building the location sits in.
    #[serde(default)]
    pub building: Option<String>,
    /// Shelving classification code.
    #[serde(default)]
    pub classification: Option<String>,
}

/// One location link attached to a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerLocation {
    /// URI of the linked location.
    pub uri: RecordUri,
    /// Link status reported by the remote service.
    #[serde(default)]
    pub status: Option<String>,
}

// ============================================================================
// SECTION: Update Payload
// ============================================================================

/// Core-field update applied to a container during synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerUpdate {
    /// New barcode value.
    pub barcode: Barcode,
    /// New display indicator.
    pub indicator: String,
    /// Replacement set of location links.
    pub container_locations: Vec<ContainerLocation>,
}
