// crates/shelfmark-core/src/core/identifiers.rs
// ============================================================================
// Module: Shelfmark Identifiers
// Description: Canonical opaque identifiers for ledger records and remote URIs.
// Purpose: Provide strongly typed, serializable IDs with stable forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the typed identifiers used throughout Shelfmark. Ledger
//! keys are numeric and serialize as plain integers; remote URIs are opaque
//! strings. Validation is handled at runtime boundaries rather than within
//! these simple wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Ledger Keys
// ============================================================================

/// Primary key of an absolute identifier record in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierId(u64);

impl IdentifierId {
    /// Creates a new identifier key.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric key value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IdentifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for IdentifierId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

/// Primary key of a batch record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(u64);

impl BatchId {
    /// Creates a new batch key.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric key value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for BatchId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

/// Primary key of a session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a new session key.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric key value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for SessionId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

/// Key of the user a session or batch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Creates a new user key.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric key value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Remote URIs
// ============================================================================

/// Opaque URI of a record in a remote archival service.
///
/// URIs are service-relative paths such as `/repositories/4` and are compared
/// byte-for-byte; the core never parses them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordUri(String);

impl RecordUri {
    /// Creates a new record URI.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Returns the URI as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RecordUri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordUri {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
