// crates/shelfmark-remote/src/lib.rs
// ============================================================================
// Module: Shelfmark Remote
// Description: Remote archival service adapters for the Shelfmark runtime.
// Purpose: Provide ArchiveClient implementations backed by real endpoints.
// Dependencies: shelfmark-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! This crate ships the HTTP adapter that connects the synchronizer to an
//! ArchivesSpace-style archival service. Adapters validate every wire payload
//! into the typed records defined by `shelfmark-core` and fail closed on
//! unusable endpoints, oversized responses, and payloads that do not resolve
//! into records.
//! Invariants:
//! - Adapters never hand raw wire payloads to the synchronizer.
//! - Lookups report missing records as `Ok(None)`, never as errors.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http::HttpArchiveClient;
pub use http::HttpArchiveConfig;
