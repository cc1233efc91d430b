// crates/shelfmark-config/src/lib.rs
// ============================================================================
// Module: Shelfmark Config Library
// Description: Canonical config model and validation for shelfmark.toml.
// Purpose: Single source of truth for endpoint configuration semantics.
// Dependencies: shelfmark-remote, serde, toml
// ============================================================================

//! ## Overview
//! `shelfmark-config` defines the configuration model for the synchronization
//! runtime: one `[source]` and one `[target]` endpoint table, each mapping
//! onto the HTTP client configuration. Loading is strict and fail-closed with
//! hard limits on path length, file size, and field values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
