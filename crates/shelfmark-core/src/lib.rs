// crates/shelfmark-core/src/lib.rs
// ============================================================================
// Module: Shelfmark Core Library
// Description: Public API surface for the Shelfmark core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Shelfmark core provides the absolute-identifier model, synchronization
//! status roll-ups, and the per-identifier synchronization engine. It is
//! backend-agnostic and integrates through explicit interfaces rather than
//! embedding into hosting applications.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ArchiveClient;
pub use interfaces::IdentifierLedger;
pub use interfaces::LedgerError;
pub use interfaces::RemoteError;
pub use runtime::ArchiveCall;
pub use runtime::ArchiveFaults;
pub use runtime::AttemptOutcome;
pub use runtime::ConflictKind;
pub use runtime::InMemoryArchive;
pub use runtime::InMemoryLedger;
pub use runtime::MissingResource;
pub use runtime::SkipReason;
pub use runtime::SynchronizeFailure;
pub use runtime::SynchronizeReport;
pub use runtime::SynchronizeRequest;
pub use runtime::Synchronizer;
pub use runtime::SynchronizerError;
