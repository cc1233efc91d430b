// crates/shelfmark-core/src/runtime/mod.rs
// ============================================================================
// Module: Shelfmark Runtime
// Description: Synchronization engine and in-memory reference implementations.
// Purpose: Execute identifier synchronization against archive clients and the ledger.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! Runtime modules implement the synchronization attempt loop plus in-memory
//! implementations of the ledger and archive interfaces. All hosting surfaces
//! must call into the same synchronizer logic to preserve the status state
//! machine.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod archive;
pub mod ledger;
pub mod synchronizer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use archive::ArchiveCall;
pub use archive::ArchiveFaults;
pub use archive::InMemoryArchive;
pub use ledger::InMemoryLedger;
pub use synchronizer::AttemptOutcome;
pub use synchronizer::ConflictKind;
pub use synchronizer::MissingResource;
pub use synchronizer::SkipReason;
pub use synchronizer::SynchronizeFailure;
pub use synchronizer::SynchronizeReport;
pub use synchronizer::SynchronizeRequest;
pub use synchronizer::Synchronizer;
pub use synchronizer::SynchronizerError;
