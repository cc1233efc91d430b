// crates/shelfmark-core/src/runtime/ledger.rs
// ============================================================================
// Module: Shelfmark In-Memory Ledger
// Description: Simple in-memory identifier ledger for tests and examples.
// Purpose: Provide a deterministic ledger implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`IdentifierLedger`] for tests and local demos. Every save is also appended
//! to an ordered log so callers can observe the persisted status transitions
//! of an attempt. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::identifiers::IdentifierId;
use crate::core::model::AbsoluteId;
use crate::interfaces::IdentifierLedger;
use crate::interfaces::LedgerError;

// ============================================================================
// SECTION: In-Memory Ledger
// ============================================================================

/// In-memory identifier ledger for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    /// Record map protected by a mutex.
    records: Arc<Mutex<BTreeMap<u64, AbsoluteId>>>,
    /// Ordered log of every saved record state.
    save_log: Arc<Mutex<Vec<AbsoluteId>>>,
}

impl InMemoryLedger {
    /// Creates a new in-memory ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
            save_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Seeds a record without appending to the save log.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger lock is poisoned.
    pub fn insert(&self, record: AbsoluteId) -> Result<(), LedgerError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| LedgerError::Store("identifier ledger mutex poisoned".to_string()))?;
        guard.insert(record.id.get(), record);
        Ok(())
    }

    /// Returns every record state saved through the trait, in order.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger lock is poisoned.
    pub fn save_log(&self) -> Result<Vec<AbsoluteId>, LedgerError> {
        let guard = self
            .save_log
            .lock()
            .map_err(|_| LedgerError::Store("identifier ledger mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

impl IdentifierLedger for InMemoryLedger {
    fn load(&self, id: IdentifierId) -> Result<Option<AbsoluteId>, LedgerError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| LedgerError::Store("identifier ledger mutex poisoned".to_string()))?;
        Ok(guard.get(&id.get()).cloned())
    }

    fn save(&self, record: &AbsoluteId) -> Result<(), LedgerError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| LedgerError::Store("identifier ledger mutex poisoned".to_string()))?;
        guard.insert(record.id.get(), record.clone());
        drop(guard);
        let mut log = self
            .save_log
            .lock()
            .map_err(|_| LedgerError::Store("identifier ledger mutex poisoned".to_string()))?;
        log.push(record.clone());
        Ok(())
    }
}
