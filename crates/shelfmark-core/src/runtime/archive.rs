// crates/shelfmark-core/src/runtime/archive.rs
// ============================================================================
// Module: Shelfmark In-Memory Archive
// Description: Seeded in-memory archive client for tests and examples.
// Purpose: Provide a deterministic ArchiveClient without network access.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`ArchiveClient`]
//! backed by seeded records. Searches and updates behave like a small archival
//! service; scripted faults let tests exercise the synchronizer's failure
//! branches, and a call log records every remote operation in order. It is not
//! intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::identifiers::RecordUri;
use crate::core::remote::ContainerLocation;
use crate::core::remote::ContainerRecord;
use crate::core::remote::ContainerUpdate;
use crate::core::remote::LocationRecord;
use crate::core::remote::RepositoryRecord;
use crate::interfaces::ArchiveClient;
use crate::interfaces::RemoteError;

// ============================================================================
// SECTION: Call Log
// ============================================================================

/// One remote operation observed by the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveCall {
    /// Repository lookup.
    FindRepository {
        /// Looked-up URI.
        uri: RecordUri,
    },
    /// Container lookup.
    FindTopContainer {
        /// Looked-up URI.
        uri: RecordUri,
    },
    /// Location lookup.
    FindLocation {
        /// Looked-up URI.
        uri: RecordUri,
    },
    /// Barcode search within a repository.
    SearchByBarcode {
        /// Repository searched.
        repository: RecordUri,
        /// Barcode searched for.
        barcode: String,
    },
    /// Indicator search within a repository.
    SearchByIndicator {
        /// Repository searched.
        repository: RecordUri,
        /// Indicator searched for.
        indicator: String,
    },
    /// Core-field container update.
    UpdateContainer {
        /// Container updated.
        container: RecordUri,
    },
    /// Container-profile link.
    LinkContainerProfile {
        /// Profile linked.
        profile: RecordUri,
    },
    /// Location link.
    LinkLocation {
        /// Location linked.
        location: RecordUri,
    },
}

// ============================================================================
// SECTION: Faults
// ============================================================================

/// Scripted fault switches for exercising failure branches.
#[derive(Debug, Clone, Default)]
pub struct ArchiveFaults {
    /// Container updates acknowledge without returning a record.
    pub update_returns_none: bool,
    /// Container updates fail with this error.
    pub fail_update: Option<RemoteError>,
    /// Profile links return the empty failure list.
    pub drop_profile_links: bool,
    /// Location links return the empty failure list.
    pub drop_location_links: bool,
}

// ============================================================================
// SECTION: In-Memory Archive
// ============================================================================

/// Container record seeded under its owning repository.
#[derive(Debug, Clone)]
struct SeededContainer {
    /// Repository the container belongs to.
    repository_uri: RecordUri,
    /// The container record itself.
    record: ContainerRecord,
}

/// Mutable archive state behind the client's mutex.
#[derive(Debug, Default)]
struct ArchiveState {
    /// Repositories keyed by URI.
    repositories: BTreeMap<String, RepositoryRecord>,
    /// Containers keyed by URI.
    containers: BTreeMap<String, SeededContainer>,
    /// Locations keyed by URI.
    locations: BTreeMap<String, LocationRecord>,
    /// Every remote operation in invocation order.
    calls: Vec<ArchiveCall>,
    /// Active fault switches.
    faults: ArchiveFaults,
}

/// In-memory archive client for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryArchive {
    /// Archive state protected by a mutex.
    state: Arc<Mutex<ArchiveState>>,
}

impl InMemoryArchive {
    /// Creates an empty in-memory archive.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ArchiveState::default())),
        }
    }

    /// Seeds a repository record.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the archive lock is poisoned.
    pub fn insert_repository(&self, repository: RepositoryRecord) -> Result<(), RemoteError> {
        let mut state = self.lock()?;
        state
            .repositories
            .insert(repository.uri.as_str().to_string(), repository);
        Ok(())
    }

    /// Seeds a container record under its owning repository.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the archive lock is poisoned.
    pub fn insert_container(
        &self,
        repository_uri: RecordUri,
        record: ContainerRecord,
    ) -> Result<(), RemoteError> {
        let mut state = self.lock()?;
        state.containers.insert(
            record.uri.as_str().to_string(),
            SeededContainer {
                repository_uri,
                record,
            },
        );
        Ok(())
    }

    /// Seeds a location record.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the archive lock is poisoned.
    pub fn insert_location(&self, location: LocationRecord) -> Result<(), RemoteError> {
        let mut state = self.lock()?;
        state
            .locations
            .insert(location.uri.as_str().to_string(), location);
        Ok(())
    }

    /// Replaces the active fault switches.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the archive lock is poisoned.
    pub fn set_faults(&self, faults: ArchiveFaults) -> Result<(), RemoteError> {
        let mut state = self.lock()?;
        state.faults = faults;
        Ok(())
    }

    /// Returns the operations observed so far, in order.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the archive lock is poisoned.
    pub fn calls(&self) -> Result<Vec<ArchiveCall>, RemoteError> {
        let state = self.lock()?;
        Ok(state.calls.clone())
    }

    /// Returns the current state of a seeded container.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the archive lock is poisoned.
    pub fn container(&self, uri: &RecordUri) -> Result<Option<ContainerRecord>, RemoteError> {
        let state = self.lock()?;
        Ok(state
            .containers
            .get(uri.as_str())
            .map(|seeded| seeded.record.clone()))
    }

    /// Acquires the state lock, mapping poisoning onto [`RemoteError`].
    fn lock(&self) -> Result<MutexGuard<'_, ArchiveState>, RemoteError> {
        self.state
            .lock()
            .map_err(|_| RemoteError::Transport("in-memory archive mutex poisoned".to_string()))
    }
}

impl ArchiveClient for InMemoryArchive {
    fn find_repository(&self, uri: &RecordUri) -> Result<Option<RepositoryRecord>, RemoteError> {
        let mut state = self.lock()?;
        state.calls.push(ArchiveCall::FindRepository { uri: uri.clone() });
        Ok(state.repositories.get(uri.as_str()).cloned())
    }

    fn find_top_container(
        &self,
        uri: &RecordUri,
    ) -> Result<Option<ContainerRecord>, RemoteError> {
        let mut state = self.lock()?;
        state
            .calls
            .push(ArchiveCall::FindTopContainer { uri: uri.clone() });
        Ok(state
            .containers
            .get(uri.as_str())
            .map(|seeded| seeded.record.clone()))
    }

    fn find_location(&self, uri: &RecordUri) -> Result<Option<LocationRecord>, RemoteError> {
        let mut state = self.lock()?;
        state.calls.push(ArchiveCall::FindLocation { uri: uri.clone() });
        Ok(state.locations.get(uri.as_str()).cloned())
    }

    fn search_containers_by_barcode(
        &self,
        repository: &RepositoryRecord,
        barcode: &str,
    ) -> Result<Vec<ContainerRecord>, RemoteError> {
        let mut state = self.lock()?;
        state.calls.push(ArchiveCall::SearchByBarcode {
            repository: repository.uri.clone(),
            barcode: barcode.to_string(),
        });
        Ok(state
            .containers
            .values()
            .filter(|seeded| {
                seeded.repository_uri == repository.uri
                    && seeded.record.barcode.as_deref() == Some(barcode)
            })
            .map(|seeded| seeded.record.clone())
            .collect())
    }

    fn search_containers_by_indicator(
        &self,
        repository: &RepositoryRecord,
        indicator: &str,
    ) -> Result<Vec<ContainerRecord>, RemoteError> {
        let mut state = self.lock()?;
        state.calls.push(ArchiveCall::SearchByIndicator {
            repository: repository.uri.clone(),
            indicator: indicator.to_string(),
        });
        Ok(state
            .containers
            .values()
            .filter(|seeded| {
                seeded.repository_uri == repository.uri
                    && seeded.record.indicator.as_deref() == Some(indicator)
            })
            .map(|seeded| seeded.record.clone())
            .collect())
    }

    fn update_container(
        &self,
        container: &ContainerRecord,
        update: &ContainerUpdate,
    ) -> Result<Option<ContainerRecord>, RemoteError> {
        let mut state = self.lock()?;
        state.calls.push(ArchiveCall::UpdateContainer {
            container: container.uri.clone(),
        });
        if let Some(error) = state.faults.fail_update.clone() {
            return Err(error);
        }
        if state.faults.update_returns_none {
            return Ok(None);
        }
        let Some(seeded) = state.containers.get_mut(container.uri.as_str()) else {
            return Ok(None);
        };
        seeded.record.barcode = Some(update.barcode.as_str().to_string());
        seeded.record.indicator = Some(update.indicator.clone());
        seeded.record.container_locations = update.container_locations.clone();
        Ok(Some(seeded.record.clone()))
    }

    fn batch_link_container_profile(
        &self,
        repository: &RepositoryRecord,
        containers: &[ContainerRecord],
        profile_uri: &RecordUri,
    ) -> Result<Vec<ContainerRecord>, RemoteError> {
        let mut state = self.lock()?;
        state.calls.push(ArchiveCall::LinkContainerProfile {
            profile: profile_uri.clone(),
        });
        if state.faults.drop_profile_links {
            return Ok(Vec::new());
        }
        Ok(containers
            .iter()
            .map(|container| {
                state
                    .containers
                    .get(container.uri.as_str())
                    .filter(|seeded| seeded.repository_uri == repository.uri)
                    .map_or_else(|| container.clone(), |seeded| seeded.record.clone())
            })
            .collect())
    }

    fn batch_link_location(
        &self,
        repository: &RepositoryRecord,
        containers: &[ContainerRecord],
        location_uri: &RecordUri,
    ) -> Result<Vec<ContainerRecord>, RemoteError> {
        let mut state = self.lock()?;
        state.calls.push(ArchiveCall::LinkLocation {
            location: location_uri.clone(),
        });
        if state.faults.drop_location_links {
            return Ok(Vec::new());
        }
        let mut linked = Vec::with_capacity(containers.len());
        for container in containers {
            let record = match state
                .containers
                .get_mut(container.uri.as_str())
                .filter(|seeded| seeded.repository_uri == repository.uri)
            {
                Some(seeded) => {
                    let already_linked = seeded
                        .record
                        .container_locations
                        .iter()
                        .any(|link| link.uri == *location_uri);
                    if !already_linked {
                        seeded.record.container_locations.push(ContainerLocation {
                            uri: location_uri.clone(),
                            status: Some("current".to_string()),
                        });
                    }
                    seeded.record.clone()
                }
                None => container.clone(),
            };
            linked.push(record);
        }
        Ok(linked)
    }
}
