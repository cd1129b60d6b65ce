// Data store boundary
//
// Everything the locations screen reads or mutates goes through
// `LocationStore`. `revision` is bumped on every successful mutation so
// consumers can tell when their derived data is stale.

use crate::entities::{Location, LocationCategory, Sale};
use crate::error::StoreError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Read-only view of the store at one revision
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub locations: Vec<Location>,
    pub sales: Vec<Sale>,
    pub revision: u64,
}

pub trait LocationStore {
    /// All locations, in creation order
    fn locations(&self) -> Result<Vec<Location>, StoreError>;

    fn sales(&self) -> Result<Vec<Sale>, StoreError>;

    fn create_location(
        &self,
        name: &str,
        category: LocationCategory,
    ) -> Result<Location, StoreError>;

    /// Full-record edit; `NotFound` if the id is unknown
    fn update_location(&self, location: &Location) -> Result<(), StoreError>;

    /// Irreversible delete; `NotFound` if the id is unknown
    fn delete_location(&self, id: &str) -> Result<(), StoreError>;

    fn revision(&self) -> u64;

    fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let revision = self.revision();
        Ok(Snapshot {
            locations: self.locations()?,
            sales: self.sales()?,
            revision,
        })
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Store held entirely in memory (tests, demos)
#[derive(Default)]
pub struct MemoryStore {
    locations: Arc<RwLock<Vec<Location>>>,
    sales: Arc<RwLock<Vec<Sale>>>,
    revision: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(locations: Vec<Location>, sales: Vec<Sale>) -> Self {
        MemoryStore {
            locations: Arc::new(RwLock::new(locations)),
            sales: Arc::new(RwLock::new(sales)),
            revision: AtomicU64::new(0),
        }
    }

    fn bump(&self) {
        self.revision.fetch_add(1, Ordering::SeqCst);
    }
}

impl LocationStore for MemoryStore {
    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        Ok(self.locations.read().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn sales(&self) -> Result<Vec<Sale>, StoreError> {
        Ok(self.sales.read().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn create_location(
        &self,
        name: &str,
        category: LocationCategory,
    ) -> Result<Location, StoreError> {
        let location = Location::new(name, category);
        self.locations
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .push(location.clone());
        self.bump();
        Ok(location)
    }

    fn update_location(&self, location: &Location) -> Result<(), StoreError> {
        let mut locations = self.locations.write().map_err(|_| StoreError::Poisoned)?;
        let existing = locations
            .iter_mut()
            .find(|l| l.id == location.id)
            .ok_or_else(|| StoreError::NotFound(location.id.clone()))?;
        *existing = location.clone();
        drop(locations);

        self.bump();
        Ok(())
    }

    fn delete_location(&self, id: &str) -> Result<(), StoreError> {
        let mut locations = self.locations.write().map_err(|_| StoreError::Poisoned)?;
        let before = locations.len();
        locations.retain(|l| l.id != id);
        if locations.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        drop(locations);

        self.bump();
        Ok(())
    }

    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}
