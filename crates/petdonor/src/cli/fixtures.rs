//! File-backed stand-ins for the request service and the pet registry.

use std::path::{Path, PathBuf};

use anyhow::Context;
use petdonor_core::{
    DonationRequest, FeedError, FeedQuery, FeedSupplier, Pet, PetRegistry, RegistryError,
};

/// A request feed read from a JSON array of requests.
#[derive(Debug)]
pub struct JsonFeed {
    path: PathBuf,
}

impl JsonFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Every request in the file, regardless of status.
    pub fn load_all(&self) -> anyhow::Result<Vec<DonationRequest>> {
        read_json(&self.path)
    }
}

impl FeedSupplier for JsonFeed {
    /// Returns the requests in the queried status tab. Facet filtering is
    /// left to the caller.
    fn list_active(&self, query: &FeedQuery) -> Result<Vec<DonationRequest>, FeedError> {
        let requests: Vec<DonationRequest> =
            read_json(&self.path).map_err(|e| feed_error(&self.path, &e))?;
        Ok(requests
            .into_iter()
            .filter(|request| request.status == query.status)
            .collect())
    }
}

fn feed_error(path: &Path, error: &anyhow::Error) -> FeedError {
    if error.root_cause().is::<std::io::Error>() {
        FeedError::Unavailable(format!("{}: {error:#}", path.display()))
    } else {
        FeedError::Malformed(format!("{}: {error:#}", path.display()))
    }
}

/// A pet registry read from a JSON array of pets.
#[derive(Debug)]
pub struct JsonRegistry {
    pets: Vec<Pet>,
}

impl JsonRegistry {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            pets: read_json(path)?,
        })
    }

    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }
}

impl PetRegistry for JsonRegistry {
    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Pet>, RegistryError> {
        Ok(self
            .pets
            .iter()
            .filter(|pet| pet.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
