//! Domain models for pet blood donation.
//!
//! This module contains the record types exchanged with collaborators
//! (donation requests and pets), the closed vocabularies they are expressed
//! in, and the repository configuration.

/// Species vocabulary and its normalization.
pub mod species;
pub use species::Species;

/// Per-species blood-type vocabulary.
pub mod blood_type;
pub use blood_type::BloodType;

/// Donation requests and their classification fields.
pub mod request;
pub use request::{DonationRequest, Locality, RequestStatus, TransitionError, Urgency};

/// Donor candidates.
pub mod pet;
pub use pet::Pet;

mod config;
pub use config::{Config, ConfigError};

/// Error returned when a string is not a member of a closed vocabulary.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Unknown {vocabulary} '{value}'")]
pub struct UnknownValue {
    vocabulary: &'static str,
    value: String,
}

impl UnknownValue {
    pub(crate) fn new(vocabulary: &'static str, value: &str) -> Self {
        Self {
            vocabulary,
            value: value.to_string(),
        }
    }

    /// Returns the rejected input.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}
