use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BloodType, Species};

/// A pet registered by its owner as a potential blood donor.
///
/// Pets are owned by the pet registry; this crate never mutates them. Any
/// field the registry may leave blank is optional here, and the eligibility
/// classifier treats a missing value as a failed check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Opaque identifier.
    pub id: String,
    /// Identifier of the owning user.
    pub owner_id: String,
    /// The pet's name.
    #[serde(default)]
    pub name: String,
    /// Species, normalized from the registry's vocabulary.
    pub species: Species,
    /// Blood type as recorded by the owner.
    #[serde(default)]
    pub blood_type: String,
    /// Breed, if recorded.
    #[serde(default)]
    pub breed: Option<String>,
    /// Weight in kilograms.
    #[serde(default)]
    pub weight: Option<f64>,
    /// Age in whole years.
    #[serde(default)]
    pub age: Option<u32>,
    /// Free-text description of the pet's health.
    #[serde(default)]
    pub health_status: Option<String>,
    /// Date of the most recent vaccination.
    #[serde(default)]
    pub last_vaccination_date: Option<NaiveDate>,
    /// Opaque reference to the pet's photo.
    #[serde(default)]
    pub photo: Option<String>,
}

impl Pet {
    /// The recorded blood type, if it belongs to the pet's species vocabulary.
    #[must_use]
    pub fn typed_blood_type(&self) -> Option<BloodType> {
        BloodType::parse_for(self.species, &self.blood_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_registry_record() {
        let pet: Pet = serde_json::from_str(
            r#"{"id": "p1", "ownerId": "u1", "species": "Gato", "bloodType": "B"}"#,
        )
        .unwrap();

        assert_eq!(pet.species, Species::Feline);
        assert_eq!(pet.typed_blood_type(), Some(BloodType::B));
        assert_eq!(pet.weight, None);
        assert_eq!(pet.last_vaccination_date, None);
    }

    #[test]
    fn foreign_blood_type_is_untyped() {
        let pet: Pet = serde_json::from_str(
            r#"{"id": "p1", "ownerId": "u1", "species": "Perro", "bloodType": "AB"}"#,
        )
        .unwrap();

        assert_eq!(pet.typed_blood_type(), None);
    }
}
