//! Picking which of an owner's pets can answer a donation request.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    compatibility::is_compatible,
    domain::{DonationRequest, Pet},
    eligibility::{Eligibility, EligibilityRules, IneligibilityReason},
};

/// Errors reported by a [`PetRegistry`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry could not be reached.
    #[error("Pet registry unavailable: {0}")]
    Unavailable(String),

    /// The registry answered with data that could not be read.
    #[error("Malformed pet registry data: {0}")]
    Malformed(String),
}

/// Read-only access to the pets registered by each owner.
pub trait PetRegistry {
    /// Lists the pets belonging to `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] when the registry cannot produce a listing.
    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Pet>, RegistryError>;
}

/// One of the owner's pets, classified against a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorCandidate {
    /// The pet.
    pub pet: Pet,
    /// Request-scoped eligibility.
    pub eligibility: Eligibility,
    /// Whether the pet's blood type can be given for the request.
    pub compatible: bool,
}

impl DonorCandidate {
    /// Whether the pet may be offered as a donor.
    #[must_use]
    pub const fn is_selectable(&self) -> bool {
        self.eligibility.is_eligible() && self.compatible
    }
}

/// Classifies every pet of `owner_id` against `request`.
///
/// Selectable candidates come first; ties are ordered by pet id. A request
/// without a required blood type accepts any donor whose blood type belongs
/// to the request's species.
///
/// # Errors
///
/// Propagates the registry's error.
pub fn select_donors(
    registry: &impl PetRegistry,
    owner_id: &str,
    request: &DonationRequest,
    rules: &EligibilityRules,
    now: DateTime<Utc>,
) -> Result<Vec<DonorCandidate>, RegistryError> {
    let pets = registry.list_for_owner(owner_id)?;
    tracing::debug!(
        owner = owner_id,
        request = %request.id,
        pets = pets.len(),
        "classifying donors"
    );

    let mut candidates: Vec<_> = pets
        .into_iter()
        .map(|pet| {
            let mut eligibility = rules.classify_for_request(&pet, request, now);
            let compatible = match request.required_blood_type.as_deref() {
                Some(required) => is_compatible(&pet.blood_type, required, request.species),
                None => pet.species == request.species && pet.typed_blood_type().is_some(),
            };
            // The matcher decides blood type; a universal donor need not match exactly.
            if compatible {
                eligibility = eligibility.waive(IneligibilityReason::BloodTypeMismatch);
            }
            DonorCandidate {
                pet,
                eligibility,
                compatible,
            }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.is_selectable()
            .cmp(&a.is_selectable())
            .then_with(|| a.pet.id.cmp(&b.pet.id))
    });
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::domain::{Locality, RequestStatus, Species, Urgency};

    struct InMemoryRegistry(HashMap<String, Vec<Pet>>);

    impl PetRegistry for InMemoryRegistry {
        fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Pet>, RegistryError> {
            Ok(self.0.get(owner_id).cloned().unwrap_or_default())
        }
    }

    struct DownRegistry;

    impl PetRegistry for DownRegistry {
        fn list_for_owner(&self, _: &str) -> Result<Vec<Pet>, RegistryError> {
            Err(RegistryError::Unavailable("connection refused".to_string()))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    fn pet(id: &str, blood_type: &str) -> Pet {
        Pet {
            id: id.to_string(),
            owner_id: "owner-1".to_string(),
            name: id.to_uppercase(),
            species: Species::Canine,
            blood_type: blood_type.to_string(),
            breed: None,
            weight: Some(28.0),
            age: Some(4),
            health_status: Some("Sano".to_string()),
            last_vaccination_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            photo: None,
        }
    }

    fn request(required: Option<&str>) -> DonationRequest {
        DonationRequest {
            id: "req-7".to_string(),
            species: Species::Canine,
            required_blood_type: required.map(str::to_string),
            min_weight: 20.0,
            urgency: Urgency::High,
            locality: Locality::Usaquen,
            status: RequestStatus::Active,
            created_at: now(),
            pet_name: "Toby".to_string(),
            clinic_name: "Clínica Norte".to_string(),
            address: "Calle 127".to_string(),
            breed: None,
        }
    }

    fn registry(pets: Vec<Pet>) -> InMemoryRegistry {
        InMemoryRegistry(HashMap::from([("owner-1".to_string(), pets)]))
    }

    fn ids(candidates: &[DonorCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.pet.id.as_str()).collect()
    }

    #[test]
    fn selectable_candidates_come_first() {
        let light = Pet {
            weight: Some(12.0),
            ..pet("a-light", "DEA 1.1+")
        };
        let registry = registry(vec![
            pet("c-other", "DEA 4"),
            light,
            pet("b-match", "DEA 1.1+"),
        ]);

        let candidates = select_donors(
            &registry,
            "owner-1",
            &request(Some("DEA 1.1+")),
            &EligibilityRules::default(),
            now(),
        )
        .unwrap();

        assert_eq!(ids(&candidates), vec!["b-match", "a-light", "c-other"]);
        assert!(candidates[0].is_selectable());
        assert_eq!(
            candidates[1].eligibility.reasons(),
            &[IneligibilityReason::BelowRequestMinWeight]
        );
        assert!(!candidates[2].compatible);
    }

    #[test]
    fn universal_donor_is_selectable() {
        let registry = registry(vec![pet("nala", "DEA 1.1-")]);

        let candidates = select_donors(
            &registry,
            "owner-1",
            &request(Some("DEA 1.1+")),
            &EligibilityRules::default(),
            now(),
        )
        .unwrap();

        assert!(candidates[0].compatible);
        assert!(candidates[0].eligibility.reasons().is_empty());
        assert!(candidates[0].is_selectable());
    }

    #[test]
    fn incompatible_type_keeps_mismatch_reason() {
        let registry = registry(vec![pet("rex", "DEA 4")]);

        let candidates = select_donors(
            &registry,
            "owner-1",
            &request(Some("DEA 1.1+")),
            &EligibilityRules::default(),
            now(),
        )
        .unwrap();

        assert_eq!(
            candidates[0].eligibility.reasons(),
            &[IneligibilityReason::BloodTypeMismatch]
        );
    }

    #[test]
    fn unknown_blood_type_is_never_selectable() {
        let registry = registry(vec![pet("rex", "DEA 9")]);

        let candidates = select_donors(
            &registry,
            "owner-1",
            &request(None),
            &EligibilityRules::default(),
            now(),
        )
        .unwrap();

        assert!(!candidates[0].compatible);
        assert!(!candidates[0].is_selectable());
    }

    #[test]
    fn request_without_blood_type_accepts_known_types() {
        let registry = registry(vec![pet("rex", "DEA 7")]);

        let candidates = select_donors(
            &registry,
            "owner-1",
            &request(None),
            &EligibilityRules::default(),
            now(),
        )
        .unwrap();

        assert!(candidates[0].is_selectable());
    }

    #[test]
    fn owner_without_pets_has_no_candidates() {
        let candidates = select_donors(
            &registry(Vec::new()),
            "someone-else",
            &request(None),
            &EligibilityRules::default(),
            now(),
        )
        .unwrap();

        assert!(candidates.is_empty());
    }

    #[test]
    fn registry_errors_propagate() {
        let result = select_donors(
            &DownRegistry,
            "owner-1",
            &request(None),
            &EligibilityRules::default(),
            now(),
        );

        assert!(matches!(result, Err(RegistryError::Unavailable(_))));
    }
}
