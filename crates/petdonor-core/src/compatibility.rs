//! Blood-type compatibility between a donor and a recipient.
//!
//! The relation is asymmetric and depends on the species:
//!
//! - canine: a `DEA 1.1-` donor can give to any recipient;
//! - feline: an `AB` recipient can receive from any donor;
//! - otherwise donor and recipient types must be equal.
//!
//! Types outside the species vocabulary are never compatible.

use crate::domain::{BloodType, Species};

/// Whether a donor with `donor` blood type may give to a recipient needing
/// `required`, both given as labels.
///
/// Unknown labels, and labels from another species' vocabulary, are treated
/// as incompatible.
#[must_use]
pub fn is_compatible(donor: &str, required: &str, species: Species) -> bool {
    let (Some(donor), Some(required)) = (
        BloodType::parse_for(species, donor),
        BloodType::parse_for(species, required),
    ) else {
        tracing::trace!(donor, required, %species, "blood type outside vocabulary");
        return false;
    };
    compatible(donor, required, species)
}

/// Typed form of [`is_compatible`].
#[must_use]
pub fn compatible(donor: BloodType, required: BloodType, species: Species) -> bool {
    if donor.species() != species || required.species() != species {
        return false;
    }
    match species {
        Species::Canine => donor == BloodType::Dea11Negative || donor == required,
        Species::Feline => required == BloodType::Ab || donor == required,
    }
}

/// Every donor type in `species`' vocabulary that can give to `required`.
#[must_use]
pub fn donors_for(required: BloodType, species: Species) -> Vec<BloodType> {
    BloodType::for_species(species)
        .filter(|&donor| compatible(donor, required, species))
        .collect()
}
