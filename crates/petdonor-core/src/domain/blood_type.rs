use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{Species, UnknownValue};

/// A blood type from the closed per-species vocabulary.
///
/// Canine types follow the DEA (dog erythrocyte antigen) system; feline types
/// follow the AB system. Every value belongs to exactly one species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BloodType {
    /// `DEA 1.1+`
    Dea11Positive,
    /// `DEA 1.1-`, the canine universal donor.
    Dea11Negative,
    /// `DEA 1.2+`
    Dea12Positive,
    /// `DEA 1.2-`
    Dea12Negative,
    /// `DEA 4`
    Dea4,
    /// `DEA 7`
    Dea7,
    /// Feline `A`.
    A,
    /// Feline `B`.
    B,
    /// Feline `AB`, the feline universal recipient.
    Ab,
}

impl BloodType {
    /// Every blood type, canine first, in facet order.
    pub const ALL: [Self; 9] = [
        Self::Dea11Positive,
        Self::Dea11Negative,
        Self::Dea12Positive,
        Self::Dea12Negative,
        Self::Dea4,
        Self::Dea7,
        Self::A,
        Self::B,
        Self::Ab,
    ];

    /// The canonical label, e.g. `DEA 1.1+` or `AB`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dea11Positive => "DEA 1.1+",
            Self::Dea11Negative => "DEA 1.1-",
            Self::Dea12Positive => "DEA 1.2+",
            Self::Dea12Negative => "DEA 1.2-",
            Self::Dea4 => "DEA 4",
            Self::Dea7 => "DEA 7",
            Self::A => "A",
            Self::B => "B",
            Self::Ab => "AB",
        }
    }

    /// The species whose vocabulary contains this blood type.
    #[must_use]
    pub const fn species(self) -> Species {
        match self {
            Self::Dea11Positive
            | Self::Dea11Negative
            | Self::Dea12Positive
            | Self::Dea12Negative
            | Self::Dea4
            | Self::Dea7 => Species::Canine,
            Self::A | Self::B | Self::Ab => Species::Feline,
        }
    }

    /// Parses a label exactly (after trimming surrounding whitespace).
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|blood_type| blood_type.label() == label)
    }

    /// Parses a label, rejecting types from another species' vocabulary.
    #[must_use]
    pub fn parse_for(species: Species, label: &str) -> Option<Self> {
        Self::parse(label).filter(|blood_type| blood_type.species() == species)
    }

    /// The vocabulary of a single species.
    pub fn for_species(species: Species) -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .filter(move |blood_type| blood_type.species() == species)
    }

    /// Whether this type lies in the domain of a species selection.
    ///
    /// An empty selection stands for every species.
    #[must_use]
    pub fn in_domain(self, species: &[Species]) -> bool {
        species.is_empty() || species.contains(&self.species())
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BloodType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownValue::new("blood type", s))
    }
}

impl TryFrom<String> for BloodType {
    type Error = UnknownValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BloodType> for String {
    fn from(blood_type: BloodType) -> Self {
        blood_type.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("DEA 1.1+", Some(BloodType::Dea11Positive); "canine positive")]
    #[test_case(" DEA 1.1- ", Some(BloodType::Dea11Negative); "padded")]
    #[test_case("AB", Some(BloodType::Ab); "feline ab")]
    #[test_case("ab", None; "labels are case sensitive")]
    #[test_case("DEA 1.3+", None; "unknown dea")]
    #[test_case("O+", None; "human type")]
    fn parse(label: &str, expected: Option<BloodType>) {
        assert_eq!(BloodType::parse(label), expected);
    }

    #[test]
    fn parse_for_rejects_other_species() {
        assert_eq!(BloodType::parse_for(Species::Canine, "A"), None);
        assert_eq!(
            BloodType::parse_for(Species::Feline, "A"),
            Some(BloodType::A)
        );
    }

    #[test]
    fn vocabularies_partition_all_types() {
        let canine: Vec<_> = BloodType::for_species(Species::Canine).collect();
        let feline: Vec<_> = BloodType::for_species(Species::Feline).collect();

        assert_eq!(canine.len() + feline.len(), BloodType::ALL.len());
        assert!(canine.iter().all(|t| !feline.contains(t)));
        assert_eq!(feline, vec![BloodType::A, BloodType::B, BloodType::Ab]);
    }

    #[test]
    fn empty_selection_is_every_species() {
        assert!(BloodType::A.in_domain(&[]));
        assert!(BloodType::Dea4.in_domain(&[]));
        assert!(!BloodType::A.in_domain(&[Species::Canine]));
        assert!(BloodType::A.in_domain(&[Species::Canine, Species::Feline]));
    }
}
