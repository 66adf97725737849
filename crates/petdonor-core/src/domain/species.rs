use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::UnknownValue;

/// The species a donation request or a pet belongs to.
///
/// Internally species are identified by the codes `canine` and `feline`.
/// The request and pet services speak a different vocabulary (`Perro`,
/// `Gato`), so every value crossing that boundary goes through
/// [`Species::normalize`] on the way in and [`Species::external_label`] on the
/// way out. Nothing else in the crate compares species strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Species {
    /// Dogs.
    Canine,
    /// Cats.
    Feline,
}

impl Species {
    /// Every species, in facet order.
    pub const ALL: [Self; 2] = [Self::Canine, Self::Feline];

    /// Maps any known spelling of a species onto the internal vocabulary.
    ///
    /// Accepts the internal codes, the collaborator labels and a handful of
    /// common aliases, ignoring case and surrounding whitespace. Returns
    /// `None` for anything else.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "canine" | "perro" | "canino" | "dog" => Some(Self::Canine),
            "feline" | "gato" | "felino" | "cat" => Some(Self::Feline),
            _ => None,
        }
    }

    /// The internal code, used in query strings and serialized records.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Canine => "canine",
            Self::Feline => "feline",
        }
    }

    /// The label the request and pet services use for this species.
    ///
    /// This is also the label shown to users and matched by free-text search.
    #[must_use]
    pub const fn external_label(self) -> &'static str {
        match self {
            Self::Canine => "Perro",
            Self::Feline => "Gato",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Species {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s).ok_or_else(|| UnknownValue::new("species", s))
    }
}

impl TryFrom<String> for Species {
    type Error = UnknownValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Species> for String {
    fn from(species: Species) -> Self {
        species.code().to_string()
    }
}
