use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BloodType, Species, UnknownValue};

/// How urgently a clinic needs a donor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Urgency {
    /// Needed as soon as possible.
    High,
    /// Needed within days.
    Medium,
}

impl Urgency {
    /// Every urgency, in facet order.
    pub const ALL: [Self; 2] = [Self::High, Self::Medium];

    /// The internal code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }

    /// The label shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "Alta",
            Self::Medium => "Media",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Urgency {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "alta" => Ok(Self::High),
            "medium" | "media" => Ok(Self::Medium),
            _ => Err(UnknownValue::new("urgency", s)),
        }
    }
}

impl TryFrom<String> for Urgency {
    type Error = UnknownValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Urgency> for String {
    fn from(urgency: Urgency) -> Self {
        urgency.code().to_string()
    }
}

/// The locality (administrative district) a request is located in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[allow(missing_docs)]
pub enum Locality {
    Usaquen,
    Chapinero,
    SantaFe,
    SanCristobal,
    Usme,
    Tunjuelito,
    Bosa,
    Kennedy,
    Fontibon,
    Engativa,
    Suba,
    BarriosUnidos,
    Teusaquillo,
    LosMartires,
    AntonioNarino,
    PuenteAranda,
    LaCandelaria,
    RafaelUribeUribe,
    CiudadBolivar,
    Sumapaz,
}

impl Locality {
    /// Every locality, in facet order.
    pub const ALL: [Self; 20] = [
        Self::Usaquen,
        Self::Chapinero,
        Self::SantaFe,
        Self::SanCristobal,
        Self::Usme,
        Self::Tunjuelito,
        Self::Bosa,
        Self::Kennedy,
        Self::Fontibon,
        Self::Engativa,
        Self::Suba,
        Self::BarriosUnidos,
        Self::Teusaquillo,
        Self::LosMartires,
        Self::AntonioNarino,
        Self::PuenteAranda,
        Self::LaCandelaria,
        Self::RafaelUribeUribe,
        Self::CiudadBolivar,
        Self::Sumapaz,
    ];

    /// The internal code, e.g. `barrios_unidos`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usaquen => "usaquen",
            Self::Chapinero => "chapinero",
            Self::SantaFe => "santa_fe",
            Self::SanCristobal => "san_cristobal",
            Self::Usme => "usme",
            Self::Tunjuelito => "tunjuelito",
            Self::Bosa => "bosa",
            Self::Kennedy => "kennedy",
            Self::Fontibon => "fontibon",
            Self::Engativa => "engativa",
            Self::Suba => "suba",
            Self::BarriosUnidos => "barrios_unidos",
            Self::Teusaquillo => "teusaquillo",
            Self::LosMartires => "los_martires",
            Self::AntonioNarino => "antonio_narino",
            Self::PuenteAranda => "puente_aranda",
            Self::LaCandelaria => "la_candelaria",
            Self::RafaelUribeUribe => "rafael_uribe_uribe",
            Self::CiudadBolivar => "ciudad_bolivar",
            Self::Sumapaz => "sumapaz",
        }
    }

    /// The display label, e.g. `Barrios Unidos`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Usaquen => "Usaquén",
            Self::Chapinero => "Chapinero",
            Self::SantaFe => "Santa Fe",
            Self::SanCristobal => "San Cristóbal",
            Self::Usme => "Usme",
            Self::Tunjuelito => "Tunjuelito",
            Self::Bosa => "Bosa",
            Self::Kennedy => "Kennedy",
            Self::Fontibon => "Fontibón",
            Self::Engativa => "Engativá",
            Self::Suba => "Suba",
            Self::BarriosUnidos => "Barrios Unidos",
            Self::Teusaquillo => "Teusaquillo",
            Self::LosMartires => "Los Mártires",
            Self::AntonioNarino => "Antonio Nariño",
            Self::PuenteAranda => "Puente Aranda",
            Self::LaCandelaria => "La Candelaria",
            Self::RafaelUribeUribe => "Rafael Uribe Uribe",
            Self::CiudadBolivar => "Ciudad Bolívar",
            Self::Sumapaz => "Sumapaz",
        }
    }
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locality {
    type Err = UnknownValue;

    /// Accepts either the code or the display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|locality| {
                locality.code().eq_ignore_ascii_case(trimmed)
                    || locality.label().to_lowercase() == trimmed.to_lowercase()
            })
            .ok_or_else(|| UnknownValue::new("locality", s))
    }
}

impl TryFrom<String> for Locality {
    type Error = UnknownValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locality> for String {
    fn from(locality: Locality) -> Self {
        locality.code().to_string()
    }
}

/// Lifecycle status of a donation request.
///
/// ```text
/// active <-> pending
/// active  -> completed | cancelled
/// pending -> completed
/// ```
///
/// `Completed` and `Cancelled` are terminal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum RequestStatus {
    /// Open and listed in the public feed.
    #[default]
    Active,
    /// A donor has been proposed and the clinic is confirming.
    Pending,
    /// The donation took place.
    Completed,
    /// Withdrawn by the clinic.
    Cancelled,
}

impl RequestStatus {
    /// Every status.
    pub const ALL: [Self; 4] = [
        Self::Active,
        Self::Pending,
        Self::Completed,
        Self::Cancelled,
    ];

    /// The internal code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether moving from `self` to `next` is a permitted transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Pending | Self::Completed | Self::Cancelled)
                | (Self::Pending, Self::Active | Self::Completed)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownValue::new("status", s))
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = UnknownValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        status.code().to_string()
    }
}

/// Error returned when a status change is not permitted.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Request {id} cannot move from {from} to {to}")]
pub struct TransitionError {
    id: String,
    from: RequestStatus,
    to: RequestStatus,
}

/// A clinic's request for a blood donor.
///
/// Requests are created and mutated by the clinic side; the search engine
/// only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    /// Opaque identifier.
    pub id: String,
    /// Species of the recipient.
    pub species: Species,
    /// Blood type the recipient needs, as published by the clinic.
    ///
    /// Kept verbatim: values outside the species vocabulary are tolerated
    /// here and rejected wherever they are interpreted.
    #[serde(default)]
    pub required_blood_type: Option<String>,
    /// Minimum donor weight in kilograms.
    pub min_weight: f64,
    /// How urgently a donor is needed.
    pub urgency: Urgency,
    /// Where the clinic is.
    pub locality: Locality,
    /// Lifecycle status.
    #[serde(default)]
    pub status: RequestStatus,
    /// When the request was published.
    pub created_at: DateTime<Utc>,
    /// Name of the recipient pet.
    #[serde(default)]
    pub pet_name: String,
    /// Name of the clinic holding the request.
    #[serde(default)]
    pub clinic_name: String,
    /// Street address of the clinic.
    #[serde(default)]
    pub address: String,
    /// Donor breed required by the clinic, if any.
    #[serde(default)]
    pub breed: Option<String>,
}

impl DonationRequest {
    /// The required blood type, if present and within the species vocabulary.
    #[must_use]
    pub fn blood_type(&self) -> Option<BloodType> {
        self.required_blood_type
            .as_deref()
            .and_then(|label| BloodType::parse_for(self.species, label))
    }

    /// Moves the request to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if the transition is not permitted from
    /// the current status. The request is left unchanged.
    pub fn transition(&mut self, next: RequestStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        tracing::debug!(id = %self.id, from = %self.status, to = %next, "request status changed");
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn request() -> DonationRequest {
        serde_json::from_str(
            r#"{
                "id": "req-1",
                "species": "Perro",
                "requiredBloodType": "DEA 1.1+",
                "minWeight": 20.0,
                "urgency": "high",
                "locality": "suba",
                "createdAt": "2026-10-01T12:00:00Z",
                "petName": "Rocky",
                "clinicName": "Clínica Veterinaria Norte",
                "address": "Calle 145 # 91-19"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn deserializes_collaborator_record() {
        let request = request();

        assert_eq!(request.species, Species::Canine);
        assert_eq!(request.status, RequestStatus::Active);
        assert_eq!(request.locality, Locality::Suba);
        assert_eq!(request.blood_type(), Some(BloodType::Dea11Positive));
        assert_eq!(request.breed, None);
    }

    #[test]
    fn blood_type_outside_species_vocabulary_is_none() {
        let mut request = request();
        request.required_blood_type = Some("AB".to_string());
        assert_eq!(request.blood_type(), None);
    }

    #[test_case(RequestStatus::Active, RequestStatus::Pending, true; "active to pending")]
    #[test_case(RequestStatus::Pending, RequestStatus::Active, true; "pending to active")]
    #[test_case(RequestStatus::Active, RequestStatus::Completed, true; "active to completed")]
    #[test_case(RequestStatus::Active, RequestStatus::Cancelled, true; "active to cancelled")]
    #[test_case(RequestStatus::Pending, RequestStatus::Completed, true; "pending to completed")]
    #[test_case(RequestStatus::Pending, RequestStatus::Cancelled, false; "pending to cancelled")]
    #[test_case(RequestStatus::Completed, RequestStatus::Active, false; "completed is terminal")]
    #[test_case(RequestStatus::Cancelled, RequestStatus::Active, false; "cancelled is terminal")]
    #[test_case(RequestStatus::Active, RequestStatus::Active, false; "no self transition")]
    fn transitions(from: RequestStatus, to: RequestStatus, allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn rejected_transition_leaves_status_unchanged() {
        let mut request = request();
        request.transition(RequestStatus::Cancelled).unwrap();

        let error = request.transition(RequestStatus::Active).unwrap_err();

        assert_eq!(request.status, RequestStatus::Cancelled);
        assert_eq!(
            error.to_string(),
            "Request req-1 cannot move from cancelled to active"
        );
    }

    #[test]
    fn locality_parses_code_and_label() {
        assert_eq!("ciudad_bolivar".parse(), Ok(Locality::CiudadBolivar));
        assert_eq!("Ciudad Bolívar".parse(), Ok(Locality::CiudadBolivar));
        assert!("Medellín".parse::<Locality>().is_err());
    }

    #[test]
    fn urgency_accepts_spanish_labels() {
        assert_eq!("Alta".parse(), Ok(Urgency::High));
        assert_eq!("media".parse(), Ok(Urgency::Medium));
    }
}
