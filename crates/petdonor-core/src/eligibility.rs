//! Donor eligibility classification.
//!
//! A pet is eligible to donate when every check in an ordered list passes.
//! Each check is a plain function that either passes or yields a reason code,
//! so a classification reports every unmet condition, not just the first.
//! Missing data always fails its check.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DonationRequest, Pet};

/// Thresholds for baseline donor eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityRules {
    /// Minimum donor weight in kilograms, for every species.
    pub min_weight_kg: f64,
    /// Youngest eligible age in years (inclusive).
    pub min_age_years: u32,
    /// Oldest eligible age in years (inclusive).
    pub max_age_years: u32,
    /// How many days a vaccination stays current (inclusive).
    pub vaccination_window_days: u32,
    /// Substrings that mark a health status as reporting an illness.
    ///
    /// Matched case-insensitively.
    pub illness_markers: Vec<String>,
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self {
            min_weight_kg: 5.0,
            min_age_years: 1,
            max_age_years: 8,
            vaccination_window_days: 365,
            illness_markers: vec![
                "enfermo".to_string(),
                "enferma".to_string(),
                "enfermedad".to_string(),
            ],
        }
    }
}

/// Why a pet cannot donate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibilityReason {
    /// No health status was recorded.
    MissingHealthStatus,
    /// The health status mentions an illness.
    IllnessReported,
    /// No vaccination date was recorded.
    MissingVaccinationDate,
    /// The last vaccination is older than the window.
    VaccinationExpired,
    /// The last vaccination date lies in the future.
    VaccinationInFuture,
    /// No weight was recorded.
    MissingWeight,
    /// Lighter than the species-independent floor.
    Underweight,
    /// No age was recorded.
    MissingAge,
    /// Younger than the minimum age.
    TooYoung,
    /// Older than the maximum age.
    TooOld,
    /// The pet's species differs from the request's.
    SpeciesMismatch,
    /// The request names a breed the pet does not have.
    BreedMismatch,
    /// The request names a blood type the pet does not have.
    BloodTypeMismatch,
    /// Lighter than the request's own minimum weight.
    BelowRequestMinWeight,
}

impl IneligibilityReason {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingHealthStatus => "missing_health_status",
            Self::IllnessReported => "illness_reported",
            Self::MissingVaccinationDate => "missing_vaccination_date",
            Self::VaccinationExpired => "vaccination_expired",
            Self::VaccinationInFuture => "vaccination_in_future",
            Self::MissingWeight => "missing_weight",
            Self::Underweight => "underweight",
            Self::MissingAge => "missing_age",
            Self::TooYoung => "too_young",
            Self::TooOld => "too_old",
            Self::SpeciesMismatch => "species_mismatch",
            Self::BreedMismatch => "breed_mismatch",
            Self::BloodTypeMismatch => "blood_type_mismatch",
            Self::BelowRequestMinWeight => "below_request_min_weight",
        }
    }
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingHealthStatus => "health status not recorded",
            Self::IllnessReported => "health status reports an illness",
            Self::MissingVaccinationDate => "vaccination date not recorded",
            Self::VaccinationExpired => "last vaccination is out of date",
            Self::VaccinationInFuture => "vaccination date is in the future",
            Self::MissingWeight => "weight not recorded",
            Self::Underweight => "below the minimum donor weight",
            Self::MissingAge => "age not recorded",
            Self::TooYoung => "below the minimum donor age",
            Self::TooOld => "above the maximum donor age",
            Self::SpeciesMismatch => "species does not match the request",
            Self::BreedMismatch => "breed does not match the request",
            Self::BloodTypeMismatch => "blood type does not match the request",
            Self::BelowRequestMinWeight => "below the weight the request requires",
        })
    }
}

/// Outcome of a classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    eligible: bool,
    reasons: Vec<IneligibilityReason>,
}

impl Eligibility {
    fn from_reasons(reasons: Vec<IneligibilityReason>) -> Self {
        Self {
            eligible: reasons.is_empty(),
            reasons,
        }
    }

    /// Drops `reason`, e.g. once a stricter check has cleared it.
    pub(crate) fn waive(mut self, reason: IneligibilityReason) -> Self {
        self.reasons.retain(|r| *r != reason);
        Self::from_reasons(self.reasons)
    }

    /// Whether every check passed.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        self.eligible
    }

    /// The failed checks, in check order.
    #[must_use]
    pub fn reasons(&self) -> &[IneligibilityReason] {
        &self.reasons
    }
}

type BaselineCheck = fn(&Pet, &EligibilityRules, NaiveDate) -> Option<IneligibilityReason>;
type RequestCheck = fn(&Pet, &DonationRequest) -> Option<IneligibilityReason>;

const BASELINE_CHECKS: [(&str, BaselineCheck); 4] = [
    ("health", check_health),
    ("vaccination", check_vaccination),
    ("weight", check_weight),
    ("age", check_age),
];

const REQUEST_CHECKS: [(&str, RequestCheck); 4] = [
    ("species", check_species),
    ("breed", check_breed),
    ("blood_type", check_blood_type),
    ("request_weight", check_request_weight),
];

impl EligibilityRules {
    /// Classifies a pet against the baseline donation criteria.
    #[must_use]
    pub fn classify(&self, pet: &Pet, now: DateTime<Utc>) -> Eligibility {
        let today = now.date_naive();
        let reasons = BASELINE_CHECKS
            .iter()
            .filter_map(|(name, check)| {
                let reason = check(pet, self, today);
                if let Some(reason) = reason {
                    tracing::trace!(
                        pet = %pet.id,
                        check = name,
                        %reason,
                        "eligibility check failed"
                    );
                }
                reason
            })
            .collect();
        Eligibility::from_reasons(reasons)
    }

    /// Classifies a pet against the baseline criteria and a specific request.
    ///
    /// Both sets of checks apply: the request's minimum weight narrows the
    /// baseline floor but never relaxes it.
    #[must_use]
    pub fn classify_for_request(
        &self,
        pet: &Pet,
        request: &DonationRequest,
        now: DateTime<Utc>,
    ) -> Eligibility {
        let mut reasons = self.classify(pet, now).reasons;
        for (name, check) in &REQUEST_CHECKS {
            if let Some(reason) = check(pet, request) {
                tracing::trace!(
                    pet = %pet.id,
                    request = %request.id,
                    check = name,
                    %reason,
                    "request check failed"
                );
                reasons.push(reason);
            }
        }
        Eligibility::from_reasons(reasons)
    }
}

/// Classifies a pet with the default [`EligibilityRules`].
#[must_use]
pub fn classify(pet: &Pet, now: DateTime<Utc>) -> Eligibility {
    EligibilityRules::default().classify(pet, now)
}

/// Classifies a pet for a request with the default [`EligibilityRules`].
#[must_use]
pub fn classify_for_request(
    pet: &Pet,
    request: &DonationRequest,
    now: DateTime<Utc>,
) -> Eligibility {
    EligibilityRules::default().classify_for_request(pet, request, now)
}

fn check_health(pet: &Pet, rules: &EligibilityRules, _: NaiveDate) -> Option<IneligibilityReason> {
    let Some(status) = pet.health_status.as_deref().filter(|s| !s.trim().is_empty()) else {
        return Some(IneligibilityReason::MissingHealthStatus);
    };
    let status = status.to_lowercase();
    rules
        .illness_markers
        .iter()
        .any(|marker| status.contains(&marker.to_lowercase()))
        .then_some(IneligibilityReason::IllnessReported)
}

fn check_vaccination(
    pet: &Pet,
    rules: &EligibilityRules,
    today: NaiveDate,
) -> Option<IneligibilityReason> {
    let Some(date) = pet.last_vaccination_date else {
        return Some(IneligibilityReason::MissingVaccinationDate);
    };
    let elapsed = (today - date).num_days();
    if elapsed < 0 {
        Some(IneligibilityReason::VaccinationInFuture)
    } else if elapsed > i64::from(rules.vaccination_window_days) {
        Some(IneligibilityReason::VaccinationExpired)
    } else {
        None
    }
}

fn check_weight(pet: &Pet, rules: &EligibilityRules, _: NaiveDate) -> Option<IneligibilityReason> {
    match pet.weight {
        None => Some(IneligibilityReason::MissingWeight),
        // NaN fails the comparison and is rejected with it.
        Some(weight) if !(weight >= rules.min_weight_kg) => {
            Some(IneligibilityReason::Underweight)
        }
        Some(_) => None,
    }
}

fn check_age(pet: &Pet, rules: &EligibilityRules, _: NaiveDate) -> Option<IneligibilityReason> {
    match pet.age {
        None => Some(IneligibilityReason::MissingAge),
        Some(age) if age < rules.min_age_years => Some(IneligibilityReason::TooYoung),
        Some(age) if age > rules.max_age_years => Some(IneligibilityReason::TooOld),
        Some(_) => None,
    }
}

fn check_species(pet: &Pet, request: &DonationRequest) -> Option<IneligibilityReason> {
    (pet.species != request.species).then_some(IneligibilityReason::SpeciesMismatch)
}

fn check_breed(pet: &Pet, request: &DonationRequest) -> Option<IneligibilityReason> {
    let required = request.breed.as_deref().map(str::trim).filter(|b| !b.is_empty())?;
    let matches = pet
        .breed
        .as_deref()
        .is_some_and(|breed| breed.trim().to_lowercase() == required.to_lowercase());
    (!matches).then_some(IneligibilityReason::BreedMismatch)
}

fn check_blood_type(pet: &Pet, request: &DonationRequest) -> Option<IneligibilityReason> {
    let required = request
        .required_blood_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())?;
    (pet.blood_type.trim() != required).then_some(IneligibilityReason::BloodTypeMismatch)
}

/// A missing weight is already reported by the baseline weight check.
fn check_request_weight(pet: &Pet, request: &DonationRequest) -> Option<IneligibilityReason> {
    let weight = pet.weight?;
    (!(weight >= request.min_weight)).then_some(IneligibilityReason::BelowRequestMinWeight)
}
