//! Proptest generators for filter states and the records they filter.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use petdonor_core::{
    BloodType, DonationRequest, FacetValue, FilterState, Locality, Pet, RequestStatus, Species,
    Urgency,
};
use proptest::{collection::vec, prelude::*, sample::select};

pub fn arb_species() -> impl Strategy<Value = Species> {
    select(Species::ALL.to_vec())
}

pub fn arb_blood_type() -> impl Strategy<Value = BloodType> {
    select(BloodType::ALL.to_vec())
}

pub fn arb_urgency() -> impl Strategy<Value = Urgency> {
    select(Urgency::ALL.to_vec())
}

pub fn arb_locality() -> impl Strategy<Value = Locality> {
    select(Locality::ALL.to_vec())
}

pub fn arb_status() -> impl Strategy<Value = RequestStatus> {
    select(RequestStatus::ALL.to_vec())
}

pub fn arb_facet_value() -> impl Strategy<Value = FacetValue> {
    prop_oneof![
        arb_species().prop_map(FacetValue::from),
        arb_blood_type().prop_map(FacetValue::from),
        arb_urgency().prop_map(FacetValue::from),
        arb_locality().prop_map(FacetValue::from),
    ]
}

/// Free text, including characters the query string has to escape.
pub fn arb_text() -> impl Strategy<Value = String> {
    "[ a-zA-Z0-9áéíóúñÑ&+%=?#/.-]{0,16}"
}

/// Free text that survives encoding: empty, or with something besides
/// whitespace in it.
pub fn arb_canonical_text() -> impl Strategy<Value = String> {
    arb_text().prop_filter("blank text is not encoded", |text| {
        text.is_empty() || !text.trim().is_empty()
    })
}

/// One user action on the filter panel.
#[derive(Debug, Clone)]
pub enum Op {
    Toggle(FacetValue),
    Select(FacetValue),
    SetSpecies(Vec<Species>),
    SetText(String),
    SetStatus(RequestStatus),
    Clear,
}

impl Op {
    pub fn apply(&self, state: &FilterState) -> FilterState {
        match self {
            Self::Toggle(value) => state.toggle(*value),
            Self::Select(value) => state.select(*value),
            Self::SetSpecies(species) => state.set_species(species.iter().copied()),
            Self::SetText(text) => state.set_free_text(text.as_str()),
            Self::SetStatus(status) => state.set_status_tab(*status),
            Self::Clear => state.clear(),
        }
    }
}

pub fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => arb_facet_value().prop_map(Op::Toggle),
        2 => arb_facet_value().prop_map(Op::Select),
        2 => vec(arb_species(), 0..4).prop_map(Op::SetSpecies),
        2 => arb_text().prop_map(Op::SetText),
        1 => arb_status().prop_map(Op::SetStatus),
        1 => Just(Op::Clear),
    ]
}

pub fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    vec(arb_op(), 0..24)
}

pub fn apply_all(ops: &[Op]) -> FilterState {
    ops.iter()
        .fold(FilterState::default(), |state, op| op.apply(&state))
}

/// A state reachable through the public operations whose free text is
/// canonical.
pub fn arb_state() -> impl Strategy<Value = FilterState> {
    (arb_ops(), arb_canonical_text())
        .prop_map(|(ops, text)| apply_all(&ops).set_free_text(text))
}

pub fn arb_request() -> impl Strategy<Value = DonationRequest> {
    (
        arb_blood_type(),
        arb_urgency(),
        arb_locality(),
        arb_status(),
        "[A-Za-z]{1,8}",
        0u32..2_000,
    )
        .prop_map(|(blood_type, urgency, locality, status, pet_name, minutes)| {
            let species = blood_type.species();
            DonationRequest {
                id: format!("req-{pet_name}-{minutes}"),
                species,
                required_blood_type: Some(blood_type.label().to_string()),
                min_weight: 10.0,
                urgency,
                locality,
                status,
                created_at: Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()
                    + Duration::minutes(i64::from(minutes)),
                pet_name,
                clinic_name: "Clínica Central".to_string(),
                address: "Avenida 68".to_string(),
                breed: None,
            }
        })
}

/// A pet that passes every baseline check on 2026-10-16.
pub fn eligible_pet(species: Species, blood_type: BloodType) -> Pet {
    Pet {
        id: "pet-1".to_string(),
        owner_id: "owner-1".to_string(),
        name: "Kira".to_string(),
        species,
        blood_type: blood_type.label().to_string(),
        breed: None,
        weight: Some(25.0),
        age: Some(3),
        health_status: Some("Sana y activa".to_string()),
        last_vaccination_date: NaiveDate::from_ymd_opt(2026, 6, 1),
        photo: None,
    }
}
