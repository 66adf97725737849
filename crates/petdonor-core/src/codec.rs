//! Mapping between a [`FilterState`] and its query-string form.
//!
//! | Facet      | Parameter     | Multiplicity                         |
//! |------------|---------------|--------------------------------------|
//! | species    | `especie`     | repeatable                           |
//! | blood type | `tipo_sangre` | repeatable                           |
//! | urgency    | `urgencia`    | repeatable                           |
//! | locality   | `localidad`   | repeatable                           |
//! | free text  | `busqueda`    | single                               |
//! | status tab | `estado`      | single, omitted when `active`        |
//!
//! Decoding never fails. Anything it does not understand is dropped, so a
//! hand-edited or stale link still opens the feed.

use std::fmt;

use crate::{
    domain::{BloodType, Locality, RequestStatus, Species, Urgency},
    filter::{Facet, FilterState},
};

/// An ordered, multi-valued list of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Iterates over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Every value of the parameter `name`, in order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter()
            .filter(move |(n, _)| *n == name)
            .map(|(_, value)| value)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self(
            form_urlencoded::parse(query.as_bytes())
                .map(|(name, value)| (name.into_owned(), value.into_owned()))
                .collect(),
        )
    }

    /// Renders the list as an `application/x-www-form-urlencoded` string,
    /// without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Encodes a filter state.
///
/// Parameters come in facet order, values in selection order. Empty facets,
/// a blank free text and the default status tab are omitted.
#[must_use]
pub fn encode(state: &FilterState) -> QueryParams {
    let mut params = QueryParams::new();
    for species in state.species() {
        params.push(Facet::Species.param(), species.code());
    }
    for blood_type in state.blood_types() {
        params.push(Facet::BloodType.param(), blood_type.label());
    }
    for urgency in state.urgencies() {
        params.push(Facet::Urgency.param(), urgency.code());
    }
    for locality in state.localities() {
        params.push(Facet::Locality.param(), locality.code());
    }
    if !state.free_text().trim().is_empty() {
        params.push(Facet::FreeText.param(), state.free_text());
    }
    if state.status_tab() != RequestStatus::default() {
        params.push(Facet::Status.param(), state.status_tab().code());
    }
    params
}

/// Decodes a filter state, dropping whatever is malformed.
///
/// Unknown parameters and values, duplicate values, blood types outside the
/// decoded species domain and repeats of single-valued parameters are
/// ignored. Species go through [`Species::normalize`].
#[must_use]
pub fn decode(params: &QueryParams) -> FilterState {
    // Species first: the blood-type domain depends on it.
    let species = params
        .values(Facet::Species.param())
        .filter_map(|raw| accept(Facet::Species, raw, Species::normalize(raw)));
    let mut state = FilterState::default().set_species(species);

    for raw in params.values(Facet::BloodType.param()) {
        if let Some(blood_type) = accept(Facet::BloodType, raw, BloodType::parse(raw)) {
            if blood_type.in_domain(state.species()) {
                state = state.select(blood_type);
            } else {
                tracing::trace!(%blood_type, "dropped blood type outside species domain");
            }
        }
    }
    for raw in params.values(Facet::Urgency.param()) {
        if let Some(urgency) = accept(Facet::Urgency, raw, raw.parse::<Urgency>().ok()) {
            state = state.select(urgency);
        }
    }
    for raw in params.values(Facet::Locality.param()) {
        if let Some(locality) = accept(Facet::Locality, raw, raw.parse::<Locality>().ok()) {
            state = state.select(locality);
        }
    }
    if let Some(text) = params.values(Facet::FreeText.param()).next() {
        state = state.set_free_text(text);
    }
    if let Some(raw) = params.values(Facet::Status.param()).next() {
        if let Some(status) = accept(Facet::Status, raw, raw.parse::<RequestStatus>().ok()) {
            state = state.set_status_tab(status);
        }
    }

    for (name, _) in params.iter() {
        if Facet::from_param(name).is_none() {
            tracing::trace!(param = name, "dropped unknown query parameter");
        }
    }

    state
}

fn accept<T>(facet: Facet, raw: &str, parsed: Option<T>) -> Option<T> {
    if parsed.is_none() {
        tracing::trace!(%facet, value = raw, "dropped undecodable query value");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_state() -> FilterState {
        FilterState::default()
            .toggle(Species::Canine)
            .toggle(BloodType::Dea11Negative)
            .toggle(BloodType::Dea4)
            .toggle(Urgency::High)
            .toggle(Locality::Suba)
            .toggle(Locality::Kennedy)
            .set_free_text("Clínica & Co")
            .set_status_tab(RequestStatus::Pending)
    }

    #[test]
    fn encode_uses_fixed_facet_order() {
        let params = encode(&full_state());
        let names: Vec<_> = params.iter().map(|(name, _)| name).collect();

        assert_eq!(
            names,
            vec![
                "especie",
                "tipo_sangre",
                "tipo_sangre",
                "urgencia",
                "localidad",
                "localidad",
                "busqueda",
                "estado"
            ]
        );
    }

    #[test]
    fn encode_empty_state_is_empty() {
        assert!(encode(&FilterState::default()).is_empty());
    }

    #[test]
    fn encode_omits_blank_text_and_default_status() {
        let state = FilterState::default()
            .set_free_text("   ")
            .set_status_tab(RequestStatus::Active);
        assert!(encode(&state).is_empty());
    }

    #[test]
    fn query_string_escapes_values() {
        let state = FilterState::default()
            .toggle(BloodType::Dea11Positive)
            .set_free_text("Clínica & Co");

        assert_eq!(
            encode(&state).to_query_string(),
            "tipo_sangre=DEA+1.1%2B&busqueda=Cl%C3%ADnica+%26+Co"
        );
    }

    #[test]
    fn decode_reverses_encode() {
        let state = full_state();
        let query = encode(&state).to_query_string();

        assert_eq!(decode(&QueryParams::parse(&query)), state);
    }

    #[test]
    fn decode_drops_unknown_values_and_params() {
        let params = QueryParams::parse(
            "?especie=hamster&especie=Perro&urgencia=extreme&urgencia=high&localidad=gotham&page=2",
        );

        let state = decode(&params);

        assert_eq!(state.species(), &[Species::Canine]);
        assert_eq!(state.urgencies(), &[Urgency::High]);
        assert!(state.localities().is_empty());
    }

    #[test]
    fn decode_drops_blood_types_outside_species_domain() {
        let params = QueryParams::parse("especie=feline&tipo_sangre=DEA+1.1%2B&tipo_sangre=AB");

        let state = decode(&params);

        assert_eq!(state.blood_types(), &[BloodType::Ab]);
        assert!(state.is_consistent());
    }

    #[test]
    fn decode_keeps_blood_types_without_species() {
        let params = QueryParams::parse("tipo_sangre=A&tipo_sangre=DEA+7");
        assert_eq!(
            decode(&params).blood_types(),
            &[BloodType::A, BloodType::Dea7]
        );
    }

    #[test]
    fn decode_collapses_duplicates_and_single_values() {
        let params = QueryParams::parse(
            "urgencia=high&urgencia=high&busqueda=luna&busqueda=sol&estado=bogus",
        );

        let state = decode(&params);

        assert_eq!(state.urgencies(), &[Urgency::High]);
        assert_eq!(state.free_text(), "luna");
        assert_eq!(state.status_tab(), RequestStatus::Active);
    }

    #[test]
    fn decode_garbage_is_empty_state() {
        let params = QueryParams::parse("%%%&==&especie");
        assert!(decode(&params).is_clear());
    }
}
