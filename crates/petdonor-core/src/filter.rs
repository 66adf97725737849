//! Filter state for the public request feed.
//!
//! [`FilterState`] is an immutable value: every operation returns a new
//! state. Facets are multi-select; values inside a facet are OR-ed, facets
//! are AND-ed (see [`crate::predicate`]). Selections keep the order in which
//! values were chosen and never hold duplicates.
//!
//! One invariant ties two facets together: while any species is selected,
//! the selected blood types all belong to one of those species. Changing the
//! species selection narrows the blood-type selection in the same step.

use std::fmt;

use crate::domain::{BloodType, Locality, RequestStatus, Species, Urgency};

/// A filterable dimension of the request feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// Recipient species. Multi-select.
    Species,
    /// Required blood type. Multi-select, limited by the species selection.
    BloodType,
    /// Request urgency. Multi-select.
    Urgency,
    /// Clinic locality. Multi-select.
    Locality,
    /// Free-text query. Single value.
    FreeText,
    /// Status tab. Single value.
    Status,
}

impl Facet {
    /// Every facet, in the order they are encoded.
    pub const ALL: [Self; 6] = [
        Self::Species,
        Self::BloodType,
        Self::Urgency,
        Self::Locality,
        Self::FreeText,
        Self::Status,
    ];

    /// Name of the query-string parameter carrying this facet.
    #[must_use]
    pub const fn param(self) -> &'static str {
        match self {
            Self::Species => "especie",
            Self::BloodType => "tipo_sangre",
            Self::Urgency => "urgencia",
            Self::Locality => "localidad",
            Self::FreeText => "busqueda",
            Self::Status => "estado",
        }
    }

    /// Looks a facet up by its query-string parameter name.
    #[must_use]
    pub fn from_param(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|facet| facet.param() == name)
    }

    /// Whether the facet may carry several values.
    #[must_use]
    pub const fn is_repeatable(self) -> bool {
        !matches!(self, Self::FreeText | Self::Status)
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

/// A single selectable value of a multi-select facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum FacetValue {
    Species(Species),
    BloodType(BloodType),
    Urgency(Urgency),
    Locality(Locality),
}

impl FacetValue {
    /// The facet this value belongs to.
    #[must_use]
    pub const fn facet(self) -> Facet {
        match self {
            Self::Species(_) => Facet::Species,
            Self::BloodType(_) => Facet::BloodType,
            Self::Urgency(_) => Facet::Urgency,
            Self::Locality(_) => Facet::Locality,
        }
    }
}

impl From<Species> for FacetValue {
    fn from(value: Species) -> Self {
        Self::Species(value)
    }
}

impl From<BloodType> for FacetValue {
    fn from(value: BloodType) -> Self {
        Self::BloodType(value)
    }
}

impl From<Urgency> for FacetValue {
    fn from(value: Urgency) -> Self {
        Self::Urgency(value)
    }
}

impl From<Locality> for FacetValue {
    fn from(value: Locality) -> Self {
        Self::Locality(value)
    }
}

/// The user's current facet selections and free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    species: Vec<Species>,
    blood_types: Vec<BloodType>,
    urgencies: Vec<Urgency>,
    localities: Vec<Locality>,
    free_text: String,
    status_tab: RequestStatus,
}

/// Accessors.
impl FilterState {
    /// Selected species, in selection order.
    #[must_use]
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Selected blood types, in selection order.
    #[must_use]
    pub fn blood_types(&self) -> &[BloodType] {
        &self.blood_types
    }

    /// Selected urgencies, in selection order.
    #[must_use]
    pub fn urgencies(&self) -> &[Urgency] {
        &self.urgencies
    }

    /// Selected localities, in selection order.
    #[must_use]
    pub fn localities(&self) -> &[Locality] {
        &self.localities
    }

    /// The free-text query, verbatim.
    #[must_use]
    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    /// The selected status tab.
    #[must_use]
    pub const fn status_tab(&self) -> RequestStatus {
        self.status_tab
    }

    /// Whether `value` is currently selected.
    #[must_use]
    pub fn is_selected(&self, value: impl Into<FacetValue>) -> bool {
        match value.into() {
            FacetValue::Species(v) => self.species.contains(&v),
            FacetValue::BloodType(v) => self.blood_types.contains(&v),
            FacetValue::Urgency(v) => self.urgencies.contains(&v),
            FacetValue::Locality(v) => self.localities.contains(&v),
        }
    }

    /// Blood types that may currently be selected.
    pub fn blood_type_domain(&self) -> impl Iterator<Item = BloodType> + '_ {
        BloodType::ALL
            .into_iter()
            .filter(|blood_type| blood_type.in_domain(&self.species))
    }

    /// Whether the state holds no selection at all.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the blood-type selection lies inside the species domain.
    ///
    /// Every state built through the public operations satisfies this.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.blood_types
            .iter()
            .all(|blood_type| blood_type.in_domain(&self.species))
    }
}

/// Transitions.
impl FilterState {
    /// Adds `value` to its facet if absent, removes it if present.
    ///
    /// Toggling a species re-applies the species invariant (see
    /// [`FilterState::set_species`]). Adding a blood type outside the current
    /// species domain leaves the state unchanged.
    #[must_use]
    pub fn toggle(&self, value: impl Into<FacetValue>) -> Self {
        match value.into() {
            FacetValue::Species(species) => self.set_species(toggled(&self.species, species)),
            FacetValue::BloodType(blood_type) => {
                if !self.blood_types.contains(&blood_type) && !blood_type.in_domain(&self.species)
                {
                    tracing::debug!(%blood_type, "blood type outside species domain, ignored");
                    return self.clone();
                }
                Self {
                    blood_types: toggled(&self.blood_types, blood_type),
                    ..self.clone()
                }
            }
            FacetValue::Urgency(urgency) => Self {
                urgencies: toggled(&self.urgencies, urgency),
                ..self.clone()
            },
            FacetValue::Locality(locality) => Self {
                localities: toggled(&self.localities, locality),
                ..self.clone()
            },
        }
    }

    /// Adds `value` to its facet unless it is already selected.
    ///
    /// Same domain rules as [`FilterState::toggle`].
    #[must_use]
    pub fn select(&self, value: impl Into<FacetValue>) -> Self {
        let value = value.into();
        if self.is_selected(value) {
            self.clone()
        } else {
            self.toggle(value)
        }
    }

    /// Replaces the free-text query verbatim.
    #[must_use]
    pub fn set_free_text(&self, text: impl Into<String>) -> Self {
        Self {
            free_text: text.into(),
            ..self.clone()
        }
    }

    /// Replaces the species selection.
    ///
    /// Duplicates are dropped. With at least one species selected, blood
    /// types outside the new domain are deselected. An empty selection means
    /// every species, so the blood-type selection is kept as is.
    #[must_use]
    pub fn set_species(&self, values: impl IntoIterator<Item = Species>) -> Self {
        let species = dedup(values);
        let blood_types = if species.is_empty() {
            self.blood_types.clone()
        } else {
            self.blood_types
                .iter()
                .copied()
                .filter(|blood_type| blood_type.in_domain(&species))
                .collect()
        };
        if blood_types.len() != self.blood_types.len() {
            tracing::debug!(
                dropped = self.blood_types.len() - blood_types.len(),
                "species change narrowed blood types"
            );
        }
        Self {
            species,
            blood_types,
            ..self.clone()
        }
    }

    /// Selects a status tab.
    #[must_use]
    pub fn set_status_tab(&self, status: RequestStatus) -> Self {
        Self {
            status_tab: status,
            ..self.clone()
        }
    }

    /// Returns the empty state.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self::default()
    }
}

fn toggled<T: Copy + PartialEq>(values: &[T], value: T) -> Vec<T> {
    if values.contains(&value) {
        values.iter().copied().filter(|v| *v != value).collect()
    } else {
        values.iter().copied().chain(std::iter::once(value)).collect()
    }
}

fn dedup<T: Copy + PartialEq>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_symmetric_difference() {
        let state = FilterState::default().toggle(Urgency::High);
        assert_eq!(state.urgencies(), &[Urgency::High]);

        let state = state.toggle(Urgency::Medium).toggle(Urgency::High);
        assert_eq!(state.urgencies(), &[Urgency::Medium]);
    }

    #[test]
    fn toggle_keeps_selection_order() {
        let state = FilterState::default()
            .toggle(Locality::Suba)
            .toggle(Locality::Bosa)
            .toggle(Locality::Chapinero);

        assert_eq!(
            state.localities(),
            &[Locality::Suba, Locality::Bosa, Locality::Chapinero]
        );
    }

    #[test]
    fn transitions_do_not_mutate_the_original() {
        let original = FilterState::default().toggle(Species::Canine);
        let _ = original.toggle(Species::Feline).set_free_text("luna");

        assert_eq!(original.species(), &[Species::Canine]);
        assert_eq!(original.free_text(), "");
    }

    #[test]
    fn set_species_narrows_blood_types() {
        let state = FilterState::default()
            .toggle(BloodType::Dea11Positive)
            .toggle(BloodType::A)
            .set_species([Species::Feline]);

        assert_eq!(state.blood_types(), &[BloodType::A]);
        assert!(state.is_consistent());
    }

    #[test]
    fn clearing_species_keeps_blood_types() {
        let state = FilterState::default()
            .set_species([Species::Canine])
            .toggle(BloodType::Dea4)
            .set_species([]);

        assert!(state.species().is_empty());
        assert_eq!(state.blood_types(), &[BloodType::Dea4]);
    }

    #[test]
    fn toggling_species_off_narrows_to_remaining_species() {
        let state = FilterState::default()
            .toggle(Species::Canine)
            .toggle(Species::Feline)
            .toggle(BloodType::Dea7)
            .toggle(BloodType::B)
            .toggle(Species::Canine);

        assert_eq!(state.species(), &[Species::Feline]);
        assert_eq!(state.blood_types(), &[BloodType::B]);
    }

    #[test]
    fn blood_type_outside_domain_is_ignored() {
        let state = FilterState::default().toggle(Species::Feline);

        assert_eq!(state.toggle(BloodType::Dea11Negative), state);
    }

    #[test]
    fn set_species_drops_duplicates() {
        let state =
            FilterState::default().set_species([Species::Canine, Species::Canine, Species::Feline]);
        assert_eq!(state.species(), &[Species::Canine, Species::Feline]);
    }

    #[test]
    fn select_is_idempotent() {
        let once = FilterState::default().select(Urgency::High);
        assert_eq!(once.select(Urgency::High), once);
    }

    #[test]
    fn free_text_is_verbatim() {
        let state = FilterState::default().set_free_text("  Rocky ");
        assert_eq!(state.free_text(), "  Rocky ");
    }

    #[test]
    fn clear_is_idempotent() {
        let state = FilterState::default()
            .toggle(Species::Canine)
            .toggle(BloodType::Dea4)
            .set_free_text("norte")
            .set_status_tab(RequestStatus::Pending);

        let cleared = state.clear();

        assert!(cleared.is_clear());
        assert_eq!(cleared.clear(), cleared);
    }

    #[test]
    fn blood_type_domain_follows_species() {
        let all: Vec<_> = FilterState::default().blood_type_domain().collect();
        assert_eq!(all, BloodType::ALL.to_vec());

        let feline = FilterState::default().toggle(Species::Feline);
        let domain: Vec<_> = feline.blood_type_domain().collect();
        assert_eq!(domain, vec![BloodType::A, BloodType::B, BloodType::Ab]);
    }

    #[test]
    fn facet_params_round_trip() {
        for facet in Facet::ALL {
            assert_eq!(Facet::from_param(facet.param()), Some(facet));
        }
        assert_eq!(Facet::from_param("page"), None);
    }
}
