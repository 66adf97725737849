use crate::{
    domain::{BloodType, DonationRequest, Locality, RequestStatus, Species, Urgency},
    filter::FilterState,
};

/// A compiled filter over donation requests.
///
/// A request matches when all of the following hold:
///
/// - for every facet, the selection is empty or contains the request's value;
/// - the free-text term is blank, or occurs case-insensitively in at least
///   one projected field (see [`RequestPredicate::projected_fields`]);
/// - the request is [`RequestStatus::Active`]. This part is not controlled by
///   the filter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPredicate {
    species: Vec<Species>,
    blood_types: Vec<BloodType>,
    urgencies: Vec<Urgency>,
    localities: Vec<Locality>,
    /// Lowercased, trimmed term; `None` when blank.
    term: Option<String>,
}

/// Compiles a filter state into a predicate.
#[must_use]
pub fn compile(state: &FilterState) -> RequestPredicate {
    let term = state.free_text().trim();
    RequestPredicate {
        species: state.species().to_vec(),
        blood_types: state.blood_types().to_vec(),
        urgencies: state.urgencies().to_vec(),
        localities: state.localities().to_vec(),
        term: (!term.is_empty()).then(|| term.to_lowercase()),
    }
}

impl RequestPredicate {
    /// Whether `request` passes the filter.
    #[must_use]
    pub fn matches(&self, request: &DonationRequest) -> bool {
        request.status == RequestStatus::Active
            && facet(&self.species, &request.species)
            && self.matches_blood_type(request)
            && facet(&self.urgencies, &request.urgency)
            && facet(&self.localities, &request.locality)
            && self.matches_term(request)
    }

    /// Keeps the requests that pass the filter.
    pub fn filter<'p, 'r, I>(
        &'p self,
        requests: I,
    ) -> impl Iterator<Item = &'r DonationRequest> + 'p
    where
        I: IntoIterator<Item = &'r DonationRequest>,
        I::IntoIter: 'p,
        'r: 'p,
    {
        requests
            .into_iter()
            .filter(move |request| self.matches(request))
    }

    /// The fields free-text search looks at, in order: species label, blood
    /// type, address, clinic name, locality label, pet name.
    #[must_use]
    pub fn projected_fields(request: &DonationRequest) -> [&str; 6] {
        [
            request.species.external_label(),
            request.required_blood_type.as_deref().unwrap_or_default(),
            request.address.as_str(),
            request.clinic_name.as_str(),
            request.locality.label(),
            request.pet_name.as_str(),
        ]
    }

    fn matches_blood_type(&self, request: &DonationRequest) -> bool {
        if self.blood_types.is_empty() {
            return true;
        }
        request
            .blood_type()
            .is_some_and(|blood_type| self.blood_types.contains(&blood_type))
    }

    fn matches_term(&self, request: &DonationRequest) -> bool {
        let Some(term) = &self.term else {
            return true;
        };
        Self::projected_fields(request)
            .iter()
            .any(|field| field.to_lowercase().contains(term.as_str()))
    }
}

fn facet<T: PartialEq>(selected: &[T], value: &T) -> bool {
    selected.is_empty() || selected.contains(value)
}
