//! The request feed collaborator and last-request-wins bookkeeping.
//!
//! Every settled filter change issues a new fetch. Fetches may overlap, and
//! an older one may finish after a newer one, so each fetch carries a
//! generation number and [`FeedTracker`] only applies the result of the most
//! recent generation. Anything older is discarded on arrival.
//!
//! Failed fetches are reported, never retried here.

use serde::Serialize;

use crate::{
    domain::{DonationRequest, RequestStatus},
    filter::{Facet, FilterState},
};

/// Filters in the request service's own serialization.
///
/// Multi-valued facets are comma-joined; species use the service's labels
/// (`Perro`, `Gato`). Empty facets are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedQuery {
    /// Comma-joined species labels.
    pub species: Option<String>,
    /// Comma-joined blood-type labels.
    pub blood_types: Option<String>,
    /// Comma-joined urgency codes.
    pub urgencies: Option<String>,
    /// Comma-joined locality codes.
    pub localities: Option<String>,
    /// Trimmed free-text term, if not blank.
    pub search: Option<String>,
    /// Status tab to list.
    pub status: RequestStatus,
}

impl FeedQuery {
    /// Builds the service query for a filter state.
    #[must_use]
    pub fn from_state(state: &FilterState) -> Self {
        let search = state.free_text().trim();
        Self {
            species: join(state.species().iter().map(|s| s.external_label())),
            blood_types: join(state.blood_types().iter().map(|b| b.label())),
            urgencies: join(state.urgencies().iter().map(|u| u.code())),
            localities: join(state.localities().iter().map(|l| l.code())),
            search: (!search.is_empty()).then(|| search.to_string()),
            status: state.status_tab(),
        }
    }

    /// The query as `(parameter, value)` pairs, omitting empty facets.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let facets = [
            (Facet::Species, &self.species),
            (Facet::BloodType, &self.blood_types),
            (Facet::Urgency, &self.urgencies),
            (Facet::Locality, &self.localities),
            (Facet::FreeText, &self.search),
        ];
        for (facet, value) in facets {
            if let Some(value) = value {
                pairs.push((facet.param(), value.clone()));
            }
        }
        pairs.push((Facet::Status.param(), self.status.code().to_string()));
        pairs
    }
}

fn join<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let joined = values.collect::<Vec<_>>().join(",");
    (!joined.is_empty()).then_some(joined)
}

/// Errors reported by a [`FeedSupplier`].
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The service could not be reached or answered with a server error.
    #[error("Request feed unavailable: {0}")]
    Unavailable(String),

    /// The service did not answer in time.
    #[error("Request feed timed out")]
    Timeout,

    /// The service answered with data that could not be read.
    #[error("Malformed request feed: {0}")]
    Malformed(String),
}

impl FeedError {
    /// Whether issuing the same fetch again may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout)
    }
}

/// The collaborator that lists donation requests.
pub trait FeedSupplier {
    /// Lists requests matching `query`.
    ///
    /// # Errors
    ///
    /// Returns a [`FeedError`] when the service cannot produce a listing.
    fn list_active(&self, query: &FeedQuery) -> Result<Vec<DonationRequest>, FeedError>;
}

/// A fetch that has been issued and not yet completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: FeedQuery,
}

impl FetchTicket {
    /// The generation this fetch belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The query to send.
    #[must_use]
    pub const fn query(&self) -> &FeedQuery {
        &self.query
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The result was the latest and is now visible.
    Applied {
        /// Number of requests received.
        count: usize,
    },
    /// A newer fetch has been issued; the result was discarded.
    Stale {
        /// Generation of the discarded fetch.
        generation: u64,
        /// Latest issued generation.
        latest: u64,
    },
    /// The latest fetch failed. Visible requests are left as they were.
    Failed {
        /// Whether the caller may retry.
        retryable: bool,
    },
}

/// Tracks fetch generations and holds the visible listing.
#[derive(Debug, Default)]
pub struct FeedTracker {
    latest: u64,
    settled: u64,
    requests: Vec<DonationRequest>,
    error: Option<FeedError>,
}

impl FeedTracker {
    /// Creates a tracker with an empty listing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new fetch, superseding every earlier one.
    pub fn begin(&mut self, query: FeedQuery) -> FetchTicket {
        self.latest += 1;
        tracing::debug!(generation = self.latest, "feed fetch issued");
        FetchTicket {
            generation: self.latest,
            query,
        }
    }

    /// Records the result of a fetch.
    ///
    /// Only the latest generation touches the visible listing.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<DonationRequest>, FeedError>,
    ) -> FeedOutcome {
        if ticket.generation != self.latest {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.latest,
                "stale feed result discarded"
            );
            return FeedOutcome::Stale {
                generation: ticket.generation,
                latest: self.latest,
            };
        }
        self.settled = ticket.generation;
        match result {
            Ok(requests) => {
                let count = requests.len();
                self.requests = requests;
                self.error = None;
                tracing::debug!(generation = ticket.generation, count, "feed result applied");
                FeedOutcome::Applied { count }
            }
            Err(error) => {
                let retryable = error.is_retryable();
                tracing::warn!(generation = ticket.generation, %error, "feed fetch failed");
                self.error = Some(error);
                FeedOutcome::Failed { retryable }
            }
        }
    }

    /// Issues a fetch and completes it synchronously against `supplier`.
    pub fn fetch(&mut self, supplier: &impl FeedSupplier, query: FeedQuery) -> FeedOutcome {
        let ticket = self.begin(query);
        let result = supplier.list_active(ticket.query());
        self.complete(ticket, result)
    }

    /// The visible listing.
    #[must_use]
    pub fn requests(&self) -> &[DonationRequest] {
        &self.requests
    }

    /// The error of the latest completed fetch, if it failed.
    #[must_use]
    pub const fn error(&self) -> Option<&FeedError> {
        self.error.as_ref()
    }

    /// Whether the latest issued fetch has not completed yet.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.settled != self.latest
    }

    /// The latest issued generation (0 before the first fetch).
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.latest
    }
}
