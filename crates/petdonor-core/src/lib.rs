//! Faceted search and donor matching for pet blood donation.
//!
//! Veterinary clinics publish urgent blood-donation requests; pet owners
//! browse them and offer their pets as donors. This crate holds the parts of
//! that flow with real rules in them:
//!
//! - a filter state over the public request feed, its query-string encoding,
//!   a debounced free-text pipeline and the predicate that filters the feed,
//! - the donor eligibility classifier and the per-species blood-type
//!   compatibility matcher.
//!
//! Everything else (forms, HTTP clients, rendering) is a collaborator and is
//! reached through the traits in [`feed`], [`donor`] and [`session`].

pub mod domain;
pub use domain::{
    BloodType, Config, ConfigError, DonationRequest, Locality, Pet, RequestStatus, Species,
    Urgency,
};

/// Query-string encoding of a filter state.
pub mod codec;
pub use codec::{QueryParams, decode, encode};

pub mod filter;
pub use filter::{Facet, FacetValue, FilterState};

pub mod debounce;
pub use debounce::{Clock, Debouncer, ManualClock, SystemClock, Timer};

/// Compiles a filter state into a request predicate.
pub mod predicate;
pub use predicate::{RequestPredicate, compile};

pub mod eligibility;
pub use eligibility::{Eligibility, EligibilityRules, IneligibilityReason};

pub mod compatibility;
pub use compatibility::is_compatible;

pub mod feed;
pub use feed::{FeedError, FeedOutcome, FeedQuery, FeedSupplier, FeedTracker, FetchTicket};

/// Donor selection against a pet registry.
pub mod donor;
pub use donor::{DonorCandidate, PetRegistry, RegistryError, select_donors};

pub mod session;
pub use session::{Navigator, SearchSession};
