//! A search screen's worth of state: filters, the address bar and the feed.
//!
//! [`SearchSession`] wires the pieces together. Facet edits settle at once;
//! free text settles once the debouncer commits it. Each settled change
//! replaces the query string (if it changed) and hands back a
//! [`FetchTicket`] for the caller to run against its [`FeedSupplier`].
//!
//! [`FeedSupplier`]: crate::feed::FeedSupplier

use std::time::{Duration, Instant};

use crate::{
    codec::{QueryParams, decode, encode},
    debounce::{Clock, Debouncer, SystemClock},
    domain::{Config, DonationRequest, RequestStatus, Species},
    feed::{FeedError, FeedOutcome, FeedQuery, FeedTracker, FetchTicket},
    filter::{FacetValue, FilterState},
    predicate::compile,
};

/// Where the encoded filter state is published.
pub trait Navigator {
    /// Replaces the current query string without adding a history entry.
    fn replace_query(&mut self, query: &str);
}

/// Filter state, debounced text, address bar and feed for one search view.
#[derive(Debug)]
pub struct SearchSession<N, C = SystemClock> {
    state: FilterState,
    text: Debouncer<String, C>,
    navigator: N,
    feed: FeedTracker,
    published: String,
}

impl<N: Navigator, C: Clock> SearchSession<N, C> {
    /// Creates a session with an empty filter and the given text window.
    pub fn new(navigator: N, clock: C, window: Duration) -> Self {
        Self {
            state: FilterState::default(),
            text: Debouncer::new(clock, window),
            navigator,
            feed: FeedTracker::new(),
            published: String::new(),
        }
    }

    /// Creates a session using the configured debounce window.
    pub fn from_config(navigator: N, clock: C, config: &Config) -> Self {
        Self::new(navigator, clock, config.debounce_window())
    }

    /// Loads the filter encoded in `query`, discarding pending text.
    ///
    /// The address bar is rewritten in canonical form if the incoming query
    /// was not. Always issues a fetch, since the feed may be empty.
    pub fn restore(&mut self, query: &str) -> FetchTicket {
        self.text.cancel();
        self.state = decode(&QueryParams::parse(query));
        self.published = query.strip_prefix('?').unwrap_or(query).to_string();
        tracing::debug!(query, "filter restored");
        self.publish();
        self.feed.begin(FeedQuery::from_state(&self.state))
    }

    /// Toggles a facet value.
    pub fn toggle(&mut self, value: impl Into<FacetValue>) -> Option<FetchTicket> {
        let next = self.state.toggle(value);
        self.settle(next)
    }

    /// Replaces the species selection.
    pub fn set_species(
        &mut self,
        species: impl IntoIterator<Item = Species>,
    ) -> Option<FetchTicket> {
        let next = self.state.set_species(species);
        self.settle(next)
    }

    /// Selects a status tab.
    pub fn set_status_tab(&mut self, status: RequestStatus) -> Option<FetchTicket> {
        let next = self.state.set_status_tab(status);
        self.settle(next)
    }

    /// Clears every filter, including text still being debounced.
    pub fn clear(&mut self) -> Option<FetchTicket> {
        self.text.cancel();
        let next = self.state.clear();
        self.settle(next)
    }

    /// Records a keystroke in the free-text box.
    pub fn on_text_input(&mut self, text: impl Into<String>) {
        self.text.input(text.into());
    }

    /// Commits debounced text whose window has elapsed.
    ///
    /// Every committed value settles in order; the ticket of the last one
    /// that changed the state is returned.
    pub fn tick(&mut self) -> Option<FetchTicket> {
        let mut ticket = None;
        while let Some(text) = self.text.poll() {
            let next = self.state.set_free_text(text);
            ticket = self.settle(next).or(ticket);
        }
        ticket
    }

    /// When [`SearchSession::tick`] should next be called, if text is pending.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.text.next_deadline()
    }

    /// Issues a fetch for the current filter, e.g. after a failure.
    pub fn refresh(&mut self) -> FetchTicket {
        self.feed.begin(FeedQuery::from_state(&self.state))
    }

    /// Records the result of a fetch.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<DonationRequest>, FeedError>,
    ) -> FeedOutcome {
        self.feed.complete(ticket, result)
    }

    /// Stops the session. Pending text is dropped and never committed.
    pub fn teardown(&mut self) {
        self.text.teardown();
        tracing::debug!("search session torn down");
    }

    /// The settled filter state.
    #[must_use]
    pub const fn state(&self) -> &FilterState {
        &self.state
    }

    /// Text typed but not yet committed.
    #[must_use]
    pub fn pending_text(&self) -> Option<&str> {
        self.text.pending().map(String::as_str)
    }

    /// The feed bookkeeping.
    #[must_use]
    pub const fn feed(&self) -> &FeedTracker {
        &self.feed
    }

    /// The visible listing, narrowed by the settled filter.
    #[must_use]
    pub fn results(&self) -> Vec<&DonationRequest> {
        compile(&self.state).filter(self.feed.requests()).collect()
    }

    /// The navigator.
    #[must_use]
    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    fn settle(&mut self, next: FilterState) -> Option<FetchTicket> {
        if next == self.state {
            return None;
        }
        self.state = next;
        self.publish();
        Some(self.feed.begin(FeedQuery::from_state(&self.state)))
    }

    fn publish(&mut self) {
        let query = encode(&self.state).to_query_string();
        if query != self.published {
            tracing::trace!(%query, "query string replaced");
            self.navigator.replace_query(&query);
            self.published = query;
        }
    }
}
