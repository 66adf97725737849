use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use clap::Parser;
use petdonor_core::{
    BloodType, DonationRequest, FeedOutcome, FeedQuery, FeedTracker, FilterState, Locality,
    QueryParams, Species, Urgency, compile, decode, encode,
};
use serde::Serialize;
use tracing::instrument;

use super::{
    OutputFormat,
    fixtures::JsonFeed,
    load_config, print_json, print_table,
    terminal::{self, Colorize},
};

/// Command arguments for `petdonor search`.
#[derive(Debug, Parser)]
pub struct Search {
    /// JSON file holding the request feed.
    #[arg(long, value_name = "FILE")]
    requests: PathBuf,

    /// Query string to start from, e.g. `especie=canine&urgencia=high`.
    #[arg(long, value_name = "QS")]
    query: Option<String>,

    /// Species to include (comma-separated; `perro`, `gato` and friends work).
    #[arg(long, value_delimiter = ',')]
    species: Vec<Species>,

    /// Blood types to include (comma-separated labels, e.g. `DEA 4,AB`).
    #[arg(long = "blood-type", value_delimiter = ',')]
    blood_type: Vec<BloodType>,

    /// Urgencies to include (comma-separated).
    #[arg(long, value_delimiter = ',')]
    urgency: Vec<Urgency>,

    /// Localities to include (comma-separated codes or names).
    #[arg(long, value_delimiter = ',')]
    locality: Vec<Locality>,

    /// Free-text search over names, clinic, address and labels.
    #[arg(long)]
    text: Option<String>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Limit number of rows returned (default: from config).
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchOutput<'a> {
    query: String,
    total: usize,
    requests: Vec<&'a DonationRequest>,
}

impl Search {
    #[instrument(skip(self), fields(requests = %self.requests.display()))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config = load_config(root)?;
        let state = self.filter_state();
        let limit = self.limit.unwrap_or_else(|| config.result_limit());

        let feed = JsonFeed::new(&self.requests);
        let mut tracker = FeedTracker::new();
        if let FeedOutcome::Failed { retryable } =
            tracker.fetch(&feed, FeedQuery::from_state(&state))
        {
            let error = tracker
                .error()
                .map_or_else(|| "unknown error".to_string(), ToString::to_string);
            let hint = if retryable { " (retryable)" } else { "" };
            anyhow::bail!("{error}{hint}");
        }
        tracing::info!(count = tracker.requests().len(), "feed loaded");

        let mut matches = matching(&state, tracker.requests());
        let total = matches.len();
        matches.truncate(limit);
        let query = encode(&state).to_query_string();

        match self.output {
            OutputFormat::Table => {
                let shown = if query.is_empty() { "(none)" } else { query.as_str() };
                println!("{} {}", "Filter:".dim(), shown);
                println!();
                if matches.is_empty() {
                    println!("{}", "No matching requests.".warning());
                } else {
                    render_table(&matches);
                    if total > matches.len() {
                        println!();
                        println!(
                            "{}",
                            format!("Showing {} of {total} requests.", matches.len()).dim()
                        );
                    }
                }
            }
            OutputFormat::Json => print_json(&SearchOutput {
                query,
                total,
                requests: matches,
            })?,
        }
        Ok(())
    }

    /// The query string's filter with the flag selections added on top.
    fn filter_state(&self) -> FilterState {
        let mut state = self
            .query
            .as_deref()
            .map(|query| decode(&QueryParams::parse(query)))
            .unwrap_or_default();

        if !self.species.is_empty() {
            let species = state.species().iter().chain(&self.species).copied().collect::<Vec<_>>();
            state = state.set_species(species);
        }
        for &blood_type in &self.blood_type {
            if !blood_type.in_domain(state.species()) {
                tracing::warn!(
                    %blood_type,
                    "blood type does not belong to the selected species, ignored"
                );
            }
            state = state.select(blood_type);
        }
        for &urgency in &self.urgency {
            state = state.select(urgency);
        }
        for &locality in &self.locality {
            state = state.select(locality);
        }
        if let Some(text) = &self.text {
            state = state.set_free_text(text.as_str());
        }
        state
    }
}

/// Requests passing the filter, most urgent first, then newest first.
fn matching<'a>(state: &FilterState, requests: &'a [DonationRequest]) -> Vec<&'a DonationRequest> {
    let mut matches: Vec<_> = compile(state).filter(requests).collect();
    matches.sort_by(|a, b| by_priority(a, b));
    matches
}

fn by_priority(a: &DonationRequest, b: &DonationRequest) -> Ordering {
    a.urgency
        .cmp(&b.urgency)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn render_table(requests: &[&DonationRequest]) {
    let narrow = terminal::is_narrow();
    let mut headers = vec!["ID", "PET", "SPECIES", "BLOOD TYPE"];
    if !narrow {
        headers.extend(["CLINIC", "LOCALITY", "CREATED"]);
    }
    headers.push("URGENCY");

    let rows = requests
        .iter()
        .map(|request| {
            let mut row = vec![
                request.id.clone(),
                request.pet_name.clone(),
                request.species.external_label().to_string(),
                request.required_blood_type.clone().unwrap_or_default(),
            ];
            if !narrow {
                row.extend([
                    request.clinic_name.clone(),
                    request.locality.label().to_string(),
                    request.created_at.format("%Y-%m-%d %H:%M").to_string(),
                ]);
            }
            row.push(terminal::urgency(request.urgency));
            row
        })
        .collect::<Vec<_>>();

    print_table(&headers, &rows);
}
