use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use petdonor_core::{
    DonationRequest, DonorCandidate, Eligibility as Verdict, Pet, select_donors,
};
use serde::Serialize;
use tracing::instrument;

use super::{
    OutputFormat,
    fixtures::{JsonFeed, JsonRegistry},
    load_config, print_json, print_table,
    terminal::Colorize,
};

/// Command arguments for `petdonor eligibility`.
#[derive(Debug, Parser)]
pub struct Eligibility {
    /// JSON file holding the pet registry.
    #[arg(long, value_name = "FILE")]
    pets: PathBuf,

    /// Only consider pets of this owner.
    #[arg(long, value_name = "ID")]
    owner: Option<String>,

    /// JSON file holding the request feed.
    #[arg(long, value_name = "FILE", requires = "request")]
    request_file: Option<PathBuf>,

    /// Classify against this request, ranking the owner's pets as donors.
    #[arg(long, value_name = "ID", requires_all = ["request_file", "owner"])]
    request: Option<String>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    pet: &'a Pet,
    eligibility: &'a Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    compatible: Option<bool>,
}

impl Eligibility {
    #[instrument(skip(self), fields(pets = %self.pets.display()))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config = load_config(root)?;
        let registry = JsonRegistry::load(&self.pets)?;
        let now = Utc::now();

        if let (Some(request_id), Some(request_file), Some(owner)) =
            (&self.request, &self.request_file, &self.owner)
        {
            let request = find_request(&JsonFeed::new(request_file), request_id)?;
            let candidates =
                select_donors(&registry, owner, &request, &config.eligibility, now)
                    .context("failed to list pets")?;
            return self.render_candidates(&request, &candidates);
        }

        let pets: Vec<&Pet> = registry
            .pets()
            .iter()
            .filter(|pet| self.owner.as_ref().is_none_or(|owner| pet.owner_id == *owner))
            .collect();
        let verdicts: Vec<Verdict> = pets
            .iter()
            .map(|pet| config.eligibility.classify(pet, now))
            .collect();
        let rows: Vec<Row<'_>> = pets
            .iter()
            .zip(&verdicts)
            .map(|(pet, eligibility)| Row {
                pet,
                eligibility,
                compatible: None,
            })
            .collect();
        self.render(&rows)
    }

    fn render_candidates(
        &self,
        request: &DonationRequest,
        candidates: &[DonorCandidate],
    ) -> anyhow::Result<()> {
        if self.output == OutputFormat::Table {
            println!(
                "{} {} ({}, {})",
                "Request:".dim(),
                request.id,
                request.pet_name,
                request.required_blood_type.as_deref().unwrap_or("any blood type")
            );
            println!();
        }
        let rows: Vec<Row<'_>> = candidates
            .iter()
            .map(|candidate| Row {
                pet: &candidate.pet,
                eligibility: &candidate.eligibility,
                compatible: Some(candidate.compatible),
            })
            .collect();
        self.render(&rows)
    }

    fn render(&self, rows: &[Row<'_>]) -> anyhow::Result<()> {
        match self.output {
            OutputFormat::Json => print_json(rows),
            OutputFormat::Table => {
                if rows.is_empty() {
                    println!("{}", "No pets found.".warning());
                    return Ok(());
                }
                let with_compat = rows.iter().any(|row| row.compatible.is_some());
                let mut headers = vec!["ID", "NAME", "SPECIES", "BLOOD TYPE"];
                if with_compat {
                    headers.push("COMPATIBLE");
                }
                headers.push("VERDICT");

                let data = rows
                    .iter()
                    .map(|row| {
                        let mut cells = vec![
                            row.pet.id.clone(),
                            row.pet.name.clone(),
                            row.pet.species.external_label().to_string(),
                            row.pet.blood_type.clone(),
                        ];
                        if let Some(compatible) = row.compatible {
                            cells.push(if compatible { "yes" } else { "no" }.to_string());
                        }
                        cells.push(verdict(row.eligibility));
                        cells
                    })
                    .collect::<Vec<_>>();
                print_table(&headers, &data);
                Ok(())
            }
        }
    }
}

fn verdict(eligibility: &Verdict) -> String {
    if eligibility.is_eligible() {
        "eligible".success()
    } else {
        let reasons = eligibility
            .reasons()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        format!("{} ({reasons})", "ineligible".warning())
    }
}

fn find_request(feed: &JsonFeed, id: &str) -> anyhow::Result<DonationRequest> {
    feed.load_all()?
        .into_iter()
        .find(|request| request.id == id)
        .with_context(|| format!("no request with id '{id}'"))
}
