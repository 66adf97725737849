use clap::Parser;
use petdonor_core::{BloodType, Species, compatibility::donors_for, is_compatible};
use tracing::instrument;

use super::terminal::Colorize;

/// Command arguments for `petdonor compat`.
#[derive(Debug, Parser)]
pub struct Compat {
    /// Species of donor and recipient.
    #[arg(long)]
    species: Species,

    /// The donor's blood type, e.g. `DEA 1.1-`.
    donor: String,

    /// The blood type the recipient needs.
    required: String,
}

impl Compat {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let verdict = if is_compatible(&self.donor, &self.required, self.species) {
            "compatible".success()
        } else {
            "incompatible".warning()
        };
        println!(
            "{} -> {} ({}): {verdict}",
            self.donor,
            self.required,
            self.species.external_label()
        );

        if let Some(required) = BloodType::parse_for(self.species, &self.required) {
            let donors = donor_labels(required, self.species);
            println!("{} {}", "Accepted donors:".dim(), donors.join(", "));
        } else {
            println!(
                "{}",
                format!(
                    "'{}' is not a {} blood type.",
                    self.required,
                    self.species.external_label()
                )
                .dim()
            );
        }
        Ok(())
    }
}

fn donor_labels(required: BloodType, species: Species) -> Vec<&'static str> {
    donors_for(required, species)
        .into_iter()
        .map(BloodType::label)
        .collect()
}
