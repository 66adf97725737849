use std::path::{Path, PathBuf};

mod compat;
mod config;
mod eligibility;
mod fixtures;
mod search;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use compat::Compat;
use config::Config;
use eligibility::Eligibility;
use search::Search;

/// Location of the configuration file, relative to the root.
const CONFIG_PATH: &str = ".petdonor/config.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding `.petdonor/config.toml`
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run(&self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List active donation requests matching a filter
    ///
    /// Filters may come from a query string, from flags, or both; flags are
    /// added to whatever the query string selects.
    Search(Search),

    /// Classify pets as blood donors
    Eligibility(Eligibility),

    /// Check whether a donor blood type can give to a recipient
    Compat(Compat),

    /// Show or initialize configuration
    Config(Config),
}

impl Command {
    fn run(self, root: &Path) -> anyhow::Result<()> {
        match self {
            Self::Search(command) => command.run(root)?,
            Self::Eligibility(command) => command.run(root)?,
            Self::Compat(command) => command.run()?,
            Self::Config(command) => command.run(root)?,
        }
        Ok(())
    }
}

/// Output formats shared by the listing commands.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Loads the configuration under `root`, falling back to the defaults.
fn load_config(root: &Path) -> anyhow::Result<petdonor_core::Config> {
    let path = root.join(CONFIG_PATH);
    petdonor_core::Config::load_or_default(&path)
        .with_context(|| format!("failed to load {}", path.display()))
}

/// Prints left-aligned columns under a dashed header rule.
fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect::<Vec<_>>();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();
    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in rows {
        for (value, width) in row.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!();
    }
}

/// Renders a value as pretty JSON on stdout.
fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), value)
        .context("failed to render json output")?;
    println!();
    Ok(())
}
