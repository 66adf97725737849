use std::path::Path;

use anyhow::Context;
use tracing::instrument;

use super::{CONFIG_PATH, load_config, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Config {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write the default configuration to `.petdonor/config.toml`
    Init,
}

impl Config {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        match self.command {
            ConfigCommand::Show => {
                let config = load_config(root)?;
                let path = root.join(CONFIG_PATH);
                let source = if path.exists() {
                    path.display().to_string()
                } else {
                    "defaults".to_string()
                };
                let rules = &config.eligibility;

                println!("Configuration {}:", format!("({source})").dim());
                println!("  debounce_ms: {}", config.debounce_window().as_millis());
                println!("  result_limit: {}", config.result_limit());
                println!("  eligibility:");
                println!("    min_weight_kg: {}", rules.min_weight_kg);
                println!(
                    "    age_years: {}..={}",
                    rules.min_age_years, rules.max_age_years
                );
                println!(
                    "    vaccination_window_days: {}",
                    rules.vaccination_window_days
                );
                println!("    illness_markers: {:?}", rules.illness_markers);
            }
            ConfigCommand::Init => {
                init(root)?;
                println!("Initialized {}", root.join(CONFIG_PATH).display());
            }
        }
        Ok(())
    }
}

fn init(root: &Path) -> anyhow::Result<()> {
    let path = root.join(CONFIG_PATH);
    if path.exists() {
        anyhow::bail!("Configuration already exists at {}", path.display());
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    petdonor_core::Config::default()
        .save(&path)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn init_writes_loadable_defaults() {
        let tmp = tempdir().unwrap();

        init(tmp.path()).unwrap();

        let loaded = load_config(tmp.path()).unwrap();
        assert_eq!(loaded, petdonor_core::Config::default());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let tmp = tempdir().unwrap();
        init(tmp.path()).unwrap();

        let error = init(tmp.path()).unwrap_err();
        assert!(error.to_string().starts_with("Configuration already exists"));
    }

    #[test]
    fn missing_config_loads_defaults() {
        let tmp = tempdir().unwrap();
        assert_eq!(
            load_config(tmp.path()).unwrap(),
            petdonor_core::Config::default()
        );
    }
}
