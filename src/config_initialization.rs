//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::{RawConfig, TomlConfigAdapter};
use crate::cli::{Cli, Commands};
use crate::domain::errors::ConfigurationWarning;
use crate::domain::model::AppConfig;

/// Build the run configuration with precedence CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(
    cli: &Cli,
) -> Result<(AppConfig, Vec<ConfigurationWarning>)> {
    initialize_with_env(cli, |key| std::env::var(key).ok())
}

/// Same as [`initialize_configuration_hierarchy`] with an injectable environment
pub fn initialize_with_env<F>(
    cli: &Cli,
    lookup: F,
) -> Result<(AppConfig, Vec<ConfigurationWarning>)>
where
    F: Fn(&str) -> Option<String>,
{
    let mut adapter = TomlConfigAdapter::discover(cli.config.as_deref())
        .context("Failed to load configuration file")?;

    let env_overrides = adapter.apply_env(lookup);
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    let cli_overrides = apply_cli_configuration_overrides(adapter.raw_mut(), cli);
    if cli_overrides > 0 {
        info!("Applied {} command-line overrides", cli_overrides);
    }

    Ok(adapter.resolve())
}

/// Apply CLI argument overrides to configuration
fn apply_cli_configuration_overrides(raw: &mut RawConfig, cli: &Cli) -> usize {
    let mut cli_overrides = 0;

    match &cli.command {
        Commands::Split(args) => {
            let export_dir = args.export_dir.as_ref().map(|d| d.display().to_string());
            cli_overrides += override_with(&mut raw.export_dir, export_dir);
            cli_overrides += override_with(&mut raw.encoder, args.encoder.clone());
            cli_overrides += override_with(&mut raw.gpu_brand, args.gpu_brand.clone());
            cli_overrides += override_with(&mut raw.crop_ratio, args.crop_ratio.clone());
            if args.parallel {
                cli_overrides += override_with(&mut raw.scheduling, Some("parallel".to_string()));
            }
            cli_overrides += override_with(&mut raw.workers, args.workers);
            if args.no_fix_seekability {
                cli_overrides += override_with(&mut raw.fix_seekability, Some(false));
            }
        }
        Commands::Plan(args) => {
            let export_dir = args.export_dir.as_ref().map(|d| d.display().to_string());
            cli_overrides += override_with(&mut raw.export_dir, export_dir);
        }
        Commands::Inspect(_) => {}
    }

    if cli.verbose {
        cli_overrides += override_with(&mut raw.verbose, Some(true));
    }
    cli_overrides
}

fn override_with<T>(slot: &mut Option<T>, value: Option<T>) -> usize {
    match value {
        Some(value) => {
            *slot = Some(value);
            1
        }
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    use crate::domain::model::{EncoderChoice, Scheduling};

    #[test]
    fn test_cli_overrides_env_and_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("custom.toml");
        std::fs::write(
            &config_path,
            "[clipr]\nexport_dir = 'FromFile'\nencoder = 'gpu'\npreset = 'slow'\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "clipr",
            "--config",
            config_path.to_str().unwrap(),
            "split",
            "--input",
            "in.mp4",
            "--length",
            "60",
            "--export-dir",
            "FromCli",
            "--parallel",
        ]);
        let (config, warnings) = initialize_with_env(&cli, |key| match key {
            "CLIPR_EXPORT_DIR" => Some("FromEnv".to_string()),
            "CLIPR_PRESET" => Some("fast".to_string()),
            _ => None,
        })
        .unwrap();

        assert!(warnings.is_empty());
        assert_eq!(config.export_dir, PathBuf::from("FromCli"));
        assert_eq!(config.preset, "fast");
        assert_eq!(config.encoder, EncoderChoice::Gpu);
        assert_eq!(config.scheduling, Scheduling::Parallel);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let cli = Cli::parse_from([
            "clipr",
            "--config",
            "/definitely/not/here.toml",
            "inspect",
            "--input",
            "in.mp4",
        ]);
        assert!(initialize_with_env(&cli, |_| None).is_err());
    }
}
