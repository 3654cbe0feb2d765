//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use probex_core::ProbexConfig;

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a configuration value by dotted key (e.g. "acquisition.min_text_length")
    Get { key: String },

    /// Set a configuration value by dotted key
    Set {
        key: String,
        /// New value, parsed as JSON when possible
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

/// `-c` selects the file every subcommand works on.
pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => {
            if !path.exists() {
                println!("{} No config file found, showing defaults.", style("ℹ").blue());
            }
            let config = load_or_default(&path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init(init_args) => init_config(init_args.output.unwrap_or(path), init_args.force)?,
        ConfigCommand::Get { key } => {
            let value = lookup(&load_or_default(&path)?, &key)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        ConfigCommand::Set { key, value } => {
            let updated = with_value(&load_or_default(&path)?, &key, parse_value(&value))?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            updated.save(&path)?;
            println!("{} Set {} = {}", style("✓").green(), key, lookup(&updated, &key)?);
        }
        ConfigCommand::Path => {
            println!("Configuration file: {}", path.display());
            if path.exists() {
                println!("Status: {}", style("exists").green());
            } else {
                println!("Status: {}", style("not created").yellow());
                println!();
                println!("Run 'probex config init' to create a configuration file.");
            }
        }
    }

    Ok(())
}

fn load_or_default(path: &Path) -> anyhow::Result<ProbexConfig> {
    if path.exists() {
        Ok(ProbexConfig::from_file(path)?)
    } else {
        Ok(ProbexConfig::default())
    }
}

fn init_config(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    ProbexConfig::default().save(&path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

/// JSON when it parses (numbers, booleans), otherwise a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn lookup(config: &ProbexConfig, key: &str) -> anyhow::Result<Value> {
    let json = serde_json::to_value(config)?;
    key.split('.')
        .try_fold(&json, |node, part| node.get(part))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
}

/// Copy of `config` with an existing key replaced. Unknown keys and
/// ill-typed values are rejected.
fn with_value(config: &ProbexConfig, key: &str, value: Value) -> anyhow::Result<ProbexConfig> {
    let mut json = serde_json::to_value(config)?;
    let slot = key
        .split('.')
        .try_fold(&mut json, |node, part| node.get_mut(part))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    if slot.is_object() {
        anyhow::bail!("{} is a section, set one of its keys instead", key);
    }
    *slot = value;
    serde_json::from_value(json).map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup() {
        let config = ProbexConfig::default();
        assert_eq!(lookup(&config, "acquisition.min_text_length").unwrap(), Value::from(200));
        assert!(lookup(&config, "acquisition.nope").is_err());
    }

    #[test]
    fn test_with_value() {
        let config = ProbexConfig::default();
        let updated = with_value(&config, "extraction.split_cases", parse_value("false")).unwrap();
        assert!(!updated.extraction.split_cases);

        let updated = with_value(&config, "models.model_dir", parse_value("/opt/ocr")).unwrap();
        assert_eq!(updated.models.model_dir, PathBuf::from("/opt/ocr"));

        assert!(with_value(&config, "acquisition.ocr_dpi", parse_value("high")).is_err());
        assert!(with_value(&config, "acquisition", parse_value("1")).is_err());
        assert!(with_value(&config, "unknown.key", parse_value("1")).is_err());
    }
}
