//! Command-line arguments and config resolution.

use std::path::{Path, PathBuf};

use clap::Parser;
use mc_core::{Category, CheckerConfig, ConfigError};
use tracing::debug;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "misra.toml";

/// Check C sources against a subset of MISRA C:2012.
#[derive(Parser, Debug)]
#[command(name = "misra-check", author, version, about, long_about = None)]
pub struct Cli {
    /// C files to check
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Print reports as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// TOML config file (default: ./misra.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable a rule by id, e.g. "Review" or "Rule 15.1" (repeatable)
    #[arg(long = "disable", value_name = "RULE_ID")]
    pub disable: Vec<String>,

    /// Longest identifier accepted by Rule 5.1
    #[arg(long, value_name = "N")]
    pub identifier_length_max: Option<usize>,

    /// Weakest category that fails the run: advisory, required or mandatory
    #[arg(long, value_name = "CATEGORY")]
    pub fail_on: Option<Category>,

    /// Only run line rules, skip parsing
    #[arg(long)]
    pub no_ast: bool,

    /// Plain text output
    #[arg(long)]
    pub no_color: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the config relative to the process working directory.
    pub fn resolve_config(&self) -> Result<CheckerConfig, ConfigError> {
        self.resolve_config_in(Path::new("."))
    }

    /// Resolve the config: file values first, then command-line overrides.
    ///
    /// Without `--config`, `dir/misra.toml` is loaded if it exists.
    pub fn resolve_config_in(&self, dir: &Path) -> Result<CheckerConfig, ConfigError> {
        let mut config = match self.config {
            Some(ref path) => CheckerConfig::load(path)?,
            None => {
                let fallback = dir.join(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    CheckerConfig::load(&fallback)?
                } else {
                    CheckerConfig::default()
                }
            }
        };

        config.disabled_rules.extend(self.disable.iter().cloned());
        if let Some(max) = self.identifier_length_max {
            config.identifier_length_max = max;
        }
        if let Some(category) = self.fail_on {
            config.fail_on = category;
        }
        if self.no_ast {
            config.ast_enabled = false;
        }

        config.validate()?;
        debug!(?config, "resolved config");
        Ok(config)
    }

    /// Whether to color the text report.
    pub fn use_color(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }
}
