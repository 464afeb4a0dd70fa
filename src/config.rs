use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use config::{ConfigBuilder, Environment, File, builder::DefaultState};
use dotenv::dotenv;
use serde::Deserialize;

use crate::app::{AppOptions, DEFAULT_LOADING_DELAY};
use crate::clipboard::DEFAULT_COPIED_DURATION;
use crate::error::{DashboardError, Result};
use crate::feed::DEFAULT_TICK_INTERVAL;
use crate::flash::DEFAULT_FLASH_DURATION;
use crate::generator::DEFAULT_TOKENS_PER_CATEGORY;
use crate::token::Category;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Settings file (toml, yaml or json; extension optional)
    #[arg(short, long, env = "DISCOVERY_CONFIG", default_value = "config/default")]
    pub config: String,

    /// Seed for the mock data and the live feed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Live update interval in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Artificial loading delay in milliseconds
    #[arg(long)]
    pub loading_ms: Option<u64>,

    /// Tokens generated per category
    #[arg(short, long)]
    pub tokens: Option<usize>,

    /// Start with live updates turned off
    #[arg(long)]
    pub paused: bool,

    /// Write tracing output to this file
    #[arg(short, long, env = "DISCOVERY_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_loading_delay_ms")]
    pub loading_delay_ms: u64,
    #[serde(default = "default_tokens_per_category")]
    pub tokens_per_category: usize,
    #[serde(default = "default_flash_ms")]
    pub flash_ms: u64,
    #[serde(default = "default_copied_ms")]
    pub copied_ms: u64,
    #[serde(default = "default_live_updates")]
    pub live_updates: bool,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_tab")]
    pub default_tab: Category,
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

fn default_tick_interval_ms() -> u64 {
    millis(DEFAULT_TICK_INTERVAL)
}

fn default_loading_delay_ms() -> u64 {
    millis(DEFAULT_LOADING_DELAY)
}

fn default_tokens_per_category() -> usize {
    DEFAULT_TOKENS_PER_CATEGORY
}

fn default_flash_ms() -> u64 {
    millis(DEFAULT_FLASH_DURATION)
}

fn default_copied_ms() -> u64 {
    millis(DEFAULT_COPIED_DURATION)
}

fn default_live_updates() -> bool {
    true
}

fn default_tab() -> Category {
    Category::New
}

/// `DISCOVERY__TICK_INTERVAL_MS=1000` sets `tick_interval_ms`.
fn environment() -> Environment {
    Environment::with_prefix("DISCOVERY")
        .separator("__")
        .try_parsing(true)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            loading_delay_ms: default_loading_delay_ms(),
            tokens_per_category: default_tokens_per_category(),
            flash_ms: default_flash_ms(),
            copied_ms: default_copied_ms(),
            live_updates: default_live_updates(),
            seed: None,
            default_tab: default_tab(),
        }
    }
}

impl Settings {
    /// Settings file first, then `DISCOVERY__*` environment variables.
    pub fn from_file_and_env(path: &str) -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(environment());
        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Command-line flags win over file and environment.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(seed) = args.seed {
            self.seed = Some(seed);
        }
        if let Some(tick_ms) = args.tick_ms {
            self.tick_interval_ms = tick_ms;
        }
        if let Some(loading_ms) = args.loading_ms {
            self.loading_delay_ms = loading_ms;
        }
        if let Some(tokens) = args.tokens {
            self.tokens_per_category = tokens;
        }
        if args.paused {
            self.live_updates = false;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(DashboardError::InvalidSetting {
                field: "tick_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.tokens_per_category == 0 {
            return Err(DashboardError::InvalidSetting {
                field: "tokens_per_category",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn app_options(&self) -> AppOptions {
        AppOptions {
            live_updates: self.live_updates,
            default_tab: self.default_tab,
            loading_delay: Duration::from_millis(self.loading_delay_ms),
            flash_duration: Duration::from_millis(self.flash_ms),
            copied_duration: Duration::from_millis(self.copied_ms),
        }
    }
}

pub struct AppConfig {
    pub args: Args,
    pub settings: Settings,
}

pub fn load_config() -> Result<AppConfig> {
    dotenv().ok();
    let args = Args::parse();
    let mut settings = Settings::from_file_and_env(&args.config)?;
    settings.apply_args(&args);
    settings.validate()?;
    Ok(AppConfig { args, settings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<Settings> {
        Settings::from_builder(
            config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn empty_sources_fall_back_to_defaults() {
        let settings = from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.tick_interval(), Duration::from_secs(3));
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = from_toml(
            r#"
            tick_interval_ms = 1000
            tokens_per_category = 25
            live_updates = false
            default_tab = "migrated"
            seed = 99
            "#,
        )
        .unwrap();
        assert_eq!(settings.tick_interval_ms, 1_000);
        assert_eq!(settings.tokens_per_category, 25);
        assert!(!settings.live_updates);
        assert_eq!(settings.default_tab, Category::Migrated);
        assert_eq!(settings.seed, Some(99));
        assert_eq!(settings.loading_delay_ms, 1_500);
    }

    #[test]
    fn environment_overrides_file() {
        let mut vars = config::Map::new();
        vars.insert("DISCOVERY__TICK_INTERVAL_MS".to_string(), "1000".to_string());
        vars.insert("DISCOVERY__DEFAULT_TAB".to_string(), "final".to_string());
        vars.insert("DISCOVERY__LIVE_UPDATES".to_string(), "false".to_string());
        vars.insert("UNRELATED_TOKENS".to_string(), "3".to_string());

        let settings = Settings::from_builder(
            config::Config::builder()
                .add_source(File::from_str(
                    "tick_interval_ms = 250\ntokens_per_category = 4",
                    FileFormat::Toml,
                ))
                .add_source(environment().source(Some(vars))),
        )
        .unwrap();

        assert_eq!(settings.tick_interval_ms, 1_000);
        assert_eq!(settings.default_tab, Category::Final);
        assert!(!settings.live_updates);
        assert_eq!(settings.tokens_per_category, 4);
    }

    #[test]
    fn defaults_match_the_component_constants() {
        let settings = Settings::default();
        assert_eq!(settings.tick_interval(), DEFAULT_TICK_INTERVAL);
        assert_eq!(settings.tokens_per_category, DEFAULT_TOKENS_PER_CATEGORY);

        let options = settings.app_options();
        assert_eq!(options.loading_delay, DEFAULT_LOADING_DELAY);
        assert_eq!(options.flash_duration, DEFAULT_FLASH_DURATION);
        assert_eq!(options.copied_duration, DEFAULT_COPIED_DURATION);
        assert_eq!(options, AppOptions::default());
    }

    #[test]
    fn shipped_settings_file_matches_defaults() {
        let settings = Settings::from_builder(
            config::Config::builder().add_source(File::from_str(
                include_str!("../config/default.toml"),
                FileFormat::Toml,
            )),
        )
        .unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let err = from_toml("tick_interval_ms = 0").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InvalidSetting {
                field: "tick_interval_ms",
                ..
            }
        ));
    }

    #[test]
    fn args_override_settings() {
        let args = Args::parse_from(["discovery", "--seed", "7", "--tick-ms", "250", "--paused"]);
        let mut settings = Settings::default();
        settings.apply_args(&args);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.tick_interval_ms, 250);
        assert!(!settings.live_updates);
        assert_eq!(settings.tokens_per_category, DEFAULT_TOKENS_PER_CATEGORY);
    }
}
