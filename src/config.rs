use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_BOUNDARY_MARKER: &str = "%%--SIGNAL_BOUNDARY--%%";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserVariant {
    #[default]
    Heuristic,
    Strict,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub variant: ParserVariant,
    /// Stop magnitude used when a block carries no stop at all.
    #[serde(default = "default_stop_pct")]
    pub default_stop_pct: f64,
    #[serde(default = "default_boundary_marker")]
    pub boundary_marker: String,
    #[serde(default = "default_report_phrases")]
    pub report_phrases: Vec<String>,
    /// Words that are never taken as an instrument symbol.
    #[serde(default = "default_ignored_symbol_words")]
    pub ignored_symbol_words: Vec<String>,
    #[serde(default)]
    pub keywords: KeywordConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            variant: ParserVariant::default(),
            default_stop_pct: default_stop_pct(),
            boundary_marker: default_boundary_marker(),
            report_phrases: default_report_phrases(),
            ignored_symbol_words: default_ignored_symbol_words(),
            keywords: KeywordConfig::default(),
        }
    }
}

/// Lowercase keyword sets that tag a line as entry, target or stop.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "default_entry_keywords")]
    pub entry: Vec<String>,
    #[serde(default = "default_target_keywords")]
    pub target: Vec<String>,
    #[serde(default = "default_stop_keywords")]
    pub stop: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            entry: default_entry_keywords(),
            target: default_target_keywords(),
            stop: default_stop_keywords(),
        }
    }
}

impl KeywordConfig {
    /// Every keyword, across all three sets.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.entry
            .iter()
            .chain(&self.target)
            .chain(&self.stop)
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub csv_logging: bool,
    #[serde(default = "default_csv_log_path")]
    pub csv_log_path: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            csv_logging: false,
            csv_log_path: default_csv_log_path(),
        }
    }
}

fn default_stop_pct() -> f64 { 3.0 }
fn default_boundary_marker() -> String { DEFAULT_BOUNDARY_MARKER.to_string() }
fn default_csv_log_path() -> String { "parsed_signals.csv".to_string() }

fn default_report_phrases() -> Vec<String> {
    to_strings(&["target reached", "signal update", "profit/loss percent"])
}

fn default_ignored_symbol_words() -> Vec<String> {
    to_strings(&[
        "signal", "leverage", "cross", "isolated", "market", "now", "price", "spot", "futures",
    ])
}

fn default_entry_keywords() -> Vec<String> {
    to_strings(&["entry", "buy", "enter", "entries", "input", "zone", "range", "between"])
}

fn default_target_keywords() -> Vec<String> {
    to_strings(&[
        "target", "take-profit", "tp", "targets", "take profit", "selling targets", "profit book",
    ])
}

fn default_stop_keywords() -> Vec<String> {
    to_strings(&["stop", "sl", "stoploss", "stop loss", "stop targets"])
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub config_path: Option<String>,
    pub default_stop_pct: Option<f64>,
    pub strict_mode: Option<bool>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when it exists, otherwise fall back to the built-in defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Apply `.env` / environment overrides on top of the file config and
    /// re-validate the result.
    pub fn apply_env(&mut self, env: &EnvConfig) -> Result<()> {
        if let Some(pct) = env.default_stop_pct {
            self.parser.default_stop_pct = pct;
        }
        if let Some(strict) = env.strict_mode {
            self.parser.variant = if strict {
                ParserVariant::Strict
            } else {
                ParserVariant::Heuristic
            };
        }
        self.validate().context("Invalid environment override")
    }

    fn validate(&self) -> Result<()> {
        let pct = self.parser.default_stop_pct;
        if !pct.is_finite() || pct <= 0.0 || pct >= 100.0 {
            anyhow::bail!("default_stop_pct must be within (0, 100), got {}", pct);
        }
        if self.parser.boundary_marker.trim().is_empty() {
            anyhow::bail!("boundary_marker must not be empty");
        }
        Ok(())
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let default_stop_pct = match std::env::var("DEFAULT_STOP_PCT") {
            Ok(v) => Some(
                v.parse::<f64>()
                    .with_context(|| format!("DEFAULT_STOP_PCT is not a number: {}", v))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            config_path: std::env::var("SIGNAL_PARSER_CONFIG").ok(),
            default_stop_pct,
            strict_mode: match std::env::var("STRICT_MODE") {
                Ok(v) => Some(parse_flag(&v).with_context(|| format!("STRICT_MODE: {}", v))?),
                Err(_) => None,
            },
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected true/false, got {:?}", other),
    }
}
