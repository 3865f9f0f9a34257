use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General options
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// Simulated paired-host link behavior
    pub link: Option<LinkConfig>,
}

/// Knobs for the built-in simulated host link. All delays in ms.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LinkConfig {
    pub connect_delay_ms: Option<u64>,
    pub result_delay_ms: Option<u64>,
    pub weather_delay_ms: Option<u64>,
    /// Fraction of requests that fail outright (0.0 - 1.0)
    pub failure_rate: Option<f64>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "wristface", about = "WristFace watch-face engine", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub link_connect_delay_ms: Option<u64>,
    #[arg(long)]
    pub link_result_delay_ms: Option<u64>,
    #[arg(long)]
    pub link_weather_delay_ms: Option<u64>,
    #[arg(long)]
    pub link_failure_rate: Option<f64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();

    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, &cli);

    // 4) Validate
    validate(&cfg)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/wristface/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/wristface/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/wristface.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["wristface.yaml", "config.yaml", "config/wristface.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    // link
    match (&mut dst.link, src.link) {
        (None, Some(c)) => dst.link = Some(c),
        (Some(d), Some(s)) => merge_link(d, s),
        _ => {}
    }
}

fn merge_link(dst: &mut LinkConfig, src: LinkConfig) {
    if src.connect_delay_ms.is_some() { dst.connect_delay_ms = src.connect_delay_ms; }
    if src.result_delay_ms.is_some()  { dst.result_delay_ms = src.result_delay_ms; }
    if src.weather_delay_ms.is_some() { dst.weather_delay_ms = src.weather_delay_ms; }
    if src.failure_rate.is_some()     { dst.failure_rate = src.failure_rate; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    let any_link = cli.link_connect_delay_ms.is_some()
        || cli.link_result_delay_ms.is_some()
        || cli.link_weather_delay_ms.is_some()
        || cli.link_failure_rate.is_some();

    if any_link && cfg.link.is_none() {
        cfg.link = Some(LinkConfig::default());
    }
    if let Some(link) = cfg.link.as_mut() {
        if cli.link_connect_delay_ms.is_some() { link.connect_delay_ms = cli.link_connect_delay_ms; }
        if cli.link_result_delay_ms.is_some()  { link.result_delay_ms = cli.link_result_delay_ms; }
        if cli.link_weather_delay_ms.is_some() { link.weather_delay_ms = cli.link_weather_delay_ms; }
        if cli.link_failure_rate.is_some()     { link.failure_rate = cli.link_failure_rate; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(level) = cfg.log_level.as_deref() {
        match level {
            "error" | "warn" | "info" | "debug" | "trace" => {},
            _ => return Err(ConfigError::Validation(
                "log_level must be error|warn|info|debug|trace".into()
            ))
        }
    }
    if let Some(link) = cfg.link.as_ref() {
        if let Some(rate) = link.failure_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Validation("link failure_rate must be 0.0..=1.0".into()));
            }
        }
    }
    Ok(())
}
