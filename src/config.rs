use crate::analyzer::{AdvisoryRules, Preset, RuleKind};
use crate::AnkleError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default)]
pub struct AnkleConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub advisory: AdvisoryConfig,
    #[serde(default)]
    pub encryption: EncryptionConfig,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Memory,
    Remote,
}

#[derive(Debug, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: Backend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_remote_timeout(),
        }
    }
}

fn default_remote_timeout() -> u64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct AdvisoryConfig {
    #[serde(default)]
    pub preset: Preset,
    /// Explicit priority list; takes precedence over `preset`.
    #[serde(default)]
    pub rules: Option<Vec<RuleKind>>,
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_sprain_threshold")]
    pub sprain_threshold: usize,
    #[serde(default = "default_pain_threshold")]
    pub pain_threshold: f64,
    #[serde(default = "default_trend_delta")]
    pub trend_delta: i64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            rules: None,
            window: default_window(),
            sprain_threshold: default_sprain_threshold(),
            pain_threshold: default_pain_threshold(),
            trend_delta: default_trend_delta(),
        }
    }
}

fn default_window() -> usize {
    7
}

fn default_sprain_threshold() -> usize {
    2
}

fn default_pain_threshold() -> f64 {
    6.0
}

fn default_trend_delta() -> i64 {
    2
}

#[derive(Debug, Deserialize, Default)]
pub struct EncryptionConfig {
    pub key_file: Option<PathBuf>,
}

/// Load config from `explicit`, ~/.anklelog/config.toml, or defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<AnkleConfig, AnkleError> {
    let path = explicit.map(Path::to_path_buf).or_else(default_config_path);
    match path {
        Some(p) if p.exists() => {
            let content = std::fs::read_to_string(&p)?;
            let config: AnkleConfig = toml::from_str(&content)
                .map_err(|e| AnkleError::Config(format!("{}: {e}", p.display())))?;
            validate_config(&config)?;
            log::debug!("loaded config from {}", p.display());
            Ok(config)
        }
        Some(p) if explicit.is_some() => Err(AnkleError::Config(format!(
            "config file not found: {}",
            p.display()
        ))),
        _ => Ok(AnkleConfig::default()),
    }
}

pub fn anklelog_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".anklelog")
}

fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|_| anklelog_dir().join("config.toml"))
}

pub fn default_db_path() -> PathBuf {
    anklelog_dir().join("anklelog.db")
}

fn validate_config(config: &AnkleConfig) -> Result<(), AnkleError> {
    let adv = &config.advisory;
    if adv.window == 0 {
        return Err(AnkleError::Config("advisory.window must be at least 1".into()));
    }
    if !(0.0..=10.0).contains(&adv.pain_threshold) {
        return Err(AnkleError::Config(format!(
            "advisory.pain_threshold {} outside 0-10",
            adv.pain_threshold
        )));
    }
    if !(0..=10).contains(&adv.trend_delta) {
        return Err(AnkleError::Config(format!(
            "advisory.trend_delta {} outside 0-10",
            adv.trend_delta
        )));
    }
    if config.store.backend == Backend::Remote
        && config.remote.endpoint.as_deref().is_none_or(str::is_empty)
    {
        return Err(AnkleError::Config(
            "remote.endpoint is required for the remote backend".into(),
        ));
    }
    Ok(())
}

/// Merge preset and explicit rule list with the configured thresholds.
pub fn resolve_advisory_rules(config: &AnkleConfig) -> AdvisoryRules {
    let adv = &config.advisory;
    let priority = match &adv.rules {
        Some(rules) => rules.clone(),
        None => adv.preset.rules().to_vec(),
    };
    AdvisoryRules {
        priority,
        window: adv.window,
        sprain_threshold: adv.sprain_threshold,
        pain_threshold: adv.pain_threshold,
        trend_delta: adv.trend_delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_when_no_file() {
        let config = AnkleConfig::default();
        assert_eq!(config.store.backend, Backend::Sqlite);
        assert_eq!(config.advisory.window, 7);
        assert_eq!(config.remote.timeout_secs, 10);
        let rules = resolve_advisory_rules(&config);
        assert_eq!(
            rules.priority,
            vec![RuleKind::FrequentSprain, RuleKind::HighPain, RuleKind::RisingTrend]
        );
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[store]
backend = "remote"

[remote]
endpoint = "https://docs.example.net/v1"
api_key = "secret"
timeout_secs = 3

[advisory]
preset = "basic"
window = 5
sprain_threshold = 3
pain_threshold = 7.5
trend_delta = 1

[encryption]
key_file = "/home/user/.anklelog/key"
"#;
        let config: AnkleConfig = toml::from_str(toml_str).unwrap();
        validate_config(&config).unwrap();
        assert_eq!(config.store.backend, Backend::Remote);
        assert_eq!(config.remote.endpoint.as_deref(), Some("https://docs.example.net/v1"));
        assert_eq!(config.remote.timeout_secs, 3);
        assert_eq!(
            config.encryption.key_file,
            Some(PathBuf::from("/home/user/.anklelog/key"))
        );

        let rules = resolve_advisory_rules(&config);
        assert_eq!(rules.priority, vec![RuleKind::FrequentSprain, RuleKind::HighPain]);
        assert_eq!(rules.window, 5);
        assert_eq!(rules.sprain_threshold, 3);
        assert_eq!(rules.pain_threshold, 7.5);
        assert_eq!(rules.trend_delta, 1);
    }

    #[test]
    fn explicit_rules_override_preset() {
        let config: AnkleConfig = toml::from_str(
            r#"
[advisory]
preset = "basic"
rules = ["rising-trend", "frequent-sprain"]
"#,
        )
        .unwrap();
        let rules = resolve_advisory_rules(&config);
        assert_eq!(rules.priority, vec![RuleKind::RisingTrend, RuleKind::FrequentSprain]);
    }

    #[test]
    fn remote_backend_requires_endpoint() {
        let config: AnkleConfig = toml::from_str("[store]\nbackend = \"remote\"\n").unwrap();
        assert!(matches!(validate_config(&config), Err(AnkleError::Config(_))));
    }

    #[test]
    fn zero_window_rejected() {
        let config: AnkleConfig = toml::from_str("[advisory]\nwindow = 0\n").unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn unknown_rule_name_fails_to_parse() {
        let parsed = toml::from_str::<AnkleConfig>("[advisory]\nrules = [\"low-mood\"]\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn load_config_from_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[store]\nbackend = \"memory\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.store.backend, Backend::Memory);

        let missing = dir.path().join("missing.toml");
        assert!(load_config(Some(&missing)).is_err());
    }
}
