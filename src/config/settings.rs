use crate::core::{MiningLimits, ProofOfWork};
use crate::error::{LedgerError, Result};
use crate::signing::SignatureScheme;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DIFFICULTY: u32 = 2;

const DIFFICULTY_KEY: &str = "LEDGER_DIFFICULTY";
const MINING_TIMEOUT_KEY: &str = "LEDGER_MINING_TIMEOUT_SECS";
const MAX_ATTEMPTS_KEY: &str = "LEDGER_MAX_ATTEMPTS";
const SIGNATURE_SCHEME_KEY: &str = "LEDGER_SIGNATURE_SCHEME";

/// Settings for one ledger session. Built explicitly and passed to
/// whatever needs it; there is no process-wide instance.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    pub difficulty: u32,
    pub mining: MiningLimits,
    pub signature_scheme: SignatureScheme,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            mining: MiningLimits::default(),
            signature_scheme: SignatureScheme::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    difficulty: Option<u32>,
    signature_scheme: Option<SignatureScheme>,
    #[serde(default)]
    mining: FileMiningConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileMiningConfig {
    timeout_secs: Option<u64>,
    max_attempts: Option<u64>,
}

// A zero bound means "no bound".
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn attempts_from_count(count: u64) -> Option<u64> {
    (count > 0).then_some(count)
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| LedgerError::Config(format!("Invalid value for {key}: {value}")))
}

impl LedgerConfig {
    /// Defaults, then the optional TOML file, then `LEDGER_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<LedgerConfig> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<LedgerConfig> {
        let contents = fs::read_to_string(path).map_err(|e| {
            LedgerError::Io(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<LedgerConfig> {
        let file: FileConfig = toml::from_str(contents)?;
        let mut config = Self::default();
        if let Some(difficulty) = file.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(scheme) = file.signature_scheme {
            config.signature_scheme = scheme;
        }
        if let Some(secs) = file.mining.timeout_secs {
            config.mining.timeout = timeout_from_secs(secs);
        }
        if let Some(count) = file.mining.max_attempts {
            config.mining.max_attempts = attempts_from_count(count);
        }
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a `LEDGER_*` key lookup such as `std::env::var`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<LedgerConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(DIFFICULTY_KEY) {
            self.difficulty = parse_var(DIFFICULTY_KEY, &value)?;
        }
        if let Some(value) = lookup(MINING_TIMEOUT_KEY) {
            self.mining.timeout = timeout_from_secs(parse_var(MINING_TIMEOUT_KEY, &value)?);
        }
        if let Some(value) = lookup(MAX_ATTEMPTS_KEY) {
            self.mining.max_attempts = attempts_from_count(parse_var(MAX_ATTEMPTS_KEY, &value)?);
        }
        if let Some(value) = lookup(SIGNATURE_SCHEME_KEY) {
            self.signature_scheme = value
                .parse::<SignatureScheme>()
                .map_err(|e: String| LedgerError::Config(format!("{SIGNATURE_SCHEME_KEY}: {e}")))?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        ProofOfWork::validate_difficulty(self.difficulty)
            .map_err(|e| LedgerError::Config(e.to_string()))
    }
}
