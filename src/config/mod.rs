use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::{
    engine::{catch_up::DEFAULT_MAX_CATCH_UP_DAYS, CatchUpOptions, DedupKey},
    errors::Result,
    utils::{
        paths,
        persistence::{ensure_dir, write_atomic},
    },
};

const COMMA_DECIMAL_LANGUAGES: [&str; 12] = [
    "de", "es", "fr", "it", "nl", "pt", "pl", "ru", "sv", "da", "fi", "tr",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// BCP 47 tag such as `en-US` or `pt_PT`; decides the decimal mark.
    pub locale: String,
    pub currency_symbol: String,
    /// How the catch-up decides two records are the same for a given day.
    pub dedup: DedupKey,
    pub max_catch_up_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency_symbol: "$".into(),
            dedup: DedupKey::default(),
            max_catch_up_days: DEFAULT_MAX_CATCH_UP_DAYS,
        }
    }
}

impl Config {
    pub fn catch_up_options(&self) -> CatchUpOptions {
        CatchUpOptions {
            dedup: self.dedup,
            max_days: self.max_catch_up_days.max(1),
        }
    }

    /// Decimal mark for the configured locale; languages that write `1,50`
    /// get a comma, everything else a period.
    pub fn decimal_separator(&self) -> char {
        let language = self
            .locale
            .split(|c: char| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if COMMA_DECIMAL_LANGUAGES.contains(&language.as_str()) {
            ','
        } else {
            '.'
        }
    }

    /// Renders an amount with two decimals in the locale's decimal mark and the
    /// configured symbol appended.
    pub fn format_amount(&self, amount: f64) -> String {
        let digits = format!("{:.2}", amount);
        match self.decimal_separator() {
            '.' => format!("{}{}", digits, self.currency_symbol),
            mark => format!("{}{}", digits.replace('.', &mark.to_string()), self.currency_symbol),
        }
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: paths::config_file_in(&base),
        })
    }

    /// Reads the config file, falling back to defaults when it is absent or
    /// cannot be parsed.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&data) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "invalid config, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
