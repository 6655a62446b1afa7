//! Start-up configuration: a JSON file, then environment overrides.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use exn::ResultExt;
use jagai_geo::geocoding::nominatim;
use jagai_geo::Coordinate;

use crate::map::MapConfig;

const CONFIG_FILE: &str = "config.json";
const APP_DIR: &str = "jagai";

const ENV_POSITION: &str = "JAGAI_POSITION";
const ENV_NOMINATIM_URL: &str = "JAGAI_NOMINATIM_URL";
const ENV_LANGUAGE: &str = "JAGAI_LANGUAGE";
const ENV_MAP_OUTPUT: &str = "JAGAI_MAP_OUTPUT";

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Sent as `Accept-Language` on reverse and facility lookups.
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        let defaults = nominatim::Options::default();
        Self {
            base_url: defaults.base_url,
            user_agent: defaults.user_agent,
            language: "en".to_owned(),
            timeout_secs: defaults.timeout.as_secs(),
        }
    }
}

impl GeocoderConfig {
    #[must_use]
    pub fn options(&self) -> nominatim::Options {
        nominatim::Options {
            base_url: self.base_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Position reported by the device. `None` means the platform cannot
    /// locate itself.
    pub position: Option<Coordinate>,
    pub high_accuracy: bool,
    pub timeout_secs: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            position: None,
            high_accuracy: true,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Shortest input, in characters, that triggers a search.
    pub min_query_len: usize,
    pub suggestion_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: 4,
            suggestion_limit: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    pub terms: String,
    pub limit: usize,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            terms: "hospital, clinic".to_owned(),
            limit: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub operator_id: String,
    pub geocoder: GeocoderConfig,
    pub location: LocationConfig,
    pub search: SearchConfig,
    pub facility: FacilityConfig,
    pub map: MapConfig,
    /// Where the Leaflet page is written. `None` disables it.
    pub map_output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            operator_id: "dispatcher".to_owned(),
            geocoder: GeocoderConfig::default(),
            location: LocationConfig::default(),
            search: SearchConfig::default(),
            facility: FacilityConfig::default(),
            map: MapConfig::default(),
            map_output: Some(PathBuf::from("jagai-map.html")),
        }
    }
}

#[derive(Debug)]
pub struct Error(String);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Error {}

/// `$XDG_CONFIG_HOME/jagai/config.json` or the platform equivalent.
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Load from the default path (if the file exists) and the process
    /// environment.
    pub fn load() -> exn::Result<Self, Error> {
        let mut config = match default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> exn::Result<Self, Error> {
        let text = std::fs::read_to_string(path)
            .or_raise(|| Error(format!("read {}", path.display())))?;
        let config = serde_json::from_str(&text)
            .or_raise(|| Error(format!("parse {}", path.display())))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Override fields from variables resolved by `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> exn::Result<(), Error> {
        if let Some(value) = lookup(ENV_POSITION) {
            let position = value
                .parse::<Coordinate>()
                .or_raise(|| Error(format!("invalid {ENV_POSITION}")))?;
            self.location.position = Some(position);
        }
        if let Some(value) = lookup(ENV_NOMINATIM_URL) {
            self.geocoder.base_url = value;
        }
        if let Some(value) = lookup(ENV_LANGUAGE) {
            self.geocoder.language = value;
        }
        if let Some(value) = lookup(ENV_MAP_OUTPUT) {
            self.map_output = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        Ok(())
    }

    #[must_use]
    pub const fn locate_timeout(&self) -> Duration {
        Duration::from_secs(self.location.timeout_secs)
    }

    /// The language to request, if any.
    #[must_use]
    pub fn language(&self) -> Option<String> {
        Some(self.geocoder.language.clone()).filter(|l| !l.is_empty())
    }
}
