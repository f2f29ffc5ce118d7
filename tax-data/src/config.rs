//! Engine configuration loaded from TOML.
//!
//! ```toml
//! [boundaries]
//! convention = "inclusive"   # or "half_open"
//! unit = "1"
//!
//! [rounding]
//! decimal_places = 0
//! mode = "half_up"           # or "half_even"
//! ```
//!
//! Every table and key is optional.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tax_core::BoundaryConvention;
use tax_core::calculations::RoundingPolicy;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("boundary unit must be positive, got {0}")]
    InvalidUnit(Decimal),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConventionKind {
    #[default]
    Inclusive,
    HalfOpen,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    pub convention: ConventionKind,
    /// Smallest currency unit separating inclusive brackets. Defaults to 1.
    pub unit: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub boundaries: BoundaryConfig,
    pub rounding: RoundingPolicy,
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.convention()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// The boundary convention described by `[boundaries]`.
    pub fn convention(&self) -> Result<BoundaryConvention, ConfigError> {
        match self.boundaries.convention {
            ConventionKind::HalfOpen => Ok(BoundaryConvention::HalfOpen),
            ConventionKind::Inclusive => {
                let unit = self.boundaries.unit.unwrap_or(Decimal::ONE);
                if unit <= Decimal::ZERO {
                    return Err(ConfigError::InvalidUnit(unit));
                }
                Ok(BoundaryConvention::Inclusive { unit })
            }
        }
    }
}
