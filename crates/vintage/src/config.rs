//! JSON configuration and business-unit profiles.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vintage_matrix::{
    CohortRatioMatrixBuilder, DEFAULT_MAX_OFFSET, Dimension, FactSchema, GroupFilter,
};

use crate::error::ConfigError;

/// Column family and maturity convention of one business unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessUnitProfile {
    /// Business unit value, matched against the business unit column
    pub name: String,
    /// Numerator column prefix, e.g. `saldo_capital_total_c`
    pub numerator_prefix: String,
    /// Denominator column prefix, e.g. `capital_c`
    pub denominator_prefix: String,
    /// Highest offset; falls back to [`VintageConfig::default_max_offset`]
    #[serde(default)]
    pub max_offset: Option<u32>,
    /// Volume column used when the offset-1 denominator is missing
    #[serde(default)]
    pub volume_column: Option<String>,
}

impl BusinessUnitProfile {
    /// Profile with no offset or volume overrides.
    pub fn new(
        name: impl Into<String>,
        numerator_prefix: impl Into<String>,
        denominator_prefix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            numerator_prefix: numerator_prefix.into(),
            denominator_prefix: denominator_prefix.into(),
            max_offset: None,
            volume_column: None,
        }
    }

    /// Matrix builder restricted to this business unit.
    ///
    /// Further filters and alignment options are layered on by the caller.
    pub fn matrix_builder(&self, config: &VintageConfig) -> CohortRatioMatrixBuilder {
        let mut builder =
            CohortRatioMatrixBuilder::new(&self.numerator_prefix, &self.denominator_prefix)
                .schema(config.schema.clone())
                .max_offset(self.max_offset.unwrap_or(config.default_max_offset))
                .filter(GroupFilter::equals(Dimension::BusinessUnit, &self.name));

        if let Some(column) = &self.volume_column {
            builder = builder.volume_column(column);
        }
        builder
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VintageConfig {
    /// Fact table loaded when no path is given on the command line
    pub dataset: Option<PathBuf>,
    /// Dataset cache time-to-live; `None` never expires
    pub cache_ttl_secs: Option<u64>,
    /// Fixed column names
    pub schema: FactSchema,
    /// Highest offset for profiles that do not set one
    pub default_max_offset: u32,
    /// Value column summed by the exposure breakdown
    pub exposure_column: String,
    /// Known business units
    pub profiles: Vec<BusinessUnitProfile>,
}

impl Default for VintageConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            cache_ttl_secs: Some(3600),
            schema: FactSchema::default(),
            default_max_offset: DEFAULT_MAX_OFFSET,
            exposure_column: "saldo_capital_total_c1".to_string(),
            profiles: vec![
                BusinessUnitProfile {
                    max_offset: Some(24),
                    ..BusinessUnitProfile::new("PR", "saldo_capital_total_c", "capital_c")
                },
                BusinessUnitProfile {
                    max_offset: Some(36),
                    ..BusinessUnitProfile::new("CONSUMO", "saldo_vencido_c", "saldo_capital_total_c")
                },
            ],
        }
    }
}

impl VintageConfig {
    /// Load and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        log::debug!(
            "loaded config from {} ({} profiles)",
            path.display(),
            config.profiles.len()
        );
        Ok(config)
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check offsets are positive and profile names unique and non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_max_offset == 0 {
            return Err(ConfigError::Invalid(
                "default_max_offset must be at least 1".to_string(),
            ));
        }

        let mut seen = std::collections::BTreeSet::new();
        for profile in &self.profiles {
            if profile.name.trim().is_empty() {
                return Err(ConfigError::Invalid("profile name is empty".to_string()));
            }
            if profile.max_offset == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "profile {}: max_offset must be at least 1",
                    profile.name
                )));
            }
            if !seen.insert(profile.name.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate profile: {}",
                    profile.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a profile by name, ignoring case.
    pub fn profile(&self, name: &str) -> Result<&BusinessUnitProfile, ConfigError> {
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }

    /// Cache time-to-live as a [`Duration`].
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}
