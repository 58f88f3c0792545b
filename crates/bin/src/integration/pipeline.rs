//! Resolve datasets, profiles and filters into matrix builds.

use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vintage::{BusinessUnitProfile, ConfigError, VintageConfig, VintageError};
use vintage_data::DatasetCache;
use vintage_matrix::{
    Alignment, CohortMonth, CohortRatioMatrixBuilder, Dimension, GroupFilter,
};

/// Matrix parameters collected from the command line.
#[derive(Debug, Clone, Default)]
pub(crate) struct MatrixRequest {
    /// Business unit profile name.
    pub(crate) unit: Option<String>,
    /// Numerator prefix override.
    pub(crate) numerator: Option<String>,
    /// Denominator prefix override.
    pub(crate) denominator: Option<String>,
    /// Highest offset override.
    pub(crate) max_offset: Option<u32>,
    /// Column alignment.
    pub(crate) alignment: Alignment,
    /// Trailing window in months.
    pub(crate) window: Option<u32>,
    /// Dimension filters.
    pub(crate) filters: Vec<GroupFilter>,
    /// Append mean/max/min rows.
    pub(crate) summary: bool,
    /// Aggregate `initial_volume` in summary rows.
    pub(crate) summarize_volume: bool,
    /// Explicit close months for triangular alignment.
    pub(crate) close_months: Vec<String>,
}

/// Load the configuration file, or the defaults when none is given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<VintageConfig, ConfigError> {
    path.map_or_else(|| Ok(VintageConfig::default()), VintageConfig::from_file)
}

/// Pick the dataset path: command line first, then configuration.
pub(crate) fn dataset_path(
    explicit: Option<PathBuf>,
    config: &VintageConfig,
) -> Result<PathBuf, ConfigError> {
    explicit.or_else(|| config.dataset.clone()).ok_or_else(|| {
        ConfigError::Invalid("no dataset given; pass --data or set \"dataset\" in the config".into())
    })
}

/// Load the fact table through the dataset cache.
pub(crate) fn load_dataset(
    cache: &mut DatasetCache,
    path: &Path,
) -> Result<Arc<DataFrame>, VintageError> {
    Ok(cache.get_or_load(path)?)
}

/// Filters for the repeated `--branch`, `--product` and `--channel` flags.
///
/// A flag that was not given adds no filter.
pub(crate) fn dimension_filters(
    branches: Vec<String>,
    products: Vec<String>,
    channels: Vec<String>,
) -> Vec<GroupFilter> {
    [
        (Dimension::Branch, branches),
        (Dimension::ProductGroup, products),
        (Dimension::ChannelOrigin, channels),
    ]
    .into_iter()
    .filter(|(_, values)| !values.is_empty())
    .map(|(dimension, values)| GroupFilter::one_of(dimension, values))
    .collect()
}

/// Resolve the profile named by the request, applying prefix overrides.
fn resolve_profile(
    request: &MatrixRequest,
    config: &VintageConfig,
) -> Result<Option<BusinessUnitProfile>, ConfigError> {
    request
        .unit
        .as_deref()
        .map(|unit| {
            let mut profile = config.profile(unit)?.clone();
            if let Some(numerator) = &request.numerator {
                profile.numerator_prefix.clone_from(numerator);
            }
            if let Some(denominator) = &request.denominator {
                profile.denominator_prefix.clone_from(denominator);
            }
            Ok(profile)
        })
        .transpose()
}

/// Turn a request into a configured builder.
pub(crate) fn matrix_builder(
    request: &MatrixRequest,
    config: &VintageConfig,
) -> Result<CohortRatioMatrixBuilder, VintageError> {
    let builder = match resolve_profile(request, config)? {
        Some(profile) => profile.matrix_builder(config),
        None => match (&request.numerator, &request.denominator) {
            (Some(numerator), Some(denominator)) => {
                CohortRatioMatrixBuilder::new(numerator, denominator)
                    .schema(config.schema.clone())
                    .max_offset(config.default_max_offset)
            }
            _ => {
                return Err(ConfigError::Invalid(
                    "pass --unit, or both --numerator and --denominator".into(),
                )
                .into());
            }
        },
    };

    let mut builder = builder
        .alignment(request.alignment)
        .filters(request.filters.iter().cloned())
        .include_summary(request.summary)
        .summarize_volume(request.summarize_volume);

    if let Some(max_offset) = request.max_offset {
        builder = builder.max_offset(max_offset);
    }
    if let Some(window) = request.window {
        builder = builder.window_months(window);
    }
    if !request.close_months.is_empty() {
        let months = request
            .close_months
            .iter()
            .map(|m| CohortMonth::parse(m))
            .collect::<Result<Vec<_>, _>>()?;
        builder = builder.close_months(months);
    }

    Ok(builder)
}

/// Title shown above rendered output.
pub(crate) fn title(request: &MatrixRequest) -> String {
    match (&request.unit, &request.numerator, &request.denominator) {
        (Some(unit), _, _) => format!("Vintage {unit}"),
        (None, Some(numerator), Some(denominator)) => {
            format!("Vintage {numerator}N / {denominator}N")
        }
        _ => "Vintage".to_string(),
    }
}
