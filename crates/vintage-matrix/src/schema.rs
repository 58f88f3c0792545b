//! Schema descriptors for the loan fact table.
//!
//! [`FactSchema`] names the fixed columns (origination period and categorical
//! dimensions). [`MeasureSchema`] is the resolved mapping from maturity offset
//! to its numerator/denominator column pair, resolved once per build instead of
//! once per aggregation.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, Result};
use crate::filter::Dimension;
use crate::month::CohortMonth;

/// Names of the fixed columns of the fact table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactSchema {
    /// Origination period column (string, date or datetime)
    pub origination_column: String,
    /// Business unit column
    pub business_unit_column: String,
    /// Branch column
    pub branch_column: String,
    /// Product group column
    pub product_group_column: String,
    /// Origination channel column
    pub channel_column: String,
}

impl Default for FactSchema {
    fn default() -> Self {
        Self {
            origination_column: "origination_period".to_string(),
            business_unit_column: "business_unit".to_string(),
            branch_column: "branch".to_string(),
            product_group_column: "product_group".to_string(),
            channel_column: "channel_origin".to_string(),
        }
    }
}

impl FactSchema {
    /// Column holding the given dimension.
    pub fn dimension_column(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::BusinessUnit => &self.business_unit_column,
            Dimension::Branch => &self.branch_column,
            Dimension::ProductGroup => &self.product_group_column,
            Dimension::ChannelOrigin => &self.channel_column,
        }
    }

    /// Fail with [`MatrixError::MissingColumn`] unless the origination column exists.
    pub fn validate(&self, frame: &DataFrame) -> Result<()> {
        require_column(frame, &self.origination_column)
    }
}

/// The numerator/denominator column pair for one maturity offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetColumns {
    /// Maturity offset, starting at 1
    pub offset: u32,
    /// Numerator column name
    pub numerator: String,
    /// Denominator column name
    pub denominator: String,
}

/// Resolved measure columns for a numerator/denominator prefix pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureSchema {
    numerator_prefix: String,
    denominator_prefix: String,
    offsets: Vec<OffsetColumns>,
    unpaired: Vec<u32>,
}

impl MeasureSchema {
    /// Look up `{prefix}{m}` columns, `m` in `1..=max_offset`.
    ///
    /// An offset is kept only when both columns exist.
    pub fn resolve(
        frame: &DataFrame,
        numerator_prefix: &str,
        denominator_prefix: &str,
        max_offset: u32,
    ) -> Self {
        Self::resolve_with(
            |name| frame.column(name).is_ok(),
            numerator_prefix,
            denominator_prefix,
            max_offset,
        )
    }

    /// Resolve against an arbitrary column-existence predicate.
    ///
    /// # Examples
    ///
    /// ```
    /// use vintage_matrix::MeasureSchema;
    ///
    /// let columns = ["npl_1", "cap_1", "npl_2", "cap_3"];
    /// let schema = MeasureSchema::resolve_with(|c| columns.contains(&c), "npl_", "cap_", 3);
    ///
    /// assert_eq!(schema.len(), 1);
    /// assert_eq!(schema.unpaired_offsets(), &[2, 3]);
    /// ```
    pub fn resolve_with(
        has_column: impl Fn(&str) -> bool,
        numerator_prefix: &str,
        denominator_prefix: &str,
        max_offset: u32,
    ) -> Self {
        let mut offsets = Vec::new();
        let mut unpaired = Vec::new();

        for offset in 1..=max_offset {
            let numerator = format!("{numerator_prefix}{offset}");
            let denominator = format!("{denominator_prefix}{offset}");
            match (has_column(&numerator), has_column(&denominator)) {
                (true, true) => offsets.push(OffsetColumns {
                    offset,
                    numerator,
                    denominator,
                }),
                (false, false) => {}
                _ => unpaired.push(offset),
            }
        }

        if !unpaired.is_empty() {
            log::warn!(
                "{numerator_prefix}/{denominator_prefix}: offsets {unpaired:?} have only one side of the pair and are excluded"
            );
        }
        log::debug!(
            "{numerator_prefix}/{denominator_prefix}: resolved {} of {max_offset} offsets",
            offsets.len()
        );

        Self {
            numerator_prefix: numerator_prefix.to_string(),
            denominator_prefix: denominator_prefix.to_string(),
            offsets,
            unpaired,
        }
    }

    /// Numerator prefix this schema was resolved for.
    pub fn numerator_prefix(&self) -> &str {
        &self.numerator_prefix
    }

    /// Denominator prefix this schema was resolved for.
    pub fn denominator_prefix(&self) -> &str {
        &self.denominator_prefix
    }

    /// Usable offsets, ascending.
    pub fn offsets(&self) -> &[OffsetColumns] {
        &self.offsets
    }

    /// Offsets where exactly one column of the pair exists.
    pub fn unpaired_offsets(&self) -> &[u32] {
        &self.unpaired
    }

    /// Column pair for `offset`, if usable.
    pub fn get(&self, offset: u32) -> Option<&OffsetColumns> {
        self.offsets.iter().find(|c| c.offset == offset)
    }

    /// Number of usable offsets.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True when no offset is usable.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

pub(crate) fn require_column(frame: &DataFrame, name: &str) -> Result<()> {
    if frame.column(name).is_ok() {
        Ok(())
    } else {
        Err(MatrixError::MissingColumn(name.to_string()))
    }
}

/// Read the origination column as months. Null periods stay `None`.
pub(crate) fn read_periods(frame: &DataFrame, name: &str) -> Result<Vec<Option<CohortMonth>>> {
    let column = frame
        .column(name)
        .map_err(|_| MatrixError::MissingColumn(name.to_string()))?;
    let text = column.cast(&DataType::String)?;
    text.str()?
        .into_iter()
        .map(|value| value.map(CohortMonth::parse).transpose())
        .collect()
}

/// Read a numeric column as `f64`.
pub(crate) fn read_measure(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = frame
        .column(name)
        .map_err(|_| MatrixError::MissingColumn(name.to_string()))?;
    if matches!(column.dtype(), DataType::String | DataType::Boolean) {
        return Err(MatrixError::UnsupportedType {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        });
    }
    let values = column.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// Read a categorical column as owned strings.
pub(crate) fn read_categories(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = frame
        .column(name)
        .map_err(|_| MatrixError::MissingColumn(name.to_string()))?;
    let text = column.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("origination_period".into(), &["2024-01", "2024-02"]).into(),
            Series::new("npl_1".into(), &[5.0, 6.0]).into(),
            Series::new("cap_1".into(), &[100.0, 100.0]).into(),
            Series::new("npl_2".into(), &[7.0, 8.0]).into(),
            Series::new("cap_2".into(), &[100.0, 100.0]).into(),
            Series::new("npl_3".into(), &[9.0, 9.0]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_keeps_only_complete_pairs() {
        let schema = MeasureSchema::resolve(&frame(), "npl_", "cap_", 24);

        let offsets: Vec<u32> = schema.offsets().iter().map(|c| c.offset).collect();
        assert_eq!(offsets, vec![1, 2]);
        assert_eq!(schema.unpaired_offsets(), &[3]);
        assert_eq!(schema.get(2).unwrap().denominator, "cap_2");
        assert!(schema.get(3).is_none());
    }

    #[test]
    fn test_resolve_without_denominators_is_empty() {
        let schema = MeasureSchema::resolve(&frame(), "npl_", "capital_c", 24);
        assert!(schema.is_empty());
        assert_eq!(schema.unpaired_offsets(), &[1, 2, 3]);
    }

    #[test]
    fn test_max_offset_bounds_lookup() {
        let schema = MeasureSchema::resolve(&frame(), "npl_", "cap_", 1);
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_read_measure_rejects_strings() {
        let err = read_measure(&frame(), "origination_period").unwrap_err();
        assert!(matches!(err, MatrixError::UnsupportedType { .. }));
    }

    #[test]
    fn test_read_periods() {
        let periods = read_periods(&frame(), "origination_period").unwrap();
        assert_eq!(periods[1].unwrap().label(), "2024-02");
    }

    #[test]
    fn test_validate_missing_origination() {
        let schema = FactSchema {
            origination_column: "mes_apertura".to_string(),
            ..FactSchema::default()
        };
        assert!(matches!(
            schema.validate(&frame()),
            Err(MatrixError::MissingColumn(name)) if name == "mes_apertura"
        ));
    }
}
