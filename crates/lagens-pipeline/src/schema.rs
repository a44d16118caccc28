use lagens_core::{Dataset, LagError};

/// A legacy coordinate name and the canonical name it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateAlias {
    /// Name found in older archive files.
    pub legacy: &'static str,
    /// Name used by every dataset handed to the combiner.
    pub canonical: &'static str,
}

/// Canonical 2-metre height coordinate.
pub const HEIGHT_2M: &str = "height2";

/// Known coordinate renames. New schema migrations append here.
pub const COORDINATE_ALIASES: &[CoordinateAlias] = &[CoordinateAlias {
    legacy: "height6",
    canonical: HEIGHT_2M,
}];

/// Applies [`COORDINATE_ALIASES`] to a loaded member.
pub fn normalize_member(dataset: Dataset) -> Result<Dataset, LagError> {
    normalize_with(dataset, COORDINATE_ALIASES)
}

/// Renames every legacy coordinate in `aliases` that the dataset carries.
///
/// Datasets already on canonical names pass through untouched; values, units and
/// variable selection are never altered.
pub fn normalize_with(
    mut dataset: Dataset,
    aliases: &[CoordinateAlias],
) -> Result<Dataset, LagError> {
    for alias in aliases {
        if dataset.has_coord(alias.legacy) {
            dataset.rename(alias.legacy, alias.canonical)?;
        }
    }
    Ok(dataset)
}

/// Legacy names still present in `dataset`.
pub fn legacy_names(dataset: &Dataset) -> Vec<&'static str> {
    COORDINATE_ALIASES
        .iter()
        .filter(|alias| dataset.has_coord(alias.legacy))
        .map(|alias| alias.legacy)
        .collect()
}
