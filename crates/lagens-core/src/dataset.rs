//! In-memory array datasets: named dimensions, coordinate and data variables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, LagError};

fn schema_error(code: &str, message: impl Into<String>) -> LagError {
    LagError::Schema(ErrorInfo::new(code, message))
}

/// N-dimensional variable stored row-major; `None` marks a missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Dimension names, outermost first.
    pub dims: Vec<String>,
    /// Flattened values.
    pub values: Vec<Option<f64>>,
    /// Free-form string attributes (units, standard names).
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl Variable {
    /// Creates a variable over `dims` with the given flattened values.
    pub fn new<S: Into<String>>(
        dims: impl IntoIterator<Item = S>,
        values: Vec<Option<f64>>,
    ) -> Self {
        Self {
            dims: dims.into_iter().map(Into::into).collect(),
            values,
            attrs: BTreeMap::new(),
        }
    }

    /// Creates a dimensionless variable holding one value.
    pub fn scalar(value: f64) -> Self {
        Self {
            dims: Vec::new(),
            values: vec![Some(value)],
            attrs: BTreeMap::new(),
        }
    }

    /// Adds an attribute, returning the variable.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Position of `dim` within this variable's dimensions.
    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|name| name == dim)
    }

    /// Largest present value, if any.
    pub fn max_value(&self) -> Option<f64> {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(None, |acc, value| match acc {
                Some(current) if current >= value => Some(current),
                _ => Some(value),
            })
    }

    /// Rebuilds the variable along `axis`, placing source index `mapping[j]` at position `j`.
    ///
    /// `shape` is the current shape of the variable. `None` entries produce missing values.
    pub fn reindex_axis(&self, axis: usize, shape: &[usize], mapping: &[Option<usize>]) -> Self {
        let outer: usize = shape[..axis].iter().product();
        let inner: usize = shape[axis + 1..].iter().product();
        let len = shape[axis];
        let mut values = Vec::with_capacity(outer * mapping.len() * inner);
        for block in 0..outer {
            for target in mapping {
                match target {
                    Some(src) => {
                        let start = (block * len + src) * inner;
                        values.extend_from_slice(&self.values[start..start + inner]);
                    }
                    None => values.extend(std::iter::repeat(None).take(inner)),
                }
            }
        }
        Self {
            dims: self.dims.clone(),
            values,
            attrs: self.attrs.clone(),
        }
    }
}

/// Array dataset in the shape of a CF-style forecast file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Dimension lengths by name.
    pub dims: BTreeMap<String, usize>,
    /// Coordinate variables.
    #[serde(default)]
    pub coords: BTreeMap<String, Variable>,
    /// Data variables.
    #[serde(default)]
    pub data_vars: BTreeMap<String, Variable>,
    /// Global attributes.
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Length of a dimension, if declared.
    pub fn dim_len(&self, dim: &str) -> Option<usize> {
        self.dims.get(dim).copied()
    }

    /// Coordinate or data variable by name, coordinates first.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name).or_else(|| self.data_vars.get(name))
    }

    /// Whether `name` is a coordinate or a dimension of the dataset.
    pub fn has_coord(&self, name: &str) -> bool {
        self.coords.contains_key(name) || self.dims.contains_key(name)
    }

    /// Shape of `var` under this dataset's dimension lengths.
    pub fn shape_of(&self, var: &Variable) -> Result<Vec<usize>, LagError> {
        var.dims
            .iter()
            .map(|dim| {
                self.dim_len(dim).ok_or_else(|| {
                    LagError::Schema(
                        ErrorInfo::new("undeclared_dimension", "undeclared dimension")
                            .with_context("dimension", dim.clone()),
                    )
                })
            })
            .collect()
    }

    /// Checks that every variable's value count matches its declared shape.
    pub fn validate(&self) -> Result<(), LagError> {
        for (name, var) in self.coords.iter().chain(self.data_vars.iter()) {
            let shape = self
                .shape_of(var)
                .map_err(|err| err.with_context("variable", name.clone()))?;
            let expected: usize = shape.iter().product();
            if expected != var.values.len() {
                return Err(LagError::Schema(
                    ErrorInfo::new("variable_shape", "value count does not match shape")
                        .with_context("variable", name.clone())
                        .with_context("expected", expected.to_string())
                        .with_context("actual", var.values.len().to_string()),
                ));
            }
        }
        Ok(())
    }

    /// Renames a dimension, coordinate or data variable everywhere it appears.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), LagError> {
        if from == to {
            return Ok(());
        }
        let clashes = self.dims.contains_key(to)
            || self.coords.contains_key(to)
            || self.data_vars.contains_key(to);
        let present = self.dims.contains_key(from)
            || self.coords.contains_key(from)
            || self.data_vars.contains_key(from);
        if !present {
            return Ok(());
        }
        if clashes {
            return Err(LagError::Schema(
                ErrorInfo::new("rename_conflict", "target name already present")
                    .with_context("from", from)
                    .with_context("to", to),
            ));
        }
        if let Some(len) = self.dims.remove(from) {
            self.dims.insert(to.to_string(), len);
        }
        if let Some(var) = self.coords.remove(from) {
            self.coords.insert(to.to_string(), var);
        }
        if let Some(var) = self.data_vars.remove(from) {
            self.data_vars.insert(to.to_string(), var);
        }
        for var in self.coords.values_mut().chain(self.data_vars.values_mut()) {
            for dim in var.dims.iter_mut().filter(|dim| dim.as_str() == from) {
                *dim = to.to_string();
            }
        }
        Ok(())
    }

    /// Reindexes every variable spanning `dim` so that position `j` holds source index `mapping[j]`.
    pub fn reindex(&self, dim: &str, mapping: &[Option<usize>]) -> Result<Self, LagError> {
        let len = self.dim_len(dim).ok_or_else(|| {
            schema_error("missing_dimension", format!("dimension {dim} is absent"))
        })?;
        if mapping.iter().flatten().any(|src| *src >= len) {
            return Err(schema_error(
                "reindex_bounds",
                format!("reindex of {dim} refers past its length {len}"),
            ));
        }
        let remap = |vars: &BTreeMap<String, Variable>| {
            vars.iter()
                .map(|(name, var)| -> Result<(String, Variable), LagError> {
                    let updated = match var.axis_of(dim) {
                        Some(axis) => var.reindex_axis(axis, &self.shape_of(var)?, mapping),
                        None => var.clone(),
                    };
                    Ok((name.clone(), updated))
                })
                .collect::<Result<BTreeMap<_, _>, _>>()
        };
        let mut out = Self {
            dims: self.dims.clone(),
            coords: remap(&self.coords)?,
            data_vars: remap(&self.data_vars)?,
            attrs: self.attrs.clone(),
        };
        out.dims.insert(dim.to_string(), mapping.len());
        Ok(out)
    }
}
