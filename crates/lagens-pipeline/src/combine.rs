use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use lagens_core::{
    epoch_seconds, from_epoch_seconds, Dataset, ErrorInfo, LagError, Variable, MEMBER_DIM,
    REFERENCE_TIME_VAR, TIME_DIM,
};

const EPOCH_UNITS: &str = "seconds since 1970-01-01 00:00:00 +00:00";

fn mismatch(message: &str, name: &str, input: usize) -> LagError {
    LagError::Schema(
        ErrorInfo::new("schema_mismatch", message)
            .with_context("name", name)
            .with_context("input", input.to_string())
            .with_hint("members must share variables, dimensions and coordinate names"),
    )
}

/// Number of ensemble members a dataset holds; datasets without the axis count as one.
pub fn member_count(dataset: &Dataset) -> usize {
    dataset.dim_len(MEMBER_DIM).unwrap_or(1)
}

/// Concatenates datasets along [`MEMBER_DIM`], outer-joining their time axes.
///
/// Inputs that already span the member axis contribute all their members. Times an
/// input lacks are filled with missing values.
pub fn concat_members(inputs: &[Dataset]) -> Result<Dataset, LagError> {
    let Some(first) = inputs.first() else {
        return Err(LagError::Schema(ErrorInfo::new(
            "empty_concat",
            "nothing to concatenate",
        )));
    };
    for dataset in inputs {
        dataset.validate()?;
    }
    let aligned = match union_times(inputs)? {
        Some(times) => inputs
            .iter()
            .map(|dataset| align_time(dataset, &times))
            .collect::<Result<Vec<_>, _>>()?,
        None => inputs.to_vec(),
    };
    check_layout(&aligned)?;

    let counts: Vec<usize> = aligned.iter().map(member_count).collect();
    let total: usize = counts.iter().sum();
    let reference = &aligned[0];

    let mut out = Dataset::new();
    out.attrs = first.attrs.clone();
    out.dims = reference.dims.clone();
    out.dims.insert(MEMBER_DIM.to_string(), total);

    for name in reference.data_vars.keys() {
        let parts: Vec<&Variable> = aligned.iter().map(|ds| &ds.data_vars[name]).collect();
        out.data_vars
            .insert(name.clone(), stack(name, &parts, &counts)?);
    }

    for (name, coord) in &reference.coords {
        if name == MEMBER_DIM {
            continue;
        }
        let shared = reference.dims.contains_key(name)
            || (coord.axis_of(MEMBER_DIM).is_none()
                && aligned.iter().all(|ds| ds.coords.get(name) == Some(coord)));
        if shared {
            out.coords.insert(name.clone(), coord.clone());
        } else {
            let parts: Vec<&Variable> = aligned.iter().map(|ds| &ds.coords[name]).collect();
            out.coords
                .insert(name.clone(), stack(name, &parts, &counts)?);
        }
    }
    out.coords.insert(
        MEMBER_DIM.to_string(),
        Variable::new([MEMBER_DIM], (0..total).map(|idx| Some(idx as f64)).collect()),
    );
    out.validate()?;
    Ok(out)
}

/// Keeps only time steps at which no data variable has a missing value.
pub fn drop_incomplete_times(dataset: &Dataset) -> Result<Dataset, LagError> {
    let Some(len) = dataset.dim_len(TIME_DIM) else {
        return Ok(dataset.clone());
    };
    let mut complete = vec![true; len];
    for var in dataset.data_vars.values() {
        let Some(axis) = var.axis_of(TIME_DIM) else {
            continue;
        };
        let shape = dataset.shape_of(var)?;
        let inner: usize = shape[axis + 1..].iter().product();
        for (flat, value) in var.values.iter().enumerate() {
            if value.is_none() {
                complete[(flat / inner) % len] = false;
            }
        }
    }
    let keep: Vec<Option<usize>> = complete
        .iter()
        .enumerate()
        .filter(|(_, ok)| **ok)
        .map(|(idx, _)| Some(idx))
        .collect();
    dataset.reindex(TIME_DIM, &keep)
}

/// Replaces the per-member reference times with their maximum as a scalar variable.
///
/// Falls back to `fallback` when no member carries a reference time.
pub fn stamp_reference_time(
    dataset: &mut Dataset,
    fallback: Option<DateTime<Utc>>,
) -> Result<DateTime<Utc>, LagError> {
    let existing = dataset
        .data_vars
        .remove(REFERENCE_TIME_VAR)
        .or_else(|| dataset.coords.remove(REFERENCE_TIME_VAR));
    let seconds = match (existing.as_ref().and_then(Variable::max_value), fallback) {
        (Some(seconds), _) => seconds,
        (None, Some(instant)) => epoch_seconds(instant),
        (None, None) => {
            return Err(LagError::Schema(ErrorInfo::new(
                "missing_reference_time",
                "no reference time available",
            )))
        }
    };
    let instant = from_epoch_seconds(seconds).ok_or_else(|| {
        LagError::Schema(
            ErrorInfo::new("invalid_reference_time", "reference time is not whole seconds")
                .with_context("value", seconds.to_string()),
        )
    })?;
    let mut stamped = Variable::scalar(seconds);
    if let Some(original) = existing {
        stamped.attrs = original.attrs;
    }
    stamped
        .attrs
        .entry("units".to_string())
        .or_insert_with(|| EPOCH_UNITS.to_string());
    stamped
        .attrs
        .entry("standard_name".to_string())
        .or_insert_with(|| REFERENCE_TIME_VAR.to_string());
    dataset
        .data_vars
        .insert(REFERENCE_TIME_VAR.to_string(), stamped);
    Ok(instant)
}

fn union_times(inputs: &[Dataset]) -> Result<Option<Vec<f64>>, LagError> {
    let mut times = Vec::new();
    let mut any = false;
    for (idx, dataset) in inputs.iter().enumerate() {
        if !dataset.dims.contains_key(TIME_DIM) {
            continue;
        }
        any = true;
        let coord = dataset
            .coords
            .get(TIME_DIM)
            .ok_or_else(|| mismatch("time dimension has no coordinate", TIME_DIM, idx))?;
        for value in &coord.values {
            match value {
                Some(value) if value.is_finite() => times.push(*value),
                _ => return Err(mismatch("time coordinate has missing values", TIME_DIM, idx)),
            }
        }
    }
    if !any {
        return Ok(None);
    }
    times.sort_by(f64::total_cmp);
    times.dedup();
    Ok(Some(times))
}

fn align_time(dataset: &Dataset, times: &[f64]) -> Result<Dataset, LagError> {
    let Some(coord) = dataset.coords.get(TIME_DIM) else {
        return Ok(dataset.clone());
    };
    let mut positions = HashMap::with_capacity(coord.values.len());
    for (idx, value) in coord.values.iter().enumerate() {
        let Some(value) = value else {
            continue;
        };
        if positions.insert(value.to_bits(), idx).is_some() {
            return Err(LagError::Schema(
                ErrorInfo::new("duplicate_time", "time coordinate repeats a value")
                    .with_context("time", value.to_string()),
            ));
        }
    }
    let mapping: Vec<Option<usize>> = times
        .iter()
        .map(|time| positions.get(&time.to_bits()).copied())
        .collect();
    let mut aligned = dataset.reindex(TIME_DIM, &mapping)?;
    if let Some(time) = aligned.coords.get_mut(TIME_DIM) {
        time.values = times.iter().copied().map(Some).collect();
    }
    Ok(aligned)
}

fn check_layout(inputs: &[Dataset]) -> Result<(), LagError> {
    let reference = &inputs[0];
    let dims_of = |ds: &Dataset| -> BTreeSet<String> {
        ds.dims.keys().filter(|dim| *dim != MEMBER_DIM).cloned().collect()
    };
    let coords_of = |ds: &Dataset| -> BTreeSet<String> {
        ds.coords.keys().filter(|name| *name != MEMBER_DIM).cloned().collect()
    };
    let reference_dims = dims_of(reference);
    let reference_coords = coords_of(reference);

    for (idx, dataset) in inputs.iter().enumerate() {
        let dims = dims_of(dataset);
        if let Some(name) = reference_dims.symmetric_difference(&dims).next() {
            return Err(mismatch("dimension sets differ", name, idx));
        }
        for dim in &reference_dims {
            if dataset.dims[dim] != reference.dims[dim] {
                return Err(mismatch("dimension lengths differ", dim, idx));
            }
        }
        let coords = coords_of(dataset);
        if let Some(name) = reference_coords.symmetric_difference(&coords).next() {
            return Err(mismatch("coordinate names differ", name, idx));
        }
        for name in &reference_coords {
            if !reference.dims.contains_key(name) || name == TIME_DIM {
                continue;
            }
            let (left, right) = (&reference.coords[name], &dataset.coords[name]);
            if left.dims != right.dims || left.values != right.values {
                return Err(mismatch("dimension coordinate values differ", name, idx));
            }
        }
        if dataset.data_vars.len() != reference.data_vars.len() {
            return Err(mismatch("data variable sets differ", "*", idx));
        }
        for (name, var) in &reference.data_vars {
            let other = dataset
                .data_vars
                .get(name)
                .ok_or_else(|| mismatch("data variable missing", name, idx))?;
            if without_member(var) != without_member(other) {
                return Err(mismatch("data variable dimensions differ", name, idx));
            }
        }
        for (name, var) in dataset.coords.iter().chain(dataset.data_vars.iter()) {
            if var.axis_of(MEMBER_DIM).is_some_and(|axis| axis != 0) {
                return Err(mismatch("member axis must be outermost", name, idx));
            }
        }
    }
    Ok(())
}

fn without_member(var: &Variable) -> Vec<&str> {
    var.dims
        .iter()
        .map(String::as_str)
        .filter(|dim| *dim != MEMBER_DIM)
        .collect()
}

fn stack(name: &str, parts: &[&Variable], counts: &[usize]) -> Result<Variable, LagError> {
    let mut dims = vec![MEMBER_DIM.to_string()];
    dims.extend(parts[0].dims.iter().filter(|dim| *dim != MEMBER_DIM).cloned());
    let mut values = Vec::new();
    for (idx, (part, members)) in parts.iter().zip(counts).enumerate() {
        if part.axis_of(MEMBER_DIM).is_some() {
            values.extend_from_slice(&part.values);
        } else {
            for _ in 0..*members {
                values.extend_from_slice(&part.values);
            }
        }
        if without_member(part) != without_member(parts[0]) {
            return Err(mismatch("variable dimensions differ", name, idx));
        }
    }
    Ok(Variable {
        dims,
        values,
        attrs: parts[0].attrs.clone(),
    })
}
