use std::collections::BTreeMap;
use std::fs;
use std::iter::FromIterator;
use std::path::Path;

use lagens_core::{Dataset, ErrorInfo, LagError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

fn serde_error(code: &str, err: impl ToString) -> LagError {
    LagError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic key ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, LagError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical).map_err(|err| serde_error("json_write", err))?;
    Ok(bytes)
}

/// Deserializes a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, LagError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json_deserialize", err))
}

/// Serializes a value into YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, LagError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml_serialize", err))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, LagError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml_deserialize", err))
}

/// Reads a member file or artifact and checks its shapes.
pub fn read_dataset(path: &Path) -> Result<Dataset, LagError> {
    let bytes = fs::read(path).map_err(|err| {
        LagError::Io(
            ErrorInfo::new("dataset_read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let dataset: Dataset = from_json_slice(&bytes)
        .map_err(|err| err.with_context("path", path.display().to_string()))?;
    dataset
        .validate()
        .map_err(|err| err.with_context("path", path.display().to_string()))?;
    Ok(dataset)
}

/// Encodes a dataset in the on-disk format.
pub fn encode_dataset(dataset: &Dataset) -> Result<Vec<u8>, LagError> {
    to_canonical_json_bytes(dataset)
}
