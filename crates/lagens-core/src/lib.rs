#![deny(missing_docs)]
#![doc = "Shared vocabulary for lagged ensemble assembly: errors, run keys and array datasets."]

pub mod dataset;
pub mod errors;
pub mod run_key;

pub use dataset::{Dataset, Variable};
pub use errors::{ErrorInfo, LagError};
pub use run_key::{compact_token, epoch_seconds, from_epoch_seconds, parse_issuance, RunKey};

/// Forecast valid-time dimension and coordinate.
pub const TIME_DIM: &str = "time";
/// Dimension along which members of a lagged ensemble are stacked.
pub const MEMBER_DIM: &str = "ensemble_member";
/// Issuance time of a forecast, in epoch seconds.
pub const REFERENCE_TIME_VAR: &str = "forecast_reference_time";
