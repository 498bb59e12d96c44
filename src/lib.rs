//! A standalone time-series aggregation engine: a bounded raw sample buffer,
//! a set of down-sampled aggregated views kept in step with it, and a
//! cross-archive operator for combining several archives' views under an
//! overlap requirement.

pub mod aggregators;
pub mod common;
pub mod config;
pub mod error;
pub mod parser;
pub mod series;

pub use common::{Granularity, Sample, Timestamp};
pub use error::{CarbonaraError, CarbonaraResult};
pub use series::{ArchiveDefinition, TimeSerieArchive};
