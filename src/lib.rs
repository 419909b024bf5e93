mod agent;
mod error;
mod fetch;
mod options;
mod probe;
mod request;
mod response;
#[cfg(test)]
mod testing;

pub use agent::*;
pub use error::{ProbeError, ProbeErrorKind};
pub use fetch::fetch;
pub use options::{Cli, DEFAULT_API_PATH, DEFAULT_HOST, ProbeOptions, Variant, legacy_host};
pub use probe::{BatchReport, LatencySummary, OFFICE_REPEATS, Probe, Sample};
pub use request::{
	ACCEPT_JSON_V2, OFFICE, PAGE_SIZE_ALL, QueryValue, RequestDescriptor, Scheme,
	TIMESERIES_NAMES, TIMEZONE, TimeWindow,
};
pub use response::{Outcome, ProbeResponse};
