//! Request descriptors for the two probed endpoints.

use std::fmt;

use reqwest::Url;

use crate::error::{ProbeError, ProbeErrorKind};

/// Media type the API needs to answer with its v2 JSON format.
pub const ACCEPT_JSON_V2: &str = "application/json;version=2";

pub const TIMEZONE: &str = "PST8PDT";
pub const OFFICE: &str = "SPK";

/// Page size the API reads as "everything, unpaginated".
pub const PAGE_SIZE_ALL: i64 = -1;

/// Timeseries requested by the timeseries batch, in request order.
pub const TIMESERIES_NAMES: [&str; 12] = [
	"Black Butte.Elev.Inst.15Minutes.0.raw-cda",
	"Black Butte.Flow-Out.Inst.15Minutes.0.raw-cda",
	"Pine Flat-Outflow.Stage.Inst.15Minutes.0.raw-cda",
	"Pine Flat.Elev.Inst.1Hour.0.Calc-val",
	"Alder Springs.Precip-Cumulative.Inst.15Minutes.0.raw-cda",
	"Alder Springs.Precip-INC.Total.15Minutes.15Minutes.calc-cda",
	"Clear Creek.Precip-Cumulative.Inst.15Minutes.0.raw-cda",
	"Wet Meadows.Depth-SWE.Inst.15Minutes.0.raw-cda",
	"New Hogan.Elev.Inst.1Hour.0.Calc-val",
	"Isabella.Stor.Inst.1Hour.0.Calc-val",
	"Folsom.Flow-In.Ave.1Hour.1Hour.Calc-val",
	"Success.Elev.Inst.15Minutes.0.raw-cda",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
	Https,
	Http,
}

impl Scheme {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Https => "https",
			Self::Http => "http",
		}
	}
}

impl fmt::Display for Scheme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
	Text(String),
	Int(i64),
}

impl fmt::Display for QueryValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Text(s) => f.write_str(s),
			Self::Int(n) => write!(f, "{n}"),
		}
	}
}

impl From<&str> for QueryValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}

impl From<i64> for QueryValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

/// Extra timeseries query parameters accepted by the API, off unless set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeWindow {
	pub begin: Option<String>,
	pub end: Option<String>,
	pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
	pub path: String,
	pub query: Vec<(String, QueryValue)>,
}

impl RequestDescriptor {
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			query: Vec::new(),
		}
	}

	pub fn param(mut self, key: &str, value: impl Into<QueryValue>) -> Self {
		self.query.push((key.to_owned(), value.into()));
		self
	}

	/// `/{api_path}/timeseries?name=..&timezone=PST8PDT&pageSize=-1&office=SPK`
	pub fn timeseries(api_path: &str, name: &str, window: &TimeWindow) -> Self {
		let mut req = Self::new(format!("/{}/timeseries", api_path.trim_matches('/')))
			.param("name", name)
			.param("timezone", TIMEZONE)
			.param("pageSize", PAGE_SIZE_ALL)
			.param("office", OFFICE);

		for (key, value) in [
			("begin", &window.begin),
			("end", &window.end),
			("unit", &window.unit),
		] {
			if let Some(value) = value {
				req = req.param(key, value.as_str());
			}
		}

		req
	}

	/// `/{api_path}/offices/SPK?pageSize=-1`
	pub fn offices(api_path: &str) -> Self {
		Self::new(format!("/{}/offices/{OFFICE}", api_path.trim_matches('/')))
			.param("pageSize", PAGE_SIZE_ALL)
	}

	pub fn get(&self, key: &str) -> Option<&QueryValue> {
		self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	pub fn url(&self, scheme: Scheme, host: &str) -> Result<Url, ProbeError> {
		let mut url = Url::parse(&format!("{scheme}://{host}")).map_err(|err| {
			ProbeError::new(
				ProbeErrorKind::InvalidUrl,
				Some(format!("invalid host {host:?}: {err}")),
			)
		})?;
		url.set_path(&self.path);
		if !self.query.is_empty() {
			let mut pairs = url.query_pairs_mut();
			for (key, value) in &self.query {
				pairs.append_pair(key, &value.to_string());
			}
		}
		Ok(url)
	}
}
