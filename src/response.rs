use std::{fmt, time::Duration};

use bytes::Bytes;
use http::StatusCode;
use serde_json::Value;

use crate::request::Scheme;

/// A completed exchange, before any interpretation of the body.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
	pub status: StatusCode,
	pub body: Bytes,
	pub scheme: Scheme,
	pub elapsed: Duration,
}

impl ProbeResponse {
	pub fn ok(&self) -> bool {
		self.status == StatusCode::OK
	}

	/// Classify the response the way the fetch routines report it.
	pub fn into_outcome(self) -> Outcome {
		if !self.ok() {
			return Outcome::BadStatus {
				status: self.status,
				body: self.body,
			};
		}

		match serde_json::from_slice(&self.body) {
			Ok(value) => Outcome::Json(value),
			Err(err) => Outcome::BadJson {
				error: err.to_string(),
				body: self.body,
			},
		}
	}
}

/// What a single fetch routine ended with. None of these stop a batch.
#[derive(Debug, Clone)]
pub enum Outcome {
	Json(Value),
	BadStatus { status: StatusCode, body: Bytes },
	BadJson { error: String, body: Bytes },
}

impl Outcome {
	pub fn is_json(&self) -> bool {
		matches!(self, Self::Json(_))
	}
}

impl fmt::Display for Outcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Json(value) => write!(f, "{value}"),
			Self::BadStatus { status, body } => {
				write!(f, "status {}: {}", status.as_u16(), String::from_utf8_lossy(body))
			}
			Self::BadJson { error, body } => {
				write!(f, "could not decode JSON ({error}): {body:?}")
			}
		}
	}
}
