//! In-memory transport for unit tests.

use std::{
	collections::VecDeque,
	sync::Mutex,
	time::{Duration, Instant},
};

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;

use crate::{
	agent::Transport,
	error::{ProbeError, ProbeErrorKind},
	request::{RequestDescriptor, Scheme},
	response::ProbeResponse,
};

pub(crate) enum Reply {
	Status(u16, &'static str),
	Error(ProbeErrorKind, &'static str),
}

impl Reply {
	pub(crate) fn status(status: u16, body: &'static str) -> Self {
		Self::Status(status, body)
	}

	pub(crate) fn error(kind: ProbeErrorKind, message: &'static str) -> Self {
		Self::Error(kind, message)
	}
}

#[derive(Debug, Clone)]
pub(crate) struct Call {
	pub(crate) scheme: Scheme,
	pub(crate) path_and_query: String,
	pub(crate) started: Instant,
	pub(crate) finished: Instant,
}

/// Plays back replies in order, then answers `200 {"ok":true}` forever.
pub(crate) struct ScriptedTransport {
	replies: Mutex<VecDeque<Reply>>,
	calls: Mutex<Vec<Call>>,
	delay: Duration,
}

impl ScriptedTransport {
	pub(crate) fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
		Self {
			replies: Mutex::new(replies.into_iter().collect()),
			calls: Mutex::new(Vec::new()),
			delay: Duration::ZERO,
		}
	}

	pub(crate) fn always_ok() -> Self {
		Self::new(Vec::<Reply>::new())
	}

	pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}

	pub(crate) fn calls(&self) -> Vec<Call> {
		self.calls.lock().unwrap().clone()
	}

	pub(crate) fn schemes(&self) -> Vec<Scheme> {
		self.calls().into_iter().map(|call| call.scheme).collect()
	}

	/// Values of the `name` parameter, in call order.
	pub(crate) fn names(&self) -> Vec<String> {
		self.calls()
			.iter()
			.filter_map(|call| {
				let url = reqwest::Url::parse(&format!("http://probe{}", call.path_and_query)).ok()?;
				url.query_pairs()
					.find(|(k, _)| k == "name")
					.map(|(_, v)| v.into_owned())
			})
			.collect()
	}
}

#[async_trait]
impl Transport for ScriptedTransport {
	async fn get(
		&self,
		scheme: Scheme,
		host: &str,
		request: &RequestDescriptor,
	) -> Result<ProbeResponse, ProbeError> {
		let url = request.url(scheme, host)?;
		let started = Instant::now();
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}

		let reply = self.replies.lock().unwrap().pop_front();
		let finished = Instant::now();
		self.calls.lock().unwrap().push(Call {
			scheme,
			path_and_query: format!("{}?{}", url.path(), url.query().unwrap_or_default()),
			started,
			finished,
		});

		match reply.unwrap_or(Reply::Status(200, r#"{"ok":true}"#)) {
			Reply::Status(status, body) => Ok(ProbeResponse {
				status: StatusCode::from_u16(status).unwrap(),
				body: Bytes::from_static(body.as_bytes()),
				scheme,
				elapsed: finished - started,
			}),
			Reply::Error(kind, message) => Err(ProbeError::new(kind, Some(message))),
		}
	}
}
