use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};

use crate::{
	error::ProbeError,
	request::{ACCEPT_JSON_V2, RequestDescriptor, Scheme},
	response::ProbeResponse,
};

/// Shown by `--version`.
pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	" (reqwest ",
	env!("REQWEST_VERSION"),
	")"
);
pub const USER_AGENT: &str = concat!(
	"cda-probe/",
	env!("CARGO_PKG_VERSION"),
	" reqwest/",
	env!("REQWEST_VERSION")
);

/// Issues one GET for a request descriptor over the given scheme.
///
/// Implementations must not retry; the fallback policy lives in [`crate::fetch`].
#[async_trait]
pub trait Transport: Send + Sync {
	async fn get(
		&self,
		scheme: Scheme,
		host: &str,
		request: &RequestDescriptor,
	) -> Result<ProbeResponse, ProbeError>;
}

#[derive(Debug, Clone, Default)]
pub struct AgentOptions {
	/// Accept any server certificate. Internal deployments use certificates
	/// issued by a private authority.
	pub skip_certificate_validation: bool,
	pub timeout: Option<Duration>,
	pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Agent {
	pub(crate) client: Client,
}

impl Agent {
	pub fn new() -> Result<Self, ProbeError> {
		Self::with_options(AgentOptions::default())
	}

	pub fn with_options(options: AgentOptions) -> Result<Self, ProbeError> {
		let mut client = Client::builder()
			.user_agent(options.user_agent.as_deref().unwrap_or(USER_AGENT))
			.danger_accept_invalid_certs(options.skip_certificate_validation);

		if let Some(timeout) = options.timeout {
			client = client.timeout(timeout);
		}

		Ok(Self {
			client: client.build()?,
		})
	}
}

#[async_trait]
impl Transport for Agent {
	async fn get(
		&self,
		scheme: Scheme,
		host: &str,
		request: &RequestDescriptor,
	) -> Result<ProbeResponse, ProbeError> {
		let url = request.url(scheme, host)?;
		log::debug!("GET {url}");

		let started = Instant::now();
		let response = self
			.client
			.get(url)
			.header(ACCEPT, ACCEPT_JSON_V2)
			.send()
			.await?;

		let status = response.status();
		let body = response.bytes().await?;
		let elapsed = started.elapsed();
		log::debug!("{status} after {elapsed:?} ({} bytes)", body.len());

		Ok(ProbeResponse {
			status,
			body,
			scheme,
			elapsed,
		})
	}
}
