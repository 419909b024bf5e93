use std::io::Write;

use crate::{
	agent::Transport,
	error::ProbeError,
	request::{RequestDescriptor, Scheme},
	response::ProbeResponse,
};

/// GET over HTTPS, falling back to plaintext HTTP once if TLS negotiation fails.
///
/// Any other failure, including one from the plaintext attempt, is returned as is.
pub async fn fetch<T, W>(
	transport: &T,
	host: &str,
	request: &RequestDescriptor,
	out: &mut W,
) -> Result<ProbeResponse, ProbeError>
where
	T: Transport + ?Sized,
	W: Write + ?Sized,
{
	match transport.get(Scheme::Https, host, request).await {
		Err(err) if err.kind.is_tls() => {
			log::warn!("TLS failure against {host}, retrying over http: {err}");
			writeln!(out, "{err}")?;
			transport.get(Scheme::Http, host, request).await
		}
		result => result,
	}
}
