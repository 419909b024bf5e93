use std::{error::Error as StdError, fmt, io};

use strum::{EnumIter, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum ProbeErrorKind {
	InvalidUrl,
	Tls,
	Timeout,
	Network,
	BodyRead,
	Output,
	RuntimeThread,
}

impl ProbeErrorKind {
	/// Stable name of the kind, as printed in front of error messages.
	pub fn code(self) -> &'static str {
		self.into()
	}

	fn default_message(self) -> &'static str {
		match self {
			Self::InvalidUrl => "invalid URL",
			Self::Tls => "TLS negotiation failed",
			Self::Timeout => "timed out",
			Self::Network => "network error",
			Self::BodyRead => "failed to read response body",
			Self::Output => "failed to write probe output",
			Self::RuntimeThread => "internal tokio runtime thread error",
		}
	}

	/// Whether the connection strategy may retry over plaintext after this error.
	pub fn is_tls(self) -> bool {
		matches!(self, Self::Tls)
	}
}

impl From<ProbeErrorKind> for ProbeError {
	fn from(kind: ProbeErrorKind) -> Self {
		Self {
			kind,
			message: None,
		}
	}
}

#[derive(Debug, Clone)]
pub struct ProbeError {
	pub kind: ProbeErrorKind,
	pub message: Option<String>,
}

impl ProbeError {
	pub fn new(kind: ProbeErrorKind, message: Option<impl Into<String>>) -> Self {
		Self {
			kind,
			message: message.map(|m| m.into()),
		}
	}

	pub fn message(&self) -> &str {
		self.message
			.as_deref()
			.unwrap_or_else(|| self.kind.default_message())
	}
}

impl fmt::Display for ProbeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.kind.code(), self.message())
	}
}

impl StdError for ProbeError {}

impl From<reqwest::Error> for ProbeError {
	fn from(err: reqwest::Error) -> Self {
		let kind = if err.is_timeout() {
			ProbeErrorKind::Timeout
		} else if err.is_builder() {
			ProbeErrorKind::InvalidUrl
		} else if err.is_connect() && is_tls_failure(&err) {
			ProbeErrorKind::Tls
		} else if err.is_body() || err.is_decode() {
			ProbeErrorKind::BodyRead
		} else {
			ProbeErrorKind::Network
		};

		// reqwest's Display stops at the outermost layer, the cause is what the user needs
		ProbeError::new(kind, Some(describe_chain(&err)))
	}
}

impl From<io::Error> for ProbeError {
	fn from(err: io::Error) -> Self {
		ProbeError::new(ProbeErrorKind::Output, Some(err.to_string()))
	}
}

/// Walks the source chain of a connect error looking for a handshake failure.
///
/// `io::Error` hides its payload from `source()`, so wrapped errors are unpacked by hand.
/// Besides rustls errors, tokio-rustls reports a peer that answers in plaintext as
/// `InvalidData` and one that hangs up on the ClientHello as `UnexpectedEof`.
pub(crate) fn is_tls_failure(err: &(dyn StdError + 'static)) -> bool {
	let mut current = Some(err);
	while let Some(err) = current {
		if err.downcast_ref::<rustls::Error>().is_some() {
			return true;
		}

		if let Some(io_err) = err.downcast_ref::<io::Error>() {
			if matches!(
				io_err.kind(),
				io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
			) {
				return true;
			}

			if let Some(inner) = io_err.get_ref() {
				if is_tls_failure(inner) {
					return true;
				}
			}
		}

		current = err.source();
	}

	false
}

fn describe_chain(err: &(dyn StdError + 'static)) -> String {
	let mut out = err.to_string();
	let mut current = err.source();
	while let Some(cause) = current {
		let text = cause.to_string();
		if !out.contains(&text) {
			out.push_str(": ");
			out.push_str(&text);
		}
		current = cause.source();
	}
	out
}
