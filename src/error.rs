//! Error types for talking to the remote service and reading its records.
//!
//! Uses miette for diagnostics so the binary can print codes and help text.

#![allow(unused_assignments)] // Fields are read by miette's derive macro via attributes

use miette::Diagnostic;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
	/// Non-success HTTP response, or a transport failure (timeout, DNS, TLS) that never produced one.
	///
	/// Errors surfaced by [`crate::Client`] carry `url` with the API key replaced by `***`.
	#[error("request to {url} failed{}", .status.map(|s| format!(" with HTTP {s}")).unwrap_or_default())]
	#[diagnostic(code(wkq::remote), help("check the API key and that the service is reachable"))]
	Remote { status: Option<u16>, url: String, detail: String },

	/// A record or envelope did not have the expected shape.
	#[error("malformed record: {detail}")]
	#[diagnostic(code(wkq::malformed_record), help("the service response format may have changed"))]
	MalformedRecord { detail: String },

	#[error("API key is missing or empty")]
	#[diagnostic(code(wkq::empty_credential), help("pass --api-key, set WKQ_API_KEY, or run `wkq set-key <KEY>`"))]
	EmptyCredential,

	#[error("invalid configuration: {0}")]
	#[diagnostic(code(wkq::config))]
	Config(String),

	#[error(transparent)]
	#[diagnostic(code(wkq::io))]
	Io(#[from] std::io::Error),
}

impl Error {
	pub fn malformed(detail: impl Into<String>) -> Self {
		Self::MalformedRecord { detail: detail.into() }
	}

	pub(crate) fn remote(url: &str, status: Option<u16>, detail: impl Into<String>) -> Self {
		Self::Remote {
			status,
			url: url.to_string(),
			detail: detail.into(),
		}
	}

	/// Swap the URL of a [`Error::Remote`] for `url`. Other variants pass through.
	pub(crate) fn at_url(self, url: &str) -> Self {
		match self {
			Self::Remote { status, detail, .. } => Self::Remote {
				status,
				url: url.to_string(),
				detail,
			},
			other => other,
		}
	}
}

impl From<config::ConfigError> for Error {
	fn from(e: config::ConfigError) -> Self {
		Self::Config(e.to_string())
	}
}
