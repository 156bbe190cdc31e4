use std::{sync::Arc, time::Duration};

use tracing::instrument;

use crate::error::{Error, Result};

/// Blocking `GET url -> body`. The only thing the fetcher needs from the network.
pub trait Transport: Send + Sync {
	fn get(&self, url: &str) -> Result<String>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
	fn get(&self, url: &str) -> Result<String> {
		(**self).get(url)
	}
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
	fn get(&self, url: &str) -> Result<String> {
		(**self).get(url)
	}
}

//==============================================================================
// Real HTTP transport
//==============================================================================

pub struct HttpTransport {
	http_client: reqwest::blocking::Client,
}

impl HttpTransport {
	pub fn new(timeout: Duration) -> Result<Self> {
		let http_client = reqwest::blocking::Client::builder()
			.timeout(timeout)
			.user_agent(concat!("wkq/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
		Ok(Self { http_client })
	}
}

impl Transport for HttpTransport {
	#[instrument(skip_all, name = "HttpTransport::get")]
	fn get(&self, url: &str) -> Result<String> {
		// reqwest errors embed the url, which embeds the key
		let res = self
			.http_client
			.get(url)
			.send()
			.map_err(|e| Error::remote(url, e.status().map(|s| s.as_u16()), e.without_url().to_string()))?;

		let status = res.status();
		if !status.is_success() {
			let body = res.text().unwrap_or_default();
			tracing::debug!(status = status.as_u16(), "non-success response");
			return Err(Error::remote(url, Some(status.as_u16()), body));
		}

		res.text().map_err(|e| Error::remote(url, Some(status.as_u16()), e.without_url().to_string()))
	}
}
