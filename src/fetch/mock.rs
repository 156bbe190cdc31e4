//! Mock transport for testing purposes.
//!
//! Stores canned responses in memory, keyed by exact URL, and records every request so tests
//! can assert on what was (and was not) sent. URLs without a canned response answer 404.

use std::{
	collections::HashMap,
	sync::{Mutex, PoisonError},
};

use tracing::instrument;

use super::transport::Transport;
use crate::error::{Error, Result};

#[derive(Clone, Debug)]
enum MockResponse {
	Body(String),
	Status(u16),
}

#[derive(Debug, Default)]
pub struct MockTransport {
	responses: Mutex<HashMap<String, MockResponse>>,
	call_log: Mutex<Vec<String>>,
}

impl MockTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Answer `url` with a 200 and `body`.
	pub fn respond(&self, url: impl Into<String>, body: impl Into<String>) {
		self.responses.lock().unwrap_or_else(PoisonError::into_inner).insert(url.into(), MockResponse::Body(body.into()));
	}

	/// Answer `url` with a non-success `status`.
	pub fn fail(&self, url: impl Into<String>, status: u16) {
		self.responses.lock().unwrap_or_else(PoisonError::into_inner).insert(url.into(), MockResponse::Status(status));
	}

	/// Every requested URL, in order.
	pub fn calls(&self) -> Vec<String> {
		self.call_log.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}
}

impl Transport for MockTransport {
	#[instrument(skip_all, name = "MockTransport::get")]
	fn get(&self, url: &str) -> Result<String> {
		tracing::info!(target: "mock_wanikani", url, "get");
		self.call_log.lock().unwrap_or_else(PoisonError::into_inner).push(url.to_string());

		let response = self.responses.lock().unwrap_or_else(PoisonError::into_inner).get(url).cloned();
		match response {
			Some(MockResponse::Body(body)) => Ok(body),
			Some(MockResponse::Status(status)) => Err(Error::remote(url, Some(status), "mock failure")),
			None => Err(Error::remote(url, Some(404), "no mock response registered")),
		}
	}
}
