//! Utilities for capturing and verifying tracing output in integration tests.
//!
//! When tests spawn the wkq binary with `WKQ_TRACE_FILE` set, trace events are
//! written in JSON format to that file. These utilities help parse and verify
//! those traces.

use std::{fs, path::Path};

use serde::Deserialize;

/// A single trace event from the JSON log
#[derive(Debug, Deserialize)]
pub struct TraceEvent {
	pub timestamp: String,
	/// DEBUG, INFO, WARN, ERROR
	pub level: String,
	/// The emitting module, e.g. "wkq::config"
	pub target: String,
	pub fields: TraceFields,
}

#[derive(Debug, Deserialize)]
pub struct TraceFields {
	pub message: Option<String>,
	pub path: Option<String>,
}

/// Parsed trace log that provides verification methods
pub struct TraceLog {
	events: Vec<TraceEvent>,
}

impl TraceLog {
	/// Lines that fail to parse are skipped.
	pub fn from_file(path: &Path) -> Self {
		let content = fs::read_to_string(path).unwrap_or_default();
		let events: Vec<TraceEvent> = content.lines().filter(|line| !line.is_empty()).filter_map(|line| serde_json::from_str(line).ok()).collect();

		Self { events }
	}

	pub fn has_event(&self, target: &str, message: &str) -> bool {
		self.find(target, message).is_some()
	}

	pub fn find(&self, target: &str, message: &str) -> Option<&TraceEvent> {
		self.events.iter().find(|e| e.target == target && e.fields.message.as_deref() == Some(message))
	}

	pub fn events(&self) -> &[TraceEvent] {
		&self.events
	}
}

/// Assert that an event was traced
#[macro_export]
macro_rules! assert_traced {
	($log:expr, $target:expr, $message:expr) => {
		assert!(
			$log.has_event($target, $message),
			"Expected '{}' from '{}' to be traced, but it wasn't. Events:\n{:#?}",
			$message,
			$target,
			$log.events()
		);
	};
}
