//! Integration tests that verify the binary's JSON trace output.
//!
//! These tests spawn the binary with WKQ_TRACE_FILE set and examine the trace log.
//! Every run here fails before any request is sent, so no network is involved.

use rstest::rstest;

use crate::{assert_traced, common::Sandbox, fixtures::sandbox, tracing_utils::TraceLog};

#[rstest]
fn test_config_file_read_is_traced(sandbox: Sandbox) {
	let config_path = sandbox.write_config("timeout_secs = 5\n");

	let (status, _stdout, _stderr) = sandbox.run(&["--api-key", "", "profile"]);
	assert!(!status.success());

	let trace = TraceLog::from_file(&sandbox.trace_file());
	assert_traced!(trace, "wkq::config", "reading config file");
	let event = trace.find("wkq::config", "reading config file").unwrap();
	assert_eq!(event.level, "DEBUG");
	assert_eq!(event.fields.path.as_deref(), Some(config_path.to_str().unwrap()));
}

#[rstest]
fn test_legacy_key_file_read_is_traced(sandbox: Sandbox) {
	std::fs::write(sandbox.home().join(".wanikani"), "   \n").unwrap();

	let (status, _stdout, stderr) = sandbox.run(&["profile"]);
	assert!(!status.success());
	assert!(stderr.contains("API key is missing or empty"), "stderr: {stderr}");

	let trace = TraceLog::from_file(&sandbox.trace_file());
	assert_traced!(trace, "wkq::config", "loaded API key file");
}
