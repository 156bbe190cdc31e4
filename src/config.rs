//! Layered settings: built-in defaults, then `$XDG_CONFIG_HOME/wkq/config.toml`, then `WKQ_*`
//! environment variables.
//!
//! The API key additionally falls back to the plain-text `~/.wanikani` file written by `set-key`.

use std::path::{Path, PathBuf};

use jiff::tz::TimeZone;
use serde::Deserialize;
use smart_default::SmartDefault;

use crate::{
	error::{Error, Result},
	fetch::DEFAULT_BASE_URL,
};

pub const ENV_PREFIX: &str = "WKQ";
pub const CONFIG_FILE: &str = "config.toml";
const LEGACY_KEY_FILE: &str = ".wanikani";

#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct AppConfig {
	pub api_key: Option<String>,
	#[default(DEFAULT_BASE_URL.to_string())]
	pub base_url: String,
	#[default(30)]
	pub timeout_secs: u64,
	/// Keep successful responses on disk under `$XDG_CACHE_HOME/wkq/responses`.
	pub cache: bool,
	/// IANA name. The system zone when unset.
	pub timezone: Option<String>,
}

impl AppConfig {
	/// Read the XDG config file (if any) and the process environment.
	pub fn load() -> Result<Self> {
		let file = xdg::BaseDirectories::with_prefix(env!("CARGO_PKG_NAME")).find_config_file(CONFIG_FILE);
		Self::load_from(file.as_deref(), None)
	}

	/// `env` replaces the process environment when given.
	pub fn load_from(file: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Self> {
		let mut builder = config::Config::builder();
		if let Some(path) = file {
			tracing::debug!(path = %path.display(), "reading config file");
			builder = builder.add_source(config::File::from(path).required(false));
		}
		let settings = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).source(env)).build()?;

		let config: Self = settings.try_deserialize()?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<()> {
		url::Url::parse(&self.base_url).map_err(|e| Error::Config(format!("base_url `{}`: {e}", self.base_url)))?;
		if self.timeout_secs == 0 {
			return Err(Error::Config("timeout_secs must be positive".to_string()));
		}
		Ok(())
	}

	pub fn timeout(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.timeout_secs)
	}

	pub fn timezone(&self) -> Result<TimeZone> {
		match &self.timezone {
			Some(name) => TimeZone::get(name).map_err(|e| Error::Config(format!("timezone `{name}`: {e}"))),
			None => Ok(TimeZone::system()),
		}
	}

	/// First non-empty of: `flag`, the configured key, the contents of `key_file`.
	///
	/// An explicit `flag` is returned as-is, even when empty, so the client can reject it.
	pub fn api_key(&self, flag: Option<&str>, key_file: Option<&Path>) -> Result<Option<String>> {
		if let Some(key) = flag {
			return Ok(Some(key.to_string()));
		}
		if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
			return Ok(Some(key.to_string()));
		}
		match key_file {
			Some(path) => read_key_file(path),
			None => Ok(None),
		}
	}
}

/// `$HOME/.wanikani`.
pub fn legacy_key_path() -> Option<PathBuf> {
	std::env::var_os("HOME").map(|home| PathBuf::from(home).join(LEGACY_KEY_FILE))
}

/// `None` if the file does not exist or holds only whitespace.
pub fn read_key_file(path: &Path) -> Result<Option<String>> {
	match std::fs::read_to_string(path) {
		Ok(contents) => {
			tracing::debug!(path = %path.display(), "loaded API key file");
			let key = contents.trim();
			Ok((!key.is_empty()).then(|| key.to_string()))
		}
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
		Err(e) => Err(e.into()),
	}
}

pub fn write_key_file(path: &Path, key: &str) -> Result<()> {
	let key = key.trim();
	if key.is_empty() {
		return Err(Error::EmptyCredential);
	}
	std::fs::write(path, key)?;
	#[cfg(unix)]
	{
		use std::os::unix::fs::PermissionsExt;
		std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
	}
	Ok(())
}
