//! Read-through response cache keyed by exact request URL.
//!
//! Entries never expire. A body stored under a URL is treated as immutable, so concurrent
//! writers racing on the same key are harmless (last one wins).

use std::{
	collections::HashMap,
	path::PathBuf,
	sync::{Arc, PoisonError, RwLock},
};

use sha2::{Digest, Sha256};
use tracing::instrument;

use super::transport::Transport;
use crate::error::Result;

pub trait Cache: Send + Sync {
	fn get(&self, key: &str) -> Option<Vec<u8>>;
	fn set(&self, key: &str, body: &[u8]);
}

impl<C: Cache + ?Sized> Cache for Arc<C> {
	fn get(&self, key: &str) -> Option<Vec<u8>> {
		(**self).get(key)
	}

	fn set(&self, key: &str, body: &[u8]) {
		(**self).set(key, body)
	}
}

/// Process-local cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
	entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Cache for MemoryCache {
	fn get(&self, key: &str) -> Option<Vec<u8>> {
		self.entries.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
	}

	fn set(&self, key: &str, body: &[u8]) {
		self.entries.write().unwrap_or_else(PoisonError::into_inner).insert(key.to_string(), body.to_vec());
	}
}

/// One file per URL under `dir`, named by the SHA-256 of the URL and readable by the owner only.
///
/// URLs carry the API key, so only the body is written.
#[derive(Clone, Debug)]
pub struct DiskCache {
	dir: PathBuf,
}

impl DiskCache {
	pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
		let dir = dir.into();
		std::fs::create_dir_all(&dir)?;
		Ok(Self { dir })
	}

	/// `$XDG_CACHE_HOME/wkq/responses`
	pub fn in_xdg_cache() -> Result<Self> {
		let dirs = xdg::BaseDirectories::with_prefix(env!("CARGO_PKG_NAME"));
		let dir = dirs.place_cache_file("responses")?;
		Self::new(dir)
	}

	fn path_for(&self, key: &str) -> PathBuf {
		let mut hasher = Sha256::new();
		hasher.update(key.as_bytes());
		self.dir.join(format!("{:x}", hasher.finalize()))
	}

	fn write(&self, key: &str, body: &[u8]) -> std::io::Result<()> {
		let path = self.path_for(key);
		std::fs::write(&path, body)?;
		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
		}
		Ok(())
	}
}

impl Cache for DiskCache {
	fn get(&self, key: &str) -> Option<Vec<u8>> {
		std::fs::read(self.path_for(key)).ok()
	}

	fn set(&self, key: &str, body: &[u8]) {
		if let Err(e) = self.write(key, body) {
			tracing::warn!(error = %e, dir = %self.dir.display(), "failed to write cache entry");
		}
	}
}

/// Serves cached bodies without touching `inner`; stores successful bodies only.
pub struct CachingTransport<T, C> {
	inner: T,
	cache: C,
	bypass: Vec<String>,
}

impl<T: Transport, C: Cache> CachingTransport<T, C> {
	/// Profile requests always go to `inner`: the user's level can change at any time.
	pub fn new(inner: T, cache: C) -> Self {
		Self {
			inner,
			cache,
			bypass: vec!["/user-information".to_string(), "/level-progression".to_string(), "/recent-unlocks".to_string()],
		}
	}

	/// Never cache URLs containing `fragment`.
	pub fn bypass(mut self, fragment: impl Into<String>) -> Self {
		self.bypass.push(fragment.into());
		self
	}
}

impl<T: Transport, C: Cache> Transport for CachingTransport<T, C> {
	#[instrument(skip_all, name = "CachingTransport::get")]
	fn get(&self, url: &str) -> Result<String> {
		if self.bypass.iter().any(|fragment| url.contains(fragment.as_str())) {
			return self.inner.get(url);
		}
		if let Some(bytes) = self.cache.get(url) {
			match String::from_utf8(bytes) {
				Ok(body) => {
					tracing::trace!("cache hit");
					return Ok(body);
				}
				Err(_) => tracing::warn!("cached body is not valid UTF-8, refetching"),
			}
		}
		tracing::trace!("cache miss");

		let body = self.inner.get(url)?;
		self.cache.set(url, body.as_bytes());
		Ok(body)
	}
}
