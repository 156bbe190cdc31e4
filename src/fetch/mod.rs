//! Retrieval of item collections and profile summaries from the remote service.
//!
//! Collections are streamed: [`Client::fetch`] returns a [`Records`] iterator that issues one
//! request per level segment, only when the previous segment's records have been consumed.

pub mod cache;
pub mod mock;
pub mod transport;

use jiff::Timestamp;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;

pub use cache::{Cache, CachingTransport, DiskCache, MemoryCache};
pub use mock::MockTransport;
pub use transport::{HttpTransport, Transport};

use crate::{
	error::{Error, Result},
	item::{Item, Kind, RawItem, TaggedRawItem, timestamp},
	levels::Levels,
};

pub const DEFAULT_BASE_URL: &str = "https://www.wanikani.com/api/v1.2/user";

/// Stands in for the API key in URLs that end up in errors.
pub const REDACTED_KEY: &str = "***";

/// Build a request URL: `{base}/{api_key}/{resource}[/{segment}]`. The key is percent-encoded.
pub fn api_url(base_url: &str, api_key: &str, resource: &str, segment: Option<&str>) -> String {
	join_url(base_url, &urlencoding::encode(api_key), resource, segment)
}

fn join_url(base_url: &str, key_segment: &str, resource: &str, segment: Option<&str>) -> String {
	let base = base_url.trim_end_matches('/');
	match segment {
		Some(segment) => format!("{base}/{key_segment}/{resource}/{segment}"),
		None => format!("{base}/{key_segment}/{resource}"),
	}
}

//==============================================================================
// Summaries
//==============================================================================

/// Snapshot of the user's account. Always fetched fresh: the level can change at any time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Profile {
	pub username: String,
	pub level: u32,
	pub title: Option<String>,
	pub created_at: Option<Timestamp>,
	pub vacation_since: Option<Timestamp>,
}

#[derive(Deserialize)]
struct RawProfile {
	username: String,
	level: u32,
	title: Option<String>,
	creation_date: Option<i64>,
	vacation_date: Option<i64>,
}

impl TryFrom<RawProfile> for Profile {
	type Error = Error;

	fn try_from(raw: RawProfile) -> Result<Self> {
		Ok(Self {
			username: raw.username,
			level: raw.level,
			title: raw.title,
			created_at: raw.creation_date.filter(|&ts| ts > 0).map(timestamp).transpose()?,
			vacation_since: raw.vacation_date.filter(|&ts| ts > 0).map(timestamp).transpose()?,
		})
	}
}

/// Radicals/kanji passed at the current level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LevelProgress {
	pub radicals_progress: u32,
	pub radicals_total: u32,
	pub kanji_progress: u32,
	pub kanji_total: u32,
	pub profile: Profile,
}

#[derive(Deserialize)]
struct RawLevelProgress {
	radicals_progress: u32,
	radicals_total: u32,
	kanji_progress: u32,
	kanji_total: u32,
}

//==============================================================================
// Wire envelope
//==============================================================================

#[derive(Deserialize)]
struct Envelope {
	user_information: Option<serde_json::Value>,
	requested_information: Option<serde_json::Value>,
	error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
	code: Option<String>,
	message: Option<String>,
}

/// `vocabulary` answers with `{"general": [...]}` when no levels are given, a bare list otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum Collection {
	List(Vec<RawItem>),
	Grouped { general: Vec<RawItem> },
}

impl Collection {
	fn into_records(self) -> Vec<RawItem> {
		match self {
			Collection::List(records) | Collection::Grouped { general: records } => records,
		}
	}
}

fn decode<T: DeserializeOwned>(value: serde_json::Value, what: &str) -> Result<T> {
	serde_json::from_value(value).map_err(|e| Error::malformed(format!("{what}: {e}")))
}

//==============================================================================
// Client
//==============================================================================

pub struct Client<T> {
	transport: T,
	api_key: String,
	base_url: String,
}

impl<T: Transport> Client<T> {
	/// Fails with [`Error::EmptyCredential`] for an empty or whitespace-only key.
	pub fn new(api_key: impl Into<String>, transport: T) -> Result<Self> {
		let api_key = api_key.into().trim().to_string();
		if api_key.is_empty() {
			return Err(Error::EmptyCredential);
		}
		Ok(Self {
			transport,
			api_key,
			base_url: DEFAULT_BASE_URL.to_string(),
		})
	}

	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	pub fn url(&self, resource: &str, segment: Option<&str>) -> String {
		api_url(&self.base_url, &self.api_key, resource, segment)
	}

	/// Same as [`Client::url`] with the key replaced by [`REDACTED_KEY`], wherever the base points.
	pub fn redacted_url(&self, resource: &str, segment: Option<&str>) -> String {
		join_url(&self.base_url, REDACTED_KEY, resource, segment)
	}

	fn envelope(&self, resource: &str, segment: Option<&str>) -> Result<Envelope> {
		let url = self.url(resource, segment);
		tracing::debug!(resource, segment, "requesting");
		let body = self.transport.get(&url).map_err(|e| e.at_url(&self.redacted_url(resource, segment)))?;

		let envelope: Envelope = serde_json::from_str(&body).map_err(|e| Error::malformed(format!("{resource} response is not a valid envelope: {e}")))?;
		if let Some(err) = envelope.error {
			let detail = format!("{}: {}", err.code.unwrap_or_default(), err.message.unwrap_or_default());
			return Err(Error::remote(&self.redacted_url(resource, segment), None, detail));
		}
		Ok(envelope)
	}

	fn requested(&self, resource: &str, segment: Option<&str>) -> Result<serde_json::Value> {
		self.envelope(resource, segment)?
			.requested_information
			.ok_or_else(|| Error::malformed(format!("{resource} response without requested_information")))
	}

	#[instrument(skip(self))]
	pub fn profile(&self) -> Result<Profile> {
		let user = self
			.envelope("user-information", None)?
			.user_information
			.ok_or_else(|| Error::malformed("user-information response without user_information"))?;
		decode::<RawProfile>(user, "user_information")?.try_into()
	}

	#[instrument(skip(self))]
	pub fn level_progress(&self) -> Result<LevelProgress> {
		let envelope = self.envelope("level-progression", None)?;
		let user = envelope.user_information.ok_or_else(|| Error::malformed("level-progression response without user_information"))?;
		let requested = envelope
			.requested_information
			.ok_or_else(|| Error::malformed("level-progression response without requested_information"))?;

		let progress: RawLevelProgress = decode(requested, "level-progression")?;
		Ok(LevelProgress {
			radicals_progress: progress.radicals_progress,
			radicals_total: progress.radicals_total,
			kanji_progress: progress.kanji_progress,
			kanji_total: progress.kanji_total,
			profile: decode::<RawProfile>(user, "user_information")?.try_into()?,
		})
	}

	/// The last `limit` items the user unlocked, newest first.
	#[instrument(skip(self))]
	pub fn recent_unlocks(&self, limit: u32) -> Result<Vec<Item>> {
		let requested = self.requested("recent-unlocks", Some(&limit.to_string()))?;
		let records: Vec<TaggedRawItem> = decode(requested, "recent-unlocks")?;
		records.into_iter().map(TaggedRawItem::into_item).collect()
	}

	/// Stream one collection.
	///
	/// With [`Levels::All`] the user's current level is fetched first and the span `1..=level`
	/// is requested in balanced segments (see [`crate::levels::segments`]), in order.
	///
	/// On the first failed segment or malformed record the iterator yields that error and then
	/// ends. Items already yielded are not retracted.
	#[instrument(skip(self))]
	pub fn fetch(&self, kind: Kind, levels: &Levels) -> Result<Records<'_, T>> {
		let segments: Vec<String> = match levels {
			Levels::All => {
				let current = self.profile()?.level;
				let segments = crate::levels::segments(current);
				tracing::debug!(current, count = segments.len(), "segmenting all-levels request");
				segments.iter().filter_map(Levels::path_segment).collect()
			}
			Levels::Only(list) if list.is_empty() => Vec::new(),
			Levels::Only(_) => levels.path_segment().into_iter().collect(),
		};

		Ok(Records {
			client: self,
			kind,
			segments: segments.into_iter(),
			buffer: Vec::new().into_iter(),
			done: false,
		})
	}

	fn fetch_segment(&self, kind: Kind, segment: &str) -> Result<Vec<RawItem>> {
		let requested = self.requested(kind.resource(), Some(segment))?;
		Ok(decode::<Collection>(requested, kind.resource())?.into_records())
	}
}

/// Lazy, single-pass sequence of items from one collection. Call [`Client::fetch`] again to retry.
pub struct Records<'a, T> {
	client: &'a Client<T>,
	kind: Kind,
	segments: std::vec::IntoIter<String>,
	buffer: std::vec::IntoIter<RawItem>,
	done: bool,
}

impl<T: Transport> Iterator for Records<'_, T> {
	type Item = Result<Item>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		loop {
			if let Some(raw) = self.buffer.next() {
				let item = Item::from_raw(self.kind, raw);
				self.done = item.is_err();
				return Some(item);
			}

			let segment = self.segments.next()?;
			match self.client.fetch_segment(self.kind, &segment) {
				Ok(records) => self.buffer = records.into_iter(),
				Err(e) => {
					tracing::debug!(kind = %self.kind, segment = %segment, "segment failed, ending stream");
					self.done = true;
					return Some(Err(e));
				}
			}
		}
	}
}

impl<T: Transport> std::iter::FusedIterator for Records<'_, T> {}
