//! Normalized study items and the raw records they are built from.
//!
//! Every item the service returns, whatever collection it came from, ends up as one
//! [`Item`]: a tagged [`Kind`] plus the per-user [`ReviewState`] if the user has unlocked it.

use std::fmt;

use jiff::Timestamp;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Which collection an item belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Kind {
	Radical,
	Kanji,
	Vocabulary,
}

impl Kind {
	pub const ALL: [Kind; 3] = [Kind::Radical, Kind::Kanji, Kind::Vocabulary];

	/// Path segment of the collection endpoint.
	pub fn resource(&self) -> &'static str {
		match self {
			Kind::Radical => "radicals",
			Kind::Kanji => "kanji",
			Kind::Vocabulary => "vocabulary",
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Kind::Radical => "Radical",
			Kind::Kanji => "Kanji",
			Kind::Vocabulary => "Vocabulary",
		}
	}

	/// The `type` discriminator used by the recent-unlocks endpoint.
	pub fn type_tag(&self) -> &'static str {
		match self {
			Kind::Radical => "radical",
			Kind::Kanji => "kanji",
			Kind::Vocabulary => "vocabulary",
		}
	}

	pub fn from_type_tag(tag: &str) -> Option<Self> {
		Kind::ALL.into_iter().find(|k| k.type_tag() == tag)
	}
}

impl fmt::Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Memorization tier. Ordered: an item only ever moves towards `Burned`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum SrsStage {
	Apprentice,
	Guru,
	Master,
	Enlighten,
	Burned,
}

impl SrsStage {
	pub fn as_str(&self) -> &'static str {
		match self {
			SrsStage::Apprentice => "apprentice",
			SrsStage::Guru => "guru",
			SrsStage::Master => "master",
			SrsStage::Enlighten => "enlighten",
			SrsStage::Burned => "burned",
		}
	}
}

impl fmt::Display for SrsStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for SrsStage {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"apprentice" => Ok(SrsStage::Apprentice),
			"guru" => Ok(SrsStage::Guru),
			"master" => Ok(SrsStage::Master),
			"enlighten" => Ok(SrsStage::Enlighten),
			"burned" => Ok(SrsStage::Burned),
			other => Err(Error::malformed(format!("unknown srs stage {other:?}"))),
		}
	}
}

/// Per-user progress on an item. Only exists once the item is unlocked.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReviewState {
	pub srs_stage: SrsStage,
	pub next_review_at: Timestamp,
	pub unlocked_at: Timestamp,
	/// Set iff `srs_stage` is `Burned`.
	pub burned_at: Option<Timestamp>,
}

/// One learnable unit. Not `PartialEq`: schedules group by [`Item::next_review`].
#[derive(Clone, Debug)]
pub struct Item {
	pub kind: Kind,
	/// Absent for radicals that only exist as an image.
	pub character: Option<String>,
	pub kana: Option<String>,
	pub meaning: Option<String>,
	pub level: u32,
	pub review: Option<ReviewState>,
}

impl Item {
	/// Build an item from a raw record of the given collection.
	pub fn from_raw(kind: Kind, raw: RawItem) -> Result<Self> {
		let level = raw.level.ok_or_else(|| Error::malformed(format!("{kind} record without level")))?;
		if level == 0 {
			return Err(Error::malformed(format!("{kind} record with level 0")));
		}
		let character = raw.character.filter(|c| !c.is_empty());
		if character.is_none() && kind != Kind::Radical {
			return Err(Error::malformed(format!("{kind} record at level {level} without character")));
		}
		let review = raw.user_specific.map(|us| us.into_review_state()).transpose()?;

		Ok(Self {
			kind,
			character,
			kana: raw.kana.filter(|k| !k.is_empty()),
			meaning: raw.meaning,
			level,
			review,
		})
	}

	/// When this item is next due. `None` while it is still locked.
	pub fn next_review(&self) -> Option<Timestamp> {
		self.review.as_ref().map(|r| r.next_review_at)
	}

	pub fn srs_stage(&self) -> Option<SrsStage> {
		self.review.as_ref().map(|r| r.srs_stage)
	}

	pub fn unlocked_at(&self) -> Option<Timestamp> {
		self.review.as_ref().map(|r| r.unlocked_at)
	}

	pub fn burned_at(&self) -> Option<Timestamp> {
		self.review.as_ref().and_then(|r| r.burned_at)
	}
}

impl fmt::Display for Item {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let glyph = self.character.as_deref().unwrap_or("(no unicode)");
		match (&self.kind, &self.kana) {
			(Kind::Vocabulary, Some(kana)) => write!(f, "{glyph} [{kana}]"),
			_ => f.write_str(glyph),
		}
	}
}

//==============================================================================
// Raw records, as they come off the wire
//==============================================================================

/// Fields shared by the radical, kanji and vocabulary collections.
/// Everything is optional here; [`Item::from_raw`] decides what is mandatory.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawItem {
	pub level: Option<u32>,
	pub character: Option<String>,
	pub kana: Option<String>,
	pub meaning: Option<String>,
	pub user_specific: Option<RawUserSpecific>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawUserSpecific {
	pub srs: Option<SrsStage>,
	pub available_date: Option<i64>,
	pub unlocked_date: Option<i64>,
	pub burned_date: Option<i64>,
}

impl RawUserSpecific {
	fn into_review_state(self) -> Result<ReviewState> {
		let srs_stage = self.srs.ok_or_else(|| Error::malformed("user_specific without srs"))?;
		let unlocked = self.unlocked_date.ok_or_else(|| Error::malformed("user_specific without unlocked_date"))?;

		let burned_at = match (srs_stage, self.burned_date) {
			(SrsStage::Burned, Some(ts)) if ts > 0 => Some(timestamp(ts)?),
			(SrsStage::Burned, _) => return Err(Error::malformed("burned item without burned_date")),
			_ => None,
		};
		// burned items are never reviewed again, the service may send null here
		let next_review_at = match (self.available_date, burned_at) {
			(Some(ts), _) => timestamp(ts)?,
			(None, Some(burned)) => burned,
			(None, None) => return Err(Error::malformed("user_specific without available_date")),
		};

		Ok(ReviewState {
			srs_stage,
			next_review_at,
			unlocked_at: timestamp(unlocked)?,
			burned_at,
		})
	}
}

/// Recent-unlocks records carry their own `type` tag.
#[derive(Clone, Debug, Deserialize)]
pub struct TaggedRawItem {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(flatten)]
	pub item: RawItem,
}

impl TaggedRawItem {
	pub fn into_item(self) -> Result<Item> {
		let kind = Kind::from_type_tag(&self.kind).ok_or_else(|| Error::malformed(format!("unknown item type {:?}", self.kind)))?;
		Item::from_raw(kind, self.item)
	}
}

pub(crate) fn timestamp(secs: i64) -> Result<Timestamp> {
	Timestamp::from_second(secs).map_err(|e| Error::malformed(format!("timestamp {secs} out of range: {e}")))
}
