//! Time-bucketed review schedule.

use std::collections::BTreeMap;

use jiff::{Timestamp, civil::Date, tz::TimeZone};

use crate::item::{Item, Kind};

/// Per-kind item counts for a bucket, a day, or a whole schedule.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, derive_new::new)]
pub struct KindCounts {
	pub radicals: usize,
	pub kanji: usize,
	pub vocabulary: usize,
}

impl KindCounts {
	pub fn of<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
		let mut counts = Self::default();
		for item in items {
			counts.add(item.kind);
		}
		counts
	}

	pub fn add(&mut self, kind: Kind) {
		match kind {
			Kind::Radical => self.radicals += 1,
			Kind::Kanji => self.kanji += 1,
			Kind::Vocabulary => self.vocabulary += 1,
		}
	}

	pub fn total(&self) -> usize {
		self.radicals + self.kanji + self.vocabulary
	}
}

impl std::ops::AddAssign for KindCounts {
	fn add_assign(&mut self, rhs: Self) {
		self.radicals += rhs.radicals;
		self.kanji += rhs.kanji;
		self.vocabulary += rhs.vocabulary;
	}
}

/// Review timestamp -> items due at that time, in fetch order.
///
/// Buckets are never empty. Items enter only through [`Schedule::insert`], which keys them by
/// their own next review time; [`Schedule::rollup`] is the one transform that re-keys items.
#[derive(Clone, Debug, Default)]
pub struct Schedule {
	buckets: BTreeMap<Timestamp, Vec<Item>>,
}

impl Schedule {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert under `item.next_review()`. Returns `false` (and drops the item) if it has none.
	pub fn insert(&mut self, item: Item) -> bool {
		match item.next_review() {
			Some(ts) => {
				self.buckets.entry(ts).or_default().push(item);
				true
			}
			None => false,
		}
	}

	/// Number of buckets.
	pub fn len(&self) -> usize {
		self.buckets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buckets.is_empty()
	}

	pub fn item_count(&self) -> usize {
		self.buckets.values().map(Vec::len).sum()
	}

	pub fn get(&self, ts: &Timestamp) -> Option<&[Item]> {
		self.buckets.get(ts).map(Vec::as_slice)
	}

	/// Buckets in time order.
	pub fn iter(&self) -> impl Iterator<Item = (&Timestamp, &[Item])> {
		self.buckets.iter().map(|(ts, items)| (ts, items.as_slice()))
	}

	pub fn items(&self) -> impl Iterator<Item = &Item> {
		self.buckets.values().flatten()
	}

	/// Every item, bucket by bucket.
	pub fn into_items(self) -> impl Iterator<Item = Item> {
		self.buckets.into_values().flatten()
	}

	pub fn totals(&self) -> KindCounts {
		KindCounts::of(self.items())
	}

	/// Merge every bucket strictly before `now` into one bucket keyed at `now`.
	///
	/// Overdue items come first, oldest bucket first, followed by anything already due exactly
	/// at `now`. Rolling up again with the same or a later `now` changes nothing.
	pub fn rollup(mut self, now: Timestamp) -> Self {
		let current = self.buckets.split_off(&now);
		let overdue = std::mem::replace(&mut self.buckets, current);
		if overdue.is_empty() {
			return self;
		}

		let mut merged: Vec<Item> = overdue.into_values().flatten().collect();
		if let Some(at_now) = self.buckets.remove(&now) {
			merged.extend(at_now);
		}
		tracing::debug!(count = merged.len(), %now, "rolled up overdue reviews");
		self.buckets.insert(now, merged);
		self
	}

	/// Keep only buckets strictly before `cutoff`.
	pub fn before(mut self, cutoff: Timestamp) -> Self {
		self.buckets.split_off(&cutoff);
		self
	}

	/// Keep the first `n` buckets.
	pub fn take(self, n: usize) -> Self {
		Self {
			buckets: self.buckets.into_iter().take(n).collect(),
		}
	}

	/// Per-day counts in `tz`, for day-granular consumers.
	pub fn by_day(&self, tz: &TimeZone) -> BTreeMap<Date, KindCounts> {
		let mut days: BTreeMap<Date, KindCounts> = BTreeMap::new();
		for (ts, items) in &self.buckets {
			*days.entry(ts.to_zoned(tz.clone()).date()).or_default() += KindCounts::of(items);
		}
		days
	}
}

/// Items without a review time are dropped, as with [`Schedule::insert`].
impl FromIterator<Item> for Schedule {
	fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
		let mut schedule = Self::new();
		schedule.extend(iter);
		schedule
	}
}

impl Extend<Item> for Schedule {
	fn extend<I: IntoIterator<Item = Item>>(&mut self, iter: I) {
		for item in iter {
			self.insert(item);
		}
	}
}

impl IntoIterator for Schedule {
	type IntoIter = std::collections::btree_map::IntoIter<Timestamp, Vec<Item>>;
	type Item = (Timestamp, Vec<Item>);

	fn into_iter(self) -> Self::IntoIter {
		self.buckets.into_iter()
	}
}
