//! Filtering fetched items into a [`Schedule`].
//!
//! Stage filtering has two mutually exclusive modes:
//! - `exclude` non-empty: drop items whose stage is listed;
//! - otherwise `include` non-empty: keep only items whose stage is listed.
//!
//! If both are given, `exclude` wins and `include` is ignored. Items that are still locked
//! (no review state) are dropped under every policy.

use tracing::instrument;

use crate::{
	error::Result,
	fetch::{Client, Transport},
	item::{Item, Kind, SrsStage},
	levels::{Levels, segments},
	schedule::Schedule,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Policy {
	Custom,
	/// Kinds are fixed to radicals and kanji: vocabulary never blocks a level-up.
	Blockers,
}

#[derive(Clone, Debug)]
pub struct Query {
	levels: Levels,
	kinds: Vec<Kind>,
	exclude: Vec<SrsStage>,
	include: Vec<SrsStage>,
	at_level: Option<u32>,
	policy: Policy,
}

impl Query {
	/// Every kind, every stage, over `levels`.
	pub fn new(levels: Levels) -> Self {
		Self {
			levels,
			kinds: Kind::ALL.to_vec(),
			exclude: Vec::new(),
			include: Vec::new(),
			at_level: None,
			policy: Policy::Custom,
		}
	}

	/// Everything not yet burned.
	pub fn upcoming(levels: Levels) -> Self {
		Self::new(levels).exclude(&[SrsStage::Burned])
	}

	/// Items one step away from being burned.
	pub fn burning(levels: Levels) -> Self {
		Self::new(levels).include(&[SrsStage::Enlighten])
	}

	/// Apprentice radicals and kanji of `level`: what stands between the user and `level + 1`.
	pub fn blockers(level: u32) -> Self {
		Self {
			levels: Levels::single(level),
			kinds: vec![Kind::Radical, Kind::Kanji],
			exclude: Vec::new(),
			include: vec![SrsStage::Apprentice],
			at_level: Some(level),
			policy: Policy::Blockers,
		}
	}

	/// Blocker queries keep their kinds, stages and level whatever the caller asks for.
	fn is_fixed(&self, what: &str) -> bool {
		if self.policy == Policy::Blockers {
			tracing::warn!(what, "blocker query is fixed, ignoring override");
		}
		self.policy == Policy::Blockers
	}

	/// Restrict the collections fetched. Ignored for [`Query::blockers`], as are the other builders.
	pub fn kinds(mut self, kinds: &[Kind]) -> Self {
		if !self.is_fixed("kinds") {
			self.kinds = kinds.to_vec();
		}
		self
	}

	pub fn exclude(mut self, stages: &[SrsStage]) -> Self {
		if !self.is_fixed("exclude") {
			self.exclude = stages.to_vec();
		}
		self
	}

	pub fn include(mut self, stages: &[SrsStage]) -> Self {
		if !self.is_fixed("include") {
			self.include = stages.to_vec();
		}
		self
	}

	/// Keep only items whose own level is `level`.
	pub fn at_level(mut self, level: u32) -> Self {
		if !self.is_fixed("at_level") {
			self.at_level = Some(level);
		}
		self
	}

	pub fn requested_kinds(&self) -> &[Kind] {
		&self.kinds
	}

	fn admits_stage(&self, stage: SrsStage) -> bool {
		if !self.exclude.is_empty() {
			!self.exclude.contains(&stage)
		} else if !self.include.is_empty() {
			self.include.contains(&stage)
		} else {
			true
		}
	}

	/// Whether `item` belongs in this query's schedule.
	pub fn admits(&self, item: &Item) -> bool {
		let Some(stage) = item.srs_stage() else {
			return false;
		};
		if !self.kinds.contains(&item.kind) {
			return false;
		}
		if self.at_level.is_some_and(|level| level != item.level) {
			return false;
		}
		self.admits_stage(stage)
	}

	/// Build a schedule from already-fetched items. The first error aborts.
	pub fn collect(&self, items: impl IntoIterator<Item = Result<Item>>) -> Result<Schedule> {
		let mut schedule = Schedule::new();
		for item in items {
			let item = item?;
			if self.admits(&item) {
				schedule.insert(item);
			} else {
				tracing::trace!(%item, kind = %item.kind, level = item.level, stage = ?item.srs_stage(), "filtered out");
			}
		}
		Ok(schedule)
	}

	/// Fetch each requested kind, in order, and build the schedule.
	///
	/// [`Levels::All`] is resolved against the profile once, so every kind covers the same span.
	#[instrument(skip(client))]
	pub fn run<T: Transport>(&self, client: &Client<T>) -> Result<Schedule> {
		let spans = match &self.levels {
			Levels::All => {
				let current = client.profile()?.level;
				tracing::debug!(current, "resolved all levels for query");
				segments(current)
			}
			levels => vec![levels.clone()],
		};

		let mut schedule = Schedule::new();
		for &kind in &self.kinds {
			for span in &spans {
				schedule.extend(self.collect(client.fetch(kind, span)?)?.into_items());
			}
		}
		Ok(schedule)
	}
}
