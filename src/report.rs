//! Plain-text console rendering of schedules and summaries.

use std::fmt::Write as _;

use jiff::tz::TimeZone;

use crate::{
	fetch::{LevelProgress, Profile},
	item::Item,
	schedule::{KindCounts, Schedule},
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn row(out: &mut String, label: &str, counts: KindCounts) {
	let _ = writeln!(out, "{:<20} {:>10} {:>10} {:>10} {:>10}", label, counts.radicals, counts.kanji, counts.vocabulary, counts.total());
}

/// One row per bucket in time order, followed by a totals row.
///
/// With `show`, each row is followed by a tab-indented list of the items in it.
pub fn schedule_table(schedule: &Schedule, tz: &TimeZone, show: bool) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "{:<20} {:>10} {:>10} {:>10} {:>10}", "Timestamp", "Radicals", "Kanji", "Vocab", "Total");

	for (ts, items) in schedule.iter() {
		let label = ts.to_zoned(tz.clone()).strftime(TIMESTAMP_FORMAT).to_string();
		row(&mut out, &label, KindCounts::of(items));
		if show {
			let listed: Vec<String> = items.iter().map(Item::to_string).collect();
			let _ = writeln!(out, "\t{}", listed.join(", "));
		}
	}

	row(&mut out, "Totals", schedule.totals());
	out
}

pub fn profile(profile: &Profile) -> String {
	let mut out = format!("Username: {}\nLevel: {}\n", profile.username, profile.level);
	if let Some(title) = &profile.title {
		let _ = writeln!(out, "Title: {title}");
	}
	if let Some(since) = profile.vacation_since {
		let _ = writeln!(out, "On vacation since: {since}");
	}
	out
}

pub fn progress(progress: &LevelProgress) -> String {
	format!(
		"{} level {}\nRadicals: {}/{}\nKanji: {}/{}\n",
		progress.profile.username, progress.profile.level, progress.radicals_progress, progress.radicals_total, progress.kanji_progress, progress.kanji_total
	)
}

pub fn unlocks(items: &[Item]) -> String {
	let mut out = format!("{:<10} {:<5} {}\n", "type", "level", "character");
	for item in items {
		let _ = writeln!(out, "{:<10} {:<5} {}", item.kind.type_tag(), item.level, item);
	}
	out
}
