//! Custom log format for rendering study history with `gource`.
//!
//! Each line is `timestamp|username|action|path|color`. Unlocking adds a file (`A`), burning
//! modifies it (`M`) and greys it out.

use crate::item::{Item, Kind};

const BURNED_COLOR: &str = "434343";

/// Top-level directory an item is filed under.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Grouping {
	#[default]
	Kind,
	Level,
}

fn color(kind: Kind) -> &'static str {
	match kind {
		Kind::Radical => "0093DD",
		Kind::Kanji => "DD0093",
		Kind::Vocabulary => "882D9E",
	}
}

/// Log lines for every unlocked item in chronological order.
///
/// Locked items and radicals without a glyph have no file to draw and are skipped.
pub fn log<'a>(username: &str, items: impl IntoIterator<Item = &'a Item>, grouping: Grouping) -> Vec<String> {
	let mut lines = Vec::new();
	for item in items {
		let (Some(review), Some(glyph)) = (&item.review, item.character.as_deref()) else {
			tracing::trace!(kind = %item.kind, level = item.level, "nothing to draw");
			continue;
		};
		let path = match grouping {
			Grouping::Kind => format!("{}/{glyph}", item.kind),
			Grouping::Level => format!("{}/{glyph}", item.level),
		};

		let unlocked = review.unlocked_at.as_second();
		lines.push((unlocked, format!("{unlocked}|{username}|A|{path}|{}", color(item.kind))));
		if let Some(burned) = review.burned_at.map(|ts| ts.as_second()) {
			lines.push((burned, format!("{burned}|{username}|M|{path}|{BURNED_COLOR}")));
		}
	}
	lines.sort();
	lines.into_iter().map(|(_, line)| line).collect()
}
