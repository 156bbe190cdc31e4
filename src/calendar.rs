//! iCalendar (RFC 5545) feeds built from a schedule.

use jiff::{Timestamp, civil::Date, tz::TimeZone};

use crate::schedule::{KindCounts, Schedule};

/// Content lines longer than this many octets are folded.
const MAX_LINE_OCTETS: usize = 75;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum When {
	At(Timestamp),
	/// All-day.
	Day(Date),
}

#[derive(Clone, Debug)]
pub struct Event {
	pub uid: String,
	pub summary: String,
	pub start: When,
	pub end: Option<When>,
}

#[derive(Clone, Debug)]
pub struct Calendar {
	pub prodid: String,
	pub events: Vec<Event>,
}

impl Calendar {
	/// Serialize with CRLF line endings. `stamp` becomes every event's DTSTAMP.
	pub fn render(&self, stamp: Timestamp) -> String {
		let mut out = String::new();
		line(&mut out, "BEGIN:VCALENDAR");
		line(&mut out, "VERSION:2.0");
		line(&mut out, &format!("PRODID:{}", self.prodid));
		let stamp = format_timestamp(stamp);
		for event in &self.events {
			line(&mut out, "BEGIN:VEVENT");
			line(&mut out, &format!("UID:{}", escape_text(&event.uid)));
			line(&mut out, &format!("DTSTAMP:{stamp}"));
			line(&mut out, &format!("SUMMARY:{}", escape_text(&event.summary)));
			line(&mut out, &format!("DTSTART{}", format_when(&event.start)));
			if let Some(end) = &event.end {
				line(&mut out, &format!("DTEND{}", format_when(end)));
			}
			line(&mut out, "END:VEVENT");
		}
		line(&mut out, "END:VCALENDAR");
		out
	}
}

/// One event per bucket, summarising how many radicals and kanji are due.
pub fn blockers(schedule: &Schedule) -> Calendar {
	let events = schedule
		.iter()
		.map(|(ts, items)| {
			let counts = KindCounts::of(items);
			Event {
				uid: format!("blocker-{}@wkq", ts.as_second()),
				summary: blocker_summary(counts),
				start: When::At(*ts),
				end: Some(When::At(*ts)),
			}
		})
		.collect();

	Calendar {
		prodid: "-//wkq//Blockers//EN".to_string(),
		events,
	}
}

fn blocker_summary(counts: KindCounts) -> String {
	match (counts.radicals, counts.kanji) {
		(0, kanji) => format!("漢字: {kanji}"),
		(radicals, 0) => format!("部首: {radicals}"),
		(radicals, kanji) => format!("部首: {radicals} 漢字: {kanji}"),
	}
}

/// One all-day event per local day with the number of reviews due that day.
pub fn reviews(schedule: &Schedule, tz: &TimeZone) -> Calendar {
	let events = schedule
		.by_day(tz)
		.into_iter()
		.map(|(day, counts)| Event {
			uid: format!("reviews-{}@wkq", day.strftime("%Y%m%d")),
			summary: format!("復習 {}", counts.total()),
			start: When::Day(day),
			end: None,
		})
		.collect();

	Calendar {
		prodid: "-//wkq//Reviews//EN".to_string(),
		events,
	}
}

fn format_timestamp(ts: Timestamp) -> String {
	ts.strftime("%Y%m%dT%H%M%SZ").to_string()
}

fn format_when(when: &When) -> String {
	match when {
		When::At(ts) => format!(":{}", format_timestamp(*ts)),
		When::Day(day) => format!(";VALUE=DATE:{}", day.strftime("%Y%m%d")),
	}
}

fn escape_text(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'\\' => out.push_str("\\\\"),
			';' => out.push_str("\\;"),
			',' => out.push_str("\\,"),
			'\n' => out.push_str("\\n"),
			'\r' => {}
			c => out.push(c),
		}
	}
	out
}

/// Append one content line, folded at octet boundaries that do not split a character.
fn line(out: &mut String, content: &str) {
	let mut budget = MAX_LINE_OCTETS;
	let mut used = 0;
	for c in content.chars() {
		if used + c.len_utf8() > budget {
			out.push_str("\r\n ");
			// continuation lines start with a space, which counts
			budget = MAX_LINE_OCTETS - 1;
			used = 0;
		}
		out.push(c);
		used += c.len_utf8();
	}
	out.push_str("\r\n");
}
