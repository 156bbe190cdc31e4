use jiff::{Timestamp, tz::TimeZone};
use rstest::rstest;
use wkq::{Item, Kind, Levels, Query, calendar, gource};

use crate::{
	common::{HOUR, MockAccount, T0, USERNAME, record},
	fixtures::account,
};

#[rstest]
fn test_reviews_calendar(account: MockAccount) {
	let schedule = Query::upcoming(Levels::All).run(&account.client()).unwrap();
	let ics = calendar::reviews(&schedule, &TimeZone::UTC).render(Timestamp::from_second(T0).unwrap());

	assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
	assert!(ics.ends_with("END:VCALENDAR\r\n"));
	assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
	assert!(ics.contains("SUMMARY:復習 8\r\n"));
	assert!(ics.contains("DTSTART;VALUE=DATE:20240529\r\n"));
}

#[rstest]
fn test_blockers_calendar(account: MockAccount) {
	let level = Levels::single(5);
	account.serve(Kind::Radical, &level, vec![record(5, "口", Some("apprentice"), T0 + HOUR)]);
	account.serve(
		Kind::Kanji,
		&level,
		vec![record(5, "右", Some("apprentice"), T0 + HOUR), record(5, "左", Some("apprentice"), T0 + 5 * HOUR)],
	);

	let schedule = Query::blockers(account.level).run(&account.client()).unwrap();
	let ics = calendar::blockers(&schedule).render(Timestamp::from_second(T0).unwrap());

	assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
	assert!(ics.contains("SUMMARY:部首: 1 漢字: 1\r\n"));
	assert!(ics.contains("SUMMARY:漢字: 1\r\n"));
	assert!(ics.contains("DTSTART:20240529T130000Z\r\nDTEND:20240529T130000Z\r\n"));
}

#[rstest]
fn test_gource_log(account: MockAccount) {
	let client = account.client();
	let mut items: Vec<Item> = Vec::new();
	for kind in Kind::ALL {
		items.extend(client.fetch(kind, &Levels::All).unwrap().map(Result::unwrap));
	}

	let lines = gource::log(USERNAME, &items, gource::Grouping::Kind);
	// locked items and the glyphless radical are skipped, the burned kanji has two lines
	assert_eq!(lines.len(), 9);

	let burned_unlock = T0 - 100 * HOUR - 30 * 24 * HOUR;
	assert_eq!(lines[0], format!("{burned_unlock}|koichi|A|Kanji/一|DD0093"));
	assert!(lines.contains(&format!("{}|koichi|M|Kanji/一|434343", T0 - 100 * HOUR)));
	assert!(lines.iter().any(|l| l.ends_with("|A|Vocabulary/一人|882D9E")));

	let stamps: Vec<i64> = lines.iter().map(|l| l.split('|').next().unwrap().parse().unwrap()).collect();
	assert!(stamps.is_sorted());

	let by_level = gource::log(USERNAME, &items, gource::Grouping::Level);
	assert!(by_level.iter().any(|l| l.ends_with("|A|5/右|DD0093")));
}
