//! Splitting "all levels" requests into segments, and how the stream behaves when one fails.

use rstest::rstest;
use serde_json::{Value, json};
use wkq::{Error, Kind, Levels, levels::segments};

use crate::common::{MockAccount, T0, envelope, record, url};

/// One kanji per level of each segment.
fn serve_segments(account: &MockAccount) -> Vec<Levels> {
	let segs = segments(account.level);
	for seg in &segs {
		let Levels::Only(levels) = seg else { unreachable!() };
		account.serve(Kind::Kanji, seg, levels.iter().map(|&l| record(l, &format!("字{l}"), Some("guru"), T0 + i64::from(l))).collect());
	}
	segs
}

#[test]
fn test_level_37_fetches_three_balanced_segments() {
	let account = MockAccount::new(37);
	serve_segments(&account);

	let items: Vec<_> = account.client().fetch(Kind::Kanji, &Levels::All).unwrap().collect::<Result<_, _>>().unwrap();

	let levels: Vec<u32> = items.iter().map(|i| i.level).collect();
	assert_eq!(levels, (1..=37).collect::<Vec<_>>());

	let requests = account.requests();
	assert_eq!(requests.len(), 4);
	assert_eq!(requests[0], "user-information");
	let sizes: Vec<usize> = requests[1..].iter().map(|r| r.trim_start_matches("kanji/").split(',').count()).collect();
	assert_eq!(sizes, vec![13, 12, 12]);
}

#[rstest]
#[case(1, 1)]
#[case(9, 1)]
#[case(10, 1)]
#[case(19, 1)]
#[case(20, 2)]
#[case(37, 3)]
#[case(60, 6)]
fn test_segments_cover_every_level_once(#[case] level: u32, #[case] expected_segments: usize) {
	let account = MockAccount::new(level);
	let segs = serve_segments(&account);
	assert_eq!(segs.len(), expected_segments);

	let items: Vec<_> = account.client().fetch(Kind::Kanji, &Levels::All).unwrap().collect::<Result<_, _>>().unwrap();
	let mut levels: Vec<u32> = items.iter().map(|i| i.level).collect();
	levels.sort_unstable();
	assert_eq!(levels, (1..=level).collect::<Vec<_>>());
	assert_eq!(account.requests().len(), expected_segments + 1);
}

#[test]
fn test_failed_segment_ends_stream_after_partial_results() {
	let account = MockAccount::new(37);
	let segs = serve_segments(&account);
	account.fail(Kind::Kanji, &segs[1], 502);

	let client = account.client();
	let mut records = client.fetch(Kind::Kanji, &Levels::All).unwrap();
	let results: Vec<_> = records.by_ref().collect();

	assert_eq!(results.len(), 14);
	assert!(results[..13].iter().all(Result::is_ok));
	assert!(matches!(results[13], Err(Error::Remote { status: Some(502), .. })));
	assert!(records.next().is_none());

	// the third segment is never requested
	assert_eq!(account.requests().len(), 3);
}

#[test]
fn test_segments_are_requested_lazily() {
	let account = MockAccount::new(37);
	serve_segments(&account);

	let client = account.client();
	let mut records = client.fetch(Kind::Kanji, &Levels::All).unwrap();
	assert_eq!(account.requests(), vec!["user-information"]);

	let first = records.next().unwrap().unwrap();
	assert_eq!(first.level, 1);
	assert_eq!(account.requests().len(), 2);
}

#[test]
fn test_explicit_levels_skip_the_profile() {
	let account = MockAccount::new(37);
	let levels: Levels = "3-4,9".parse().unwrap();
	account.serve(Kind::Radical, &levels, vec![record(3, "工", Some("master"), T0)]);

	let items: Vec<_> = account.client().fetch(Kind::Radical, &levels).unwrap().collect::<Result<_, _>>().unwrap();
	assert_eq!(items.len(), 1);
	assert_eq!(account.requests(), vec!["radicals/3,4,9"]);

	let nothing: Vec<_> = account.client().fetch(Kind::Radical, &Levels::Only(vec![])).unwrap().collect();
	assert!(nothing.is_empty());
	assert_eq!(account.requests().len(), 1);
}

#[test]
fn test_grouped_vocabulary_envelope() {
	let account = MockAccount::new(2);
	let records: Vec<Value> = vec![record(1, "一つ", Some("guru"), T0), record(2, "二つ", Some("apprentice"), T0)];
	account.transport.respond(url("vocabulary", Some("1,2")), envelope(2, json!({"general": records})));

	let items: Vec<_> = account.client().fetch(Kind::Vocabulary, &Levels::All).unwrap().collect::<Result<_, _>>().unwrap();
	assert_eq!(items.iter().map(|i| i.character.as_deref().unwrap()).collect::<Vec<_>>(), vec!["一つ", "二つ"]);
}
