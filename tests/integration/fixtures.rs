//! rstest fixtures shared across test modules.

use rstest::fixture;
use serde_json::json;
use wkq::{Kind, Levels};

use crate::common::{HOUR, MockAccount, Sandbox, T0, record};

/// A level 5 user with items across the first two levels.
///
/// Level 5 is below 10, so [`Levels::All`] is requested as a single `1,2,3,4,5` segment.
#[fixture]
pub fn account() -> MockAccount {
	let account = MockAccount::new(5);
	let all = Levels::range(1, 5);

	account.serve(
		Kind::Radical,
		&all,
		vec![
			record(1, "丨", Some("guru"), T0 - 2 * HOUR),
			record(5, "口", Some("apprentice"), T0 + HOUR),
			json!({"character": null, "meaning": "stick", "level": 5, "user_specific": {"srs": "apprentice", "available_date": T0 + HOUR, "unlocked_date": T0 - HOUR, "burned_date": 0}}),
			record(5, "儿", None, 0),
		],
	);
	account.serve(
		Kind::Kanji,
		&all,
		vec![
			record(1, "一", Some("burned"), T0 - 100 * HOUR),
			record(2, "人", Some("enlighten"), T0 + 3 * HOUR),
			record(5, "右", Some("apprentice"), T0 + HOUR),
			record(5, "左", Some("guru"), T0 + HOUR),
			record(5, "石", None, 0),
		],
	);
	account.serve(
		Kind::Vocabulary,
		&all,
		vec![
			json!({"character": "一人", "kana": "ひとり", "meaning": "alone", "level": 2, "user_specific": {"srs": "master", "available_date": T0 - 2 * HOUR, "unlocked_date": T0 - 48 * HOUR, "burned_date": 0}}),
			json!({"character": "右口", "kana": "みぎぐち", "meaning": "right entrance", "level": 5, "user_specific": {"srs": "apprentice", "available_date": T0 + HOUR, "unlocked_date": T0 - HOUR, "burned_date": 0}}),
		],
	);

	account
}

#[fixture]
pub fn sandbox() -> Sandbox {
	Sandbox::new()
}
