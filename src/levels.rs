//! Level selection and splitting of large level spans into request-sized segments.

use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// Which curriculum levels a collection request covers.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Levels {
	/// Every level up to and including the user's current one.
	#[default]
	All,
	/// An explicit list, sent as a comma-separated path segment.
	Only(Vec<u32>),
}

impl Levels {
	pub fn single(level: u32) -> Self {
		Self::Only(vec![level])
	}

	/// Contiguous inclusive range, `first..=last`.
	pub fn range(first: u32, last: u32) -> Self {
		Self::Only((first..=last).collect())
	}

	/// Path segment for the request, `None` for [`Levels::All`].
	pub fn path_segment(&self) -> Option<String> {
		match self {
			Levels::All => None,
			Levels::Only(levels) => Some(levels.iter().map(u32::to_string).collect::<Vec<_>>().join(",")),
		}
	}
}

impl fmt::Display for Levels {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.path_segment() {
			Some(s) => f.write_str(&s),
			None => f.write_str("all"),
		}
	}
}

/// Accepts `all`, `3`, `1,2,5` and ranges like `1-10` (mixable: `1-3,7`).
impl FromStr for Levels {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let s = s.trim();
		if s.is_empty() || s.eq_ignore_ascii_case("all") {
			return Ok(Levels::All);
		}

		let mut levels = Vec::new();
		for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
			match part.split_once('-') {
				Some((a, b)) => {
					let (a, b) = (parse_level(a)?, parse_level(b)?);
					if a > b {
						return Err(Error::Config(format!("descending level range {part:?}")));
					}
					levels.extend(a..=b);
				}
				None => levels.push(parse_level(part)?),
			}
		}
		Ok(Levels::Only(levels))
	}
}

fn parse_level(s: &str) -> Result<u32> {
	match s.trim().parse::<u32>() {
		Ok(0) | Err(_) => Err(Error::Config(format!("invalid level {s:?}, expected a positive integer"))),
		Ok(n) => Ok(n),
	}
}

/// Split `1..=current_level` into `max(1, current_level / 10)` contiguous segments
/// whose sizes differ by at most one. Larger segments come first.
///
/// A user at level 0 (never happens on the live service) yields no segments.
pub fn segments(current_level: u32) -> Vec<Levels> {
	if current_level == 0 {
		return Vec::new();
	}
	let count = (current_level / 10).max(1);
	let base = current_level / count;
	let remainder = current_level % count;

	let mut out = Vec::with_capacity(count as usize);
	let mut start = 1;
	for i in 0..count {
		let size = base + u32::from(i < remainder);
		out.push(Levels::range(start, start + size - 1));
		start += size;
	}
	out
}
