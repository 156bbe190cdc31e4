//! WaniKani progress queries: fetch item collections, filter them into review schedules, and
//! render those as reports, calendars or gource logs.

pub mod calendar;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gource;
pub mod item;
pub mod levels;
pub mod query;
pub mod report;
pub mod schedule;

// Re-export the core types at crate root for convenience
pub use error::{Error, Result};
pub use fetch::{Cache, CachingTransport, Client, DiskCache, HttpTransport, LevelProgress, MemoryCache, MockTransport, Profile, Records, Transport};
pub use item::{Item, Kind, ReviewState, SrsStage};
pub use levels::Levels;
pub use query::Query;
pub use schedule::{KindCounts, Schedule};
