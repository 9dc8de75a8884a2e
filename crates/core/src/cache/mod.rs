//! Per-day on-disk snapshot cache of the combined table.
//!
//! One CSV file per day, named `combined_<key>_<YYYYMMDD>.csv`. It supports:
//!
//! - Validity checks on read (required columns, non-empty city/country)
//! - Temp-file-then-rename writes
//! - Cleanup of every other day's snapshot, skipped in cache-only mode
//! - Best-effort semantics: I/O failures read as "no cache"

pub mod key;
pub mod row;
pub mod store;
pub mod tag;

pub use key::{compute_city_list_key, dataset_key};
pub use row::REQUIRED_COLUMNS;
pub use store::{CacheStore, Snapshot};
pub use tag::{Clock, DayTag, FixedClock, SystemClock};
