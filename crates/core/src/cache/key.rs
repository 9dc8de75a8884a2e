//! Dataset key generation for snapshot file names.

use sha2::{Digest, Sha256};

const HASHED_KEY_LEN: usize = 12;

/// Pick the key a snapshot of `cities` is stored under.
///
/// The configured key is used when `cities` is the configured list (ignoring
/// order, case and surrounding whitespace); any other selection gets a short
/// content-derived key so it never adopts the default list's snapshot.
pub fn dataset_key(cities: &[String], configured_cities: &[String], configured_key: &str) -> String {
    if normalize(cities) == normalize(configured_cities) {
        configured_key.to_string()
    } else {
        compute_city_list_key(cities)
    }
}

/// Hex prefix of the SHA-256 of the normalized city list.
pub fn compute_city_list_key(cities: &[String]) -> String {
    let mut hasher = Sha256::new();
    for city in normalize(cities) {
        hasher.update(city.as_bytes());
        hasher.update(b"\n");
    }
    let mut key = hex::encode(hasher.finalize());
    key.truncate(HASHED_KEY_LEN);
    key
}

fn normalize(cities: &[String]) -> Vec<String> {
    let mut out: Vec<String> = cities
        .iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}
