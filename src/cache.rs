//! Client-local persisted state: JSON files under a cache directory.
//!
//! Two kinds of entries live here: resource bundles keyed `resources_<topic>`
//! and the last-selected topic id under `current_topic_id`. Reads and writes
//! are synchronous and unsynchronized; last writer wins.
//!
//! Resource entries carry a timestamp and a max-age policy instead of living
//! forever; an expired entry reads as absent until regenerated.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

/// Default max age for cached resource bundles: one week.
const DEFAULT_MAX_AGE_HOURS: i64 = 168;

#[derive(Serialize, Deserialize)]
struct Entry<T> {
    saved_at: DateTime<Utc>,
    value: T,
}

#[derive(Clone)]
pub struct LocalCache {
    dir: PathBuf,
    max_age: Duration,
}

impl LocalCache {
    /// Cache rooted at CACHE_DIR (default "./cache"), with max age from
    /// RESOURCE_CACHE_MAX_AGE_HOURS when set.
    pub fn from_env() -> Self {
        let dir = std::env::var("CACHE_DIR").unwrap_or_else(|_| "./cache".into());
        let hours = std::env::var("RESOURCE_CACHE_MAX_AGE_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_MAX_AGE_HOURS);
        Self::new(dir, Duration::hours(hours))
    }

    pub fn new(dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self { dir: dir.into(), max_age }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys come from topic ids; strip anything that isn't filename-safe.
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    /// Read a timestamped entry; expired or unreadable entries read as None.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let entry: Entry<T> = read_json(&path)?;
        if Utc::now() - entry.saved_at > self.max_age {
            debug!(target: "sciencespark_backend", %key, "Cache entry expired");
            return None;
        }
        Some(entry.value)
    }

    /// Write a timestamped entry, overwriting any prior value for the key.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        let entry = Entry { saved_at: Utc::now(), value };
        self.write_json(key, &entry);
    }

    /// Last-selected topic id. Plain UI state; no expiry applies.
    pub fn current_topic(&self) -> Option<String> {
        read_json(&self.path_for("current_topic_id"))
    }

    pub fn set_current_topic(&self, topic_id: Option<&str>) {
        match topic_id {
            Some(id) => self.write_json("current_topic_id", &id),
            None => {
                let _ = std::fs::remove_file(self.path_for("current_topic_id"));
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(target: "sciencespark_backend", error = %e, "Failed to create cache dir");
            return;
        }
        match serde_json::to_vec_pretty(value) {
            Ok(bytes) => {
                if let Err(e) = std::fs::write(self.path_for(key), bytes) {
                    warn!(target: "sciencespark_backend", %key, error = %e, "Cache write failed");
                }
            }
            Err(e) => warn!(target: "sciencespark_backend", %key, error = %e, "Cache serialize failed"),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = std::fs::read(path).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceBundle;
    use uuid::Uuid;

    fn temp_cache(max_age: Duration) -> LocalCache {
        let dir = std::env::temp_dir().join(format!("sciencespark-cache-{}", Uuid::new_v4()));
        LocalCache::new(dir, max_age)
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = temp_cache(Duration::hours(1));
        let bundle = ResourceBundle {
            key_concepts: vec!["Newton's laws".into()],
            australian_connection: "CSIRO".into(),
            ..Default::default()
        };
        cache.put("resources_forces", &bundle);
        let got: ResourceBundle = cache.get("resources_forces").expect("cached");
        assert_eq!(got.key_concepts, bundle.key_concepts);
        assert_eq!(got.australian_connection, "CSIRO");
    }

    #[test]
    fn expired_entries_read_as_absent() {
        let cache = temp_cache(Duration::zero() - Duration::seconds(1));
        cache.put("resources_energy", &ResourceBundle::default());
        assert!(cache.get::<ResourceBundle>("resources_energy").is_none());
    }

    #[test]
    fn overwrite_replaces_not_merges() {
        let cache = temp_cache(Duration::hours(1));
        let first = ResourceBundle { key_concepts: vec!["a".into(), "b".into()], ..Default::default() };
        let second = ResourceBundle { key_concepts: vec!["c".into()], ..Default::default() };
        cache.put("resources_change", &first);
        cache.put("resources_change", &second);
        let got: ResourceBundle = cache.get("resources_change").expect("cached");
        assert_eq!(got.key_concepts, vec!["c".to_string()]);
    }

    #[test]
    fn current_topic_set_get_clear() {
        let cache = temp_cache(Duration::hours(1));
        assert!(cache.current_topic().is_none());
        cache.set_current_topic(Some("forces"));
        assert_eq!(cache.current_topic().as_deref(), Some("forces"));
        cache.set_current_topic(None);
        assert!(cache.current_topic().is_none());
    }
}
