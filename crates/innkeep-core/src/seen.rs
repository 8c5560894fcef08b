//! Durable set of booking ids the operator has already been shown.

use std::{collections::HashSet, sync::Arc};

use tracing::{debug, info, warn};

use crate::{domain::BookingId, errors::Error, ports::KeyValueStore, Result};

/// Store key holding the JSON array of seen ids.
pub const SEEN_BOOKINGS_KEY: &str = "admin_seen_bookings";

/// Seen-ID set. Ids are only ever added; insertion order is kept for the
/// persisted array.
pub struct SeenBookings {
    order: Vec<String>,
    index: HashSet<String>,
    store: Arc<dyn KeyValueStore>,
}

impl SeenBookings {
    /// Loads the set from `store`. Unreadable or malformed data yields an
    /// empty set, which sends the next poll down the cold-start path.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let reader = store.clone();
        let raw = match tokio::task::spawn_blocking(move || reader.get(SEEN_BOOKINGS_KEY)).await
        {
            Ok(Ok(v)) => v,
            Ok(Err(e)) => {
                warn!(error = %e, "failed to read seen bookings, starting empty");
                None
            }
            Err(e) => {
                warn!(error = %e, "seen bookings reader panicked, starting empty");
                None
            }
        };

        let ids = match raw.as_deref().map(parse_ids) {
            Some(Ok(ids)) => ids,
            Some(Err(e)) => {
                warn!(error = %e, "seen bookings cache is malformed, starting empty");
                Vec::new()
            }
            None => Vec::new(),
        };

        let mut seen = Self {
            order: Vec::with_capacity(ids.len()),
            index: HashSet::with_capacity(ids.len()),
            store,
        };
        for id in ids {
            seen.push(id);
        }
        if !seen.is_empty() {
            info!(count = seen.len(), "loaded previously seen bookings");
        }
        seen
    }

    pub fn contains(&self, id: &BookingId) -> bool {
        self.index.contains(id.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// Adds `ids` and persists the whole set as one step.
    ///
    /// The set is written before the in-memory copy is updated. When the
    /// write fails the ids are still recorded in memory (so this process will
    /// not alert for them again) and the error is returned for logging.
    pub async fn insert_all_and_persist(
        &mut self,
        ids: impl IntoIterator<Item = BookingId>,
    ) -> Result<usize> {
        let fresh: Vec<String> = {
            let mut batch = HashSet::new();
            ids.into_iter()
                .map(|id| id.0)
                .filter(|id| !self.index.contains(id) && batch.insert(id.clone()))
                .collect()
        };
        if fresh.is_empty() {
            return Ok(0);
        }

        let mut next = self.order.clone();
        next.extend(fresh.iter().cloned());
        let txt = serde_json::to_string(&next)?;

        let store = self.store.clone();
        let written = tokio::task::spawn_blocking(move || store.set(SEEN_BOOKINGS_KEY, &txt))
            .await
            .map_err(|e| Error::External(format!("seen bookings writer failed: {e}")))
            .and_then(|r| r);

        let added = fresh.len();
        for id in fresh {
            self.push(id);
        }
        debug!(added, total = self.len(), "recorded seen bookings");

        written.map(|_| added)
    }

    fn push(&mut self, id: String) {
        if self.index.insert(id.clone()) {
            self.order.push(id);
        }
    }
}

fn parse_ids(raw: &str) -> Result<Vec<String>> {
    let v: serde_json::Value = serde_json::from_str(raw)?;
    let serde_json::Value::Array(items) = v else {
        return Err(Error::InvalidInput(
            "seen bookings must be a JSON array".to_string(),
        ));
    };
    items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            other => Err(Error::InvalidInput(format!(
                "unexpected seen booking entry: {other}"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn loads_strings_and_numbers() {
        let store = Arc::new(MemoryStore::with_entry(SEEN_BOOKINGS_KEY, "[\"1\", 2]"));
        let seen = SeenBookings::load(store).await;
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&BookingId::from("1")));
        assert!(seen.contains(&BookingId::from("2")));
    }

    #[tokio::test]
    async fn malformed_cache_falls_back_to_empty() {
        for bad in ["{oops", "{\"1\": true}", "[null]"] {
            let store = Arc::new(MemoryStore::with_entry(SEEN_BOOKINGS_KEY, bad));
            let seen = SeenBookings::load(store).await;
            assert!(seen.is_empty(), "{bad}");
        }
    }

    #[tokio::test]
    async fn inserts_are_persisted_in_order_without_duplicates() {
        let store = Arc::new(MemoryStore::with_entry(SEEN_BOOKINGS_KEY, "[\"1\"]"));
        let mut seen = SeenBookings::load(store.clone()).await;

        let added = seen
            .insert_all_and_persist(["1", "3", "2", "3"].map(BookingId::from))
            .await
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(seen.ids(), &["1", "3", "2"]);

        let persisted = store.get(SEEN_BOOKINGS_KEY).unwrap().unwrap();
        assert_eq!(persisted, "[\"1\",\"3\",\"2\"]");

        let reloaded = SeenBookings::load(store).await;
        assert_eq!(reloaded.ids(), seen.ids());
    }

    #[tokio::test]
    async fn failed_persist_still_records_in_memory() {
        let mut seen = SeenBookings::load(Arc::new(FailingStore)).await;
        let res = seen
            .insert_all_and_persist([BookingId::from("9")])
            .await;
        assert!(res.is_err());
        assert!(seen.contains(&BookingId::from("9")));
    }
}
