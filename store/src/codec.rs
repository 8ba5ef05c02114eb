//! Record encoding (bincode) on top of [`KvStore`].

use crate::{KvStore, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    Ok(bincode::serialize(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    Ok(bincode::deserialize(bytes)?)
}

pub fn put_record<T: Serialize>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    store.put(key, &encode(value)?)
}

pub fn get_record<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<T, StoreError> {
    decode(&store.get(key)?)
}

/// Decode every record under `prefix`, in key order.
pub fn load_prefix<T: DeserializeOwned>(
    store: &dyn KvStore,
    prefix: &str,
) -> Result<Vec<T>, StoreError> {
    store
        .iterate_prefix(prefix)?
        .into_iter()
        .map(|(_, bytes)| decode(&bytes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore(Mutex<BTreeMap<String, Vec<u8>>>);

    impl KvStore for MapStore {
        fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
            self.0.lock().unwrap().insert(key.to_string(), value.to_vec());
            Ok(())
        }

        fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
            self.0
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(key.to_string()))
        }

        fn iterate_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .range(prefix.to_string()..)
                .take_while(|(k, _)| k.starts_with(prefix))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect())
        }
    }

    #[test]
    fn records_round_trip_through_store() {
        let store = MapStore::default();
        put_record(&store, "n/1", &(1u64, "one".to_string())).unwrap();
        put_record(&store, "n/2", &(2u64, "two".to_string())).unwrap();
        put_record(&store, "m/1", &(9u64, "other".to_string())).unwrap();

        let one: (u64, String) = get_record(&store, "n/1").unwrap();
        assert_eq!(one.1, "one");
        let all: Vec<(u64, String)> = load_prefix(&store, "n/").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].0, 2);
    }

    #[test]
    fn missing_and_corrupt_records() {
        let store = MapStore::default();
        let err = get_record::<u64>(&store, "nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(err.kind(), triad_types::ErrorKind::NotFound);

        store.put("bad", &[1]).unwrap();
        let err = get_record::<u64>(&store, "bad").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
