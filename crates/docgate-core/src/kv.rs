//! Embedded key-value adapter (sled)
//!
//! One handle is opened per process and shared by cloning; sled keeps the
//! underlying tree behind an `Arc`. Keys are ordered by their UTF-8 bytes.

use crate::codec::{deserialize_array, serialize_array};
use crate::error::{CoreError, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

#[derive(Clone)]
pub struct KvStore {
    db: sled::Db,
    read_only: bool,
}

impl KvStore {
    /// Open (creating if missing) the store at `path`.
    ///
    /// A read-only store still opens the on-disk tree but refuses every write.
    pub fn open(path: impl AsRef<Path>, read_only: bool) -> Result<Self> {
        let path = path.as_ref();
        info!(
            "Opening KV store at: {} (read_only={})",
            path.display(),
            read_only
        );

        let db = sled::Config::new().path(path).open()?;

        info!("KV store opened, {} entries", db.len());
        Ok(Self { db, read_only })
    }

    /// Throwaway store removed on drop
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self {
            db,
            read_only: false,
        })
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Store an integer array as comma-delimited text
    pub fn put(&self, key: &str, value: &[i32]) -> Result<()> {
        self.ensure_writable()?;
        self.db.insert(key, serialize_array(value).as_bytes())?;
        debug!("Stored array under '{}' ({} items)", key, value.len());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<i32>>> {
        match self.get_text(key)? {
            Some(text) => Ok(Some(deserialize_array(&text)?)),
            None => Ok(None),
        }
    }

    /// Delete a key; deleting an absent key is not an error
    pub fn remove(&self, key: &str) -> Result<()> {
        self.ensure_writable()?;
        self.db.remove(key)?;
        debug!("Removed '{}'", key);
        Ok(())
    }

    /// Store a document as compact JSON and flush it to disk before returning
    pub fn put_json(&self, key: &str, value: &Value) -> Result<()> {
        self.ensure_writable()?;
        let text = serde_json::to_string(value)?;
        self.db.insert(key, text.as_bytes())?;
        self.db.flush()?;
        debug!("Stored document under '{}' ({} bytes)", key, text.len());
        Ok(())
    }

    pub fn get_json(&self, key: &str) -> Result<Option<Value>> {
        match self.get_text(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// All keys in ascending order
    pub fn keys(&self) -> Result<Vec<String>> {
        self.db
            .iter()
            .keys()
            .map(|k| -> Result<String> {
                let k = k?;
                Ok(String::from_utf8_lossy(&k).into_owned())
            })
            .collect()
    }

    /// Flush pending writes to disk, returning the number of bytes written
    pub fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    fn get_text(&self, key: &str) -> Result<Option<String>> {
        let Some(raw) = self.db.get(key)? else {
            return Ok(None);
        };
        let text = std::str::from_utf8(&raw)
            .map_err(|_| CoreError::InvalidUtf8(key.to_string()))?
            .to_string();
        Ok(Some(text))
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(CoreError::ReadOnly);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_operations() {
        let store = KvStore::temporary().unwrap();

        store.put("nums", &[1, 2, 3]).unwrap();
        assert_eq!(store.get("nums").unwrap(), Some(vec![1, 2, 3]));

        store.put("empty", &[]).unwrap();
        assert_eq!(store.get("empty").unwrap(), Some(vec![]));

        assert_eq!(store.get("missing").unwrap(), None);

        store.remove("nums").unwrap();
        assert_eq!(store.get("nums").unwrap(), None);

        // Removing twice is fine
        store.remove("nums").unwrap();
    }

    #[test]
    fn test_json_operations() {
        let store = KvStore::temporary().unwrap();
        let doc = json!({ "billing_date": "2025-03-25", "da_code": 7 });

        store.put_json("bill-1", &doc).unwrap();
        assert_eq!(store.get_json("bill-1").unwrap(), Some(doc));
        assert_eq!(store.get_json("bill-2").unwrap(), None);
    }

    #[test]
    fn test_array_read_of_json_value_fails() {
        let store = KvStore::temporary().unwrap();
        store.put_json("doc", &json!({ "a": 1 })).unwrap();

        assert!(matches!(store.get("doc"), Err(CoreError::Codec(_))));
    }

    #[test]
    fn test_keys_are_ordered() {
        let store = KvStore::temporary().unwrap();
        assert!(store.is_empty());

        for key in ["charlie", "alpha", "bravo"] {
            store.put_json(key, &json!({})).unwrap();
        }

        assert_eq!(store.keys().unwrap(), vec!["alpha", "bravo", "charlie"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_reopen_and_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv");

        {
            let store = KvStore::open(&path, false).unwrap();
            store.put_json("persisted", &json!({ "n": 1 })).unwrap();
        }

        let store = KvStore::open(&path, true).unwrap();
        assert!(store.is_read_only());
        assert_eq!(store.get_json("persisted").unwrap(), Some(json!({ "n": 1 })));
        assert!(matches!(
            store.put_json("other", &json!({})),
            Err(CoreError::ReadOnly)
        ));
        assert!(matches!(store.remove("persisted"), Err(CoreError::ReadOnly)));
        assert!(matches!(store.put("nums", &[1]), Err(CoreError::ReadOnly)));
    }
}
