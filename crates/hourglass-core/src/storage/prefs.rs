//! Persisted bulb levels.

use crate::error::{DatabaseError, Result};
use crate::timer::Sandglass;

use super::Database;

pub const KEY_MILLIS_LEFT: &str = "millisLeftValue";
pub const KEY_MILLIS_PASSED: &str = "millisPassedValue";

/// App-private key-value store of signed 64-bit integers.
pub trait PersistentStore {
    /// Stored value, or `default` when the key was never written.
    fn get_i64(&self, key: &str, default: i64) -> Result<i64>;

    fn put_i64(&self, key: &str, value: i64) -> Result<()>;
}

impl PersistentStore for Database {
    fn get_i64(&self, key: &str, default: i64) -> Result<i64> {
        match self.kv_get(key)? {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                DatabaseError::CorruptValue {
                    key: key.to_string(),
                    value: raw,
                }
                .into()
            }),
            None => Ok(default),
        }
    }

    fn put_i64(&self, key: &str, value: i64) -> Result<()> {
        self.kv_set(key, &value.to_string())?;
        Ok(())
    }
}

/// Read both bulbs, defaulting to a full upper bulb.
pub fn load_sandglass<S: PersistentStore + ?Sized>(store: &S, capacity_ms: i64) -> Result<Sandglass> {
    let remaining = store.get_i64(KEY_MILLIS_LEFT, capacity_ms)?;
    let elapsed = store.get_i64(KEY_MILLIS_PASSED, 0)?;
    Ok(Sandglass::restore(capacity_ms, remaining, elapsed))
}

/// Write both bulbs.
pub fn save_sandglass<S: PersistentStore + ?Sized>(store: &S, glass: &Sandglass) -> Result<()> {
    store.put_i64(KEY_MILLIS_LEFT, glass.remaining_ms())?;
    store.put_i64(KEY_MILLIS_PASSED, glass.elapsed_ms())?;
    Ok(())
}
