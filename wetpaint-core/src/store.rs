//! Persistence of per-ride configurations in the park save.
//!
//! Each ride is stored under its id as a flat JSON object:
//!
//! ```json
//! { "ride": 3, "colouringEnabled": true, "mode": "train",
//!   "trainModeProps": { "numberVehicleSets": 1, ... },
//!   "tailModeProps": { "numberOfTailSets": 2, ... } }
//! ```
//!
//! Both payloads are always written; the inactive one holds defaults.
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::config::{ModeKind, PaintConfig, PaintMode};
use crate::constants::SAVE_KEY;
use crate::error::StorageError;
use crate::host::{RideHost, RideId};
use crate::props::{TailModeProps, TrainModeProps};

/// Key-value store scoped to the park save.
pub trait PaintStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Stored configuration for a ride. Entries in an unrecognised shape read
    /// as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self, ride: RideId) -> Result<Option<PaintConfig>, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the configuration cannot be encoded or written.
    fn save(&self, config: &PaintConfig) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the entry cannot be removed.
    fn clear(&self, ride: RideId) -> Result<(), Self::Error>;
}

/// Flat stored form of [`PaintConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPaintConfig {
    pub ride: RideId,
    pub colouring_enabled: bool,
    pub mode: ModeKind,
    pub train_mode_props: TrainModeProps,
    pub tail_mode_props: TailModeProps,
}

impl From<&PaintConfig> for StoredPaintConfig {
    fn from(config: &PaintConfig) -> Self {
        let (train_mode_props, tail_mode_props) = match &config.mode {
            PaintMode::Train(props) => (props.clone(), TailModeProps::default()),
            PaintMode::Tail(props) => (TrainModeProps::default(), props.clone()),
        };
        Self {
            ride: config.ride,
            colouring_enabled: config.enabled,
            mode: config.mode.kind(),
            train_mode_props,
            tail_mode_props,
        }
    }
}

impl From<StoredPaintConfig> for PaintConfig {
    fn from(stored: StoredPaintConfig) -> Self {
        let mode = match stored.mode {
            ModeKind::Train => PaintMode::Train(stored.train_mode_props),
            ModeKind::Tail => PaintMode::Tail(stored.tail_mode_props),
        };
        Self {
            ride: stored.ride,
            enabled: stored.colouring_enabled,
            mode,
        }
    }
}

/// Encode a configuration into its stored JSON form.
///
/// # Errors
///
/// Returns [`StorageError::Serde`] if encoding fails.
pub fn encode(config: &PaintConfig) -> Result<Value, StorageError> {
    Ok(serde_json::to_value(StoredPaintConfig::from(config))?)
}

/// Decode a stored entry. Entries written before per-set counts existed, or in
/// any other unrecognised shape, are discarded with a warning.
#[must_use]
pub fn decode(ride: RideId, value: Value) -> Option<PaintConfig> {
    let has_set_count = value
        .get("trainModeProps")
        .and_then(|props| props.get("numberVehicleSets"))
        .is_some();
    if !has_set_count {
        warn!("ignoring stored configuration for ride {ride}: legacy shape");
        return None;
    }
    match serde_json::from_value::<StoredPaintConfig>(value) {
        Ok(stored) => Some(stored.into()),
        Err(err) => {
            warn!("ignoring stored configuration for ride {ride}: {err}");
            None
        }
    }
}

/// Load every stored configuration for rides that exist in the park. With
/// `reset`, each ride's entry is cleared first, which leaves nothing to load.
///
/// # Errors
///
/// Returns the storage error if any read or clear fails.
pub fn load_all<S: PaintStorage, H: RideHost>(
    storage: &S,
    host: &H,
    reset: bool,
) -> Result<Vec<PaintConfig>, S::Error> {
    let mut configs = Vec::new();
    for ride in host.ride_ids() {
        if reset {
            storage.clear(ride)?;
        }
        if !host.ride_exists(ride) {
            continue;
        }
        if let Some(config) = storage.load(ride)? {
            debug!("loaded configuration for ride {ride}");
            configs.push(config);
        }
    }
    Ok(configs)
}

/// Park storage held in memory. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<String, Value>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored entry for a ride.
    #[must_use]
    pub fn raw(&self, ride: RideId) -> Option<Value> {
        self.entries.borrow().get(&ride.to_string()).cloned()
    }

    /// Write a raw entry, bypassing encoding.
    pub fn insert_raw(&self, ride: RideId, value: Value) {
        self.entries.borrow_mut().insert(ride.to_string(), value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Whole namespace as it would appear in the park file.
    #[must_use]
    pub fn export(&self) -> Value {
        let entries: serde_json::Map<String, Value> = self
            .entries
            .borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let mut root = serde_json::Map::new();
        root.insert(SAVE_KEY.to_string(), Value::Object(entries));
        Value::Object(root)
    }
}

impl PaintStorage for MemoryStorage {
    type Error = StorageError;

    fn load(&self, ride: RideId) -> Result<Option<PaintConfig>, Self::Error> {
        Ok(self.raw(ride).and_then(|value| decode(ride, value)))
    }

    fn save(&self, config: &PaintConfig) -> Result<(), Self::Error> {
        let value = encode(config)?;
        self.insert_raw(config.ride, value);
        Ok(())
    }

    fn clear(&self, ride: RideId) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(&ride.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::{PatternChoice, PatternValue, SetCount};
    use serde_json::json;

    #[test]
    fn stored_shape_uses_flat_keys() {
        let config = PaintConfig::new(RideId(3)).with_enabled(true);
        let value = encode(&config).unwrap();
        assert_eq!(value["ride"], 3);
        assert_eq!(value["colouringEnabled"], true);
        assert_eq!(value["mode"], "train");
        assert_eq!(value["trainModeProps"]["numberVehicleSets"], 1);
        assert_eq!(value["tailModeProps"]["numberOfTailSets"], 2);
    }

    #[test]
    fn tail_config_survives_storage() {
        let storage = MemoryStorage::new();
        let mut tail = TailModeProps::default();
        tail.set_number_of_tail_sets(SetCount::THREE);
        tail.add_to_pattern(PatternChoice::After, PatternValue::new(2).unwrap());
        let config = PaintConfig::new(RideId(8))
            .with_enabled(true)
            .with_mode(PaintMode::Tail(tail));
        storage.save(&config).unwrap();
        assert_eq!(storage.load(RideId(8)).unwrap(), Some(config));
        assert_eq!(storage.load(RideId(9)).unwrap(), None);
    }

    #[test]
    fn legacy_entries_are_ignored() {
        let storage = MemoryStorage::new();
        let mut value = encode(&PaintConfig::new(RideId(2))).unwrap();
        value["trainModeProps"]
            .as_object_mut()
            .unwrap()
            .remove("numberVehicleSets");
        storage.insert_raw(RideId(2), value);
        assert_eq!(storage.load(RideId(2)).unwrap(), None);

        storage.insert_raw(RideId(4), json!({ "ride": 4, "colouringEnabled": "yes" }));
        assert_eq!(storage.load(RideId(4)).unwrap(), None);
    }

    #[test]
    fn export_nests_entries_under_save_key() {
        let storage = MemoryStorage::new();
        storage.save(&PaintConfig::new(RideId(1))).unwrap();
        let exported = storage.export();
        assert_eq!(exported[SAVE_KEY]["1"]["mode"], "train");
        storage.clear(RideId(1)).unwrap();
        assert!(storage.is_empty());
    }
}
