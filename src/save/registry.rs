use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::{errors::SaveError, models::ComponentData};

/// A component whose state goes into the save file
///
/// `Data` is the component's own schema: the registry serializes it on save
/// and deserializes exactly that type on load.
pub trait Saveable {
    type Data: Serialize + DeserializeOwned;

    /// Key the component's data is stored under
    fn save_key(&self) -> String;

    fn save_data(&self) -> Self::Data;

    fn load_save_data(&mut self, data: Self::Data);
}

/// Type-erased view of a registered saveable
trait SaveSlot {
    fn key(&self) -> String;

    fn collect(&self) -> Result<Value, SaveError>;

    fn restore(&self, value: &Value) -> Result<(), SaveError>;

    /// Address of the shared component, used as its identity
    fn target(&self) -> *const ();
}

struct Slot<S>(Rc<RefCell<S>>);

impl<S: Saveable> SaveSlot for Slot<S> {
    fn key(&self) -> String {
        self.0
            .try_borrow()
            .map(|s| s.save_key())
            .unwrap_or_else(|_| "<borrowed>".to_string())
    }

    fn collect(&self) -> Result<Value, SaveError> {
        let component = self.0.try_borrow().map_err(|e| SaveError::Component {
            key: self.key(),
            reason: e.to_string(),
        })?;
        Ok(serde_json::to_value(component.save_data())?)
    }

    fn restore(&self, value: &Value) -> Result<(), SaveError> {
        let key = self.key();
        let data: S::Data =
            serde_json::from_value(value.clone()).map_err(|e| SaveError::Component {
                key: key.clone(),
                reason: e.to_string(),
            })?;
        let mut component = self
            .0
            .try_borrow_mut()
            .map_err(|e| SaveError::Component {
                key,
                reason: e.to_string(),
            })?;
        component.load_save_data(data);
        Ok(())
    }

    fn target(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

fn is_empty_data(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Registry of saveable components plus free-form global data
///
/// Global data lives next to component data in the save file: on collect it
/// overrides a component with the same key, on load every entry of the file
/// is remembered as global data so it survives the next save even when no
/// component claims it.
#[derive(Default)]
pub struct SaveDataRegistry {
    saveables: RefCell<Vec<Box<dyn SaveSlot>>>,
    global_data: RefCell<BTreeMap<String, Map<String, Value>>>,
}

impl SaveDataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&self) {
        info!("SaveDataRegistry initialized");
    }

    /// Register a component; registering the same component twice is ignored
    pub fn register_saveable<S: Saveable + 'static>(&self, saveable: &Rc<RefCell<S>>) {
        let target = Rc::as_ptr(saveable) as *const ();
        let mut saveables = self.saveables.borrow_mut();

        if saveables.iter().any(|slot| slot.target() == target) {
            debug!("Saveable component already registered");
            return;
        }

        let slot = Slot(Rc::clone(saveable));
        info!(key = %slot.key(), "Registered saveable component");
        saveables.push(Box::new(slot));
    }

    pub fn unregister_saveable<S: Saveable + 'static>(&self, saveable: &Rc<RefCell<S>>) {
        let target = Rc::as_ptr(saveable) as *const ();
        let mut saveables = self.saveables.borrow_mut();

        if let Some(index) = saveables.iter().position(|slot| slot.target() == target) {
            let slot = saveables.remove(index);
            info!(key = %slot.key(), "Unregistered saveable component");
        }
    }

    /// Snapshot every component, then overlay global data
    ///
    /// A component that fails to serialize is skipped with a warning.
    pub fn collect_all_save_data(&self) -> ComponentData {
        let mut all = ComponentData::new();

        for slot in self.saveables.borrow().iter() {
            match slot.collect() {
                Ok(value) if is_empty_data(&value) => {}
                Ok(value) => {
                    all.insert(slot.key(), value);
                }
                Err(e) => warn!(key = %slot.key(), error = %e, "Skipping component save data"),
            }
        }

        for (key, data) in self.global_data.borrow().iter() {
            all.insert(key.clone(), Value::Object(data.clone()));
        }

        info!(components = all.len(), "Collected save data");
        all
    }

    /// Hand each registered component its stored data and keep everything as global data
    ///
    /// Since global data wins on collect, a loaded component's entry is saved
    /// back unchanged until `clear_global_data` drops that key.
    pub fn load_all_save_data(&self, all: &ComponentData) {
        if all.is_empty() {
            warn!("No save data to load");
        }

        for slot in self.saveables.borrow().iter() {
            let key = slot.key();
            if let Some(value) = all.get(&key) {
                if let Err(e) = slot.restore(value) {
                    warn!(key = %key, error = %e, "Failed to load component save data");
                }
            }
        }

        let mut global = self.global_data.borrow_mut();
        global.clear();
        for (key, value) in all {
            match value {
                Value::Object(map) => {
                    global.insert(key.clone(), map.clone());
                }
                _ => debug!(key = %key, "Non-object save entry not kept as global data"),
            }
        }

        info!(components = all.len(), "Loaded save data");
    }

    pub fn set_global_data<T: Serialize>(
        &self,
        key: &str,
        data_key: &str,
        value: &T,
    ) -> Result<(), SaveError> {
        let value = serde_json::to_value(value)?;
        self.global_data
            .borrow_mut()
            .entry(key.to_string())
            .or_default()
            .insert(data_key.to_string(), value);
        Ok(())
    }

    /// Read a global value as `T`; a value of a different shape reads as `None`
    pub fn get_global_data<T: DeserializeOwned>(&self, key: &str, data_key: &str) -> Option<T> {
        let global = self.global_data.borrow();
        let value = global.get(key)?.get(data_key)?;

        match serde_json::from_value::<T>(value.clone()) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(
                    key = %key,
                    data_key = %data_key,
                    expected = std::any::type_name::<T>(),
                    error = %e,
                    "Failed to convert global data"
                );
                None
            }
        }
    }

    pub fn get_global_data_or<T: DeserializeOwned>(
        &self,
        key: &str,
        data_key: &str,
        default: T,
    ) -> T {
        self.get_global_data(key, data_key).unwrap_or(default)
    }

    pub fn has_global_data(&self, key: &str, data_key: &str) -> bool {
        self.global_data
            .borrow()
            .get(key)
            .is_some_and(|data| data.contains_key(data_key))
    }

    /// Clear one key, or everything when `key` is `None`
    pub fn clear_global_data(&self, key: Option<&str>) {
        let mut global = self.global_data.borrow_mut();
        match key {
            None => {
                global.clear();
                info!("Cleared all global save data");
            }
            Some(key) => {
                if global.remove(key).is_some() {
                    info!(key = %key, "Cleared global save data");
                }
            }
        }
    }

    pub fn registered_keys(&self) -> Vec<String> {
        self.saveables.borrow().iter().map(|slot| slot.key()).collect()
    }
}
