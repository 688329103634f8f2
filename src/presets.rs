//! Named snapshots of the campaign form, persisted as one JSON mapping.

use crate::campaign::{CampaignForm, CampaignType};
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const PRESETS_KEY: &str = "campaignPresets";
pub const PRESET_PLACEHOLDER: &str = "Load a preset...";

/// String key-value persistence.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<K: KvStore + ?Sized> KvStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Preset {
    #[serde(default)]
    pub campaign: String,
    #[serde(default)]
    pub template: String,
    #[serde(default, rename = "imageUrl")]
    pub image_url: String,
}

impl Preset {
    pub fn snapshot(form: &CampaignForm) -> Self {
        Self {
            campaign: form
                .campaign
                .map(|c| c.wire_name().to_string())
                .unwrap_or_else(|| crate::campaign::CAMPAIGN_PLACEHOLDER.to_string()),
            template: form.template_name.clone(),
            image_url: form.image_url.clone(),
        }
    }

    pub fn to_form(&self) -> CampaignForm {
        CampaignForm {
            campaign: CampaignType::from_wire(&self.campaign),
            template_name: self.template.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

pub struct PresetStore<S: KvStore> {
    store: S,
}

impl<S: KvStore> PresetStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn read(&self) -> Result<BTreeMap<String, Preset>, StoreError> {
        match self.store.get(PRESETS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(BTreeMap::new()),
        }
    }

    fn write(&mut self, presets: &BTreeMap<String, Preset>) -> Result<(), StoreError> {
        let json = serde_json::to_string(presets)?;
        self.store.set(PRESETS_KEY, &json)
    }

    /// Saves under `name`, replacing any previous entry. Returns `false`
    /// without touching the store when the name is blank.
    pub fn save(&mut self, name: &str, preset: Preset) -> Result<bool, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        let mut presets = self.read()?;
        presets.insert(name.to_string(), preset);
        self.write(&presets)?;
        Ok(true)
    }

    pub fn load(&self, name: &str) -> Result<Option<Preset>, StoreError> {
        Ok(self.read()?.remove(name))
    }

    pub fn delete(&mut self, name: &str) -> Result<bool, StoreError> {
        let mut presets = self.read()?;
        if presets.remove(name).is_none() {
            return Ok(false);
        }
        self.write(&presets)?;
        Ok(true)
    }

    pub fn names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read()?.into_keys().collect())
    }

    /// Dropdown labels, placeholder first.
    pub fn labels(&self) -> Result<Vec<String>, StoreError> {
        let mut labels = vec![PRESET_PLACEHOLDER.to_string()];
        labels.extend(self.names()?);
        Ok(labels)
    }
}
