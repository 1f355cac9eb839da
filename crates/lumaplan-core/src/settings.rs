//! Persisted per-entity options

use crate::entity::{ClickableArea, Entity, EntityCatalog};
use crate::error::Result;
use crate::types::Point2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySettings {
    #[serde(default)]
    pub always_on: bool,
    #[serde(default)]
    pub is_rgb: bool,
    #[serde(default)]
    pub clickable_area: ClickableArea,
    /// User-pinned position in viewport percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point2>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    entities: BTreeMap<String, EntitySettings>,
}

/// TOML-backed settings keyed by `Entity::settings_key`
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    entries: BTreeMap<String, EntitySettings>,
}

impl SettingsStore {
    /// Open the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let file: SettingsFile = toml::from_str(&content)?;
            file.entities
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = SettingsFile {
            entities: self.entries.clone(),
        };
        std::fs::write(&self.path, toml::to_string_pretty(&file)?)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&EntitySettings> {
        self.entries.get(key)
    }

    pub fn entry(&mut self, key: &str) -> &mut EntitySettings {
        self.entries.entry(key.to_string()).or_default()
    }

    pub fn pin_position(&mut self, entity: &Entity, position: Point2) {
        self.entry(&entity.settings_key()).position = Some(position);
    }

    pub fn clear_position(&mut self, entity: &Entity) {
        if let Some(settings) = self.entries.get_mut(&entity.settings_key()) {
            settings.position = None;
        }
    }

    /// Copy stored options onto the catalog's entities.
    ///
    /// A stored position pins the entity.
    pub fn apply_to(&self, catalog: &mut EntityCatalog) {
        for entity in catalog.all_mut() {
            let Some(settings) = self.entries.get(&entity.settings_key()) else {
                continue;
            };
            entity.always_on = settings.always_on;
            entity.is_rgb = settings.is_rgb;
            entity.clickable_area = settings.clickable_area;
            if let Some(position) = settings.position {
                entity.pin(position);
            }
        }
    }
}
