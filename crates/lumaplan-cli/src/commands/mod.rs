//! CLI command implementations

pub mod layout;
pub mod pin;
pub mod plan;
pub mod render;
pub mod validate;

use anyhow::{Context, Result};
use lumaplan_core::{EntityCatalog, House, LumaplanConfig, SettingsStore};
use lumaplan_layout::LayoutPlan;
use std::path::{Path, PathBuf};

/// Layered config, or a single file when `--config` is given.
///
/// Environment overrides apply either way.
pub fn load_config(path: Option<&str>) -> Result<LumaplanConfig> {
    match path {
        Some(path) => {
            let mut config = LumaplanConfig::load_from_file(Path::new(path))
                .with_context(|| format!("Failed to load config {}", path))?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config.validate()?;
            Ok(config)
        }
        None => Ok(LumaplanConfig::load()?),
    }
}

pub fn load_house(path: &str) -> Result<House> {
    House::load(path).with_context(|| format!("Failed to load house {}", path))
}

/// Entity options live next to the house file: `home.toml` -> `home.settings.toml`
pub fn settings_path(house: &str) -> PathBuf {
    Path::new(house).with_extension("settings.toml")
}

pub fn open_settings(house: &str) -> Result<SettingsStore> {
    let path = settings_path(house);
    SettingsStore::open(&path).with_context(|| format!("Failed to read settings {}", path.display()))
}

/// Discover entities, apply stored options and compute the layout
pub fn build_plan(house_path: &str, house: House, config: LumaplanConfig) -> Result<LayoutPlan> {
    let mut catalog = EntityCatalog::from_house(&house);
    open_settings(house_path)?.apply_to(&mut catalog);
    Ok(LayoutPlan::new(house, catalog, config)?)
}

/// Print a serializable value as pretty JSON
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
