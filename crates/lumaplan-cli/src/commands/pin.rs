//! Pin or unpin an entity's icon position

use super::{load_house, open_settings};
use anyhow::{bail, Result};
use lumaplan_core::{EntityCatalog, Point2};

pub struct PinArgs {
    pub house: String,
    pub entity: String,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub clear: bool,
}

pub fn run(args: PinArgs) -> Result<()> {
    let house = load_house(&args.house)?;
    let catalog = EntityCatalog::from_house(&house);
    let Some(entity) = catalog.find(&args.entity) else {
        bail!("Entity '{}' not found in {}", args.entity, args.house);
    };

    let mut settings = open_settings(&args.house)?;
    if args.clear {
        settings.clear_position(entity);
        settings.save()?;
        println!("Unpinned {}", entity.name);
        return Ok(());
    }

    let (Some(left), Some(top)) = (args.left, args.top) else {
        bail!("Both left and top are required to pin an entity");
    };
    if !left.is_finite() || !top.is_finite() {
        bail!("Position must be finite, got ({}, {})", left, top);
    }
    settings.pin_position(entity, Point2::new(left, top));
    settings.save()?;
    println!(
        "Pinned {} at ({:.2}%, {:.2}%) in {}",
        entity.name,
        left,
        top,
        settings.path().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::settings_path;
    use lumaplan_core::SettingsStore;

    const HOUSE: &str = r#"
[[furniture]]
kind = "piece"
id = "p1"
name = "light.desk"
x = 10.0
y = 10.0
light = true
"#;

    fn temp_house() -> (std::path::PathBuf, String) {
        let dir = std::env::temp_dir().join(format!("lumaplan_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("home.toml");
        std::fs::write(&path, HOUSE).unwrap();
        (dir, path.to_string_lossy().to_string())
    }

    fn args(house: &str, left: Option<f64>, top: Option<f64>, clear: bool) -> PinArgs {
        PinArgs {
            house: house.to_string(),
            entity: "light.desk".into(),
            left,
            top,
            clear,
        }
    }

    #[test]
    fn test_pin_then_clear() {
        let (dir, house) = temp_house();

        run(args(&house, Some(12.5), Some(40.0), false)).unwrap();
        let store = SettingsStore::open(settings_path(&house)).unwrap();
        assert_eq!(
            store.get("light.desk_p1").unwrap().position,
            Some(Point2::new(12.5, 40.0))
        );

        run(args(&house, None, None, true)).unwrap();
        let store = SettingsStore::open(settings_path(&house)).unwrap();
        assert_eq!(store.get("light.desk_p1").unwrap().position, None);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unknown_entity_is_an_error() {
        let (dir, house) = temp_house();
        let mut a = args(&house, Some(1.0), Some(1.0), false);
        a.entity = "light.missing".into();
        assert!(run(a).is_err());
        assert!(!settings_path(&house).exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
