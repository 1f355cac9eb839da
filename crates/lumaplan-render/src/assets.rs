//! On-disk render cache and derived floor-plan assets

use crate::compose::transparent_image;
use image::{RgbImage, RgbaImage};
use lumaplan_core::{ContentHash, ImageFormat, LumaplanError, OutputConfig, Result, Scene};
use std::fs;
use std::path::{Path, PathBuf};

/// Background placeholder written at render size
pub const TRANSPARENT_IMAGE_NAME: &str = "transparent";

pub const DOCUMENT_NAME: &str = "floorplan.json";

/// Path under which clients fetch floor-plan assets
const URL_PREFIX: &str = "/local/floorplan";

/// Raw frames live in `renders/`, everything clients load in `floorplan/`.
/// Asset names may carry a scene directory (`night/base`).
#[derive(Debug, Clone)]
pub struct AssetStore {
    renders_dir: PathBuf,
    floorplan_dir: PathBuf,
    reuse: bool,
}

impl AssetStore {
    pub fn new(output: &OutputConfig, reuse: bool) -> Self {
        Self::with_dirs(output.renders_dir(), output.floorplan_dir(), reuse)
    }

    pub fn with_dirs(renders_dir: PathBuf, floorplan_dir: PathBuf, reuse: bool) -> Self {
        Self {
            renders_dir,
            floorplan_dir,
            reuse,
        }
    }

    pub fn renders_dir(&self) -> &Path {
        &self.renders_dir
    }

    pub fn floorplan_dir(&self) -> &Path {
        &self.floorplan_dir
    }

    /// Create both directories, plus the scene's subdirectories when it has a name
    pub fn prepare_scene_dirs(&self, scene: &Scene) -> Result<()> {
        fs::create_dir_all(self.renders_dir.join(&scene.name))?;
        fs::create_dir_all(self.floorplan_dir.join(&scene.name))?;
        Ok(())
    }

    pub fn render_path(&self, name: &str) -> PathBuf {
        self.renders_dir.join(format!("{}.png", name))
    }

    pub fn asset_path(&self, name: &str, extension: &str) -> PathBuf {
        self.floorplan_dir.join(format!("{}.{}", name, extension))
    }

    pub fn document_path(&self) -> PathBuf {
        self.floorplan_dir.join(DOCUMENT_NAME)
    }

    /// A previously rendered frame of the expected size.
    ///
    /// Only consulted when reuse is enabled. Unreadable or mis-sized files
    /// count as missing and get rendered again.
    pub fn load_render(&self, name: &str, width: u32, height: u32) -> Option<RgbImage> {
        if !self.reuse {
            return None;
        }
        let path = self.render_path(name);
        if !path.exists() {
            return None;
        }
        match image::open(&path) {
            Ok(img) if img.width() == width && img.height() == height => Some(img.to_rgb8()),
            Ok(img) => {
                log::warn!(
                    "Cached render {} is {}x{}, expected {}x{}, rendering again",
                    path.display(),
                    img.width(),
                    img.height(),
                    width,
                    height
                );
                None
            }
            Err(e) => {
                log::warn!(
                    "Failed to read cached render {}: {}, rendering again",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    pub fn save_render(&self, name: &str, frame: &RgbImage) -> Result<()> {
        let path = self.render_path(name);
        ensure_parent(&path)?;
        frame.save_with_format(&path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Write a frame as a floor-plan asset, returning the extension used
    pub fn save_frame(&self, name: &str, frame: &RgbImage, format: ImageFormat) -> Result<&'static str> {
        let extension = format.extension();
        let path = self.asset_path(name, extension);
        ensure_parent(&path)?;
        let codec = match format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        };
        frame.save_with_format(&path, codec)?;
        Ok(extension)
    }

    /// Write an image with transparency; always PNG
    pub fn save_png(&self, name: &str, image: &RgbaImage) -> Result<()> {
        let path = self.asset_path(name, "png");
        ensure_parent(&path)?;
        image.save_with_format(&path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Client URL of an asset, versioned with the hash of its bytes
    pub fn versioned_url(&self, name: &str, extension: &str) -> Result<String> {
        let path = self.asset_path(name, extension);
        let hash = ContentHash::from_file(&path).map_err(|e| {
            LumaplanError::AssetError(format!("Failed to hash {}: {}", path.display(), e))
        })?;
        Ok(hash.versioned_url(&format!(
            "{}/{}.{}",
            URL_PREFIX,
            name.replace('\\', "/"),
            extension
        )))
    }

    /// Write the render-sized transparent background
    pub fn write_transparent(&self, width: u32, height: u32) -> Result<()> {
        self.save_png(TRANSPARENT_IMAGE_NAME, &transparent_image(width, height))
    }

    /// Transparent hit-target image of a room-sized entity.
    ///
    /// An existing file is kept when reuse is enabled and its dimensions
    /// already match. Returns the asset name.
    pub fn ensure_marker(&self, entity: &str, width: u32, height: u32) -> Result<String> {
        let name = format!("{}_{}", TRANSPARENT_IMAGE_NAME, entity);
        let path = self.asset_path(&name, "png");
        if self.reuse && path.exists() {
            match image::image_dimensions(&path) {
                Ok(dims) if dims == (width, height) => return Ok(name),
                Ok(_) => {}
                Err(e) => log::warn!(
                    "Failed to read marker {}: {}, writing it again",
                    path.display(),
                    e
                ),
            }
        }
        self.save_png(&name, &transparent_image(width, height))?;
        Ok(name)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn temp_store(reuse: bool) -> (PathBuf, AssetStore) {
        let dir = std::env::temp_dir().join(format!("lumaplan_test_{}", uuid::Uuid::new_v4()));
        let store = AssetStore::with_dirs(dir.join("renders"), dir.join("floorplan"), reuse);
        (dir, store)
    }

    #[test]
    fn test_render_cache_round_trip() {
        let (dir, store) = temp_store(true);
        let frame = RgbImage::from_pixel(4, 3, Rgb([9, 8, 7]));
        store.save_render("night/base", &frame).unwrap();
        assert!(dir.join("renders").join("night").join("base.png").exists());

        assert_eq!(store.load_render("night/base", 4, 3), Some(frame));
        // wrong size means render again
        assert!(store.load_render("night/base", 5, 3).is_none());
        assert!(store.load_render("missing", 4, 3).is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unreadable_cache_is_treated_as_missing() {
        let (dir, store) = temp_store(true);
        fs::create_dir_all(store.renders_dir()).unwrap();
        fs::write(store.render_path("base"), b"not a png").unwrap();
        assert!(store.load_render("base", 4, 3).is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_reuse_disabled_ignores_cache() {
        let (dir, store) = temp_store(false);
        store.save_render("base", &RgbImage::new(2, 2)).unwrap();
        assert!(store.load_render("base", 2, 2).is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_versioned_url_tracks_content() {
        let (dir, store) = temp_store(true);
        let ext = store
            .save_frame("light.a", &RgbImage::from_pixel(2, 2, Rgb([1, 1, 1])), ImageFormat::Png)
            .unwrap();
        assert_eq!(ext, "png");
        let first = store.versioned_url("light.a", ext).unwrap();
        assert!(first.starts_with("/local/floorplan/light.a.png?version="));

        store
            .save_frame("light.a", &RgbImage::from_pixel(2, 2, Rgb([2, 2, 2])), ImageFormat::Png)
            .unwrap();
        assert_ne!(first, store.versioned_url("light.a", "png").unwrap());

        let jpg = store
            .save_frame("base", &RgbImage::new(2, 2), ImageFormat::Jpeg)
            .unwrap();
        assert_eq!(jpg, "jpg");
        assert!(store.asset_path("base", "jpg").exists());

        assert!(matches!(
            store.versioned_url("missing", "png"),
            Err(LumaplanError::AssetError(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_marker_reused_only_when_size_matches() {
        let (dir, store) = temp_store(true);
        let name = store.ensure_marker("light.a", 20, 10).unwrap();
        assert_eq!(name, "transparent_light.a");
        let path = store.asset_path(&name, "png");
        assert_eq!(image::image_dimensions(&path).unwrap(), (20, 10));

        let before = fs::metadata(&path).unwrap().len();
        store.ensure_marker("light.a", 20, 10).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), before);

        store.ensure_marker("light.a", 10, 20).unwrap();
        assert_eq!(image::image_dimensions(&path).unwrap(), (10, 20));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_transparent_background() {
        let (dir, store) = temp_store(true);
        store.write_transparent(8, 6).unwrap();
        let img = image::open(store.asset_path(TRANSPARENT_IMAGE_NAME, "png"))
            .unwrap()
            .to_rgba8();
        assert_eq!(img.dimensions(), (8, 6));
        assert!(img.pixels().all(|p| p[3] == 0));
        let _ = fs::remove_dir_all(&dir);
    }
}
