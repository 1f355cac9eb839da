//! lumaplan Core - Foundational types for floor-plan generation
//!
//! This crate provides the types that every other lumaplan crate depends on:
//! - `House`, `Level`, `Room`, `FurnitureNode` - The 3D house model
//! - `CameraPose` - Immutable camera snapshot for a render pass
//! - `Entity`, `EntityCatalog` - Home-automation bindings
//! - `SettingsStore` - Persisted per-entity options
//! - `LumaplanConfig` - Layered configuration
//! - `ContentHash` - SHA-256 based content hashing
//! - Error types and Result alias

mod config;
mod entity;
mod error;
mod hash;
mod house;
mod scene;
mod settings;
mod types;

pub use config::{
    ClusterMode, ImageFormat, LayoutConfig, LightMixingMode, LumaplanConfig, OutputConfig,
    Quality, RenderConfig,
};
pub use entity::{is_home_assistant_entity, ClickableArea, Entity, EntityCatalog};
pub use error::{LumaplanError, Result};
pub use hash::ContentHash;
pub use house::{CameraPose, FurnitureNode, House, Level, Piece, Room};
pub use scene::{Scene, StateCondition};
pub use settings::{EntitySettings, SettingsStore};
pub use types::{Point2, WorldPoint};
