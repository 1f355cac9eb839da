//! Lumaplan Render - combinatorial light renders and derived floor-plan assets
//!
//! Drives a [`PhotoRenderer`] through every light combination of a
//! [`lumaplan_layout::LayoutPlan`], caches the raw frames, derives overlay and
//! tint images and writes the floor-plan layout document.

mod assets;
mod compose;
mod document;
mod orchestrator;
mod progress;
mod renderer;
mod schematic;
mod state;

pub use assets::{AssetStore, DOCUMENT_NAME, TRANSPARENT_IMAGE_NAME};
pub use compose::{diff_overlay, hsb_to_rgb, opaque, pixel_difference, red_tint, transparent_image};
pub use document::{placement_order, ClickableRect, EntityPlacement, FloorplanDocument, ImageLayer};
pub use orchestrator::{RenderOrchestrator, RenderPhase, RenderSummary};
pub use progress::{CancelToken, RenderProgress};
pub use renderer::{FrameRequest, PhotoRenderer};
pub use schematic::SchematicRenderer;
pub use state::{EntityStateSource, PieceState, StateGuard, StateSnapshot};
