//! Renderer trait and the per-frame request handed to it

use crate::progress::CancelToken;
use crate::state::{EntityStateSource, StateSnapshot};
use image::RgbImage;
use lumaplan_core::{CameraPose, Quality, Result, Scene};
use std::collections::{BTreeMap, BTreeSet};

/// Lighting and visibility of one frame, read from the state source after
/// the orchestrator prepared it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameRequest {
    pub scene: String,
    /// Milliseconds since the epoch, when the scene fixes a time of day
    pub render_time: Option<i64>,
    pub quality: Quality,
    /// Light pieces with a non-zero power
    pub powered: BTreeMap<String, f64>,
    /// Pieces not drawn in this frame
    pub hidden: BTreeSet<String>,
}

impl FrameRequest {
    /// Read the current state of every captured piece
    pub fn capture<S: EntityStateSource + ?Sized>(
        source: &S,
        pieces: &StateSnapshot,
        scene: &Scene,
        quality: Quality,
    ) -> Self {
        let mut request = Self {
            scene: scene.name.clone(),
            render_time: scene.render_time,
            quality,
            ..Default::default()
        };
        for id in pieces.piece_ids() {
            if source.is_visible(id) == Some(false) {
                request.hidden.insert(id.to_string());
                continue;
            }
            if let Some(power) = source.light_power(id).filter(|p| *p > 0.0) {
                request.powered.insert(id.to_string(), power);
            }
        }
        request
    }

    pub fn is_powered(&self, piece_id: &str) -> bool {
        self.powered.contains_key(piece_id)
    }
}

/// An external photo renderer.
///
/// `render` blocks until the frame is filled. Implementations should poll
/// `cancel` during long renders and return `LumaplanError::Interrupted`
/// once it fires. `dispose` releases whatever the renderer holds between
/// passes.
pub trait PhotoRenderer {
    /// Renderer name (e.g. "schematic")
    fn name(&self) -> &str;

    fn render(
        &mut self,
        frame: &mut RgbImage,
        camera: &CameraPose,
        request: &FrameRequest,
        cancel: &CancelToken,
    ) -> Result<()>;

    fn dispose(&mut self);
}
