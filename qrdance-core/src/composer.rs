/// Root view state shared between the scanner and the viewer
use crate::error::{QrDanceError, Result};

/// Pixel size of the canvas overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySize {
    pub width: u32,
    pub height: u32,
}

impl OverlaySize {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(QrDanceError::InvalidOverlaySize { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for OverlaySize {
    fn default() -> Self {
        Self {
            width: 300,
            height: 200,
        }
    }
}

/// Elements of the root view, bottom to top
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Video,
    Canvas,
    NameOverlay,
}

impl Layer {
    pub const STACK: [Layer; 3] = [Layer::Video, Layer::Canvas, Layer::NameOverlay];
}

/// Holds the two state slots of the root view.
/// Setters return whether the value changed so the host can skip redraws.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootComposer {
    action_name: String,
    overlay_size: OverlaySize,
}

impl RootComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    pub fn overlay_size(&self) -> OverlaySize {
        self.overlay_size
    }

    pub fn set_action_name(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.action_name == name {
            return false;
        }
        self.action_name = name;
        true
    }

    pub fn set_size(&mut self, size: OverlaySize) -> bool {
        if self.overlay_size == size {
            return false;
        }
        self.overlay_size = size;
        true
    }

    /// Inline style pinning the canvas over the video at the origin
    pub fn canvas_style(&self) -> String {
        format!(
            "position: absolute; left: 0px; top: 0px; width: {}px; height: {}px;",
            self.overlay_size.width, self.overlay_size.height
        )
    }
}
