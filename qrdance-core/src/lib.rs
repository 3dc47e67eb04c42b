/// QrDance Core Library - Platform-independent logic for the QR dance demo
///
/// This library holds the animation catalog and cycler, the mixer
/// abstraction, decode-result handling for the camera scanner, and the root
/// view state. The web crate binds these to the browser.

pub mod catalog;
pub mod composer;
pub mod config;
pub mod error;
pub mod mixer;
pub mod projection;
pub mod scan;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use catalog::{AnimationCatalog, AnimationEntry, BASE_MESH};
pub use composer::{Layer, OverlaySize, RootComposer};
pub use config::{SceneConfig, ViewerConfig};
pub use error::{QrDanceError, Result};
pub use mixer::{AnimationAction, AnimationMixer, ClipAction, ClipInfo, ClipMixer};
pub use projection::SceneCamera;
pub use scan::{CameraConstraints, FacingMode, LocatorQuad, ScanAdapter, ScanEvent, ScanOutcome, ScanResult};
pub use transform::ModelPlacement;
pub use viewer::{ModelViewer, Transition};
