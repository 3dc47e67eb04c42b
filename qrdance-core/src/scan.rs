/// Camera request and decode-result handling for the QR scanner
use nalgebra::Point2;

use crate::composer::OverlaySize;
use crate::error::{QrDanceError, Result};

/// Which camera the browser should prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

/// min / ideal / max bound for one video dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionRange {
    pub min: u32,
    pub ideal: u32,
    pub max: u32,
}

impl DimensionRange {
    pub const fn new(min: u32, ideal: u32, max: u32) -> Self {
        Self { min, ideal, max }
    }
}

/// Stream request handed to the browser's media devices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub audio: bool,
    pub facing_mode: FacingMode,
    pub width: DimensionRange,
    pub height: DimensionRange,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            audio: false,
            facing_mode: FacingMode::Environment,
            width: DimensionRange::new(1024, 1920, 1920),
            height: DimensionRange::new(576, 1080, 1080),
        }
    }
}

/// Text and finder-pattern corners reported by the decoder
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub text: String,
    pub points: Vec<Point2<f32>>,
}

impl ScanResult {
    pub fn new(text: impl Into<String>, points: Vec<Point2<f32>>) -> Self {
        Self {
            text: text.into(),
            points,
        }
    }
}

/// Everything the decoder can call back with
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// Stream acquisition or decode pipeline failure
    Error(String),
    /// A frame was analysed and held no code
    NotFound,
    Decoded(ScanResult),
}

/// The four corners read from a decode result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorQuad {
    pub corners: [Point2<f32>; 4],
}

impl LocatorQuad {
    /// Take points 0..4 of a result, refusing results with fewer
    pub fn from_points(points: &[Point2<f32>]) -> Result<Self> {
        match points {
            [a, b, c, d, ..] => Ok(Self {
                corners: [*a, *b, *c, *d],
            }),
            _ => Err(QrDanceError::TooFewLocatorPoints {
                found: points.len(),
            }),
        }
    }
}

/// What handling a scan event amounted to
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Logged as a pipeline error, scanning continues
    Failed,
    /// Logged as an empty frame
    Empty,
    /// Result without any locator point, dropped without logging
    Discarded,
    /// Result with 1 to 3 points, logged and otherwise ignored
    Incomplete { found: usize },
    /// Four corners were read and logged
    Located(LocatorQuad),
}

/// Logs decoder callbacks and tracks the video surface size
#[derive(Debug, Default)]
pub struct ScanAdapter {
    constraints: CameraConstraints,
    video_size: Option<OverlaySize>,
}

impl ScanAdapter {
    pub fn new(constraints: CameraConstraints) -> Self {
        Self {
            constraints,
            video_size: None,
        }
    }

    pub fn constraints(&self) -> &CameraConstraints {
        &self.constraints
    }

    /// Route one decoder callback to the diagnostic log.
    /// `video_offset_left` is the video element's horizontal offset.
    pub fn handle(&mut self, event: ScanEvent, video_offset_left: f64) -> ScanOutcome {
        match event {
            ScanEvent::Error(message) => {
                log::warn!("scan error: {}", message);
                ScanOutcome::Failed
            }
            ScanEvent::NotFound => {
                log::debug!("scan: no code in frame");
                ScanOutcome::Empty
            }
            ScanEvent::Decoded(result) => Self::locate(&result, video_offset_left),
        }
    }

    fn locate(result: &ScanResult, video_offset_left: f64) -> ScanOutcome {
        if result.points.is_empty() {
            return ScanOutcome::Discarded;
        }

        log::info!("decoded {:?}", result.text);
        match LocatorQuad::from_points(&result.points) {
            Ok(quad) => {
                log::info!("video offset left = {}", video_offset_left);
                for (i, p) in quad.corners.iter().enumerate() {
                    log::info!("{} -----[{}]: {} , {}", result.points.len(), i, p.x, p.y);
                }
                ScanOutcome::Located(quad)
            }
            Err(e) => {
                log::info!("ignoring decode result: {}", e);
                ScanOutcome::Incomplete {
                    found: result.points.len(),
                }
            }
        }
    }

    /// Record the video's intrinsic size. Returns the new size only when it
    /// differs from the last one seen; zero sizes (no frame yet) are ignored.
    /// A stream that stops and drops to 0x0 therefore keeps the last size.
    pub fn observe_video_size(&mut self, width: u32, height: u32) -> Option<OverlaySize> {
        let size = OverlaySize::new(width, height).ok()?;
        if self.video_size == Some(size) {
            return None;
        }
        self.video_size = Some(size);
        Some(size)
    }

    pub fn video_size(&self) -> Option<OverlaySize> {
        self.video_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::Once;

    thread_local! {
        static CAPTURED: RefCell<Vec<String>> = RefCell::new(Vec::new());
    }

    // Records per test thread so parallel tests do not see each other's lines
    struct CaptureLogger;

    impl log::Log for CaptureLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            CAPTURED.with(|c| c.borrow_mut().push(record.args().to_string()));
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger;

    fn captured<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            log::set_logger(&LOGGER).expect("logger already installed");
            log::set_max_level(log::LevelFilter::Trace);
        });
        CAPTURED.with(|c| c.borrow_mut().clear());
        let result = f();
        let lines = CAPTURED.with(|c| c.borrow_mut().drain(..).collect());
        (result, lines)
    }

    fn points(n: usize) -> Vec<Point2<f32>> {
        (0..n).map(|i| Point2::new(i as f32 * 10.0, 5.0)).collect()
    }

    #[test]
    fn test_default_constraints() {
        let c = CameraConstraints::default();
        assert!(!c.audio);
        assert_eq!(c.facing_mode.as_str(), "environment");
        assert_eq!(c.width, DimensionRange::new(1024, 1920, 1920));
        assert_eq!(c.height, DimensionRange::new(576, 1080, 1080));
    }

    #[test]
    fn test_result_without_points_is_discarded() {
        let mut adapter = ScanAdapter::default();
        let event = ScanEvent::Decoded(ScanResult::new("hello", vec![]));
        let (outcome, lines) = captured(|| adapter.handle(event, 0.0));
        assert_eq!(outcome, ScanOutcome::Discarded);
        assert!(lines.is_empty(), "unexpected log output: {:?}", lines);
        assert_eq!(adapter.video_size(), None);
    }

    #[test]
    fn test_partial_results_are_guarded() {
        let mut adapter = ScanAdapter::default();
        for n in 1..4 {
            let event = ScanEvent::Decoded(ScanResult::new("hello", points(n)));
            let (outcome, lines) = captured(|| adapter.handle(event, 0.0));
            assert_eq!(outcome, ScanOutcome::Incomplete { found: n });
            assert!(!lines.iter().any(|l| l.contains("-----[")));
        }
    }

    #[test]
    fn test_four_points_are_located() {
        let mut adapter = ScanAdapter::default();
        let event = ScanEvent::Decoded(ScanResult::new("hello", points(5)));
        let (outcome, lines) = captured(|| adapter.handle(event, 12.0));
        assert!(lines.iter().any(|l| l == "video offset left = 12"));
        assert!(lines.iter().any(|l| l == "5 -----[3]: 30 , 5"));
        assert!(!lines.iter().any(|l| l.contains("-----[4]")));
        match outcome {
            ScanOutcome::Located(quad) => {
                assert_eq!(quad.corners[3], Point2::new(30.0, 5.0));
                assert_eq!(quad.corners[0], Point2::new(0.0, 5.0));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_errors_are_non_fatal() {
        let mut adapter = ScanAdapter::default();
        assert_eq!(
            adapter.handle(ScanEvent::Error("NotAllowedError".into()), 0.0),
            ScanOutcome::Failed
        );
        assert_eq!(adapter.handle(ScanEvent::NotFound, 0.0), ScanOutcome::Empty);
    }

    #[test]
    fn test_video_size_reported_on_change_only() {
        let mut adapter = ScanAdapter::default();
        assert_eq!(adapter.observe_video_size(0, 0), None);
        assert_eq!(
            adapter.observe_video_size(1920, 1080),
            Some(OverlaySize::new(1920, 1080).unwrap())
        );
        assert_eq!(adapter.observe_video_size(1920, 1080), None);
        assert_eq!(
            adapter.observe_video_size(1280, 720),
            Some(OverlaySize::new(1280, 720).unwrap())
        );
        assert_eq!(adapter.video_size(), OverlaySize::new(1280, 720).ok());
    }

    #[test]
    fn test_stopped_stream_keeps_last_size() {
        let mut adapter = ScanAdapter::default();
        adapter.observe_video_size(1280, 720);
        assert_eq!(adapter.observe_video_size(0, 0), None);
        assert_eq!(adapter.video_size(), OverlaySize::new(1280, 720).ok());
    }
}
