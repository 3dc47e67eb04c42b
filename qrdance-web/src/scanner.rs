/// Camera stream and QR decoding through the browser's `BarcodeDetector`
use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Object, Reflect};
use nalgebra::Point2;
use qrdance_core::scan::DimensionRange;
use qrdance_core::{CameraConstraints, OverlaySize, ScanAdapter, ScanEvent, ScanResult};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlVideoElement, MediaStream, MediaStreamConstraints, MediaStreamTrack};

#[wasm_bindgen]
extern "C" {
    type BarcodeDetector;

    #[wasm_bindgen(constructor, catch)]
    fn new(options: &JsValue) -> Result<BarcodeDetector, JsValue>;

    #[wasm_bindgen(method)]
    fn detect(this: &BarcodeDetector, source: &HtmlVideoElement) -> js_sys::Promise;

    type DetectedBarcode;

    #[wasm_bindgen(method, getter, js_name = rawValue)]
    fn raw_value(this: &DetectedBarcode) -> String;

    #[wasm_bindgen(method, getter, js_name = cornerPoints)]
    fn corner_points(this: &DetectedBarcode) -> Array;

    type CornerPoint;

    #[wasm_bindgen(method, getter)]
    fn x(this: &CornerPoint) -> f32;

    #[wasm_bindgen(method, getter)]
    fn y(this: &CornerPoint) -> f32;
}

// HTMLMediaElement.HAVE_CURRENT_DATA
const HAVE_CURRENT_DATA: u16 = 2;

fn range_to_js(range: &DimensionRange) -> Result<Object, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &"min".into(), &range.min.into())?;
    Reflect::set(&obj, &"ideal".into(), &range.ideal.into())?;
    Reflect::set(&obj, &"max".into(), &range.max.into())?;
    Ok(obj)
}

fn constraints_to_js(constraints: &CameraConstraints) -> Result<MediaStreamConstraints, JsValue> {
    let video = Object::new();
    Reflect::set(
        &video,
        &"facingMode".into(),
        &constraints.facing_mode.as_str().into(),
    )?;
    let width = range_to_js(&constraints.width)?;
    let height = range_to_js(&constraints.height)?;
    Reflect::set(&video, &"width".into(), &width)?;
    Reflect::set(&video, &"height".into(), &height)?;

    let request = MediaStreamConstraints::new();
    request.set_audio(&JsValue::from_bool(constraints.audio));
    request.set_video(&video);
    Ok(request)
}

async fn open_stream(
    video: &HtmlVideoElement,
    constraints: &CameraConstraints,
) -> Result<MediaStream, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("missing window"))?;
    let devices = window.navigator().media_devices()?;
    let promise = devices.get_user_media_with_constraints(&constraints_to_js(constraints)?)?;
    let stream: MediaStream = JsFuture::from(promise).await?.dyn_into()?;

    video.set_src_object(Some(&stream));
    video.set_muted(true);
    video.set_attribute("playsinline", "")?;
    JsFuture::from(video.play()?).await?;
    Ok(stream)
}

fn to_scan_event(outcome: Result<JsValue, JsValue>) -> ScanEvent {
    let found = match outcome {
        Ok(found) => Array::from(&found),
        Err(e) => return ScanEvent::Error(format!("{e:?}")),
    };
    if found.length() == 0 {
        return ScanEvent::NotFound;
    }

    let barcode: DetectedBarcode = found.get(0).unchecked_into();
    let points = barcode
        .corner_points()
        .iter()
        .map(|p| {
            let p: CornerPoint = p.unchecked_into();
            Point2::new(p.x(), p.y())
        })
        .collect();
    ScanEvent::Decoded(ScanResult::new(barcode.raw_value(), points))
}

/// Scan side of the root view: owns the video element, the camera stream
/// and the decoder, and feeds decoder callbacks through a `ScanAdapter`.
pub struct Scanner {
    video: HtmlVideoElement,
    adapter: ScanAdapter,
    stream: Option<MediaStream>,
    detector: Option<BarcodeDetector>,
    in_flight: bool,
    closed: bool,
}

impl Scanner {
    pub fn new(video: HtmlVideoElement, constraints: CameraConstraints) -> Self {
        Self {
            video,
            adapter: ScanAdapter::new(constraints),
            stream: None,
            detector: None,
            in_flight: false,
            closed: false,
        }
    }

    /// Acquire the camera and create the decoder. Failures are logged and
    /// leave the scanner idle; the rest of the page keeps running.
    pub async fn open(scanner: Rc<RefCell<Scanner>>) {
        let (video, constraints) = {
            let s = scanner.borrow();
            (s.video.clone(), *s.adapter.constraints())
        };

        let stream = open_stream(&video, &constraints).await;
        let detector = {
            let options = Object::new();
            let formats = Array::of1(&"qr_code".into());
            Reflect::set(&options, &"formats".into(), &formats)
                .and_then(|_| BarcodeDetector::new(&options))
        };

        let mut s = scanner.borrow_mut();
        match stream {
            Ok(stream) if s.closed => stop_tracks(&stream),
            Ok(stream) => s.stream = Some(stream),
            Err(e) => {
                s.adapter.handle(ScanEvent::Error(format!("{e:?}")), 0.0);
            }
        }
        match detector {
            Ok(detector) => s.detector = Some(detector),
            Err(e) => {
                s.adapter.handle(ScanEvent::Error(format!("{e:?}")), 0.0);
            }
        }
    }

    /// Intrinsic video size, reported only when it changed
    pub fn poll_size(&mut self) -> Option<OverlaySize> {
        self.adapter
            .observe_video_size(self.video.video_width(), self.video.video_height())
    }

    /// Start one detection on the current frame unless one is still running
    pub fn poll_decode(scanner: &Rc<RefCell<Scanner>>) {
        let promise = {
            let mut s = scanner.borrow_mut();
            if s.closed || s.in_flight || s.video.ready_state() < HAVE_CURRENT_DATA {
                return;
            }
            let Some(detector) = s.detector.as_ref() else {
                return;
            };
            let promise = detector.detect(&s.video);
            s.in_flight = true;
            promise
        };

        let scanner = Rc::clone(scanner);
        spawn_local(async move {
            let event = to_scan_event(JsFuture::from(promise).await);
            let mut s = scanner.borrow_mut();
            s.in_flight = false;
            if s.closed {
                return;
            }
            let offset_left = f64::from(s.video.offset_left());
            s.adapter.handle(event, offset_left);
        });
    }

    /// Release the camera. Pending detections are dropped on arrival.
    pub fn close(&mut self) {
        self.closed = true;
        self.detector = None;
        if let Some(stream) = self.stream.take() {
            stop_tracks(&stream);
        }
        self.video.set_src_object(None);
    }
}

fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn path(value: &JsValue, keys: &[&str]) -> JsValue {
        keys.iter().fold(value.clone(), |v, k| {
            Reflect::get(&v, &(*k).into()).unwrap()
        })
    }

    #[wasm_bindgen_test]
    fn test_constraints_carry_dimension_ranges() {
        let request = constraints_to_js(&CameraConstraints::default()).unwrap();

        assert_eq!(path(&request, &["audio"]).as_bool(), Some(false));
        assert_eq!(
            path(&request, &["video", "facingMode"]).as_string().as_deref(),
            Some("environment")
        );
        assert_eq!(path(&request, &["video", "width", "min"]).as_f64(), Some(1024.0));
        assert_eq!(path(&request, &["video", "width", "ideal"]).as_f64(), Some(1920.0));
        assert_eq!(path(&request, &["video", "height", "min"]).as_f64(), Some(576.0));
        assert_eq!(path(&request, &["video", "height", "max"]).as_f64(), Some(1080.0));
    }
}
