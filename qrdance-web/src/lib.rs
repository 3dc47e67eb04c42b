/// QrDance Web - camera QR scanner with a dancing character overlay
///
/// `mount` builds the page under a root element, opens the rear camera,
/// loads the character and its dance clips, and drives everything from a
/// `requestAnimationFrame` loop until `unmount` is called.

mod mixer;
mod scanner;
mod stage;
mod three;
mod timer;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use qrdance_core::{
    AnimationCatalog, CameraConstraints, ModelPlacement, ModelViewer, QrDanceError,
    RootComposer, SceneConfig, ViewerConfig,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlElement;

use mixer::ThreeMixer;
use scanner::Scanner;
use stage::{SceneView, Stage};
use timer::Timeout;

fn to_js(err: QrDanceError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("missing window"))
}

struct Runtime {
    composer: RootComposer,
    stage: Stage,
    scene: SceneView,
    scanner: Rc<RefCell<Scanner>>,
    viewer: Option<ModelViewer<ThreeMixer>>,
    first_play: Option<Timeout>,
    last_frame_ms: Option<f64>,
    frame_id: Option<i32>,
    mounted: bool,
}

impl Runtime {
    fn frame(&mut self, now_ms: f64) -> Result<(), JsValue> {
        let delta = self
            .last_frame_ms
            .map(|last| ((now_ms - last) / 1000.0).max(0.0) as f32)
            .unwrap_or(0.0);
        self.last_frame_ms = Some(now_ms);

        let mut dirty = false;
        let resized = self.scanner.borrow_mut().poll_size();
        if let Some(size) = resized {
            if self.composer.set_size(size) {
                self.scene.resize(size);
                dirty = true;
            }
        }

        if let Some(viewer) = self.viewer.as_mut() {
            if let Some(transition) = viewer.frame(delta).map_err(to_js)? {
                dirty |= self.composer.set_action_name(transition.label);
            }
        }

        if dirty {
            self.stage.apply(&self.composer)?;
        }

        Scanner::poll_decode(&self.scanner);
        self.scene.render();
        Ok(())
    }

    fn model_loaded(runtime: &Rc<RefCell<Runtime>>, mixer: ThreeMixer) -> Result<(), JsValue> {
        let mut rt = runtime.borrow_mut();
        if !rt.mounted {
            return Ok(());
        }

        rt.scene.add(mixer.root());
        let (viewer, transition) =
            ModelViewer::new(AnimationCatalog::dances(), mixer, ViewerConfig::default())
                .map_err(to_js)?;
        let delay = viewer.config().first_play_delay;
        rt.viewer = Some(viewer);
        if rt.composer.set_action_name(transition.label) {
            rt.stage.apply(&rt.composer)?;
        }

        let weak = Rc::downgrade(runtime);
        rt.first_play = Some(Timeout::new(delay, move || {
            if let Some(runtime) = weak.upgrade() {
                if let Some(viewer) = runtime.borrow_mut().viewer.as_mut() {
                    viewer.play_initial();
                }
            }
        })?);
        Ok(())
    }

    /// Release everything the page holds. Safe to call more than once.
    fn teardown(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        self.mounted = false;
        // Dropping the timeout clears it
        self.first_play = None;
        if let (Some(id), Ok(window)) = (self.frame_id.take(), window()) {
            if let Err(e) = window.cancel_animation_frame(id) {
                log::debug!("cancelAnimationFrame: {e:?}");
            }
        }
        self.scanner.borrow_mut().close();
        if let Some(viewer) = self.viewer.take() {
            let mixer = viewer.dispose();
            self.scene.remove(mixer.root());
        }
        self.scene.dispose();
        self.stage.remove();
        true
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn schedule_frame(runtime: &Weak<RefCell<Runtime>>, callback: &FrameCallback) -> Result<(), JsValue> {
    let Some(runtime) = runtime.upgrade() else {
        return Ok(());
    };
    let mut rt = runtime.borrow_mut();
    if !rt.mounted {
        return Ok(());
    }
    if let Some(cb) = callback.borrow().as_ref() {
        rt.frame_id = Some(window()?.request_animation_frame(cb.as_ref().unchecked_ref())?);
    }
    Ok(())
}

/// Handle returned to the page; keeps the render loop alive
#[wasm_bindgen]
pub struct QrDanceApp {
    runtime: Rc<RefCell<Runtime>>,
    frame_callback: FrameCallback,
}

#[wasm_bindgen]
impl QrDanceApp {
    /// Overlay text currently shown, e.g. `HipHopDancing : 2`
    #[wasm_bindgen(getter, js_name = actionName)]
    pub fn action_name(&self) -> String {
        self.runtime.borrow().composer.action_name().to_string()
    }

    /// Stop rendering, release the camera and remove the page elements
    pub fn unmount(&mut self) {
        self.shutdown();
    }
}

impl QrDanceApp {
    fn shutdown(&mut self) {
        let released = self.runtime.borrow_mut().teardown();
        // Break the closure's self-reference
        self.frame_callback.borrow_mut().take();
        if released {
            log::info!("qrdance unmounted");
        }
    }
}

// Covers `free()` from JS and handles dropped without `unmount()`
impl Drop for QrDanceApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Build the demo inside the element with id `root_id`
#[wasm_bindgen]
pub fn mount(root_id: &str) -> Result<QrDanceApp, JsValue> {
    let document = window()?
        .document()
        .ok_or_else(|| JsValue::from_str("missing document"))?;
    let root: HtmlElement = document
        .get_element_by_id(root_id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{root_id}")))?
        .dyn_into()
        .map_err(|_| JsValue::from_str(&format!("element #{root_id} has unexpected type")))?;

    let config = SceneConfig::default();
    let composer = RootComposer::new();
    let stage = Stage::build(&document, &root, &composer, &config)?;
    let scene = SceneView::new(&stage.canvas, composer.overlay_size(), &config)?;
    let scanner = Rc::new(RefCell::new(Scanner::new(
        stage.video.clone(),
        CameraConstraints::default(),
    )));

    let runtime = Rc::new(RefCell::new(Runtime {
        composer,
        stage,
        scene,
        scanner: Rc::clone(&scanner),
        viewer: None,
        first_play: None,
        last_frame_ms: None,
        frame_id: None,
        mounted: true,
    }));

    spawn_local(Scanner::open(scanner));

    let loading = Rc::downgrade(&runtime);
    spawn_local(async move {
        let placement = ModelPlacement::default();
        let loaded = mixer::load_character(&AnimationCatalog::dances(), &placement).await;
        let Some(runtime) = loading.upgrade() else {
            return;
        };
        let result = loaded.and_then(|mixer| Runtime::model_loaded(&runtime, mixer));
        if let Err(e) = result {
            log::error!("character load failed: {e:?}");
        }
    });

    let frame_callback: FrameCallback = Rc::new(RefCell::new(None));
    let weak = Rc::downgrade(&runtime);
    let next = Rc::clone(&frame_callback);
    *frame_callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
        if let Some(runtime) = weak.upgrade() {
            if let Err(e) = runtime.borrow_mut().frame(now_ms) {
                log::error!("frame: {e:?}");
            }
        }
        if let Err(e) = schedule_frame(&weak, &next) {
            log::error!("requestAnimationFrame: {e:?}");
        }
    }) as Box<dyn FnMut(f64)>));
    schedule_frame(&Rc::downgrade(&runtime), &frame_callback)?;

    log::info!("qrdance mounted on #{}", root_id);
    Ok(QrDanceApp {
        runtime,
        frame_callback,
    })
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    Ok(())
}
