/// DOM layout of the root view and the three.js scene drawn into the canvas
use js_sys::{Object, Reflect};
use qrdance_core::{Layer, OverlaySize, RootComposer, SceneCamera, SceneConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, HtmlVideoElement};

use crate::three;

fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T, JsValue> {
    document
        .create_element(tag)?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("<{tag}> has unexpected type")))
}

/// Video, canvas and name overlay, appended to the root in stacking order
pub struct Stage {
    pub video: HtmlVideoElement,
    pub canvas: HtmlCanvasElement,
    overlay: HtmlElement,
    nodes: Vec<HtmlElement>,
}

impl Stage {
    pub fn build(
        document: &Document,
        root: &HtmlElement,
        composer: &RootComposer,
        config: &SceneConfig,
    ) -> Result<Self, JsValue> {
        let video: HtmlVideoElement = create(document, "video")?;
        let canvas: HtmlCanvasElement = create(document, "canvas")?;
        let overlay: HtmlElement = create(document, "div")?;
        overlay.set_id("summry");
        overlay
            .style()
            .set_property("background", config.overlay_background)?;

        let mut nodes = Vec::with_capacity(Layer::STACK.len());
        for layer in Layer::STACK {
            let node: HtmlElement = match layer {
                Layer::Video => video.clone().into(),
                Layer::Canvas => canvas.clone().into(),
                Layer::NameOverlay => overlay.clone(),
            };
            root.append_child(&node)?;
            nodes.push(node);
        }

        let stage = Self {
            video,
            canvas,
            overlay,
            nodes,
        };
        stage.apply(composer)?;
        Ok(stage)
    }

    /// Push both state slots to the DOM
    pub fn apply(&self, composer: &RootComposer) -> Result<(), JsValue> {
        self.canvas
            .set_attribute("style", &composer.canvas_style())?;
        self.overlay.set_text_content(Some(composer.action_name()));
        Ok(())
    }

    pub fn remove(&self) {
        for node in &self.nodes {
            node.remove();
        }
    }
}

/// Renderer, scene graph and camera for the overlay canvas
pub struct SceneView {
    renderer: three::WebGLRenderer,
    scene: three::Scene,
    camera: three::PerspectiveCamera,
    controls: three::OrbitControls,
    projection: SceneCamera,
}

impl SceneView {
    pub fn new(
        canvas: &HtmlCanvasElement,
        size: OverlaySize,
        config: &SceneConfig,
    ) -> Result<Self, JsValue> {
        let params = Object::new();
        Reflect::set(&params, &"canvas".into(), canvas)?;
        Reflect::set(&params, &"antialias".into(), &JsValue::TRUE)?;
        Reflect::set(&params, &"alpha".into(), &JsValue::TRUE)?;
        let renderer = three::WebGLRenderer::new(&params)?;
        if let Some(window) = web_sys::window() {
            renderer.set_pixel_ratio(window.device_pixel_ratio());
        }

        let projection = SceneCamera::new(size);
        let camera = three::PerspectiveCamera::new(
            projection.fov_degrees,
            projection.aspect,
            projection.near,
            projection.far,
        );
        camera.position().set(
            projection.position.x,
            projection.position.y,
            projection.position.z,
        );

        let scene = three::Scene::new();
        scene.add(&three::AmbientLight::new(0xffffff, config.ambient_intensity));
        let point = three::PointLight::new(0xffffff, 1.0);
        let p = config.point_light_position;
        point.position().set(p.x, p.y, p.z);
        scene.add(&point);
        scene.add(&three::AxesHelper::new(config.axes_size));
        if config.show_grid {
            scene.add(&three::GridHelper::new());
        }

        let element: &HtmlElement = canvas.as_ref();
        let controls = three::OrbitControls::new(&camera, element);

        let view = Self {
            renderer,
            scene,
            camera,
            controls,
            projection,
        };
        view.resize_renderer(size);
        Ok(view)
    }

    pub fn add(&self, object: &three::Object3D) {
        self.scene.add(object);
    }

    pub fn remove(&self, object: &three::Object3D) {
        self.scene.remove(object);
    }

    /// Match the drawing buffer and the camera to a new overlay size
    pub fn resize(&mut self, size: OverlaySize) {
        self.projection.set_viewport(size);
        self.camera.set_aspect(self.projection.aspect);
        self.camera.update_projection_matrix();
        self.resize_renderer(size);
    }

    fn resize_renderer(&self, size: OverlaySize) {
        // CSS size stays with the composer's inline style
        self.renderer.set_size(size.width, size.height, false);
    }

    pub fn render(&self) {
        self.controls.update();
        self.renderer.render(&self.scene, &self.camera);
    }

    pub fn dispose(&self) {
        self.controls.dispose();
        self.renderer.dispose();
    }
}
