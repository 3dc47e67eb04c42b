/// Bindings to the `THREE` global and the loader/controls add-ons
///
/// Only the surface the demo touches is declared here. The page is
/// expected to load three.js together with `FBXLoader` and `OrbitControls`
/// exposed on the same namespace.
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = THREE)]
    #[derive(Clone, Debug)]
    pub type Object3D;

    #[wasm_bindgen(method, getter)]
    pub fn position(this: &Object3D) -> Vector3;

    #[wasm_bindgen(method, getter)]
    pub fn scale(this: &Object3D) -> Vector3;

    #[wasm_bindgen(method)]
    pub fn add(this: &Object3D, child: &Object3D);

    #[wasm_bindgen(method)]
    pub fn remove(this: &Object3D, child: &Object3D);

    /// Clips attached to an object by the FBX loader
    #[wasm_bindgen(method, getter)]
    pub fn animations(this: &Object3D) -> js_sys::Array;

    #[wasm_bindgen(js_namespace = THREE)]
    #[derive(Clone, Debug)]
    pub type Vector3;

    #[wasm_bindgen(method)]
    pub fn set(this: &Vector3, x: f32, y: f32, z: f32);

    #[wasm_bindgen(method, js_name = multiplyScalar)]
    pub fn multiply_scalar(this: &Vector3, scalar: f32);

    #[wasm_bindgen(js_namespace = THREE, extends = Object3D)]
    #[derive(Clone, Debug)]
    pub type Scene;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    pub fn new() -> Scene;

    #[wasm_bindgen(js_namespace = THREE, extends = Object3D)]
    #[derive(Clone, Debug)]
    pub type PerspectiveCamera;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> PerspectiveCamera;

    #[wasm_bindgen(method, setter)]
    pub fn set_aspect(this: &PerspectiveCamera, aspect: f32);

    #[wasm_bindgen(method, js_name = updateProjectionMatrix)]
    pub fn update_projection_matrix(this: &PerspectiveCamera);

    #[wasm_bindgen(js_namespace = THREE, extends = Object3D)]
    #[derive(Clone, Debug)]
    pub type AmbientLight;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    pub fn new(color: u32, intensity: f32) -> AmbientLight;

    #[wasm_bindgen(js_namespace = THREE, extends = Object3D)]
    #[derive(Clone, Debug)]
    pub type PointLight;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    pub fn new(color: u32, intensity: f32) -> PointLight;

    #[wasm_bindgen(js_namespace = THREE, extends = Object3D)]
    #[derive(Clone, Debug)]
    pub type AxesHelper;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    pub fn new(size: f32) -> AxesHelper;

    #[wasm_bindgen(js_namespace = THREE, extends = Object3D)]
    #[derive(Clone, Debug)]
    pub type GridHelper;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    pub fn new() -> GridHelper;

    #[wasm_bindgen(js_namespace = THREE)]
    #[derive(Clone, Debug)]
    pub type WebGLRenderer;

    #[wasm_bindgen(constructor, js_namespace = THREE, catch)]
    pub fn new(parameters: &JsValue) -> Result<WebGLRenderer, JsValue>;

    #[wasm_bindgen(method, js_name = setSize)]
    pub fn set_size(this: &WebGLRenderer, width: u32, height: u32, update_style: bool);

    #[wasm_bindgen(method, js_name = setPixelRatio)]
    pub fn set_pixel_ratio(this: &WebGLRenderer, ratio: f64);

    #[wasm_bindgen(method)]
    pub fn render(this: &WebGLRenderer, scene: &Scene, camera: &PerspectiveCamera);

    #[wasm_bindgen(method)]
    pub fn dispose(this: &WebGLRenderer);

    #[wasm_bindgen(js_namespace = THREE)]
    #[derive(Clone, Debug)]
    pub type AnimationClip;

    #[wasm_bindgen(method, getter)]
    pub fn duration(this: &AnimationClip) -> f32;

    #[wasm_bindgen(js_namespace = THREE)]
    #[derive(Clone, Debug)]
    pub type AnimationMixer;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    pub fn new(root: &Object3D) -> AnimationMixer;

    #[wasm_bindgen(method, js_name = clipAction)]
    pub fn clip_action(this: &AnimationMixer, clip: &AnimationClip) -> AnimationAction;

    #[wasm_bindgen(method)]
    pub fn update(this: &AnimationMixer, delta: f32);

    #[wasm_bindgen(method, js_name = stopAllAction)]
    pub fn stop_all_action(this: &AnimationMixer);

    #[wasm_bindgen(method, js_name = uncacheRoot)]
    pub fn uncache_root(this: &AnimationMixer, root: &Object3D);

    #[wasm_bindgen(js_namespace = THREE)]
    #[derive(Clone, Debug)]
    pub type AnimationAction;

    #[wasm_bindgen(method)]
    pub fn reset(this: &AnimationAction);

    #[wasm_bindgen(method, js_name = fadeIn)]
    pub fn fade_in(this: &AnimationAction, duration: f32);

    #[wasm_bindgen(method, js_name = fadeOut)]
    pub fn fade_out(this: &AnimationAction, duration: f32);

    #[wasm_bindgen(method)]
    pub fn play(this: &AnimationAction);

    #[wasm_bindgen(method)]
    pub fn stop(this: &AnimationAction);

    #[wasm_bindgen(method, getter)]
    pub fn time(this: &AnimationAction) -> f32;

    #[wasm_bindgen(method, js_name = getClip)]
    pub fn get_clip(this: &AnimationAction) -> AnimationClip;

    #[wasm_bindgen(method, js_name = isRunning)]
    pub fn is_running(this: &AnimationAction) -> bool;

    #[wasm_bindgen(js_namespace = THREE)]
    #[derive(Clone, Debug)]
    pub type FBXLoader;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    pub fn new() -> FBXLoader;

    #[wasm_bindgen(method, js_name = loadAsync)]
    pub fn load_async(this: &FBXLoader, url: &str) -> js_sys::Promise;

    #[wasm_bindgen(js_namespace = THREE)]
    #[derive(Clone, Debug)]
    pub type OrbitControls;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    pub fn new(camera: &PerspectiveCamera, element: &web_sys::HtmlElement) -> OrbitControls;

    #[wasm_bindgen(method)]
    pub fn update(this: &OrbitControls);

    #[wasm_bindgen(method)]
    pub fn dispose(this: &OrbitControls);
}
