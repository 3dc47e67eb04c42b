/// Core mixer traits implemented over the three.js animation system
use js_sys::{Array, Promise};
use qrdance_core::{AnimationAction, AnimationCatalog, AnimationMixer, ModelPlacement, BASE_MESH};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::three;

pub struct ThreeAction {
    action: three::AnimationAction,
    // three.js does not expose the fade direction
    fading_out: bool,
}

impl ThreeAction {
    fn new(action: three::AnimationAction) -> Self {
        Self {
            action,
            fading_out: false,
        }
    }
}

impl AnimationAction for ThreeAction {
    fn reset(&mut self) {
        self.action.reset();
        self.fading_out = false;
    }

    fn fade_in(&mut self, duration: f32) {
        self.action.fade_in(duration);
        self.fading_out = false;
    }

    fn fade_out(&mut self, duration: f32) {
        self.action.fade_out(duration);
        self.fading_out = true;
    }

    fn play(&mut self) {
        self.action.play();
    }

    fn stop(&mut self) {
        self.action.stop();
        self.fading_out = false;
    }

    fn time(&self) -> f32 {
        self.action.time()
    }

    fn duration(&self) -> f32 {
        self.action.get_clip().duration()
    }

    fn is_active(&self) -> bool {
        self.action.is_running() && !self.fading_out
    }
}

/// One shared `THREE.AnimationMixer` bound to the character
pub struct ThreeMixer {
    root: three::Object3D,
    mixer: three::AnimationMixer,
    actions: Vec<ThreeAction>,
}

impl ThreeMixer {
    pub fn root(&self) -> &three::Object3D {
        &self.root
    }
}

impl AnimationMixer for ThreeMixer {
    type Action = ThreeAction;

    fn update(&mut self, delta: f32) {
        self.mixer.update(delta);
    }

    fn action_count(&self) -> usize {
        self.actions.len()
    }

    fn action(&self, index: usize) -> Option<&ThreeAction> {
        self.actions.get(index)
    }

    fn action_mut(&mut self, index: usize) -> Option<&mut ThreeAction> {
        self.actions.get_mut(index)
    }

    fn stop_all(&mut self) {
        self.mixer.stop_all_action();
        self.mixer.uncache_root(&self.root);
        for action in &mut self.actions {
            action.fading_out = false;
        }
    }
}

/// Load the base mesh and every catalog clip, then build one action per
/// clip against a single mixer. The mesh is scaled and placed before the
/// mixer binds to it.
pub async fn load_character(
    catalog: &AnimationCatalog,
    placement: &ModelPlacement,
) -> Result<ThreeMixer, JsValue> {
    let loader = three::FBXLoader::new();

    let requests = Array::new();
    requests.push(&loader.load_async(BASE_MESH));
    for entry in catalog.entries() {
        requests.push(&loader.load_async(entry.clip));
    }
    let loaded: Array = JsFuture::from(Promise::all(&requests))
        .await?
        .dyn_into()?;

    let root: three::Object3D = loaded.get(0).unchecked_into();
    root.scale().multiply_scalar(placement.scale);
    root.position()
        .set(placement.position.x, placement.position.y, placement.position.z);

    let mixer = three::AnimationMixer::new(&root);
    let mut actions = Vec::with_capacity(catalog.len());
    for (i, entry) in catalog.entries().iter().enumerate() {
        let source: three::Object3D = loaded.get(i as u32 + 1).unchecked_into();
        let clip = source.animations().get(0);
        if clip.is_undefined() {
            return Err(JsValue::from_str(&format!(
                "{} contains no animation clip",
                entry.clip
            )));
        }
        let clip: three::AnimationClip = clip.unchecked_into();
        log::info!("loaded clip {} ({:.2}s)", entry.name, clip.duration());
        actions.push(ThreeAction::new(mixer.clip_action(&clip)));
    }

    Ok(ThreeMixer {
        root,
        mixer,
        actions,
    })
}
