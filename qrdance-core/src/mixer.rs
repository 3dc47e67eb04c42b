/// Animation mixer abstraction and a reference implementation
///
/// The viewer drives any scene-graph framework through these two traits.
/// `ClipMixer` implements them in plain Rust with the same timing rules as
/// the browser scene graph, so the cycling logic can run and be tested
/// without a WebGL context.

/// A playable clip bound to the base mesh
pub trait AnimationAction {
    /// Rewind to the start and cancel any pending fade
    fn reset(&mut self);
    /// Ramp the weight from 0 to 1 over `duration` seconds
    fn fade_in(&mut self, duration: f32);
    /// Ramp the weight from 1 to 0 over `duration` seconds
    fn fade_out(&mut self, duration: f32);
    fn play(&mut self);
    fn stop(&mut self);
    /// Local playback time in seconds
    fn time(&self) -> f32;
    /// Clip length in seconds
    fn duration(&self) -> f32;
    /// Running, enabled and not fading out
    fn is_active(&self) -> bool;
}

/// Scheduler that advances every running action once per frame
pub trait AnimationMixer {
    type Action: AnimationAction;

    fn update(&mut self, delta: f32);
    fn action_count(&self) -> usize;
    fn action(&self, index: usize) -> Option<&Self::Action>;
    fn action_mut(&mut self, index: usize) -> Option<&mut Self::Action>;

    fn stop_all(&mut self) {
        for index in 0..self.action_count() {
            if let Some(action) = self.action_mut(index) {
                action.stop();
            }
        }
    }
}

/// Name and length of a loaded clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInfo {
    pub name: String,
    pub duration: f32,
}

impl ClipInfo {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Weight ramp expressed in mixer time
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    start: f32,
    end: f32,
    from: f32,
    to: f32,
}

impl Fade {
    fn weight_at(&self, now: f32) -> f32 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return self.to;
        }
        let t = ((now - self.start) / span).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }
}

/// Reference action with looping playback and linear weight fades
#[derive(Debug, Clone)]
pub struct ClipAction {
    clip: ClipInfo,
    time: f32,
    weight: f32,
    running: bool,
    enabled: bool,
    fade: Option<Fade>,
    // Fade requests are timestamped against the owning mixer's clock
    clock: f32,
}

impl ClipAction {
    pub fn new(clip: ClipInfo) -> Self {
        Self {
            clip,
            time: 0.0,
            weight: 1.0,
            running: false,
            enabled: true,
            fade: None,
            clock: 0.0,
        }
    }

    pub fn clip(&self) -> &ClipInfo {
        &self.clip
    }

    /// Effective blend weight at the last mixer update
    pub fn weight(&self) -> f32 {
        if self.enabled {
            self.weight
        } else {
            0.0
        }
    }

    pub fn is_running(&self) -> bool {
        self.running && self.enabled
    }

    pub fn is_fading_out(&self) -> bool {
        matches!(self.fade, Some(fade) if fade.to < fade.from)
    }

    fn schedule_fade(&mut self, duration: f32, from: f32, to: f32) {
        self.fade = Some(Fade {
            start: self.clock,
            end: self.clock + duration.max(0.0),
            from,
            to,
        });
        self.weight = from;
    }

    fn advance(&mut self, now: f32, delta: f32) {
        self.clock = now;
        if !self.is_running() {
            return;
        }

        if let Some(fade) = self.fade {
            self.weight = fade.weight_at(now);
            if now >= fade.end {
                self.fade = None;
                if fade.to <= 0.0 {
                    self.enabled = false;
                    return;
                }
            }
        }

        self.time += delta;
        let duration = self.clip.duration;
        if duration > 0.0 && self.time >= duration {
            self.time %= duration;
        }
    }
}

impl AnimationAction for ClipAction {
    fn reset(&mut self) {
        self.enabled = true;
        self.time = 0.0;
        self.weight = 1.0;
        self.fade = None;
    }

    fn fade_in(&mut self, duration: f32) {
        self.schedule_fade(duration, 0.0, 1.0);
    }

    fn fade_out(&mut self, duration: f32) {
        self.schedule_fade(duration, 1.0, 0.0);
    }

    fn play(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
        self.time = 0.0;
        self.fade = None;
    }

    fn time(&self) -> f32 {
        self.time
    }

    fn duration(&self) -> f32 {
        self.clip.duration
    }

    fn is_active(&self) -> bool {
        self.is_running() && !self.is_fading_out()
    }
}

/// Plain-Rust mixer owning one action per clip
#[derive(Debug, Clone, Default)]
pub struct ClipMixer {
    time: f32,
    actions: Vec<ClipAction>,
}

impl ClipMixer {
    pub fn new(clips: impl IntoIterator<Item = ClipInfo>) -> Self {
        Self {
            time: 0.0,
            actions: clips.into_iter().map(ClipAction::new).collect(),
        }
    }

    /// Mixer clock in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn actions(&self) -> &[ClipAction] {
        &self.actions
    }
}

impl AnimationMixer for ClipMixer {
    type Action = ClipAction;

    fn update(&mut self, delta: f32) {
        self.time += delta;
        for action in &mut self.actions {
            action.advance(self.time, delta);
        }
    }

    fn action_count(&self) -> usize {
        self.actions.len()
    }

    fn action(&self, index: usize) -> Option<&ClipAction> {
        self.actions.get(index)
    }

    fn action_mut(&mut self, index: usize) -> Option<&mut ClipAction> {
        self.actions.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixer() -> ClipMixer {
        ClipMixer::new([ClipInfo::new("a", 2.0), ClipInfo::new("b", 1.0)])
    }

    #[test]
    fn test_idle_actions_do_not_advance() {
        let mut mixer = mixer();
        mixer.update(0.5);
        assert_eq!(mixer.action(0).unwrap().time(), 0.0);
        assert!(!mixer.action(0).unwrap().is_active());
    }

    #[test]
    fn test_playing_action_loops() {
        let mut mixer = mixer();
        mixer.action_mut(1).unwrap().play();
        mixer.update(0.75);
        mixer.update(0.5);
        let time = mixer.action(1).unwrap().time();
        assert!((time - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_fade_in_ramps_weight() {
        let mut mixer = mixer();
        let action = mixer.action_mut(0).unwrap();
        action.reset();
        action.fade_in(0.3);
        action.play();
        mixer.update(0.15);
        assert!((mixer.action(0).unwrap().weight() - 0.5).abs() < 1e-4);
        mixer.update(0.2);
        assert!((mixer.action(0).unwrap().weight() - 1.0).abs() < 1e-6);
        assert!(mixer.action(0).unwrap().is_active());
    }

    #[test]
    fn test_fade_out_disables_action() {
        let mut mixer = mixer();
        mixer.action_mut(0).unwrap().play();
        mixer.update(0.1);
        mixer.action_mut(0).unwrap().fade_out(0.3);
        assert!(!mixer.action(0).unwrap().is_active());
        assert!(mixer.action(0).unwrap().is_running());

        mixer.update(0.4);
        let action = mixer.action(0).unwrap();
        assert!(!action.is_running());
        assert_eq!(action.weight(), 0.0);
    }

    #[test]
    fn test_reset_reenables_faded_action() {
        let mut mixer = mixer();
        mixer.action_mut(0).unwrap().play();
        mixer.action_mut(0).unwrap().fade_out(0.1);
        mixer.update(0.2);
        assert!(!mixer.action(0).unwrap().is_running());

        mixer.action_mut(0).unwrap().reset();
        assert!(mixer.action(0).unwrap().is_active());
        assert_eq!(mixer.action(0).unwrap().time(), 0.0);
    }

    #[test]
    fn test_stop_all() {
        let mut mixer = mixer();
        mixer.action_mut(0).unwrap().play();
        mixer.action_mut(1).unwrap().play();
        mixer.stop_all();
        assert!(mixer.actions().iter().all(|a| !a.is_running()));
    }
}
