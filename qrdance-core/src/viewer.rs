/// Cycling dance viewer
///
/// Owns the mixer for the lifetime of the loaded model and walks the
/// catalog in order, cross-fading from each clip to the next once the
/// active clip is almost finished.
use crate::catalog::AnimationCatalog;
use crate::config::ViewerConfig;
use crate::error::{QrDanceError, Result};
use crate::mixer::{AnimationAction, AnimationMixer};

/// A change of active clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Option<usize>,
    pub to: usize,
    pub label: String,
}

pub struct ModelViewer<M: AnimationMixer> {
    catalog: AnimationCatalog,
    mixer: M,
    config: ViewerConfig,
    index: usize,
}

impl<M: AnimationMixer> ModelViewer<M> {
    /// Bind a mixer holding one action per catalog entry and activate the
    /// first clip. The returned transition carries the initial label.
    pub fn new(
        catalog: AnimationCatalog,
        mixer: M,
        config: ViewerConfig,
    ) -> Result<(Self, Transition)> {
        if mixer.action_count() != catalog.len() {
            return Err(QrDanceError::ActionCountMismatch {
                actions: mixer.action_count(),
                entries: catalog.len(),
            });
        }

        let mut viewer = Self {
            catalog,
            mixer,
            config,
            index: 0,
        };
        let transition = viewer.activate(None, 0)?;
        Ok((viewer, transition))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn catalog(&self) -> &AnimationCatalog {
        &self.catalog
    }

    pub fn mixer(&self) -> &M {
        &self.mixer
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Overlay text for the active clip
    pub fn label(&self) -> Result<String> {
        self.catalog.label(self.index)
    }

    /// Share of the active clip already played, in [0, 1)
    pub fn playback_fraction(&self) -> f32 {
        match self.mixer.action(self.index) {
            Some(action) if action.duration() > 0.0 => action.time() / action.duration(),
            _ => 0.0,
        }
    }

    /// Deferred first play. Only acts while the first clip is still the
    /// active one, so a late call never starts a second clip.
    pub fn play_initial(&mut self) {
        if self.index != 0 {
            log::debug!("skipping deferred first play, index is {}", self.index);
            return;
        }
        if let Some(action) = self.mixer.action_mut(0) {
            action.play();
        }
    }

    /// Per-frame update: advance the mixer, then move on to the next clip
    /// once the active one has passed the advance threshold.
    pub fn frame(&mut self, delta: f32) -> Result<Option<Transition>> {
        self.mixer.update(delta);

        if self.playback_fraction() > self.config.advance_threshold {
            return self.advance().map(Some);
        }
        Ok(None)
    }

    /// Switch to the next clip in catalog order
    pub fn advance(&mut self) -> Result<Transition> {
        let next = self.catalog.next_index(self.index);
        self.activate(Some(self.index), next)
    }

    fn activate(&mut self, previous: Option<usize>, next: usize) -> Result<Transition> {
        let label = self.catalog.label(next)?;
        let fade = self.config.fade_duration;

        // Previous clip fades out before the next one fades in
        if let Some(prev) = previous {
            if let Some(action) = self.mixer.action_mut(prev) {
                action.fade_out(fade);
            }
        }

        let action = self
            .mixer
            .action_mut(next)
            .ok_or(QrDanceError::IndexOutOfRange {
                index: next,
                len: self.catalog.len(),
            })?;
        action.reset();
        action.fade_in(fade);
        action.play();

        self.index = next;
        log::debug!("animation -> {}", label);

        Ok(Transition {
            from: previous,
            to: next,
            label,
        })
    }

    /// Stop every action and hand the mixer back for disposal
    pub fn dispose(mut self) -> M {
        self.mixer.stop_all();
        self.mixer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::{ClipInfo, ClipMixer};

    fn viewer() -> ModelViewer<ClipMixer> {
        let catalog = AnimationCatalog::dances();
        let mixer = ClipMixer::new(
            catalog
                .entries()
                .iter()
                .map(|e| ClipInfo::new(e.name, 10.0)),
        );
        let (viewer, _) = ModelViewer::new(catalog, mixer, ViewerConfig::default()).unwrap();
        viewer
    }

    fn active_count(viewer: &ModelViewer<ClipMixer>) -> usize {
        viewer
            .mixer()
            .actions()
            .iter()
            .filter(|a| a.is_active())
            .count()
    }

    #[test]
    fn test_initial_state() {
        let catalog = AnimationCatalog::dances();
        let mixer = ClipMixer::new(catalog.entries().iter().map(|e| ClipInfo::new(e.name, 4.0)));
        let (viewer, transition) =
            ModelViewer::new(catalog, mixer, ViewerConfig::default()).unwrap();

        assert_eq!(viewer.index(), 0);
        assert_eq!(transition.from, None);
        assert_eq!(transition.label, "BreakdanceEnding2 : 0");
        assert_eq!(active_count(&viewer), 1);
    }

    #[test]
    fn test_mismatched_mixer_rejected() {
        let mixer = ClipMixer::new([ClipInfo::new("only", 1.0)]);
        let result = ModelViewer::new(AnimationCatalog::dances(), mixer, ViewerConfig::default());
        assert!(matches!(
            result,
            Err(QrDanceError::ActionCountMismatch {
                actions: 1,
                entries: 6
            })
        ));
    }

    #[test]
    fn test_no_advance_at_threshold() {
        let mut viewer = viewer();
        // 9.0 / 10.0 == 0.9 exactly
        assert_eq!(viewer.frame(9.0).unwrap(), None);
        assert_eq!(viewer.index(), 0);
    }

    #[test]
    fn test_advance_just_past_threshold() {
        let mut viewer = viewer();
        assert_eq!(viewer.frame(9.0).unwrap(), None);
        let transition = viewer.frame(0.01).unwrap().unwrap();
        assert_eq!(transition.from, Some(0));
        assert_eq!(transition.to, 1);
        assert_eq!(transition.label, "BreakdanceUprockVar1 : 1");
    }

    #[test]
    fn test_previous_action_fades_out() {
        let mut viewer = viewer();
        viewer.frame(9.5).unwrap();
        assert_eq!(viewer.index(), 1);

        let previous = &viewer.mixer().actions()[0];
        assert!(previous.is_fading_out());
        assert!(previous.is_running());
        assert_eq!(active_count(&viewer), 1);

        // Fade completes and the old clip drops out
        viewer.frame(0.5).unwrap();
        assert!(!viewer.mixer().actions()[0].is_running());
        assert_eq!(active_count(&viewer), 1);
    }

    #[test]
    fn test_full_cycle_reports_catalog_in_order() {
        let mut viewer = viewer();
        let mut labels = Vec::new();
        for _ in 0..12 {
            let transition = viewer.frame(9.5).unwrap().unwrap();
            labels.push(transition.label);
            assert_eq!(active_count(&viewer), 1);
        }

        let expected: Vec<String> = (1..=12)
            .map(|i| viewer.catalog().label(i % 6).unwrap())
            .collect();
        assert_eq!(labels, expected);
        assert_eq!(labels[5], "BreakdanceEnding2 : 0");
        assert_eq!(labels[1], "HipHopDancing : 2");
    }

    #[test]
    fn test_deferred_play_after_move_is_noop() {
        let mut viewer = viewer();
        viewer.advance().unwrap();
        viewer.frame(0.5).unwrap();
        viewer.play_initial();
        assert!(!viewer.mixer().actions()[0].is_running());
        assert_eq!(active_count(&viewer), 1);
    }

    #[test]
    fn test_zero_length_clip_never_advances() {
        let catalog = AnimationCatalog::dances();
        let mixer = ClipMixer::new(catalog.entries().iter().map(|e| ClipInfo::new(e.name, 0.0)));
        let (mut viewer, _) = ModelViewer::new(catalog, mixer, ViewerConfig::default()).unwrap();
        assert_eq!(viewer.frame(1.0).unwrap(), None);
        assert_eq!(viewer.playback_fraction(), 0.0);
    }

    #[test]
    fn test_dispose_stops_actions() {
        let mixer = viewer().dispose();
        assert!(mixer.actions().iter().all(|a| !a.is_running()));
    }
}
