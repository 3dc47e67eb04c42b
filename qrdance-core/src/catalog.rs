/// The fixed, ordered list of dance clips the viewer cycles through
use crate::error::{QrDanceError, Result};

/// Base character mesh every clip is bound to
pub const BASE_MESH: &str = "assets/Ch09_nonPBR.fbx";

/// One named clip source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationEntry {
    pub name: &'static str,
    pub clip: &'static str,
}

impl AnimationEntry {
    pub const fn new(name: &'static str, clip: &'static str) -> Self {
        Self { name, clip }
    }
}

const DANCES: [AnimationEntry; 6] = [
    AnimationEntry::new("BreakdanceEnding2", "assets/BreakdanceEnding2.fbx"),
    AnimationEntry::new("BreakdanceUprockVar1", "assets/BreakdanceUprockVar1.fbx"),
    AnimationEntry::new("HipHopDancing", "assets/HipHopDancing.fbx"),
    AnimationEntry::new("NorthernSoulSpin", "assets/NorthernSoulSpin.fbx"),
    AnimationEntry::new("SwingDancing", "assets/SwingDancing.fbx"),
    AnimationEntry::new("BreakdanceEnding1", "assets/BreakdanceEnding1.fbx"),
];

/// Index-addressed clip list. Order is cycling order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationCatalog {
    entries: Vec<AnimationEntry>,
}

impl AnimationCatalog {
    pub fn new(entries: Vec<AnimationEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(QrDanceError::EmptyCatalog);
        }
        Ok(Self { entries })
    }

    /// The six dance clips shipped with the demo
    pub fn dances() -> Self {
        Self {
            entries: DANCES.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&AnimationEntry> {
        self.entries.get(index).ok_or(QrDanceError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    pub fn entries(&self) -> &[AnimationEntry] {
        &self.entries
    }

    /// Index that follows `index`, wrapping to 0 after the last entry
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.entries.len()
    }

    /// Overlay text for an index, e.g. `HipHopDancing : 2`
    pub fn label(&self, index: usize) -> Result<String> {
        let entry = self.get(index)?;
        Ok(format!("{} : {}", entry.name, index))
    }
}

impl Default for AnimationCatalog {
    fn default() -> Self {
        Self::dances()
    }
}
