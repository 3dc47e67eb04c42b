/// Placement of the loaded character in the scene
use nalgebra::Vector3;

/// Uniform scale and offset applied once after the mesh loads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPlacement {
    pub scale: f32,
    pub position: Vector3<f32>,
}

impl ModelPlacement {
    pub fn new(scale: f32, position: Vector3<f32>) -> Self {
        Self { scale, position }
    }
}

impl Default for ModelPlacement {
    fn default() -> Self {
        // Source meshes are authored in centimetres
        Self::new(0.02, Vector3::new(1.0, -1.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_placement() {
        let placement = ModelPlacement::default();
        assert!((placement.scale - 0.02).abs() < 1e-6);
        assert_eq!(placement.position, Vector3::new(1.0, -1.0, 1.0));
    }
}
