/// Perspective camera looking at the dancing model
use nalgebra::Point3;

use crate::composer::OverlaySize;

/// Camera parameters handed to the scene graph, which builds the matrices
pub struct SceneCamera {
    pub position: Point3<f32>,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl SceneCamera {
    pub fn new(size: OverlaySize) -> Self {
        Self {
            position: Point3::new(3.0, 1.0, 3.0),
            fov_degrees: 75.0,
            aspect: size.aspect(),
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Follow the overlay canvas when the video size changes
    pub fn set_viewport(&mut self, size: OverlaySize) {
        self.aspect = size.aspect();
    }
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self::new(OverlaySize::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_follows_viewport() {
        let mut camera = SceneCamera::default();
        assert!((camera.aspect - 1.5).abs() < 1e-6);
        assert_eq!(camera.position, Point3::new(3.0, 1.0, 3.0));

        camera.set_viewport(OverlaySize::new(1920, 1080).unwrap());
        assert!((camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }
}
