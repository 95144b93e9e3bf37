use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use crate::model::{Camera, CubeState};

/// Keeps the camera orbiting the cube and turns mouse deltas into yaw/pitch
pub struct OrbitCamera {
    pub distance: f32,
    pub mouse_sensitivity: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self {
            distance: 5.0,
            mouse_sensitivity: 0.005,
            min_pitch: -FRAC_PI_4,
            max_pitch: FRAC_PI_2 * 0.9,
        }
    }

    /// Apply mouse look delta (pixels) to camera orientation
    pub fn apply_look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.yaw -= dx * self.mouse_sensitivity;
        camera.pitch = (camera.pitch - dy * self.mouse_sensitivity).clamp(self.min_pitch, self.max_pitch);
    }

    /// Place the camera on its orbit around the cube
    pub fn follow(&self, camera: &mut Camera, cube: &CubeState) {
        let (sin_yaw, cos_yaw) = camera.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = camera.pitch.sin_cos();
        let offset = Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch);

        camera.eye = cube.position - offset * self.distance;
        camera.target = cube.position + Vec3::Y * cube.half_scale();

        // never dip below the top of the cube
        camera.eye.y = camera.eye.y.max(cube.position.y + cube.scale);
    }

    pub fn update(&self, camera: &mut Camera, cube: &CubeState, look_delta: (f32, f32)) {
        self.apply_look(camera, look_delta.0, look_delta.1);
        self.follow(camera, cube);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn camera() -> Camera {
        Camera::new(800, 600)
    }

    #[test]
    fn starts_behind_cube_looking_at_its_center_top() {
        let orbit = OrbitCamera::new();
        let mut cam = camera();
        let cube = CubeState::new();
        orbit.follow(&mut cam, &cube);

        assert!((cam.target - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-6);
        assert!(cam.eye.z > 3.0, "eye = {:?}", cam.eye);
        assert!(cam.eye.x.abs() < 1e-5);
        // raw orbit height is below the cube and gets floored
        assert_eq!(cam.eye.y, 1.5);
    }

    #[test]
    fn pitch_stays_clamped() {
        let orbit = OrbitCamera::new();
        let mut cam = camera();

        for _ in 0..1000 {
            orbit.apply_look(&mut cam, 3.0, -250.0);
            assert!(cam.pitch <= 0.9 * PI / 2.0 + 1e-6);
        }
        assert!((cam.pitch - orbit.max_pitch).abs() < 1e-6);

        for _ in 0..1000 {
            orbit.apply_look(&mut cam, -3.0, 250.0);
            assert!(cam.pitch >= -PI / 4.0 - 1e-6);
        }
        assert!((cam.pitch - orbit.min_pitch).abs() < 1e-6);
    }

    #[test]
    fn mouse_right_decreases_yaw() {
        let orbit = OrbitCamera::new();
        let mut cam = camera();
        orbit.apply_look(&mut cam, 100.0, 0.0);
        assert!((cam.yaw - (PI - 0.5)).abs() < 1e-5);
        assert!((cam.pitch - PI / 4.0).abs() < 1e-6);
    }

    #[test]
    fn eye_stays_distance_away_when_above_floor() {
        let orbit = OrbitCamera::new();
        let mut cam = camera();
        cam.pitch = -FRAC_PI_4;
        let cube = CubeState::new();
        orbit.follow(&mut cam, &cube);

        // looking from below the cube puts the eye high above it
        assert!(cam.eye.y > cube.position.y + cube.scale);
        assert!(((cam.eye - cube.position).length() - orbit.distance).abs() < 1e-4);
    }

    #[test]
    fn eye_floor_tracks_scale() {
        let orbit = OrbitCamera::new();
        let mut cam = camera();
        let cube = CubeState {
            position: Vec3::new(2.0, 2.5, -1.0),
            scale: 5.0,
            ..CubeState::new()
        };
        orbit.follow(&mut cam, &cube);
        assert!(cam.eye.y >= 7.5 - 1e-6);
        assert!((cam.target.y - 5.0).abs() < 1e-6);
    }
}
