use glam::{Mat4, Vec3};

/// Orbit camera state. `eye` and `target` are derived from the cube every tick,
/// only `yaw` and `pitch` carry over between ticks.
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::ZERO,
            target: Vec3::ZERO,
            yaw: std::f32::consts::PI, // behind the cube
            pitch: std::f32::consts::FRAC_PI_4,
            up: Vec3::Y,
            fov_y: 70f32.to_radians(),
            aspect: aspect_ratio(width, height),
            z_near: 0.1,
            z_far: 100.0,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) { self.aspect = aspect_ratio(width, height); }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }
}

// minimized windows report a zero height
fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
