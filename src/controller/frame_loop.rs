use std::time::{Duration, Instant};

use crate::controller::input::InputSnapshot;
use crate::controller::orbit_camera::OrbitCamera;
use crate::controller::physics::MotionIntegrator;
use crate::model::{Camera, Contact, CubeState};

/// Camera matrices as laid out in the scene shader
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view: camera.view().to_cols_array_2d(),
            proj: camera.proj().to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub transform: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn from_mat4(m: glam::Mat4) -> Self {
        Self { transform: m.to_cols_array_2d() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Exit,
}

/// Main game loop state and update logic
pub struct FrameLoop {
    pub cube: CubeState,
    pub camera: Camera,
    pub physics: MotionIntegrator,
    pub orbit: OrbitCamera,
}

impl FrameLoop {
    pub fn new(width: u32, height: u32) -> Self {
        let mut frame_loop = Self {
            cube: CubeState::new(),
            camera: Camera::new(width, height),
            physics: MotionIntegrator::new(),
            orbit: OrbitCamera::new(),
        };
        frame_loop.orbit.follow(&mut frame_loop.camera, &frame_loop.cube);
        frame_loop
    }

    /// Advance cube and camera by one frame
    pub fn tick(&mut self, input: &InputSnapshot, dt: f32) -> TickOutcome {
        if input.exit_requested {
            return TickOutcome::Exit;
        }

        let previous = self.cube.contact;
        self.cube = self.physics.step(self.cube, &input.motion_intent(), self.camera.yaw, dt);
        if self.cube.contact != previous {
            match self.cube.contact {
                Contact::Airborne => tracing::debug!(velocity = self.cube.vertical_velocity, "cube left the ground"),
                Contact::Grounded => tracing::debug!(y = self.cube.position.y, "cube landed"),
            }
        }

        self.orbit.update(&mut self.camera, &self.cube, input.look_delta);
        TickOutcome::Continue
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    pub fn camera_uniform(&self) -> CameraUniform {
        CameraUniform::from_camera(&self.camera)
    }

    pub fn cube_transform(&self) -> TransformUniform {
        TransformUniform::from_mat4(self.cube.world_matrix())
    }
}

/// Wall-clock frame timing with a cap on single-frame stalls
pub struct FrameClock {
    last: Instant,
    max_dt: Duration,
    fps: f32,
    frame_count: u32,
    fps_timer: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            max_dt: Duration::from_millis(100),
            fps: 0.0,
            frame_count: 0,
            fps_timer: 0.0,
        }
    }

    /// Seconds since the previous call
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = self.advance(now - self.last);
        self.last = now;
        dt
    }

    fn advance(&mut self, elapsed: Duration) -> f32 {
        let dt = elapsed.min(self.max_dt).as_secs_f32();

        self.frame_count += 1;
        self.fps_timer += dt;
        if self.fps_timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.fps_timer;
            self.frame_count = 0;
            self.fps_timer = 0.0;
        }
        dt
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn exit_leaves_state_untouched() {
        let mut frame_loop = FrameLoop::new(800, 600);
        let before = frame_loop.cube;
        let input = InputSnapshot { exit_requested: true, movement: Vec3::Z, ..Default::default() };

        assert_eq!(frame_loop.tick(&input, 0.1), TickOutcome::Exit);
        assert_eq!(frame_loop.cube, before);
    }

    #[test]
    fn motion_uses_yaw_from_previous_tick() {
        let mut frame_loop = FrameLoop::new(800, 600);
        // turning a quarter circle in the same tick must not bend this tick's movement
        let quarter_turn = std::f32::consts::FRAC_PI_2 / frame_loop.orbit.mouse_sensitivity;
        let input = InputSnapshot {
            movement: Vec3::Z,
            look_delta: (quarter_turn, 0.0),
            ..Default::default()
        };

        frame_loop.tick(&input, 0.1);
        assert!((frame_loop.cube.position.z + 0.5).abs() < 1e-4);
        assert!(frame_loop.cube.position.x.abs() < 1e-4);
    }

    #[test]
    fn camera_follows_cube() {
        let mut frame_loop = FrameLoop::new(800, 600);
        let input = InputSnapshot { movement: Vec3::Z, ..Default::default() };
        for _ in 0..10 {
            frame_loop.tick(&input, 0.05);
        }

        let cube = frame_loop.cube;
        let target = frame_loop.camera.target;
        assert!((target - (cube.position + Vec3::Y * cube.half_scale())).length() < 1e-5);
    }

    #[test]
    fn clock_caps_long_frames() {
        let mut clock = FrameClock::new();
        assert!((clock.advance(Duration::from_secs(3)) - 0.1).abs() < 1e-6);
        assert!((clock.advance(Duration::from_millis(16)) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn clock_reports_fps() {
        let mut clock = FrameClock::new();
        for _ in 0..60 {
            clock.advance(Duration::from_millis(20));
        }
        assert!((clock.fps() - 50.0).abs() < 1.0, "fps = {}", clock.fps());
    }
}
