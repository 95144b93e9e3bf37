use glam::{Quat, Vec3};
use crate::model::{Contact, CubeState, Platform};

/// Per-tick motion request, already mapped from devices
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionIntent {
    /// Camera-relative direction, +Z is away from the camera and +X is to the left
    pub movement: Vec3,
    /// -1.0 shrink, 1.0 grow, 0.0 hold
    pub scale_delta: f32,
    pub jump: bool,
}

/// Handles cube physics (movement, scaling, gravity, ground collision, jumping)
pub struct MotionIntegrator {
    pub move_speed: f32,
    pub scale_speed: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    pub platform: Platform,
}

impl MotionIntegrator {
    pub fn new() -> Self {
        Self {
            move_speed: 5.0,
            scale_speed: 0.5,
            min_scale: 0.1,
            max_scale: 5.0,
            gravity: 19.8,
            jump_impulse: 15.0,
            platform: Platform::new(),
        }
    }

    /// Advance the cube by `dt` seconds. `yaw` is the camera yaw from the previous tick.
    pub fn step(&self, cube: CubeState, intent: &MotionIntent, yaw: f32, dt: f32) -> CubeState {
        let mut next = cube;

        // Horizontal movement, relative to where the camera looks
        let direction = (Quat::from_rotation_y(yaw) * intent.movement).normalize_or_zero();
        let step = direction * self.move_speed * dt;
        next.position.x += step.x;
        next.position.z += step.z;
        (next.position.x, next.position.z) =
            self.platform.clamp_xz(next.position.x, next.position.z, next.scale);

        // Scaling; a resting cube keeps its base on the platform
        let previous_scale = next.scale;
        next.scale = (next.scale + sign(intent.scale_delta) * self.scale_speed * dt)
            .clamp(self.min_scale, self.max_scale);
        if next.is_grounded() {
            next.position.y += (next.scale - previous_scale) / 2.0;
        }
        (next.position.x, next.position.z) =
            self.platform.clamp_xz(next.position.x, next.position.z, next.scale);

        // Jump only from the ground
        if next.is_grounded() && intent.jump {
            next.vertical_velocity = self.jump_impulse;
            next.contact = Contact::Airborne;
        }

        // Gravity
        next.vertical_velocity -= self.gravity * dt;
        next.position.y += next.vertical_velocity * dt;

        // Ground collision
        if next.base_height() < self.platform.height {
            next.position.y = self.platform.height + next.half_scale();
            next.vertical_velocity = 0.0;
            next.contact = Contact::Grounded;
        }

        next
    }
}

impl Default for MotionIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

// f32::signum maps 0.0 to 1.0
fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const FORWARD: Vec3 = Vec3::Z;

    fn intent(movement: Vec3, scale_delta: f32, jump: bool) -> MotionIntent {
        MotionIntent { movement, scale_delta, jump }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn forward_moves_away_from_camera() {
        let physics = MotionIntegrator::new();
        let cube = physics.step(CubeState::new(), &intent(FORWARD, 0.0, false), PI, 0.1);

        assert!(approx(cube.position.z, -0.5), "z = {}", cube.position.z);
        assert!(cube.position.x.abs() < 1e-4);
        assert_eq!(cube.position.y, 0.5);
        assert!(cube.is_grounded());
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let physics = MotionIntegrator::new();
        let start = CubeState::new();
        let cube = physics.step(start, &intent(Vec3::new(1.0, 0.0, 1.0), 0.0, false), 0.0, 0.1);

        let travelled = Vec3::new(cube.position.x, 0.0, cube.position.z).length();
        assert!(approx(travelled, 0.5), "travelled {travelled}");
    }

    #[test]
    fn position_stays_on_platform() {
        let physics = MotionIntegrator::new();
        let directions = [Vec3::X, -Vec3::X, Vec3::Z, -Vec3::Z, Vec3::new(1.0, 0.0, -1.0)];

        for (i, dir) in directions.iter().enumerate() {
            let mut cube = CubeState::new();
            for tick in 0..200 {
                let scale_delta = if tick % 3 == 0 { 1.0 } else { -1.0 };
                cube = physics.step(cube, &intent(*dir, scale_delta, false), i as f32 * 0.7, 0.25);
                let (min, max) = physics.platform.walkable_range(cube.scale);
                assert!(cube.position.x >= min && cube.position.x <= max, "x = {}", cube.position.x);
                assert!(cube.position.z >= min && cube.position.z <= max, "z = {}", cube.position.z);
            }
        }
    }

    #[test]
    fn growing_at_the_edge_pushes_cube_inward() {
        let physics = MotionIntegrator::new();
        let mut cube = CubeState {
            position: Vec3::new(9.0, 0.5, -9.0),
            ..CubeState::new()
        };
        cube = physics.step(cube, &intent(Vec3::ZERO, 1.0, false), 0.0, 1.0);

        assert!(approx(cube.scale, 1.5));
        assert!(approx(cube.position.x, 8.75));
        assert!(approx(cube.position.z, -8.75));
    }

    #[test]
    fn scale_is_clamped() {
        let physics = MotionIntegrator::new();
        let mut cube = CubeState::new();
        for _ in 0..100 {
            cube = physics.step(cube, &intent(Vec3::ZERO, 1.0, false), 0.0, 0.5);
            assert!(cube.scale <= 5.0);
        }
        assert_eq!(cube.scale, 5.0);
        for _ in 0..100 {
            cube = physics.step(cube, &intent(Vec3::ZERO, -1.0, false), 0.0, 0.5);
            assert!(cube.scale >= 0.1);
        }
        assert_eq!(cube.scale, 0.1);
    }

    #[test]
    fn grounded_scaling_keeps_base_on_platform() {
        let physics = MotionIntegrator::new();
        let cube = physics.step(CubeState::new(), &intent(Vec3::ZERO, 1.0, false), 0.0, 0.2);

        assert!(approx(cube.scale, 1.1));
        assert!(approx(cube.position.y, 0.55));
        assert!(approx(cube.base_height(), 0.0));
        assert!(cube.is_grounded());
    }

    #[test]
    fn jump_from_ground_becomes_airborne() {
        let physics = MotionIntegrator::new();
        let dt = 0.016;
        let cube = physics.step(CubeState::new(), &intent(Vec3::ZERO, 0.0, true), 0.0, dt);

        assert_eq!(cube.contact, Contact::Airborne);
        assert!(approx(cube.vertical_velocity, physics.jump_impulse - physics.gravity * dt));
        assert!(cube.position.y > 0.5);
    }

    #[test]
    fn jump_ignored_while_airborne() {
        let physics = MotionIntegrator::new();
        let airborne = CubeState {
            position: Vec3::new(0.0, 4.0, 0.0),
            vertical_velocity: 2.0,
            contact: Contact::Airborne,
            ..CubeState::new()
        };
        let cube = physics.step(airborne, &intent(Vec3::ZERO, 0.0, true), 0.0, 0.1);

        assert!(approx(cube.vertical_velocity, 2.0 - physics.gravity * 0.1));
        assert_eq!(cube.contact, Contact::Airborne);
    }

    #[test]
    fn gravity_decelerates_high_cube() {
        let physics = MotionIntegrator::new();
        let airborne = CubeState {
            position: Vec3::new(0.0, 20.0, 0.0),
            vertical_velocity: 15.0,
            contact: Contact::Airborne,
            ..CubeState::new()
        };
        let cube = physics.step(airborne, &intent(Vec3::ZERO, 0.0, false), 0.0, 1.0);

        assert!(approx(cube.vertical_velocity, -4.8));
        assert!(approx(cube.position.y, 15.2));
        assert_eq!(cube.contact, Contact::Airborne);
    }

    #[test]
    fn landing_snaps_to_platform() {
        let physics = MotionIntegrator::new();
        let airborne = CubeState {
            vertical_velocity: 15.0,
            contact: Contact::Airborne,
            ..CubeState::new()
        };
        let cube = physics.step(airborne, &intent(Vec3::ZERO, 0.0, false), 0.0, 1.0);

        assert_eq!(cube.position.y, 0.5);
        assert_eq!(cube.vertical_velocity, 0.0);
        assert!(cube.is_grounded());
    }

    #[test]
    fn base_never_below_platform() {
        let physics = MotionIntegrator::new();
        let mut cube = CubeState::new();
        for tick in 0..500 {
            let jump = tick % 40 == 0;
            let scale_delta = if tick % 7 < 3 { -1.0 } else { 1.0 };
            let dt = 0.005 + (tick % 11) as f32 * 0.01;
            cube = physics.step(cube, &intent(Vec3::Z, scale_delta, jump), 0.3, dt);
            assert!(cube.base_height() >= -1e-5, "base {} at tick {tick}", cube.base_height());
        }
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let physics = MotionIntegrator::new();
        let start = CubeState::new();
        let cube = physics.step(start, &intent(Vec3::Z, 1.0, false), 1.0, 0.0);
        assert_eq!(cube, start);
    }
}
