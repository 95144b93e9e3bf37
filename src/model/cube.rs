use glam::{Mat4, Vec3};

/// Whether the cube currently rests on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Grounded,
    Airborne,
}

/// Everything the simulation knows about the cube. Replaced wholesale every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeState {
    /// Center of the cube in world space
    pub position: Vec3,
    /// Edge length
    pub scale: f32,
    pub vertical_velocity: f32,
    pub contact: Contact,
}

impl CubeState {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.5, 0.0),
            scale: 1.0,
            vertical_velocity: 0.0,
            contact: Contact::Grounded,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.contact == Contact::Grounded
    }

    pub fn half_scale(&self) -> f32 {
        self.scale / 2.0
    }

    /// Height of the cube's bottom face
    pub fn base_height(&self) -> f32 {
        self.position.y - self.half_scale()
    }

    /// Model matrix for the unit cube mesh
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

impl Default for CubeState {
    fn default() -> Self {
        Self::new()
    }
}
