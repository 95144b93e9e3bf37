/// The static floor the cube lives on. Centered on the origin, axis aligned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    /// Half the side length of the drawn quad
    pub half_extent: f32,
    /// Half extent the cube's center may reach before its own half size is subtracted
    pub walkable_half_extent: f32,
    /// Y coordinate of the surface
    pub height: f32,
}

impl Platform {
    pub fn new() -> Self {
        Self {
            half_extent: 10.0,
            walkable_half_extent: 9.5,
            height: 0.0,
        }
    }

    /// Allowed range for the cube center on X and Z given the cube's edge length
    pub fn walkable_range(&self, scale: f32) -> (f32, f32) {
        let margin = scale / 2.0;
        (-self.walkable_half_extent + margin, self.walkable_half_extent - margin)
    }

    pub fn clamp_xz(&self, x: f32, z: f32, scale: f32) -> (f32, f32) {
        let (min, max) = self.walkable_range(scale);
        (x.clamp(min, max), z.clamp(min, max))
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::new()
    }
}
