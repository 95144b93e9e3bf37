// MODEL: Simulation state and data
pub mod cube;
pub mod camera;
pub mod platform;

pub use cube::{Contact, CubeState};
pub use camera::Camera;
pub use platform::Platform;
