// VIEW: Rendering and graphics
pub mod render;
pub mod gpu_init;

pub use render::{CameraResources, ObjectResources, RenderState};
pub use gpu_init::GpuContext;
