// CONTROLLER: Input, game logic, and update loop
pub mod input;
pub mod gamepad;
pub mod physics;
pub mod orbit_camera;
pub mod frame_loop;

pub use input::{CursorWarp, DeviceSampler, InputEvent, InputProcessor, InputSampler, InputSnapshot, InputState, KeyBindings};
pub use gamepad::{GamepadSource, GamepadState, NoGamepad};
pub use physics::{MotionIntegrator, MotionIntent};
pub use orbit_camera::OrbitCamera;
pub use frame_loop::{CameraUniform, FrameClock, FrameLoop, TickOutcome, TransformUniform};
