use thiserror::Error;

/// Fatal errors while bringing up the window and GPU
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// The platform refused to move the pointer
#[derive(Debug, Error)]
#[error("cursor warp unavailable: {0}")]
pub struct CursorWarpError(pub String);
