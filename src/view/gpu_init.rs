use std::sync::Arc;
use wgpu::Device;
use winit::window::Window;

use crate::error::AppError;

/// GPU context for the demo window
pub struct GpuContext {
    pub device: Arc<Device>,
    pub queue: Arc<wgpu::Queue>,
    pub surface: wgpu::Surface<'static>,
    pub format: wgpu::TextureFormat,
    pub config: wgpu::SurfaceConfiguration,
}

async fn init_device_and_queue(
    adapter: &wgpu::Adapter,
) -> Result<(Arc<Device>, Arc<wgpu::Queue>), AppError> {
    let adapter_limits = adapter.limits();
    let limits = wgpu::Limits::downlevel_defaults().using_resolution(adapter_limits);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits,
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::default(),
            },
        )
        .await?;

    Ok((Arc::new(device), Arc::new(queue)))
}

fn configure_surface(
    device: &Device,
    adapter: &wgpu::Adapter,
    surface: &wgpu::Surface,
    width: u32,
    height: u32,
) -> Result<(wgpu::TextureFormat, wgpu::SurfaceConfiguration), AppError> {
    let caps = surface.get_capabilities(adapter);
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first().copied())
        .ok_or(AppError::NoSurfaceFormat)?;
    let alpha_mode = caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto);

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(device, &config);

    Ok((format, config))
}

impl GpuContext {
    /// Initialize GPU for the given window
    pub async fn new(window: Arc<Window>) -> Result<Self, AppError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await?;
        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "selected GPU adapter");

        let (device, queue) = init_device_and_queue(&adapter).await?;
        let (format, config) = configure_surface(&device, &adapter, &surface, size.width, size.height)?;

        Ok(GpuContext {
            device,
            queue,
            surface,
            format,
            config,
        })
    }

    /// Apply a new window size; zero sizes (minimized) are ignored
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
        true
    }

    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}
