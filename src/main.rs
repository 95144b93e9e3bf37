use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowId},
};

use cubehop::controller::{gamepad, DeviceSampler, FrameClock, FrameLoop, InputEvent, InputSampler, TickOutcome};
use cubehop::view::{GpuContext, RenderState};
use cubehop::{logging, ui, AppError};

struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,
    overlay: ui::Overlay,

    // Simulation
    sampler: DeviceSampler<Arc<Window>>,
    frame_loop: FrameLoop,
    clock: FrameClock,
    cursor_grabbed: bool,
}

impl App {
    fn new(event_loop: &ActiveEventLoop) -> Result<Self, AppError> {
        let window_attributes = Window::default_attributes()
            .with_title("cubehop")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        let (width, height) = (gpu.config.width, gpu.config.height);

        let frame_loop = FrameLoop::new(width, height);
        let render_state = RenderState::new(
            &gpu.device,
            gpu.format,
            width,
            height,
            frame_loop.physics.platform.half_extent,
            &frame_loop.camera_uniform(),
            &frame_loop.cube_transform(),
        );
        let overlay = ui::Overlay::new(&window);
        let sampler = DeviceSampler::new(window.clone(), width, height)
            .with_gamepad(gamepad::default_source());

        tracing::info!(width, height, "window ready");

        Ok(Self {
            window,
            gpu,
            render_state,
            overlay,
            sampler,
            frame_loop,
            clock: FrameClock::new(),
            cursor_grabbed: false,
        })
    }

    fn input(&mut self, event: &WindowEvent) {
        if self.overlay.on_window_event(&self.window, event) {
            return;
        }

        let input_event = match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, repeat, .. }, .. } => {
                let PhysicalKey::Code(code) = physical_key else { return };
                match state {
                    ElementState::Pressed => {
                        if !repeat && self.sampler.processor().wants_to_toggle_overlay(*code) {
                            self.overlay.toggle();
                        }
                        InputEvent::KeyDown(*code)
                    }
                    ElementState::Released => InputEvent::KeyUp(*code),
                }
            }
            WindowEvent::CursorMoved { position, .. } => InputEvent::CursorMoved { x: position.x, y: position.y },
            WindowEvent::MouseInput { state: ElementState::Pressed, .. } => InputEvent::MouseClick,
            WindowEvent::Focused(true) => InputEvent::FocusGained,
            WindowEvent::Focused(false) => InputEvent::FocusLost,
            _ => return,
        };

        self.sampler.process_event(&input_event);
        self.sync_cursor_grab();
    }

    fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.sampler.process_event(&InputEvent::MouseMove { dx: dx as f32, dy: dy as f32 });
    }

    /// Hide and confine the pointer while the sampler is reading look input
    fn sync_cursor_grab(&mut self) {
        let captured = self.sampler.pointer_captured();
        if captured == self.cursor_grabbed {
            return;
        }
        self.cursor_grabbed = captured;

        self.window.set_cursor_visible(!captured);
        let mode = if captured { CursorGrabMode::Confined } else { CursorGrabMode::None };
        if let Err(e) = self.window.set_cursor_grab(mode) {
            tracing::debug!("cursor grab {mode:?} unavailable: {e}");
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if !self.gpu.resize(new_size.width, new_size.height) {
            return;
        }
        self.render_state.resize(&self.gpu.device, new_size.width, new_size.height);
        self.frame_loop.resize(new_size.width, new_size.height);
        self.sampler.process_event(&InputEvent::Resized { width: new_size.width, height: new_size.height });
    }

    /// One update + draw. Returns false when the app should quit.
    fn frame(&mut self) -> bool {
        let dt = self.clock.tick();
        let snapshot = self.sampler.sample();

        if self.frame_loop.tick(&snapshot, dt) == TickOutcome::Exit {
            tracing::info!("exit requested");
            return false;
        }

        self.render_state.update(
            &self.gpu.queue,
            &self.frame_loop.camera_uniform(),
            &self.frame_loop.cube_transform(),
        );

        let ui_frame = self.overlay.run(
            &self.window,
            &self.frame_loop,
            self.clock.fps(),
            self.gpu.config.width,
            self.gpu.config.height,
        );

        match self.render_state.draw_frame(&self.gpu.device, &self.gpu.queue, &self.gpu.surface, ui_frame) {
            Ok(()) => true,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
                true
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory");
                false
            }
            Err(e) => {
                tracing::warn!("dropped frame: {e:?}");
                true
            }
        }
    }
}

#[derive(Default)]
struct Host {
    app: Option<App>,
    error: Option<AppError>,
}

impl ApplicationHandler for Host {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        match App::new(event_loop) {
            Ok(app) => self.app = Some(app),
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(app) = self.app.as_mut() else { return };
        if window_id != app.window.id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(physical_size) => app.resize(physical_size),
            WindowEvent::RedrawRequested => {
                if !app.frame() {
                    event_loop.exit();
                }
            }
            ref other => app.input(other),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let (Some(app), DeviceEvent::MouseMotion { delta }) = (self.app.as_mut(), event) {
            app.handle_mouse_motion(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &self.app {
            app.window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut host = Host::default();
    event_loop.run_app(&mut host)?;

    if let Some(e) = host.error {
        tracing::error!("{e}");
        return Err(e.into());
    }
    Ok(())
}
