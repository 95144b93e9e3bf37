use egui::Context;
use winit::window::Window;

use crate::controller::FrameLoop;
use crate::model::Contact;

/// Tessellated overlay ready for the renderer
pub struct UiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen: egui_wgpu::ScreenDescriptor,
}

/// Debug overlay drawn on top of the scene
pub struct Overlay {
    ctx: Context,
    state: egui_winit::State,
    pub visible: bool,
}

impl Overlay {
    pub fn new(window: &Window) -> Self {
        let ctx = Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            None,
            None,
            None,
        );
        Self { ctx, state, visible: true }
    }

    /// Returns true when egui consumed the event
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.visible && self.state.on_window_event(window, event).consumed
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Build the UI for this frame, `None` while hidden
    pub fn run(&mut self, window: &Window, frame_loop: &FrameLoop, fps: f32, width: u32, height: u32) -> Option<UiFrame> {
        if !self.visible {
            return None;
        }

        let raw_input = self.state.take_egui_input(window);
        let lines = debug_lines(frame_loop, fps);
        let output = self.ctx.run(raw_input, |ctx| {
            draw_debug_window(ctx, &lines);
        });
        self.state.handle_platform_output(window, output.platform_output);

        let primitives = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        Some(UiFrame {
            primitives,
            textures_delta: output.textures_delta,
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [width, height],
                pixels_per_point: output.pixels_per_point,
            },
        })
    }
}

fn draw_debug_window(ctx: &Context, lines: &[String]) {
    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .show(ctx, |ui| {
            for line in lines {
                ui.label(egui::RichText::new(line).small());
            }
            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            ui.label(egui::RichText::new("WASD - Move").small());
            ui.label(egui::RichText::new("E / Q - Grow / Shrink").small());
            ui.label(egui::RichText::new("Space - Jump").small());
            ui.label(egui::RichText::new("Mouse - Orbit camera").small());
            ui.label(egui::RichText::new("F3 - Toggle overlay").small());
            ui.label(egui::RichText::new("Esc - Quit").small());
        });
}

pub fn debug_lines(frame_loop: &FrameLoop, fps: f32) -> Vec<String> {
    let cube = &frame_loop.cube;
    let cam = &frame_loop.camera;
    let contact = match cube.contact {
        Contact::Grounded => "grounded",
        Contact::Airborne => "airborne",
    };

    vec![
        format!("FPS: {fps:.0}"),
        format!("Pos: x: {:.2} y: {:.2} z: {:.2}", cube.position.x, cube.position.y, cube.position.z),
        format!("Scale: {:.2}", cube.scale),
        format!("State: {contact} (vy {:.2})", cube.vertical_velocity),
        format!("Yaw: {:.1} Pitch: {:.1}", cam.yaw.to_degrees(), cam.pitch.to_degrees()),
    ]
}
