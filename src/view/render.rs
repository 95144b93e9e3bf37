use wgpu::*;
use wgpu::util::DeviceExt;

use crate::controller::{CameraUniform, TransformUniform};
use crate::ui::UiFrame;
use crate::utils::{create_cube_mesh, create_platform_mesh, rgb, MeshBuffer, Vertex};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Cornflower blue, in the surface's linear space
pub fn clear_color() -> Color {
    let [r, g, b, a] = rgb(100, 149, 237);
    Color { r: r as f64, g: g as f64, b: b as f64, a: a as f64 }
}

pub struct CameraResources {
    pub camera_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub camera_bind_group: wgpu::BindGroup,
}

/// World matrix uniform for one drawn object
pub struct ObjectResources {
    pub transform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

fn uniform_layout_entry(visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

pub fn create_camera_resources(device: &wgpu::Device, initial: &CameraUniform) -> CameraResources {
    let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("camera_buffer"),
        contents: bytemuck::bytes_of(initial),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[uniform_layout_entry(ShaderStages::VERTEX)],
    });

    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() }],
    });

    CameraResources { camera_buffer, bind_group_layout, camera_bind_group }
}

pub fn create_transform_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("transform_bind_group_layout"),
        entries: &[uniform_layout_entry(ShaderStages::VERTEX)],
    })
}

pub fn create_object_resources(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    initial: &TransformUniform,
) -> ObjectResources {
    let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label}_transform")),
        contents: bytemuck::bytes_of(initial),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label}_bind_group")),
        layout,
        entries: &[wgpu::BindGroupEntry { binding: 0, resource: transform_buffer.as_entire_binding() }],
    });

    ObjectResources { transform_buffer, bind_group }
}

pub fn create_scene_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let shader_src = include_str!("shaders/scene.wgsl");
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pipeline_layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("render_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState { format, blend: Some(wgpu::BlendState::REPLACE), write_mask: wgpu::ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // both meshes are seen from either side
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}


/// Everything needed to draw the platform, the cube and the overlay
pub struct RenderState {
    pipeline: RenderPipeline,
    camera: CameraResources,
    platform: ObjectResources,
    cube: ObjectResources,
    platform_mesh: MeshBuffer,
    cube_mesh: MeshBuffer,
    _depth_texture: Texture,
    depth_view: TextureView,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl RenderState {
    pub fn new(
        device: &Device,
        format: TextureFormat,
        width: u32,
        height: u32,
        platform_half_extent: f32,
        camera: &CameraUniform,
        cube: &TransformUniform,
    ) -> Self {
        let camera = create_camera_resources(device, camera);
        let transform_layout = create_transform_layout(device);
        let platform = create_object_resources(
            device,
            &transform_layout,
            "platform",
            &TransformUniform::from_mat4(glam::Mat4::IDENTITY),
        );
        let cube = create_object_resources(device, &transform_layout, "cube", cube);
        let pipeline = create_scene_pipeline(device, format, &[&camera.bind_group_layout, &transform_layout]);

        let platform_mesh = create_platform_mesh(platform_half_extent).upload(device, "Platform");
        let cube_mesh = create_cube_mesh().upload(device, "Cube");
        let (depth_texture, depth_view) = create_depth_texture(device, width, height);

        let egui_renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            pipeline,
            camera,
            platform,
            cube,
            platform_mesh,
            cube_mesh,
            _depth_texture: depth_texture,
            depth_view,
            egui_renderer,
        }
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        let (depth_texture, depth_view) = create_depth_texture(device, width, height);
        self._depth_texture = depth_texture;
        self.depth_view = depth_view;
    }

    /// Upload this frame's camera and cube matrices
    pub fn update(&self, queue: &Queue, camera: &CameraUniform, cube: &TransformUniform) {
        queue.write_buffer(&self.camera.camera_buffer, 0, bytemuck::bytes_of(camera));
        queue.write_buffer(&self.cube.transform_buffer, 0, bytemuck::bytes_of(cube));
    }

    pub fn draw_frame(
        &mut self,
        device: &Device,
        queue: &Queue,
        surface: &Surface,
        ui: Option<UiFrame>,
    ) -> Result<(), SurfaceError> {
        let frame = surface.get_current_texture()?;
        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(clear_color()),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.camera.camera_bind_group, &[]);

            rp.set_bind_group(1, &self.platform.bind_group, &[]);
            self.platform_mesh.draw(&mut rp);

            rp.set_bind_group(1, &self.cube.bind_group, &[]);
            self.cube_mesh.draw(&mut rp);
        }

        if let Some(ui) = ui {
            self.draw_ui(device, queue, &mut encoder, &view, ui);
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn draw_ui(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        view: &TextureView,
        ui: UiFrame,
    ) {
        // Upload egui textures
        for (id, image_delta) in &ui.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, encoder, &ui.primitives, &ui.screen);

        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &ui.primitives, &ui.screen);
        }

        for id in &ui.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
