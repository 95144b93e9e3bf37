use wgpu::util::DeviceExt;
use bytemuck::NoUninit;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
        wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
        wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x4 },
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// 8-bit sRGB channel to linear light; the surface re-encodes on write
pub fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
}

/// 8-bit sRGB color to the linear float layout the shader expects
pub fn rgb(r: u8, g: u8, b: u8) -> [f32; 4] {
    [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), 1.0]
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: Option<wgpu::Buffer>,
    /// Number of indices, or vertices for non-indexed meshes
    pub element_count: u32,
}

impl MeshBuffer {
    pub fn draw(&self, rp: &mut wgpu::RenderPass<'_>) {
        rp.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(index_buffer) => {
                rp.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                rp.draw_indexed(0..self.element_count, 0, 0..1);
            }
            None => rp.draw(0..self.element_count, 0..1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Empty for non-indexed meshes
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        if self.is_indexed() { self.indices.len() / 3 } else { self.vertices.len() / 3 }
    }

    pub fn upload(&self, device: &wgpu::Device, label: &str) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        if !self.is_indexed() {
            return MeshBuffer {
                vertex_buffer,
                index_buffer: None,
                element_count: self.vertices.len() as u32,
            };
        }

        // index buffers must be 4-byte aligned
        let mut indices = self.indices.clone();
        if indices.len() % 2 != 0 {
            indices.push(0);
        }
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer: Some(index_buffer),
            element_count: self.indices.len() as u32,
        }
    }
}

/// Unit cube centered on the origin, one color per corner
pub fn create_cube_mesh() -> Mesh {
    let vertices = vec![
        Vertex { pos: [-0.5, -0.5, -0.5], color: rgb(255, 0, 0) },     // red
        Vertex { pos: [0.5, -0.5, -0.5], color: rgb(255, 165, 0) },    // orange
        Vertex { pos: [0.5, 0.5, -0.5], color: rgb(255, 255, 0) },     // yellow
        Vertex { pos: [-0.5, 0.5, -0.5], color: rgb(0, 128, 0) },      // green
        Vertex { pos: [-0.5, -0.5, 0.5], color: rgb(0, 0, 255) },      // blue
        Vertex { pos: [0.5, -0.5, 0.5], color: rgb(75, 0, 130) },      // indigo
        Vertex { pos: [0.5, 0.5, 0.5], color: rgb(238, 130, 238) },    // violet
        Vertex { pos: [-0.5, 0.5, 0.5], color: rgb(255, 255, 255) },   // white
    ];
    let indices = vec![
        0, 1, 2, 0, 2, 3, // front
        1, 5, 6, 1, 6, 2, // right
        5, 4, 7, 5, 7, 6, // back
        4, 0, 3, 4, 3, 7, // left
        3, 2, 6, 3, 6, 7, // top
        4, 5, 1, 4, 1, 0, // bottom
    ];

    Mesh { vertices, indices }
}

/// Flat gray quad at y = 0 spanning +-half_extent on X and Z
pub fn create_platform_mesh(half_extent: f32) -> Mesh {
    let s = half_extent;
    let color = rgb(128, 128, 128);
    let corner = |x: f32, z: f32| Vertex { pos: [x, 0.0, z], color };

    let vertices = vec![
        corner(-s, -s), corner(s, -s), corner(s, s),
        corner(-s, -s), corner(s, s), corner(-s, s),
    ];

    Mesh { vertices, indices: Vec::new() }
}
