//! Vertex and per-instance GPU buffers.

use wgpu::util::DeviceExt;

use super::vertex::{InstanceModel, VertexPnt};

/// Non-indexed triangle list uploaded once.
pub struct GpuMesh {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl GpuMesh {
    /// Upload `vertices` as a static vertex buffer.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        vertices: &[VertexPnt],
    ) -> Self {
        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        Self {
            buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    /// The vertex buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Number of vertices to draw.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

/// Fixed-capacity per-instance model matrices, rewritten every frame.
pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl InstanceBuffer {
    /// Allocate room for exactly `count` instances.
    pub fn new(device: &wgpu::Device, label: &str, count: usize) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (count.max(1) * size_of::<InstanceModel>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            count: count as u32,
        }
    }

    /// Overwrite the whole buffer. `models.len()` must equal the allocated
    /// count; extra entries are ignored.
    pub fn write(&self, queue: &wgpu::Queue, models: &[InstanceModel]) {
        let used = models.len().min(self.count as usize);
        let bytes = bytemuck::cast_slice(&models[..used]);
        queue.write_buffer(&self.buffer, 0, bytes);
    }

    /// The instance vertex buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Number of instances.
    pub fn count(&self) -> u32 {
        self.count
    }
}
