//! Data-driven vertex attribute layouts.
//!
//! Each vertex record type publishes a [`VertexLayout`] table (stride, step
//! mode and a list of `{location, offset, components}` descriptors). Pipelines
//! turn the table into a `wgpu::VertexBufferLayout` via [`BufferLayout`],
//! which owns the converted attribute list for as long as the pipeline
//! descriptor needs it.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// One float attribute inside a vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// Shader `@location`.
    pub location: u32,
    /// Byte offset inside the record.
    pub offset: u64,
    /// Number of `f32` components (1–4).
    pub components: u8,
}

impl AttributeDescriptor {
    fn format(self) -> wgpu::VertexFormat {
        match self.components {
            1 => wgpu::VertexFormat::Float32,
            2 => wgpu::VertexFormat::Float32x2,
            3 => wgpu::VertexFormat::Float32x3,
            _ => wgpu::VertexFormat::Float32x4,
        }
    }
}

/// Complete attribute table for one vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    /// Bytes between consecutive records.
    pub stride: u64,
    /// Per-vertex or per-instance stepping.
    pub step: wgpu::VertexStepMode,
    /// Attributes in location order.
    pub attributes: &'static [AttributeDescriptor],
}

/// A GPU vertex record type with a published layout table.
pub trait VertexRecord: Pod {
    /// The layout table for this record type.
    const LAYOUT: VertexLayout;
}

/// Owned `wgpu` attributes converted from a [`VertexLayout`].
pub struct BufferLayout {
    stride: u64,
    step: wgpu::VertexStepMode,
    attributes: Vec<wgpu::VertexAttribute>,
}

impl BufferLayout {
    /// Convert the layout table of `V`.
    pub fn of<V: VertexRecord>() -> Self {
        Self::from_table(&V::LAYOUT)
    }

    /// Convert an arbitrary layout table.
    pub fn from_table(layout: &VertexLayout) -> Self {
        Self {
            stride: layout.stride,
            step: layout.step,
            attributes: layout
                .attributes
                .iter()
                .map(|a| wgpu::VertexAttribute {
                    format: a.format(),
                    offset: a.offset,
                    shader_location: a.location,
                })
                .collect(),
        }
    }

    /// Borrow as a `wgpu::VertexBufferLayout`.
    pub fn as_wgpu(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: self.step,
            attributes: &self.attributes,
        }
    }
}

/// Position / normal / texture-coordinate vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VertexPnt {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub texcoords: [f32; 2],
}

impl VertexRecord for VertexPnt {
    const LAYOUT: VertexLayout = VertexLayout {
        stride: size_of::<Self>() as u64,
        step: wgpu::VertexStepMode::Vertex,
        attributes: &[
            AttributeDescriptor {
                location: 0,
                offset: 0,
                components: 3,
            },
            AttributeDescriptor {
                location: 1,
                offset: 12,
                components: 3,
            },
            AttributeDescriptor {
                location: 2,
                offset: 24,
                components: 2,
            },
        ],
    };
}

/// Per-instance model matrix, one column per attribute.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceModel {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
}

impl From<Mat4> for InstanceModel {
    fn from(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }
}

impl VertexRecord for InstanceModel {
    const LAYOUT: VertexLayout = VertexLayout {
        stride: size_of::<Self>() as u64,
        step: wgpu::VertexStepMode::Instance,
        attributes: &[
            AttributeDescriptor {
                location: 3,
                offset: 0,
                components: 4,
            },
            AttributeDescriptor {
                location: 4,
                offset: 16,
                components: 4,
            },
            AttributeDescriptor {
                location: 5,
                offset: 32,
                components: 4,
            },
            AttributeDescriptor {
                location: 6,
                offset: 48,
                components: 4,
            },
        ],
    };
}

/// Position + color vertex for overlay line geometry.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VertexPc {
    /// Position.
    pub position: [f32; 3],
    /// Linear RGB color.
    pub color: [f32; 3],
}

impl VertexRecord for VertexPc {
    const LAYOUT: VertexLayout = VertexLayout {
        stride: size_of::<Self>() as u64,
        step: wgpu::VertexStepMode::Vertex,
        attributes: &[
            AttributeDescriptor {
                location: 0,
                offset: 0,
                components: 3,
            },
            AttributeDescriptor {
                location: 1,
                offset: 12,
                components: 3,
            },
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_packed(layout: &VertexLayout) {
        let mut end = 0;
        for attribute in layout.attributes {
            assert_eq!(attribute.offset, end, "gap before {attribute:?}");
            end += u64::from(attribute.components) * 4;
        }
        assert_eq!(end, layout.stride);
    }

    #[test]
    fn layouts_cover_their_records_without_gaps() {
        assert_packed(&VertexPnt::LAYOUT);
        assert_packed(&InstanceModel::LAYOUT);
        assert_packed(&VertexPc::LAYOUT);
    }

    #[test]
    fn instance_layout_does_not_overlap_vertex_locations() {
        let vertex: Vec<u32> =
            VertexPnt::LAYOUT.attributes.iter().map(|a| a.location).collect();
        for attribute in InstanceModel::LAYOUT.attributes {
            assert!(!vertex.contains(&attribute.location));
        }
        assert_eq!(InstanceModel::LAYOUT.step, wgpu::VertexStepMode::Instance);
    }

    #[test]
    fn converted_layout_keeps_formats() {
        let layout = BufferLayout::of::<VertexPnt>();
        let wgpu_layout = layout.as_wgpu();
        assert_eq!(wgpu_layout.array_stride, 32);
        let formats: Vec<_> =
            wgpu_layout.attributes.iter().map(|a| a.format).collect();
        assert_eq!(formats[0], wgpu::VertexFormat::Float32x3);
        assert_eq!(formats[2], wgpu::VertexFormat::Float32x2);
    }
}
