use crate::error::PickerError;

// Copies must use a 256-byte aligned row pitch even for a single texel.
const STAGING_SIZE: u64 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64;

/// Blocking one-texel copy from a GPU texture to the CPU.
///
/// The source texture and aspect are always named explicitly by the
/// caller, so a read never depends on which target happened to be bound
/// last.
pub struct TexelReadback {
    staging_buffer: wgpu::Buffer,
}

impl TexelReadback {
    /// Allocate the mappable staging buffer.
    pub fn new(device: &wgpu::Device, label: &str) -> Self {
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: STAGING_SIZE,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self { staging_buffer }
    }

    /// Copy the first byte of texel `(x, y)` of `aspect` of `texture`,
    /// wait for the GPU and return it. `texture` must have `COPY_SRC`
    /// usage and a one-byte texel in `aspect` (`R8Uint`, or the stencil
    /// aspect of a depth/stencil format).
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Readback`] if the texel is outside the
    /// texture, the device cannot be polled, or the buffer fails to map.
    pub fn read_u8(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        aspect: wgpu::TextureAspect,
        (x, y): (u32, u32),
    ) -> Result<u8, PickerError> {
        if x >= texture.width() || y >= texture.height() {
            return Err(PickerError::Readback(format!(
                "texel ({x}, {y}) outside {}x{} target",
                texture.width(),
                texture.height()
            )));
        }

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Pick Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        let _ = queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = self.staging_buffer.slice(..4);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        let _ = device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| {
                PickerError::Readback(format!("device poll failed: {e}"))
            })?;

        match receiver.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(PickerError::Readback(format!(
                    "buffer map failed: {e}"
                )))
            }
            Err(_) => {
                return Err(PickerError::Readback(
                    "buffer map callback never ran".to_owned(),
                ))
            }
        }

        let data = buffer_slice.get_mapped_range();
        let value = data[0];
        drop(data);
        self.staging_buffer.unmap();
        Ok(value)
    }
}
