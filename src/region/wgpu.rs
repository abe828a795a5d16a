//! GPU memory region backed by wgpu buffers.
//!
//! Buffers are uploaded with `Queue::write_buffer` and read back through a
//! mapped staging buffer. The intersection engine does not execute here;
//! this region exists so meshes can live accelerator-side and be mirrored
//! with [`crate::region::mesh_to`].

use core::fmt::{self, Debug};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::IntervoxError;
use crate::region::{Element, MemoryRegion, RegionBuffer};

/// Memory region allocating buffers on one wgpu device.
#[derive(Clone)]
pub struct WgpuRegion {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl Debug for WgpuRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WgpuRegion").finish_non_exhaustive()
    }
}

impl WgpuRegion {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }
}

/// GPU-resident buffer of Pod elements.
pub struct WgpuBuffer<V> {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    buffer: wgpu::Buffer,
    len: usize,
    _pd: PhantomData<V>,
}

impl<V> Debug for WgpuBuffer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WgpuBuffer")
            .field("len", &self.len)
            .finish()
    }
}

impl<V: Element> WgpuBuffer<V> {
    #[inline]
    fn elem_size() -> usize {
        std::mem::size_of::<V>()
    }

    #[inline]
    fn to_bytes(off: usize, len: usize) -> (u64, u64) {
        let b = Self::elem_size();
        ((off * b) as u64, (len * b) as u64)
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<(), IntervoxError> {
        let end = offset
            .checked_add(len)
            .ok_or(IntervoxError::RangeOutOfBounds {
                region: "wgpu",
                offset,
                len,
            })?;
        if end > self.len {
            return Err(IntervoxError::RangeOutOfBounds {
                region: "wgpu",
                offset,
                len,
            });
        }
        Ok(())
    }
}

impl<V: Element> RegionBuffer<V> for WgpuBuffer<V> {
    fn len(&self) -> usize {
        self.len
    }

    fn read_slice(&self, offset: usize, len: usize) -> Result<Vec<V>, IntervoxError> {
        self.check_range(offset, len)?;
        if len == 0 {
            return Ok(Vec::new());
        }
        let (src_b, size_b) = Self::to_bytes(offset, len);
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("WgpuBuffer[read] staging"),
            size: size_b,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut enc = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("WgpuBuffer::read_slice"),
            });
        enc.copy_buffer_to_buffer(&self.buffer, src_b, &staging, 0, size_b);
        self.queue.submit(Some(enc.finish()));

        let buffer_slice = staging.slice(..);
        let (sender, receiver) = futures_intrusive::channel::shared::oneshot_channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |res| {
            sender.send(res).ok();
        });
        self.device.poll(wgpu::Maintain::Wait);
        let res = pollster::block_on(receiver.receive());
        res.ok_or(IntervoxError::GpuMappingFailed)?
            .map_err(|_| IntervoxError::GpuMappingFailed)?;

        let data = buffer_slice.get_mapped_range();
        let mut out = vec![V::zeroed(); len];
        out.copy_from_slice(bytemuck::cast_slice(&data));
        drop(data);
        staging.unmap();
        Ok(out)
    }

    fn write_slice(&mut self, offset: usize, src: &[V]) -> Result<(), IntervoxError> {
        self.check_range(offset, src.len())?;
        if src.is_empty() {
            return Ok(());
        }
        let (dst_b, _) = Self::to_bytes(offset, src.len());
        self.queue
            .write_buffer(&self.buffer, dst_b, bytemuck::cast_slice(src));
        Ok(())
    }
}

impl MemoryRegion for WgpuRegion {
    type Buffer<V: Element> = WgpuBuffer<V>;

    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn alloc<V: Element>(&self, len: usize) -> Result<Self::Buffer<V>, IntervoxError> {
        let byte_len = len
            .checked_mul(std::mem::size_of::<V>())
            .ok_or(IntervoxError::AllocationFailed {
                region: "wgpu",
                len,
            })? as u64;
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("intervox/WgpuBuffer"),
            size: byte_len,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        if byte_len > 0 {
            let zeros = vec![V::zeroed(); len];
            self.queue
                .write_buffer(&buffer, 0, bytemuck::cast_slice(&zeros));
        }
        Ok(WgpuBuffer {
            device: self.device.clone(),
            queue: self.queue.clone(),
            buffer,
            len,
            _pd: PhantomData,
        })
    }
}
