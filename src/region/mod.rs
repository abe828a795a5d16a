//! Memory regions: where mesh arrays live.
//!
//! A [`MemoryRegion`] allocates typed buffers in one physical memory space.
//! [`HostRegion`] is the Vec-backed default and the only region the
//! intersection engine executes in; the `wgpu` feature adds a GPU region
//! backed by wgpu buffers. Buffers expose only
//! bulk slice reads and writes, which is all [`mesh_to`] needs to mirror a
//! mesh across regions.

use core::fmt::{self, Debug};

use crate::error::IntervoxError;
use crate::mesh::csr::Mesh;

#[cfg(feature = "wgpu")]
pub mod wgpu;

/// Element types that may live in a region buffer.
///
/// `Pod` gives a stable byte layout for bulk copies and GPU uploads; the
/// marker is blanket-implemented, so every plain-old-data type qualifies.
pub trait Element: bytemuck::Pod + Send + Sync + Debug {}

impl<T: bytemuck::Pod + Send + Sync + Debug> Element for T {}

/// Contiguous storage for `V` in some memory region.
///
/// Reads stage through a host `Vec`; a host-resident implementation returns
/// its own contents, an accelerator implementation copies back through a
/// staging buffer.
pub trait RegionBuffer<V: Element>: Debug + Send + Sync {
    /// Current length in elements.
    fn len(&self) -> usize;

    /// Whether the buffer holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the range `[offset .. offset + len)` into a host `Vec`.
    fn read_slice(&self, offset: usize, len: usize) -> Result<Vec<V>, IntervoxError>;

    /// Copy `src` into the range `[offset .. offset + src.len())`.
    fn write_slice(&mut self, offset: usize, src: &[V]) -> Result<(), IntervoxError>;
}

/// A named memory space that can allocate [`RegionBuffer`]s.
pub trait MemoryRegion {
    /// Buffer type this region allocates.
    type Buffer<V: Element>: RegionBuffer<V>;

    /// Region name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Allocate a zero-initialised buffer of `len` elements.
    fn alloc<V: Element>(&self, len: usize) -> Result<Self::Buffer<V>, IntervoxError>;

    /// Allocate and fill a buffer from host data.
    fn upload<V: Element>(&self, data: &[V]) -> Result<Self::Buffer<V>, IntervoxError> {
        let mut buf = self.alloc(data.len())?;
        buf.write_slice(0, data)?;
        Ok(buf)
    }
}

/// Host-accessible memory region (the default).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HostRegion;

/// `Vec`-backed buffer with direct slice access.
#[derive(Clone, PartialEq, Eq)]
pub struct HostBuffer<V>(pub(crate) Vec<V>);

impl<V> Debug for HostBuffer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBuffer")
            .field("len", &self.0.len())
            .finish()
    }
}

impl<V> HostBuffer<V> {
    /// Entire read-only buffer.
    #[inline]
    pub fn as_slice(&self) -> &[V] {
        &self.0
    }

    /// Entire mutable buffer.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [V] {
        &mut self.0
    }

    /// Consume the buffer, yielding the underlying `Vec`.
    pub fn into_inner(self) -> Vec<V> {
        self.0
    }
}

impl<V> From<Vec<V>> for HostBuffer<V> {
    fn from(v: Vec<V>) -> Self {
        Self(v)
    }
}

impl<V: Element> RegionBuffer<V> for HostBuffer<V> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn read_slice(&self, offset: usize, len: usize) -> Result<Vec<V>, IntervoxError> {
        let end = offset
            .checked_add(len)
            .ok_or(IntervoxError::RangeOutOfBounds {
                region: "host",
                offset,
                len,
            })?;
        let src = self
            .0
            .get(offset..end)
            .ok_or(IntervoxError::RangeOutOfBounds {
                region: "host",
                offset,
                len,
            })?;
        Ok(src.to_vec())
    }

    fn write_slice(&mut self, offset: usize, src: &[V]) -> Result<(), IntervoxError> {
        let end = offset
            .checked_add(src.len())
            .ok_or(IntervoxError::RangeOutOfBounds {
                region: "host",
                offset,
                len: src.len(),
            })?;
        let dst = self
            .0
            .get_mut(offset..end)
            .ok_or(IntervoxError::RangeOutOfBounds {
                region: "host",
                offset,
                len: src.len(),
            })?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl MemoryRegion for HostRegion {
    type Buffer<V: Element> = HostBuffer<V>;

    fn name(&self) -> &'static str {
        "host"
    }

    fn alloc<V: Element>(&self, len: usize) -> Result<Self::Buffer<V>, IntervoxError> {
        // Vec rejects allocations whose byte size exceeds isize::MAX; catch
        // that here as a fallible path instead of a panic.
        let bytes = len.checked_mul(std::mem::size_of::<V>());
        if bytes.map_or(true, |b| b > isize::MAX as usize) {
            return Err(IntervoxError::AllocationFailed {
                region: "host",
                len,
            });
        }
        Ok(HostBuffer(vec![V::zeroed(); len]))
    }
}

/// Mirror a whole mesh into `dst`, preserving sizes and contents verbatim.
///
/// All mesh invariants survive the copy unchanged. Fails only if a buffer
/// cannot be allocated in the destination region or a staged read fails.
pub fn mesh_to<Dst, Src>(dst: &Dst, src: &Mesh<Src>) -> Result<Mesh<Dst>, IntervoxError>
where
    Dst: MemoryRegion,
    Src: MemoryRegion,
{
    let row_keys = src.row_keys_buf().read_slice(0, src.num_rows())?;
    let row_ptr = src.row_ptr_buf().read_slice(0, src.num_rows() + 1)?;
    let intervals = src.intervals_buf().read_slice(0, src.num_intervals())?;
    Mesh::upload_parts_in(dst, &row_keys, &row_ptr, &intervals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_buffer_roundtrip() {
        let mut buf = HostRegion.alloc::<u32>(6).unwrap();
        buf.write_slice(2, &[7, 8, 9]).unwrap();
        assert_eq!(buf.read_slice(0, 6).unwrap(), vec![0, 0, 7, 8, 9, 0]);
        assert_eq!(buf.read_slice(2, 3).unwrap(), vec![7, 8, 9]);
    }

    #[test]
    fn host_buffer_rejects_out_of_range() {
        let mut buf = HostRegion.alloc::<u32>(4).unwrap();
        assert!(matches!(
            buf.read_slice(2, 3),
            Err(IntervoxError::RangeOutOfBounds { .. })
        ));
        assert!(matches!(
            buf.write_slice(3, &[1, 2]),
            Err(IntervoxError::RangeOutOfBounds { .. })
        ));
    }

    #[test]
    fn upload_matches_source() {
        let buf = HostRegion.upload(&[3i32, 1, 4, 1, 5]).unwrap();
        assert_eq!(buf.as_slice(), &[3, 1, 4, 1, 5]);
    }

    #[test]
    fn oversized_alloc_fails() {
        assert!(matches!(
            HostRegion.alloc::<u64>(usize::MAX),
            Err(IntervoxError::AllocationFailed {
                region: "host",
                len: usize::MAX,
            })
        ));
        // Largest representable byte size still refuses: over isize::MAX.
        assert!(matches!(
            HostRegion.alloc::<u8>(usize::MAX),
            Err(IntervoxError::AllocationFailed { .. })
        ));
    }
}
