//! Dual-residency buffers
//!
//! `HostBuffer` is the mutable staging side. `sync_to_device` performs the one
//! copy into a shared, parallel-visible allocation and hands back a
//! `MirroredBuffer`, which exposes no mutation at all.

use std::sync::Arc;
use tracing::debug;

/// Host-side staging buffer
#[derive(Debug, Clone, PartialEq)]
pub struct HostBuffer<T> {
    data: Vec<T>,
}

impl<T: Clone> HostBuffer<T> {
    /// Copy the host data into the device-visible buffer
    #[must_use]
    pub fn sync_to_device(self) -> MirroredBuffer<T> {
        let device: Arc<[T]> = Arc::from(self.data.as_slice());
        debug!("Mirrored {} elements to device buffer", device.len());
        MirroredBuffer {
            host: self.data,
            device,
        }
    }
}

impl<T> From<Vec<T>> for HostBuffer<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Immutable buffer resident on both the host and the parallel side
///
/// Clones share the device allocation.
#[derive(Debug, Clone)]
pub struct MirroredBuffer<T> {
    host: Vec<T>,
    device: Arc<[T]>,
}

impl<T> MirroredBuffer<T> {
    /// Host copy, for diagnostics and serialization
    pub fn host(&self) -> &[T] {
        &self.host
    }

    /// Copy read by parallel kernels
    pub fn device(&self) -> &[T] {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_copies_host_data() {
        let mirrored = HostBuffer::from(vec![1.0_f64, 2.0]).sync_to_device();
        assert_eq!(mirrored.host(), &[1.0, 2.0]);
        assert_eq!(mirrored.device(), mirrored.host());
        assert_ne!(mirrored.device().as_ptr(), mirrored.host().as_ptr());
    }

    #[test]
    fn test_clones_share_device_copy() {
        let mirrored = HostBuffer::from(vec![3_u32, 4, 5]).sync_to_device();
        let clone = mirrored.clone();
        assert_eq!(mirrored.device().as_ptr(), clone.device().as_ptr());
        assert_ne!(mirrored.host().as_ptr(), clone.host().as_ptr());
    }

    #[test]
    fn test_empty_buffer() {
        let mirrored = HostBuffer::<f64>::from(Vec::new()).sync_to_device();
        assert!(mirrored.host().is_empty());
        assert!(mirrored.device().is_empty());
    }
}
