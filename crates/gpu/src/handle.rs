use crate::device::{GpuDevice, NO_RESOURCE, RawHandle, ResourceKind};
use std::fmt;
use std::rc::Rc;

/// Exclusive owner of one GPU object.
///
/// Dropping a non-empty handle releases the object through its device.
/// `take` transfers ownership and leaves this handle empty, so a
/// moved-from owner never releases anything.
pub struct GpuHandle {
    raw: RawHandle,
    kind: ResourceKind,
    device: Rc<dyn GpuDevice>,
}

impl GpuHandle {
    /// Wrap a raw id that `device` just created.
    pub fn new(device: Rc<dyn GpuDevice>, kind: ResourceKind, raw: RawHandle) -> Self {
        Self { raw, kind, device }
    }

    /// A handle that owns nothing.
    pub fn empty(device: Rc<dyn GpuDevice>, kind: ResourceKind) -> Self {
        Self::new(device, kind, NO_RESOURCE)
    }

    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.raw == NO_RESOURCE
    }

    pub fn device(&self) -> &Rc<dyn GpuDevice> {
        &self.device
    }

    /// Move the owned object into a new handle, zeroing this one.
    pub fn take(&mut self) -> Self {
        Self {
            raw: std::mem::replace(&mut self.raw, NO_RESOURCE),
            kind: self.kind,
            device: Rc::clone(&self.device),
        }
    }
}

impl Drop for GpuHandle {
    fn drop(&mut self) {
        if !self.is_empty() {
            self.device.release(self.kind, self.raw);
            self.raw = NO_RESOURCE;
        }
    }
}

impl fmt::Debug for GpuHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuHandle")
            .field("raw", &self.raw)
            .field("kind", &self.kind)
            .finish()
    }
}
