use crate::device::{GpuDevice, NO_RESOURCE, RawHandle, ResourceKind, TextureImage};
use crate::handle::GpuHandle;
use std::rc::Rc;

/// Owned 2D texture with a full mip chain.
///
/// An empty texture stands in for one that failed to load; binding it
/// binds [`NO_RESOURCE`] and the backend substitutes its fallback.
#[derive(Debug)]
pub struct GpuTexture {
    handle: GpuHandle,
}

impl GpuTexture {
    pub fn new(device: &Rc<dyn GpuDevice>, image: &TextureImage) -> Self {
        let raw = device.create_texture(image);
        Self {
            handle: GpuHandle::new(Rc::clone(device), ResourceKind::Texture, raw),
        }
    }

    pub fn empty(device: &Rc<dyn GpuDevice>) -> Self {
        Self {
            handle: GpuHandle::empty(Rc::clone(device), ResourceKind::Texture),
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.handle.raw()
    }

    pub fn is_empty(&self) -> bool {
        self.handle.raw() == NO_RESOURCE
    }

    pub fn bind(&self, unit: u32) {
        self.handle.device().bind_texture(unit, self.raw());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::PixelFormat;
    use crate::recording::{DeviceCall, RecordingDevice};

    #[test]
    fn texture_created_and_released() {
        let recording = Rc::new(RecordingDevice::new());
        let device: Rc<dyn GpuDevice> = recording.clone();
        let image = TextureImage {
            width: 2,
            height: 2,
            format: PixelFormat::Rgba8,
            pixels: vec![255; 16],
        };
        let texture = GpuTexture::new(&device, &image);
        texture.bind(3);
        assert!(recording.calls().contains(&DeviceCall::BindTexture {
            unit: 3,
            handle: texture.raw()
        }));
        let raw = texture.raw();
        drop(texture);
        assert_eq!(recording.releases_of(raw), 1);
    }
}
