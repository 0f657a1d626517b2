//! GPU resource layer: owning handles and thin buffer wrappers.
//!
//! Everything here talks to the graphics context through the [`GpuDevice`]
//! capability, which backends implement (`glimmer-render-wgpu`) and tests
//! replace with [`RecordingDevice`].
//!
//! # Invariants
//! - A raw handle of [`NO_RESOURCE`] means "nothing to release".
//! - Every non-empty [`GpuHandle`] is released exactly once, on drop.
//! - Handles are move-only. There is no way to duplicate an owner.
//! - All calls happen on the thread that owns the context; the types are
//!   `!Send` because they share the device through `Rc`.

mod buffer;
mod device;
mod handle;
mod program;
mod recording;
mod texture;

pub use buffer::{IndexBuffer, VertexArray, VertexBuffer};
pub use device::{
    AttributeFormat, BufferTarget, GpuDevice, NO_RESOURCE, PixelFormat, PolygonMode, RawHandle,
    ResourceKind, TextureImage, VertexAttribute, VertexLayout,
};
pub use handle::GpuHandle;
pub use program::{SamplerRole, ShaderProgram, TextureKind, UniformValue};
pub use recording::{DeviceCall, RecordingDevice, RecordingProgram};
pub use texture::GpuTexture;

pub fn crate_info() -> &'static str {
    "glimmer-gpu v0.1.0"
}
