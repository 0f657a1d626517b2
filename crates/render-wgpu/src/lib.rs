//! wgpu backend for glimmer.
//!
//! [`WgpuDevice`] implements the GL-style [`glimmer_gpu::GpuDevice`] on top of
//! wgpu by keeping the bind state a GL context would and recording every
//! indexed draw. [`WgpuRenderer::present`] replays the recorded draws into a
//! single render pass with the Phong pipeline.

mod device;
mod mipmap;
mod program;
mod renderer;
mod shaders;

pub use device::WgpuDevice;
pub use mipmap::{MipError, MipLevel, TEXTURE_FORMAT, mip_chain};
pub use program::{PHONG_LAYOUT, PhongProgram, Slot, SlotKind, UniformLayout};
pub use renderer::{WgpuRenderer, effective_polygon_mode, supports_layout};
pub use shaders::PHONG_SHADER;
